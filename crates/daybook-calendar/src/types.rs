//! Calendar API types and data structures.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Calendar event as seen by callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    pub all_day: bool,
    pub html_link: Option<String>,
}

/// Event time - a specific datetime or an all-day date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

// Request payloads

/// Timed boundary of an event, always sent as UTC.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTimePayload {
    pub date_time: String,
    pub time_zone: String,
}

impl From<DateTime<Utc>> for EventTimePayload {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            date_time: dt.to_rfc3339_opts(SecondsFormat::Secs, true),
            time_zone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: u32,
}

/// Reminder policy attached to a new event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

impl Reminders {
    /// Default reminders off, one popup `minutes` before the event.
    pub fn popup_before(minutes: u32) -> Self {
        Self {
            use_default: false,
            overrides: vec![ReminderOverride { method: "popup".to_string(), minutes }],
        }
    }
}

/// Insert payload for a new event.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: EventTimePayload,
    pub end: EventTimePayload,
    pub reminders: Reminders,
}

/// Patch payload for merge-updates.
///
/// Only fields the caller supplied are serialized, so everything else on
/// the remote event is left untouched.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventTimePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTimePayload>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.start.is_none()
            && self.end.is_none()
    }
}

// API Response Types

/// Google Calendar API event resource.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<ApiEventTime>,
    pub end: Option<ApiEventTime>,
    pub html_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
    pub time_zone: Option<String>,
}

/// API response for event list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
    pub next_page_token: Option<String>,
}

impl Event {
    /// Convert API response to local Event.
    pub fn from_api(api: ApiEvent) -> Self {
        let (start, all_day) = api
            .start
            .map(|t| parse_event_time(&t))
            .unwrap_or((EventTime::DateTime(Utc::now()), false));

        let end = api
            .end
            .map(|t| parse_event_time(&t).0)
            .unwrap_or_else(|| start.clone());

        Self {
            id: api.id,
            summary: api.summary.unwrap_or_default(),
            description: api.description,
            location: api.location,
            start,
            end,
            all_day,
            html_link: api.html_link,
        }
    }
}

fn parse_event_time(api: &ApiEventTime) -> (EventTime, bool) {
    if let Some(dt_str) = &api.date_time {
        if let Ok(dt) = DateTime::parse_from_rfc3339(dt_str) {
            return (EventTime::DateTime(dt.with_timezone(&Utc)), false);
        }
    }
    if let Some(date_str) = &api.date {
        if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
            return (EventTime::Date(date), true);
        }
    }
    (EventTime::DateTime(Utc::now()), false)
}
