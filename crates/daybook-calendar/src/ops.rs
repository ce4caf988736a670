//! Tool-facing calendar operations.
//!
//! Each operation is a stateless request/response mapping over an injected
//! [`CalendarContext`]: arguments in, formatted string out. Typed errors are
//! returned to the caller; the agent-tool layer is responsible for turning
//! them into failure strings.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::client::CalendarClient;
use crate::error::CalendarError;
use crate::types::{Event, EventPatch, EventTime, NewEvent, Reminders};

/// Minutes before the event for the fixed popup reminder policy.
const REMINDER_MINUTES: u32 = 30;

/// Max characters of description shown in a list line.
const DESCRIPTION_PREVIEW_CHARS: usize = 100;

/// Everything an operation needs: the API client and the calendar to act on.
pub struct CalendarContext {
    client: CalendarClient,
    calendar_id: String,
}

impl CalendarContext {
    pub fn new(client: CalendarClient, calendar_id: impl Into<String>) -> Self {
        Self { client, calendar_id: calendar_id.into() }
    }
}

/// Arguments for event creation.
#[derive(Debug, Default)]
pub struct CreateEventArgs {
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    /// ISO-8601; trailing "Z" is UTC. Defaults to now.
    pub start_time: Option<String>,
    /// ISO-8601; defaults to start + `duration_hours`.
    pub end_time: Option<String>,
    /// Window length when `end_time` is not given.
    pub duration_hours: Option<f64>,
}

/// Arguments for a merge-update; every field independently optional.
#[derive(Debug, Default)]
pub struct UpdateEventArgs {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Parse an ISO-8601 timestamp; a bare datetime without offset is read as UTC.
fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, CalendarError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    Err(CalendarError::InvalidEventData(format!("unrecognized timestamp: {}", value)))
}

fn duration_from_hours(hours: f64) -> Result<Duration, CalendarError> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(CalendarError::InvalidEventData(format!(
            "duration_hours must be positive, got {}",
            hours
        )));
    }
    Ok(Duration::seconds((hours * 3600.0) as i64))
}

/// Create an event with the fixed reminder policy (default reminders off,
/// one popup 30 minutes prior). Returns the provider id and shareable link.
pub async fn create_event(
    ctx: &CalendarContext,
    args: CreateEventArgs,
) -> Result<String, CalendarError> {
    let start = match &args.start_time {
        Some(s) => parse_timestamp(s)?,
        None => Utc::now(),
    };

    let end = match &args.end_time {
        Some(s) => parse_timestamp(s)?,
        None => start + duration_from_hours(args.duration_hours.unwrap_or(1.0))?,
    };

    let new_event = NewEvent {
        summary: args.summary,
        description: args.description,
        location: args.location,
        start: start.into(),
        end: end.into(),
        reminders: Reminders::popup_before(REMINDER_MINUTES),
    };

    let event = ctx.client.insert_event(&ctx.calendar_id, &new_event).await?;

    Ok(format!(
        "Event created: {} (id: {})\nLink: {}",
        event.summary,
        event.id,
        event.html_link.as_deref().unwrap_or("(no link)")
    ))
}

/// List events between now and now + `days_ahead` days, one line each.
pub async fn list_events(
    ctx: &CalendarContext,
    max_results: u32,
    days_ahead: i64,
) -> Result<String, CalendarError> {
    let time_min = Utc::now();
    let time_max = time_min + Duration::days(days_ahead);

    let events = ctx
        .client
        .list_events(&ctx.calendar_id, time_min, time_max, max_results)
        .await?;

    if events.is_empty() {
        return Ok("No upcoming events found.".to_string());
    }

    let lines: Vec<String> = events.iter().map(format_event_line).collect();
    Ok(lines.join("\n"))
}

fn format_event_line(event: &Event) -> String {
    let when = match &event.start {
        EventTime::Date(date) => format!("{} (All day)", date.format("%Y-%m-%d")),
        EventTime::DateTime(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
    };

    let mut line = format!("- {} at {}", event.summary, when);

    if let Some(location) = &event.location {
        line.push_str(&format!(" @ {}", location));
    }

    if let Some(description) = &event.description {
        line.push_str(&format!(": {}", truncate(description, DESCRIPTION_PREVIEW_CHARS)));
    }

    line.push_str(&format!(" [id: {}]", event.id));
    line
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max_chars).collect();
        out.push_str("...");
        out
    }
}

/// Update an event, overlaying only the supplied fields.
pub async fn update_event(
    ctx: &CalendarContext,
    event_id: &str,
    args: UpdateEventArgs,
) -> Result<String, CalendarError> {
    let patch = EventPatch {
        summary: args.summary,
        description: args.description,
        location: args.location,
        start: args.start_time.as_deref().map(parse_timestamp).transpose()?.map(Into::into),
        end: args.end_time.as_deref().map(parse_timestamp).transpose()?.map(Into::into),
    };

    if patch.is_empty() {
        return Err(CalendarError::InvalidEventData("no fields supplied to update".into()));
    }

    // Confirm the event exists so a bad id fails before anything is written.
    ctx.client.get_event(&ctx.calendar_id, event_id).await?;

    let event = ctx.client.patch_event(&ctx.calendar_id, event_id, &patch).await?;

    Ok(format!("Event updated: {} (id: {})", event.summary, event.id))
}

/// Delete an event by id. Deleting it again reports an error.
pub async fn delete_event(ctx: &CalendarContext, event_id: &str) -> Result<String, CalendarError> {
    ctx.client.delete_event(&ctx.calendar_id, event_id).await?;
    Ok(format!("Event deleted: {}", event_id))
}
