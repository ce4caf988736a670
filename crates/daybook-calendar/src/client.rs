//! Google Calendar API client.

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::error::CalendarError;
use crate::types::*;

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

pub struct CalendarClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl CalendarClient {
    pub fn new(access_token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token: access_token.to_string(),
            base_url: CALENDAR_API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    pub fn new_with_base_url(access_token: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token: access_token.to_string(),
            base_url: base_url.to_string(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// Insert a new event.
    #[instrument(skip(self, event), level = "info")]
    pub async fn insert_event(
        &self,
        calendar_id: &str,
        event: &NewEvent,
    ) -> Result<Event, CalendarError> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id),
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(event)
            .send()
            .await?;

        let api_event: ApiEvent = self.handle_response(response).await?;
        Ok(Event::from_api(api_event))
    }

    /// List events within a time range, single occurrences expanded,
    /// ordered by start time.
    #[instrument(skip(self), level = "info")]
    pub async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<Event>, CalendarError> {
        let url = format!(
            "{}/calendars/{}/events?timeMin={}&timeMax={}&singleEvents=true&orderBy=startTime&maxResults={}",
            self.base_url,
            urlencoding::encode(calendar_id),
            urlencoding::encode(&time_min.to_rfc3339()),
            urlencoding::encode(&time_max.to_rfc3339()),
            max_results,
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        let resp: EventListResponse = self.handle_response(response).await?;
        Ok(resp.items.into_iter().map(Event::from_api).collect())
    }

    /// Get a single event.
    #[instrument(skip(self), level = "info")]
    pub async fn get_event(
        &self,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<Event, CalendarError> {
        let url = format!(
            "{}/calendars/{}/events/{}",
            self.base_url,
            urlencoding::encode(calendar_id),
            urlencoding::encode(event_id),
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        let api_event: ApiEvent = self.handle_response(response).await?;
        Ok(Event::from_api(api_event))
    }

    /// Patch an existing event; only the fields present in `patch` change.
    #[instrument(skip(self, patch), level = "info")]
    pub async fn patch_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        patch: &EventPatch,
    ) -> Result<Event, CalendarError> {
        let url = format!(
            "{}/calendars/{}/events/{}",
            self.base_url,
            urlencoding::encode(calendar_id),
            urlencoding::encode(event_id),
        );

        let response = self
            .client
            .patch(&url)
            .header("Authorization", self.auth_header())
            .json(patch)
            .send()
            .await?;

        let api_event: ApiEvent = self.handle_response(response).await?;
        Ok(Event::from_api(api_event))
    }

    /// Delete an event.
    #[instrument(skip(self), level = "info")]
    pub async fn delete_event(
        &self,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<(), CalendarError> {
        let url = format!(
            "{}/calendars/{}/events/{}",
            self.base_url,
            urlencoding::encode(calendar_id),
            urlencoding::encode(event_id),
        );

        let response = self
            .client
            .delete(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        // Delete returns 204 No Content on success
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status.as_u16() == 404 || status.as_u16() == 410 {
            Err(CalendarError::EventNotFound(event_id.to_string()))
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(CalendarError::ApiError(format!("{}: {}", status, text)))
        }
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CalendarError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| CalendarError::ApiError(format!("JSON parse error: {}", e)))
        } else if status.as_u16() == 401 {
            Err(CalendarError::TokenExpired)
        } else if status.as_u16() == 403 {
            Err(CalendarError::AuthRequired)
        } else if status.as_u16() == 404 || status.as_u16() == 410 {
            let text = response.text().await.unwrap_or_default();
            Err(CalendarError::EventNotFound(text))
        } else if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            Err(CalendarError::RateLimited(retry_after))
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(CalendarError::ApiError(format!("{}: {}", status, text)))
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn new_event(summary: &str) -> NewEvent {
        let start: DateTime<Utc> = "2030-01-01T10:00:00Z".parse().unwrap();
        NewEvent {
            summary: summary.to_string(),
            description: None,
            location: None,
            start: start.into(),
            end: (start + chrono::Duration::hours(1)).into(),
            reminders: Reminders::popup_before(30),
        }
    }

    #[tokio::test]
    async fn test_insert_event() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .and(header("Authorization", "Bearer test_token"))
            .and(body_partial_json(serde_json::json!({
                "summary": "Standup",
                "reminders": {"useDefault": false}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "event1",
                "summary": "Standup",
                "start": {"dateTime": "2030-01-01T10:00:00Z"},
                "end": {"dateTime": "2030-01-01T11:00:00Z"},
                "htmlLink": "https://calendar.google.com/event?id=event1"
            })))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::new_with_base_url("test_token", &mock_server.uri());
        let event = client.insert_event("primary", &new_event("Standup")).await.unwrap();

        assert_eq!(event.id, "event1");
        assert_eq!(
            event.html_link,
            Some("https://calendar.google.com/event?id=event1".to_string())
        );
    }

    #[tokio::test]
    async fn test_list_events() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(query_param("singleEvents", "true"))
            .and(query_param("orderBy", "startTime"))
            .and(query_param("maxResults", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {
                        "id": "event1",
                        "summary": "Meeting",
                        "start": {"dateTime": "2024-02-01T10:00:00Z"},
                        "end": {"dateTime": "2024-02-01T11:00:00Z"}
                    }
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::new_with_base_url("test_token", &mock_server.uri());
        let time_min = "2024-02-01T00:00:00Z".parse().unwrap();
        let time_max = "2024-02-28T23:59:59Z".parse().unwrap();

        let events = client.list_events("primary", time_min, time_max, 10).await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Meeting");
    }

    #[tokio::test]
    async fn test_get_event() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events/event123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "event123",
                "summary": "Team Sync",
                "start": {"dateTime": "2024-02-01T14:00:00Z"},
                "end": {"dateTime": "2024-02-01T15:00:00Z"}
            })))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::new_with_base_url("test_token", &mock_server.uri());
        let event = client.get_event("primary", "event123").await.unwrap();

        assert_eq!(event.id, "event123");
        assert_eq!(event.summary, "Team Sync");
    }

    #[tokio::test]
    async fn test_patch_event_sends_only_patch_fields() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/calendars/primary/events/event123"))
            .and(wiremock::matchers::body_json(serde_json::json!({"location": "Room B"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "event123",
                "summary": "Team Sync",
                "location": "Room B",
                "start": {"dateTime": "2024-02-01T14:00:00Z"},
                "end": {"dateTime": "2024-02-01T15:00:00Z"}
            })))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::new_with_base_url("test_token", &mock_server.uri());
        let patch = EventPatch { location: Some("Room B".to_string()), ..Default::default() };
        let event = client.patch_event("primary", "event123", &patch).await.unwrap();

        assert_eq!(event.location, Some("Room B".to_string()));
        assert_eq!(event.summary, "Team Sync");
    }

    #[tokio::test]
    async fn test_delete_event() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/calendars/primary/events/event123"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::new_with_base_url("test_token", &mock_server.uri());
        let result = client.delete_event("primary", "event123").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing_event_is_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/calendars/primary/events/gone"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::new_with_base_url("test_token", &mock_server.uri());
        let result = client.delete_event("primary", "gone").await;

        assert!(matches!(result, Err(CalendarError::EventNotFound(_))));
    }

    #[tokio::test]
    async fn test_token_expired() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events/event123"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::new_with_base_url("expired_token", &mock_server.uri());
        let result = client.get_event("primary", "event123").await;

        assert!(matches!(result, Err(CalendarError::TokenExpired)));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events/event123"))
            .respond_with(ResponseTemplate::new(429).append_header("Retry-After", "60"))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::new_with_base_url("token", &mock_server.uri());
        let result = client.get_event("primary", "event123").await;

        assert!(matches!(result, Err(CalendarError::RateLimited(60))));
    }
}
