//! Google Calendar event creation.

use std::time::Duration;

use axum::http::StatusCode;
use domain::models::calendar::{CalendarEventInput, CreateCalendarEventRequest};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::CalendarConfig;

/// Errors that can occur while creating a calendar event.
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Google rejected the provider token")]
    Unauthorized,

    #[error("Calendar request timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Google Calendar error: HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Invalid response from Google Calendar: {0}")]
    InvalidResponse(String),

    #[error("Invalid calendar base URL: {0}")]
    InvalidBaseUrl(String),
}

impl From<url::ParseError> for CalendarError {
    fn from(err: url::ParseError) -> Self {
        CalendarError::InvalidBaseUrl(err.to_string())
    }
}

impl CalendarError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CalendarError::Unauthorized => StatusCode::UNAUTHORIZED,
            CalendarError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            CalendarError::Http(_)
            | CalendarError::Upstream { .. }
            | CalendarError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            CalendarError::InvalidBaseUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn public_message(&self) -> String {
        match self {
            CalendarError::Unauthorized => {
                "Google authorization expired. Please reconnect your calendar.".to_string()
            }
            CalendarError::Timeout => "Google Calendar timed out. Please try again.".to_string(),
            CalendarError::Upstream { message, .. } if !message.is_empty() => {
                format!("Failed to create calendar event: {}", message)
            }
            _ => "Failed to create calendar event".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTime<'a> {
    date_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_zone: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Attendee<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct EventResource<'a> {
    summary: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
    start: EventTime<'a>,
    end: EventTime<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attendees: Vec<Attendee<'a>>,
}

impl<'a> From<&'a CalendarEventInput> for EventResource<'a> {
    fn from(event: &'a CalendarEventInput) -> Self {
        let time_zone = event.time_zone.as_deref().filter(|tz| !tz.trim().is_empty());
        Self {
            summary: event.summary.trim(),
            description: event.description.as_deref(),
            location: event.location.as_deref(),
            start: EventTime {
                date_time: event.start.to_rfc3339(),
                time_zone,
            },
            end: EventTime {
                date_time: event.end.to_rfc3339(),
                time_zone,
            },
            attendees: event
                .attendees
                .iter()
                .map(|email| Attendee {
                    email: email.as_str(),
                })
                .collect(),
        }
    }
}

/// Event as returned by Google.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEvent {
    pub id: String,
    #[serde(default)]
    pub html_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Client for the Google Calendar REST API.
pub struct CalendarClient {
    client: Client,
    base_url: Url,
}

impl CalendarClient {
    pub fn new(config: CalendarConfig) -> Result<Self, CalendarError> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(CalendarError::InvalidBaseUrl(config.base_url));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// `{base_url}/calendar/v3/calendars/{calendar_id}/events`, with the
    /// calendar ID encoded as a single path segment.
    fn events_url(&self, calendar_id: &str) -> Result<Url, CalendarError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CalendarError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["calendar", "v3", "calendars", calendar_id, "events"]);
        Ok(url)
    }

    /// Creates an event in the requested calendar with the user's provider token.
    pub async fn create_event(
        &self,
        request: &CreateCalendarEventRequest,
    ) -> Result<CreatedEvent, CalendarError> {
        let calendar_id = request.calendar_id_or_primary();
        let url = self.events_url(calendar_id)?;

        debug!(calendar_id = %calendar_id, "Creating Google Calendar event");

        let response = self
            .client
            .post(url)
            .bearer_auth(&request.provider_token)
            .json(&EventResource::from(&request.event))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CalendarError::Timeout
                } else {
                    CalendarError::Http(e)
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(CalendarError::Unauthorized);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GoogleErrorEnvelope>(&text)
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or_default();
            warn!(status = status.as_u16(), error = %message, "Google Calendar returned an error");
            return Err(CalendarError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<CreatedEvent>()
            .await
            .map_err(|e| CalendarError::InvalidResponse(e.to_string()))
    }
}
