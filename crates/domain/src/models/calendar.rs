//! Calendar event models for the Google Calendar proxy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Event details supplied by the front end.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_event_window"))]
pub struct CalendarEventInput {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Summary must be between 1 and 255 characters"
    ))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub summary: String,

    #[validate(length(max = 8000, message = "Description must be at most 8000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 500, message = "Location must be at most 500 characters"))]
    pub location: Option<String>,

    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,

    /// IANA time zone name shown in the calendar, e.g. `Africa/Nairobi`.
    pub time_zone: Option<String>,

    #[serde(default)]
    #[validate(length(max = 50, message = "At most 50 attendees are allowed"))]
    pub attendees: Vec<String>,
}

fn validate_event_window(event: &CalendarEventInput) -> Result<(), ValidationError> {
    if event.end <= event.start {
        let mut err = ValidationError::new("event_window");
        err.message = Some("Event end must be after its start".into());
        return Err(err);
    }
    Ok(())
}

/// Request body for `create-event`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCalendarEventRequest {
    /// The user's Google OAuth access token.
    #[validate(length(min = 1, message = "providerToken is required"))]
    pub provider_token: String,

    pub calendar_id: Option<String>,

    #[validate(nested)]
    pub event: CalendarEventInput,
}

impl CreateCalendarEventRequest {
    pub fn calendar_id_or_primary(&self) -> &str {
        self.calendar_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or("primary")
    }
}

/// Response after an event was created.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCalendarEventResponse {
    pub success: bool,
    pub event_id: String,
    pub html_link: Option<String>,
}

/// Response for `check-auth`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAuthResponse {
    pub success: bool,
    pub authenticated: bool,
    pub user_id: Uuid,
    pub email: Option<String>,
}
