//! `google-calendar` edge function.
//!
//! The caller passes the Google access token obtained by the front end; the
//! server never stores it.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use domain::models::calendar::{
    CheckAuthResponse, CreateCalendarEventRequest, CreateCalendarEventResponse,
};
use tracing::{info, warn};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::app::AppState;
use crate::middleware::metrics::record_calendar_event;
use crate::middleware::user_auth::{edge_failure, AuthenticatedUser};

/// Confirms the caller's session.
///
/// GET /functions/v1/google-calendar/check-auth
pub async fn check_auth(Extension(user): Extension<AuthenticatedUser>) -> Json<CheckAuthResponse> {
    Json(CheckAuthResponse {
        success: true,
        authenticated: true,
        user_id: user.user_id,
        email: user.email,
    })
}

/// POST /functions/v1/google-calendar/create-event
pub async fn create_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Result<Json<CreateCalendarEventRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(user_id = %user.user_id, error = %rejection, "Malformed create-event body");
            return edge_failure(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    if let Err(errors) = request.validate() {
        record_calendar_event("invalid_request");
        return edge_failure(
            StatusCode::BAD_REQUEST,
            validation_messages(&errors).join("; "),
        );
    }

    match state.calendar.create_event(&request).await {
        Ok(event) => {
            record_calendar_event("created");
            info!(
                user_id = %user.user_id,
                event_id = %event.id,
                calendar_id = %request.calendar_id_or_primary(),
                "Calendar event created"
            );

            Json(CreateCalendarEventResponse {
                success: true,
                event_id: event.id,
                html_link: event.html_link,
            })
            .into_response()
        }
        Err(e) => {
            record_calendar_event("failed");
            warn!(user_id = %user.user_id, error = %e, "Calendar event creation failed");
            edge_failure(e.status_code(), e.public_message())
        }
    }
}

/// Flattens field, nested and schema-level validation messages.
fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    collect_messages(errors, &mut messages);
    messages.sort();
    messages
}

fn collect_messages(errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                out.extend(field_errors.iter().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                }));
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(nested, out),
            ValidationErrorsKind::List(items) => {
                for nested in items.values() {
                    collect_messages(nested, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use domain::models::calendar::CalendarEventInput;

    #[test]
    fn test_validation_messages_include_nested_errors() {
        let start = Utc::now();
        let request = CreateCalendarEventRequest {
            provider_token: String::new(),
            calendar_id: None,
            event: CalendarEventInput {
                summary: "Town hall".to_string(),
                description: None,
                location: None,
                start,
                end: start - Duration::hours(1),
                time_zone: None,
                attendees: vec![],
            },
        };

        let errors = request.validate().unwrap_err();
        let messages = validation_messages(&errors);
        assert!(messages.contains(&"providerToken is required".to_string()));
        assert!(messages.contains(&"Event end must be after its start".to_string()));
    }
}
