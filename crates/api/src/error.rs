//! HTTP error type for the team endpoints.
//!
//! The edge functions answer with `{success: false, error}` instead; see
//! `middleware::user_auth::edge_failure`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::MembershipError;
use persistence::WorkflowError;
use serde::Serialize;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Gone: {0}")]
    Gone(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Vec<ValidationDetail>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// One rejected request field.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<ValidationDetail>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Gone(_) => StatusCode::GONE,
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Gone(_) => "gone",
            ApiError::Validation { .. } => "validation_error",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = self.code();

        let (message, details) = match self {
            ApiError::Internal(msg) => {
                // Never leak database text to the caller.
                tracing::error!(error = %msg, "Request failed");
                ("An internal error occurred".to_string(), Vec::new())
            }
            ApiError::Validation { message, details } => (message, details),
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Gone(msg) => (msg, Vec::new()),
        };

        (
            status,
            Json(ErrorBody {
                error,
                message,
                details,
            }),
        )
            .into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => ApiError::Conflict("Resource already exists".into()),
                Some("23503") => ApiError::NotFound("Referenced resource not found".into()),
                _ => ApiError::Internal(format!("Database error: {}", db_err)),
            },
            other => ApiError::Internal(format!("Database error: {}", other)),
        }
    }
}

impl From<MembershipError> for ApiError {
    fn from(err: MembershipError) -> Self {
        let message = err.to_string();
        match err {
            MembershipError::RegistrationCodeNotFound
            | MembershipError::TeamNotFound
            | MembershipError::InvitationNotFound
            | MembershipError::NotTeamMember
            | MembershipError::MemberNotFound => ApiError::NotFound(message),
            MembershipError::RegistrationCodeUsed
            | MembershipError::InvitationExhausted
            | MembershipError::AlreadyMember
            | MembershipError::TeamInactive => ApiError::Conflict(message),
            MembershipError::InvitationExpired => ApiError::Gone(message),
            MembershipError::NotLeader
            | MembershipError::CannotRemoveSelf
            | MembershipError::CannotRemoveLeader => ApiError::Forbidden(message),
            MembershipError::RemovalNotApplied => ApiError::Internal(message),
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Database(e) => e.into(),
            WorkflowError::Rejected(e) => e.into(),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details = Vec::new();
        collect_details("", &errors, &mut details);
        details.sort_by(|a, b| a.field.cmp(&b.field));

        let message = match details.as_slice() {
            [only] => only.message.clone(),
            _ => format!("{} validation errors", details.len()),
        };

        ApiError::Validation { message, details }
    }
}

fn collect_details(prefix: &str, errors: &ValidationErrors, out: &mut Vec<ValidationDetail>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                out.extend(field_errors.iter().map(|e| ValidationDetail {
                    field: path.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", path)),
                }));
            }
            ValidationErrorsKind::Struct(nested) => collect_details(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_details(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_membership_error_status_codes() {
        let cases = [
            (MembershipError::RegistrationCodeNotFound, StatusCode::NOT_FOUND),
            (MembershipError::RegistrationCodeUsed, StatusCode::CONFLICT),
            (MembershipError::TeamInactive, StatusCode::CONFLICT),
            (MembershipError::InvitationExhausted, StatusCode::CONFLICT),
            (MembershipError::InvitationExpired, StatusCode::GONE),
            (MembershipError::AlreadyMember, StatusCode::CONFLICT),
            (MembershipError::NotTeamMember, StatusCode::NOT_FOUND),
            (MembershipError::NotLeader, StatusCode::FORBIDDEN),
            (MembershipError::MemberNotFound, StatusCode::NOT_FOUND),
            (MembershipError::CannotRemoveSelf, StatusCode::FORBIDDEN),
            (MembershipError::CannotRemoveLeader, StatusCode::FORBIDDEN),
            (MembershipError::RemovalNotApplied, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            let response = ApiError::from(err.clone()).into_response();
            assert_eq!(response.status(), status, "{:?}", err);
        }
    }

    #[test]
    fn test_rejection_message_reaches_caller() {
        match ApiError::from(MembershipError::CannotRemoveLeader) {
            ApiError::Forbidden(msg) => assert_eq!(msg, "Team leaders cannot be removed"),
            other => panic!("Expected Forbidden, got {:?}", other),
        }
        match ApiError::from(MembershipError::CannotRemoveSelf) {
            ApiError::Forbidden(msg) => {
                assert_eq!(msg, "You cannot remove yourself from the team")
            }
            other => panic!("Expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_workflow_error_database_maps_through_sqlx() {
        let error: ApiError = WorkflowError::Database(sqlx::Error::RowNotFound).into();
        assert!(matches!(error, ApiError::NotFound(_)));

        let error: ApiError = WorkflowError::Database(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(error, ApiError::Internal(_)));
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let (status, body) =
            body_json(ApiError::Internal("relation \"groups\" does not exist".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "An internal error occurred");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_validation_errors_listed_per_field() {
        let request = domain::models::team::ClaimTeamRequest {
            registration_code: "0O1I".to_string(),
            name: "   ".to_string(),
            email: "not-an-email".to_string(),
        };
        let errors = request.validate().unwrap_err();

        let (status, body) = body_json(errors.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], "3 validation errors");

        let fields: Vec<&str> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["email", "name", "registration_code"]);
    }

    #[test]
    fn test_single_validation_error_becomes_message() {
        let request = domain::models::invitation::CreateInvitationRequest {
            max_uses: Some(0),
            expires_in_hours: None,
        };
        let error: ApiError = request.validate().unwrap_err().into();
        match error {
            ApiError::Validation { message, details } => {
                assert_eq!(message, "max_uses must be between 1 and 100");
                assert_eq!(details.len(), 1);
            }
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            ApiError::Unauthorized("test".to_string()).to_string(),
            "Unauthorized: test"
        );
        assert_eq!(
            ApiError::Gone("Invitation has expired".to_string()).to_string(),
            "Gone: Invitation has expired"
        );
    }
}
