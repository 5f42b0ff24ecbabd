//! Bearer token authentication.
//!
//! Tokens are HS256 JWTs issued by the identity provider. The subject claim
//! is the auth user ID used for every membership lookup.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use domain::models::summary::EdgeFailure;
use shared::jwt::{extract_user_id, JwtConfig};
use uuid::Uuid;

use crate::app::AppState;
use crate::config::Config;

/// Identity extracted from a validated access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Auth user ID from the `sub` claim.
    pub user_id: Uuid,
    pub email: Option<String>,
}

impl AuthenticatedUser {
    /// Validates an access token and returns the caller's identity.
    pub fn validate(jwt_config: &JwtConfig, token: &str) -> Result<Self, String> {
        let claims = jwt_config
            .validate_access_token(token)
            .map_err(|e| format!("Invalid token: {}", e))?;

        let user_id =
            extract_user_id(&claims).map_err(|_| "Invalid user ID in token".to_string())?;

        Ok(AuthenticatedUser {
            user_id,
            email: claims.email,
        })
    }

    /// Builds the token validator from the auth section.
    pub fn create_jwt_config(config: &Config) -> Result<JwtConfig, String> {
        JwtConfig::with_leeway(
            &config.auth.jwt_secret,
            config.jwt_audience(),
            config.auth.access_token_expiry_secs,
            config.auth.leeway_secs,
        )
        .map_err(|e| format!("Failed to initialize JWT config: {}", e))
    }
}

/// Returns the token of a `Bearer` Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware guarding the edge functions.
///
/// Failures use the `{ success, error }` body those endpoints share. The
/// identity is stored in request extensions for the rate limiter and handlers.
pub async fn require_edge_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = match bearer_token(req.headers()) {
        Some(token) => token,
        None => return edge_failure(StatusCode::UNAUTHORIZED, "Missing authorization header"),
    };

    let jwt_config = match AuthenticatedUser::create_jwt_config(&state.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to create JWT config: {}", e);
            return edge_failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service unavailable",
            );
        }
    };

    match AuthenticatedUser::validate(&jwt_config, token) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!("JWT validation failed: {}", e);
            edge_failure(StatusCode::UNAUTHORIZED, "Invalid or expired token")
        }
    }
}

/// Error response in the edge-function shape.
pub fn edge_failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(EdgeFailure::new(message))).into_response()
}
