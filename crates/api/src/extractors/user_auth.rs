//! User JWT authentication extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::{bearer_token, AuthenticatedUser};

/// Authenticated caller of the team endpoints.
///
/// Validates the Bearer token in the Authorization header unless a
/// middleware already did.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// Auth user ID from the JWT subject claim.
    pub user_id: Uuid,
    pub email: Option<String>,
}

impl From<AuthenticatedUser> for UserAuth {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email,
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(user.clone().into());
        }

        let token = bearer_token(&parts.headers).ok_or_else(|| {
            ApiError::Unauthorized("Missing or invalid Authorization header".to_string())
        })?;

        let jwt_config =
            AuthenticatedUser::create_jwt_config(&state.config).map_err(ApiError::Internal)?;

        let user = AuthenticatedUser::validate(&jwt_config, token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_auth_from_authenticated_user() {
        let user = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            email: Some("leader@example.com".to_string()),
        };
        let auth: UserAuth = user.clone().into();
        assert_eq!(auth.user_id, user.user_id);
        assert_eq!(auth.email, user.email);
    }
}
