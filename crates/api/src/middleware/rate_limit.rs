//! Per-user rate limiting for the edge functions.
//!
//! One keyed governor limiter holds a budget per auth user. The edge
//! functions proxy paid upstream APIs, so the budget is per caller rather
//! than global. Users whose budget has fully refilled are pruned every
//! `PRUNE_EVERY` checks, so the key store tracks recent callers only.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter as GovRateLimiter,
};
use serde_json::json;
use std::{
    num::NonZeroU32,
    sync::atomic::{AtomicU64, Ordering},
};
use uuid::Uuid;

use crate::app::AppState;
use crate::middleware::user_auth::AuthenticatedUser;

const FALLBACK_LIMIT_PER_MINUTE: NonZeroU32 = match NonZeroU32::new(30) {
    Some(limit) => limit,
    None => NonZeroU32::MIN,
};

const PRUNE_EVERY: u64 = 1024;

/// Budgets keyed by auth user ID.
pub struct RateLimiterState {
    limiter: DefaultKeyedRateLimiter<Uuid>,
    rate_limit_per_minute: u32,
    checks: AtomicU64,
    clock: DefaultClock,
}

impl RateLimiterState {
    pub fn new(rate_limit_per_minute: u32) -> Self {
        let quota = Quota::per_minute(
            NonZeroU32::new(rate_limit_per_minute).unwrap_or(FALLBACK_LIMIT_PER_MINUTE),
        );
        Self {
            limiter: GovRateLimiter::keyed(quota),
            rate_limit_per_minute,
            checks: AtomicU64::new(0),
            clock: DefaultClock::default(),
        }
    }

    /// Returns `Err(retry_after_secs)` when the user is over budget.
    pub fn check(&self, user_id: Uuid) -> Result<(), u64> {
        let result = self.limiter.check_key(&user_id);

        if (self.checks.fetch_add(1, Ordering::Relaxed) + 1) % PRUNE_EVERY == 0 {
            self.prune();
        }

        result.map_err(|not_until| {
            let wait_time = not_until.wait_time_from(self.clock.now());
            wait_time.as_secs().max(1)
        })
    }

    /// Drops users whose budget is back to full.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    pub fn active_limiters(&self) -> usize {
        self.limiter.len()
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("active_limiters", &self.active_limiters())
            .finish()
    }
}

/// Middleware applying the per-user budget.
///
/// Must run after `require_edge_auth`, which stores the caller identity.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let user_id = match req.extensions().get::<AuthenticatedUser>() {
        Some(user) => user.user_id,
        None => return next.run(req).await,
    };

    if let Some(ref rate_limiter) = state.rate_limiter {
        if let Err(retry_after) = rate_limiter.check(user_id) {
            tracing::warn!(user_id = %user_id, retry_after, "Edge function rate limit exceeded");
            return rate_limited_response(state.config.security.rate_limit_per_minute, retry_after);
        }
    }

    next.run(req).await
}

/// 429 in the edge-function body shape with a `Retry-After` header.
fn rate_limited_response(limit: u32, retry_after: u64) -> Response {
    let body = json!({
        "success": false,
        "error": format!("Rate limit of {} requests/minute exceeded", limit),
        "retryAfter": retry_after
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_allows_requests() {
        let state = RateLimiterState::new(100);
        assert!(state.check(Uuid::new_v4()).is_ok());
    }

    #[test]
    fn test_rate_limiter_exhaustion() {
        let state = RateLimiterState::new(1);
        let user_id = Uuid::new_v4();

        assert!(state.check(user_id).is_ok());

        let result = state.check(user_id);
        assert!(result.is_err());
        assert!(result.unwrap_err() >= 1);
    }

    #[test]
    fn test_rate_limiter_users_are_independent() {
        let state = RateLimiterState::new(1);
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        assert!(state.check(first).is_ok());
        assert!(state.check(first).is_err());
        assert!(state.check(second).is_ok());
    }

    #[test]
    fn test_rate_limiter_budget() {
        let state = RateLimiterState::new(5);
        let user_id = Uuid::new_v4();

        for i in 0..5 {
            assert!(state.check(user_id).is_ok(), "Request {} should be allowed", i);
        }
        assert!(state.check(user_id).is_err());
    }

    #[test]
    fn test_zero_limit_uses_fallback() {
        let state = RateLimiterState::new(0);
        assert!(state.check(Uuid::new_v4()).is_ok());
    }

    #[test]
    fn test_one_entry_per_user() {
        let state = RateLimiterState::new(100);
        let user_id = Uuid::new_v4();

        assert!(state.check(user_id).is_ok());
        assert!(state.check(user_id).is_ok());
        assert_eq!(state.active_limiters(), 1);

        assert!(state.check(Uuid::new_v4()).is_ok());
        assert_eq!(state.active_limiters(), 2);
    }

    #[test]
    fn test_prune_keeps_throttled_users() {
        let state = RateLimiterState::new(1);
        let user_id = Uuid::new_v4();

        assert!(state.check(user_id).is_ok());
        state.prune();

        assert_eq!(state.active_limiters(), 1);
        assert!(state.check(user_id).is_err());
    }

    #[test]
    fn test_periodic_prune_bounds_idle_users() {
        let state = RateLimiterState::new(u32::MAX);

        for _ in 0..PRUNE_EVERY {
            assert!(state.check(Uuid::new_v4()).is_ok());
        }

        // A single request barely dents a budget this large, so every
        // entry has refilled by the time the prune runs.
        assert!(state.active_limiters() < PRUNE_EVERY as usize);
    }

    #[test]
    fn test_rate_limiter_state_debug() {
        let state = RateLimiterState::new(30);
        let debug = format!("{:?}", state);
        assert!(debug.contains("rate_limit_per_minute"));
        assert!(debug.contains("30"));
    }

    #[test]
    fn test_rate_limited_response_format() {
        let response = rate_limited_response(30, 60);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "60");
    }
}
