use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_edge_auth,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{ai_summary, google_calendar, health, invitations, members, regions, teams};
use crate::services::{CalendarClient, SummaryClient};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
    pub summarizer: Arc<SummaryClient>,
    pub calendar: Arc<CalendarClient>,
}

pub fn create_app(config: Config, pool: PgPool) -> anyhow::Result<Router> {
    let config = Arc::new(config);

    // rate_limit_per_minute = 0 disables limiting
    let rate_limiter = (config.security.rate_limit_per_minute > 0)
        .then(|| Arc::new(RateLimiterState::new(config.security.rate_limit_per_minute)));

    let state = AppState {
        pool,
        config: config.clone(),
        rate_limiter,
        summarizer: Arc::new(SummaryClient::new(config.llm.clone())?),
        calendar: Arc::new(CalendarClient::new(config.calendar.clone())?),
    };

    let cors = if config.security.cors_origins.is_empty() {
        // Development: any origin
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Team routes authenticate through the UserAuth extractor.
    let team_routes = Router::new()
        .route("/api/v1/teams/claim", post(teams::claim_team))
        .route("/api/v1/teams/join", post(teams::join_team))
        .route("/api/v1/teams/me", get(teams::list_my_teams))
        .route("/api/v1/teams/:team_id", get(teams::get_team))
        .route("/api/v1/teams/:team_id/members", get(members::list_members))
        .route(
            "/api/v1/teams/:team_id/members/:member_id",
            delete(members::remove_member),
        )
        .route(
            "/api/v1/teams/:team_id/invitations",
            post(invitations::create_invitation).get(invitations::list_invitations),
        )
        .route(
            "/api/v1/teams/:team_id/invitations/:invitation_id/reset",
            post(invitations::reset_invitation),
        );

    // Edge functions: auth runs first, then the per-user rate limit.
    let edge_routes = Router::new()
        .route("/functions/v1/ai-summary", post(ai_summary::summarize))
        .route(
            "/functions/v1/google-calendar/check-auth",
            get(google_calendar::check_auth),
        )
        .route(
            "/functions/v1/google-calendar/create-event",
            post(google_calendar::create_event),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_edge_auth,
        ));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/counties", get(regions::list_counties))
        .route(
            "/api/v1/counties/:county_id/districts",
            get(regions::list_districts),
        )
        .route(
            "/api/v1/invitations/:code",
            get(invitations::preview_invitation),
        );

    Ok(Router::new()
        .merge(public_routes)
        .merge(team_routes)
        .merge(edge_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state))
}
