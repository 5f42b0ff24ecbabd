//! Invitation routes for team leaders, plus the public code preview.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use domain::models::invitation::{
    generate_access_code, CreateInvitationRequest, InvitationState, InvitationSummary,
    ListInvitationsResponse, PublicInvitationInfo,
};
use domain::models::{Invitation, Member, TeamStatus};
use domain::services::require_leader;
use domain::MembershipError;
use persistence::repositories::{InvitationRepository, MemberRepository, TeamRepository};
use shared::validation::{is_valid_access_code, normalize_access_code};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_invitation_created;

/// Loads the caller's membership and requires them to lead `team_id`.
async fn require_team_leader(
    state: &AppState,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<Member, ApiError> {
    let member_repo = MemberRepository::new(state.pool.clone());
    let caller: Option<Member> = member_repo
        .find_membership(team_id, user_id)
        .await?
        .map(Into::into);

    Ok(require_leader(team_id, caller.as_ref())?.clone())
}

/// Create an invitation.
///
/// POST /api/v1/teams/:team_id/invitations
pub async fn create_invitation(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(team_id): Path<Uuid>,
    Json(request): Json<CreateInvitationRequest>,
) -> Result<(StatusCode, Json<InvitationSummary>), ApiError> {
    request.validate()?;

    let leader = require_team_leader(&state, team_id, user_auth.user_id).await?;

    let team_repo = TeamRepository::new(state.pool.clone());
    let team = team_repo
        .find_by_id(team_id)
        .await?
        .ok_or(MembershipError::TeamNotFound)?;
    if TeamStatus::from(team.status) != TeamStatus::Active {
        return Err(MembershipError::TeamInactive.into());
    }

    let invitation_repo = InvitationRepository::new(state.pool.clone());
    let code_length = state.config.invitations.code_length;
    let code = invitation_repo
        .generate_unique_code(|| generate_access_code(code_length))
        .await?;

    let now = Utc::now();
    let invitation: Invitation = invitation_repo
        .create_invitation(
            team_id,
            &code,
            request.max_uses_or_default(),
            request.expires_at_from(now, state.config.invitations.default_ttl_hours),
            leader.auth_user_id,
        )
        .await?
        .into();

    record_invitation_created();
    info!(
        team_id = %team_id,
        invitation_id = %invitation.id,
        max_uses = invitation.max_uses,
        "Invitation created"
    );

    Ok((
        StatusCode::CREATED,
        Json(InvitationSummary::from_invitation(invitation, now)),
    ))
}

/// List a team's invitations, newest first.
///
/// GET /api/v1/teams/:team_id/invitations
pub async fn list_invitations(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(team_id): Path<Uuid>,
) -> Result<Json<ListInvitationsResponse>, ApiError> {
    require_team_leader(&state, team_id, user_auth.user_id).await?;

    let invitation_repo = InvitationRepository::new(state.pool.clone());
    let now = Utc::now();
    let data = invitation_repo
        .list(Some(team_id))
        .await?
        .into_iter()
        .map(|i| InvitationSummary::from_invitation(i.into(), now))
        .collect();

    Ok(Json(ListInvitationsResponse { data }))
}

/// Reissue an invitation under a fresh code with its counters cleared.
///
/// POST /api/v1/teams/:team_id/invitations/:invitation_id/reset
pub async fn reset_invitation(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path((team_id, invitation_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<InvitationSummary>, ApiError> {
    require_team_leader(&state, team_id, user_auth.user_id).await?;

    let invitation_repo = InvitationRepository::new(state.pool.clone());
    let code_length = state.config.invitations.code_length;
    let code = invitation_repo
        .generate_unique_code(|| generate_access_code(code_length))
        .await?;

    let now = Utc::now();
    let expires_at = now + Duration::hours(state.config.invitations.default_ttl_hours);
    let invitation: Invitation = invitation_repo
        .reset_invitation(invitation_id, Some(team_id), &code, expires_at)
        .await?
        .ok_or(MembershipError::InvitationNotFound)?
        .into();

    Ok(Json(InvitationSummary::from_invitation(invitation, now)))
}

/// Public preview of an invitation code before signing in to redeem it.
///
/// GET /api/v1/invitations/:code
pub async fn preview_invitation(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<PublicInvitationInfo>, ApiError> {
    let code = normalize_access_code(&code);
    if !is_valid_access_code(&code) {
        return Err(MembershipError::InvitationNotFound.into());
    }

    let invitation_repo = InvitationRepository::new(state.pool.clone());
    let row = invitation_repo
        .find_by_code_with_team(&code)
        .await?
        .ok_or(MembershipError::InvitationNotFound)?;

    let team_status: TeamStatus = row.team_status.into();
    let invitation: Invitation = row.invitation.into();

    Ok(Json(public_info(
        &invitation,
        row.team_name,
        row.politician_name,
        team_status,
    )))
}

fn public_info(
    invitation: &Invitation,
    team_name: String,
    politician_name: String,
    team_status: TeamStatus,
) -> PublicInvitationInfo {
    let state = invitation.state_at(Utc::now());
    PublicInvitationInfo {
        team_name,
        politician_name,
        state,
        expires_at: invitation.expires_at,
        is_valid: state == InvitationState::Active && team_status == TeamStatus::Active,
    }
}
