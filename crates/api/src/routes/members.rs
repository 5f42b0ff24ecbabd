//! Team roster routes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::member::{
    ListMembersQuery, ListMembersResponse, MemberStatus, MemberSummary, RemoveMemberResponse,
};
use domain::models::Member;
use domain::services::{require_leader, require_member};
use persistence::repositories::MemberRepository;
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_member_removed;

/// List a team's members.
///
/// GET /api/v1/teams/:team_id/members?include_inactive=true
///
/// Any active member sees the active roster; removed members are only
/// listed for the leader.
pub async fn list_members(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(team_id): Path<Uuid>,
    Query(query): Query<ListMembersQuery>,
) -> Result<Json<ListMembersResponse>, ApiError> {
    let member_repo = MemberRepository::new(state.pool.clone());

    let caller: Option<Member> = member_repo
        .find_membership(team_id, user_auth.user_id)
        .await?
        .map(Into::into);

    if query.include_inactive {
        require_leader(team_id, caller.as_ref())?;
    } else {
        require_member(team_id, caller.as_ref())?;
    }

    let members = member_repo
        .list_for_team(team_id, query.include_inactive)
        .await?;

    Ok(Json(ListMembersResponse {
        data: members
            .into_iter()
            .map(|m| MemberSummary::from(Member::from(m)))
            .collect(),
    }))
}

/// Remove a staff member from the team.
///
/// DELETE /api/v1/teams/:team_id/members/:member_id
///
/// Removal deactivates the row. Repeating it returns 200 with
/// `already_removed: true`.
pub async fn remove_member(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path((team_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<RemoveMemberResponse>, ApiError> {
    let member_repo = MemberRepository::new(state.pool.clone());

    let outcome = member_repo
        .remove_member(team_id, user_auth.user_id, member_id)
        .await?;

    if !outcome.already_removed {
        record_member_removed();
    }

    info!(
        team_id = %team_id,
        member_id = %member_id,
        operator = %user_auth.user_id,
        already_removed = outcome.already_removed,
        "Member removal handled"
    );

    Ok(Json(removal_response(
        outcome.member.id,
        outcome.member.status.into(),
        outcome.already_removed,
    )))
}

fn removal_response(
    member_id: Uuid,
    status: MemberStatus,
    already_removed: bool,
) -> RemoveMemberResponse {
    let message = if already_removed {
        "Member has already been removed"
    } else {
        "Member removed"
    };

    RemoveMemberResponse {
        member_id,
        status,
        already_removed,
        message: message.to_string(),
    }
}
