//! Team routes: claiming with a registration code, joining with an
//! invitation and reading team details.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::member::MembershipInfo;
use domain::models::team::{
    ClaimTeamRequest, ClaimTeamResponse, ListTeamsResponse, TeamDetail, TeamInfo, TeamSummary,
};
use domain::models::invitation::{JoinTeamRequest, JoinTeamResponse};
use domain::models::{Member, Team};
use domain::services::require_member;
use domain::MembershipError;
use persistence::entities::TeamWithMembershipEntity;
use persistence::repositories::{InvitationRepository, MemberRepository, TeamRepository};
use shared::validation::normalize_access_code;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::{record_invitation_redeemed, record_team_claimed};

/// Claim a pending team and become its leader.
///
/// POST /api/v1/teams/claim
pub async fn claim_team(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<ClaimTeamRequest>,
) -> Result<(StatusCode, Json<ClaimTeamResponse>), ApiError> {
    request.validate()?;

    let code = normalize_access_code(&request.registration_code);
    let team_repo = TeamRepository::new(state.pool.clone());

    let (team, leader) = team_repo
        .claim_team(
            &code,
            user_auth.user_id,
            request.name.trim(),
            &normalize_email(&request.email),
        )
        .await?;

    record_team_claimed();

    let team: Team = team.into();
    let leader: Member = leader.into();

    Ok((
        StatusCode::CREATED,
        Json(ClaimTeamResponse {
            team: TeamInfo::from(&team),
            membership: MembershipInfo::from(&leader),
        }),
    ))
}

/// Redeem an invitation code and join its team as staff.
///
/// POST /api/v1/teams/join
pub async fn join_team(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<JoinTeamRequest>,
) -> Result<(StatusCode, Json<JoinTeamResponse>), ApiError> {
    request.validate()?;

    let code = normalize_access_code(&request.invite_code);
    let invitation_repo = InvitationRepository::new(state.pool.clone());

    let redemption = invitation_repo
        .redeem(
            &code,
            user_auth.user_id,
            request.name.trim(),
            &normalize_email(&request.email),
        )
        .await?;

    record_invitation_redeemed();

    let team: Team = redemption.team.into();
    let member: Member = redemption.member.into();

    Ok((
        StatusCode::CREATED,
        Json(JoinTeamResponse {
            team: TeamInfo::from(&team),
            membership: MembershipInfo::from(&member),
        }),
    ))
}

/// List the teams the caller actively belongs to.
///
/// GET /api/v1/teams/me
pub async fn list_my_teams(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<ListTeamsResponse>, ApiError> {
    let team_repo = TeamRepository::new(state.pool.clone());
    let rows = team_repo.list_for_user(user_auth.user_id).await?;

    Ok(Json(ListTeamsResponse {
        data: rows.into_iter().map(team_summary).collect(),
    }))
}

/// Team detail for an active member.
///
/// GET /api/v1/teams/:team_id
pub async fn get_team(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(team_id): Path<Uuid>,
) -> Result<Json<TeamDetail>, ApiError> {
    let team_repo = TeamRepository::new(state.pool.clone());
    let member_repo = MemberRepository::new(state.pool.clone());

    let membership: Option<Member> = member_repo
        .find_membership(team_id, user_auth.user_id)
        .await?
        .map(Into::into);
    let membership = require_member(team_id, membership.as_ref())?;

    let team: Team = team_repo
        .find_by_id(team_id)
        .await?
        .ok_or(MembershipError::TeamNotFound)?
        .into();
    let active_member_count = member_repo.count_active(team_id).await?;

    info!(team_id = %team_id, user_id = %user_auth.user_id, "Team detail requested");

    Ok(Json(TeamDetail {
        id: team.id,
        name: team.name,
        politician_name: team.politician_name,
        position: team.position,
        county_id: team.county_id,
        district_id: team.district_id,
        status: team.status,
        leader_id: team.leader_id,
        active_member_count,
        created_at: team.created_at,
        your_membership: MembershipInfo::from(membership),
    }))
}

fn team_summary(row: TeamWithMembershipEntity) -> TeamSummary {
    TeamSummary {
        id: row.id,
        name: row.name,
        politician_name: row.politician_name,
        status: row.status.into(),
        active_member_count: row.active_member_count,
        your_membership: MembershipInfo {
            id: row.membership_id,
            role: row.role.into(),
            is_leader: row.is_leader,
            status: row.membership_status.into(),
            joined_at: row.joined_at,
        },
    }
}

/// Emails are stored trimmed and lowercased.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use persistence::entities::{MemberRoleDb, MemberStatusDb, TeamStatusDb};

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "jane.doe@example.com");
    }

    #[test]
    fn test_team_summary_mapping() {
        let row = TeamWithMembershipEntity {
            id: Uuid::new_v4(),
            name: "Office of Jane Doe".to_string(),
            politician_name: "Jane Doe".to_string(),
            status: TeamStatusDb::Active,
            membership_id: Uuid::new_v4(),
            role: MemberRoleDb::Staff,
            is_leader: false,
            membership_status: MemberStatusDb::Active,
            joined_at: Utc::now(),
            active_member_count: 4,
        };
        let membership_id = row.membership_id;

        let summary = team_summary(row);
        assert_eq!(summary.active_member_count, 4);
        assert_eq!(summary.your_membership.id, membership_id);
        assert!(!summary.your_membership.is_leader);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["your_membership"]["role"], "staff");
    }
}
