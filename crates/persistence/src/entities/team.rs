//! Team entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Team, TeamStatus};
use sqlx::FromRow;
use uuid::Uuid;

use super::member::{MemberRoleDb, MemberStatusDb};

/// Database enum for team_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "team_status", rename_all = "lowercase")]
pub enum TeamStatusDb {
    Pending,
    Active,
    Inactive,
}

impl From<TeamStatusDb> for TeamStatus {
    fn from(db: TeamStatusDb) -> Self {
        match db {
            TeamStatusDb::Pending => TeamStatus::Pending,
            TeamStatusDb::Active => TeamStatus::Active,
            TeamStatusDb::Inactive => TeamStatus::Inactive,
        }
    }
}

impl From<TeamStatus> for TeamStatusDb {
    fn from(status: TeamStatus) -> Self {
        match status {
            TeamStatus::Pending => TeamStatusDb::Pending,
            TeamStatus::Active => TeamStatusDb::Active,
            TeamStatus::Inactive => TeamStatusDb::Inactive,
        }
    }
}

/// Database row mapping for the groups table.
#[derive(Debug, Clone, FromRow)]
pub struct TeamEntity {
    pub id: Uuid,
    pub name: String,
    pub politician_name: String,
    pub position: String,
    pub county_id: Option<Uuid>,
    pub district_id: Option<Uuid>,
    pub registration_code: String,
    pub status: TeamStatusDb,
    pub code_used: bool,
    pub leader_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TeamEntity> for Team {
    fn from(entity: TeamEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            politician_name: entity.politician_name,
            position: entity.position,
            county_id: entity.county_id,
            district_id: entity.district_id,
            registration_code: entity.registration_code,
            status: entity.status.into(),
            code_used: entity.code_used,
            leader_id: entity.leader_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Team joined with the caller's membership, for the "my teams" listing.
#[derive(Debug, Clone, FromRow)]
pub struct TeamWithMembershipEntity {
    pub id: Uuid,
    pub name: String,
    pub politician_name: String,
    pub status: TeamStatusDb,
    // Membership fields
    pub membership_id: Uuid,
    pub role: MemberRoleDb,
    pub is_leader: bool,
    pub membership_status: MemberStatusDb,
    pub joined_at: DateTime<Utc>,
    // Aggregates
    pub active_member_count: i64,
}

/// Team with aggregates for the admin report.
#[derive(Debug, Clone, FromRow)]
pub struct TeamReportEntity {
    pub id: Uuid,
    pub name: String,
    pub politician_name: String,
    pub status: TeamStatusDb,
    pub registration_code: String,
    pub code_used: bool,
    pub leader_id: Option<Uuid>,
    pub leader_name: Option<String>,
    pub active_member_count: i64,
    pub inactive_member_count: i64,
    pub invitation_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Team row with its active leader count, for integrity audits.
#[derive(Debug, Clone, FromRow)]
pub struct TeamLeaderCountEntity {
    #[sqlx(flatten)]
    pub team: TeamEntity,
    pub active_leader_count: i64,
}
