//! Invitation entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Invitation, InvitationStatus};
use sqlx::FromRow;
use uuid::Uuid;

use super::team::TeamStatusDb;

/// Database enum for invitation_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "invitation_status", rename_all = "lowercase")]
pub enum InvitationStatusDb {
    Active,
    Exhausted,
}

impl From<InvitationStatusDb> for InvitationStatus {
    fn from(db: InvitationStatusDb) -> Self {
        match db {
            InvitationStatusDb::Active => InvitationStatus::Active,
            InvitationStatusDb::Exhausted => InvitationStatus::Exhausted,
        }
    }
}

impl From<InvitationStatus> for InvitationStatusDb {
    fn from(status: InvitationStatus) -> Self {
        match status {
            InvitationStatus::Active => InvitationStatusDb::Active,
            InvitationStatus::Exhausted => InvitationStatusDb::Exhausted,
        }
    }
}

/// Database row mapping for the team_invitations table.
#[derive(Debug, Clone, FromRow)]
pub struct InvitationEntity {
    pub id: Uuid,
    pub invite_code: String,
    pub group_id: Uuid,
    pub max_uses: i32,
    pub current_uses: i32,
    pub status: InvitationStatusDb,
    pub expires_at: DateTime<Utc>,
    pub used_by: Option<Uuid>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InvitationEntity> for Invitation {
    fn from(entity: InvitationEntity) -> Self {
        Self {
            id: entity.id,
            invite_code: entity.invite_code,
            group_id: entity.group_id,
            max_uses: entity.max_uses,
            current_uses: entity.current_uses,
            status: entity.status.into(),
            expires_at: entity.expires_at,
            used_by: entity.used_by,
            used_at: entity.used_at,
            created_by: entity.created_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Invitation with team info (for public lookup).
#[derive(Debug, Clone, FromRow)]
pub struct InvitationWithTeamEntity {
    #[sqlx(flatten)]
    pub invitation: InvitationEntity,
    pub team_name: String,
    pub politician_name: String,
    pub team_status: TeamStatusDb,
}
