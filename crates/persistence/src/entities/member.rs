//! Member entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Member, MemberRole, MemberStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for member_role that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
pub enum MemberRoleDb {
    Leader,
    Staff,
}

impl From<MemberRoleDb> for MemberRole {
    fn from(db: MemberRoleDb) -> Self {
        match db {
            MemberRoleDb::Leader => MemberRole::Leader,
            MemberRoleDb::Staff => MemberRole::Staff,
        }
    }
}

impl From<MemberRole> for MemberRoleDb {
    fn from(role: MemberRole) -> Self {
        match role {
            MemberRole::Leader => MemberRoleDb::Leader,
            MemberRole::Staff => MemberRoleDb::Staff,
        }
    }
}

/// Database enum for member_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "member_status", rename_all = "lowercase")]
pub enum MemberStatusDb {
    Active,
    Inactive,
}

impl From<MemberStatusDb> for MemberStatus {
    fn from(db: MemberStatusDb) -> Self {
        match db {
            MemberStatusDb::Active => MemberStatus::Active,
            MemberStatusDb::Inactive => MemberStatus::Inactive,
        }
    }
}

impl From<MemberStatus> for MemberStatusDb {
    fn from(status: MemberStatus) -> Self {
        match status {
            MemberStatus::Active => MemberStatusDb::Active,
            MemberStatus::Inactive => MemberStatusDb::Inactive,
        }
    }
}

/// Database row mapping for the members table.
#[derive(Debug, Clone, FromRow)]
pub struct MemberEntity {
    pub id: Uuid,
    pub auth_user_id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: MemberRoleDb,
    pub is_leader: bool,
    pub status: MemberStatusDb,
    pub invitation_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MemberEntity> for Member {
    fn from(entity: MemberEntity) -> Self {
        Self {
            id: entity.id,
            auth_user_id: entity.auth_user_id,
            group_id: entity.group_id,
            name: entity.name,
            email: entity.email,
            role: entity.role.into(),
            is_leader: entity.is_leader,
            status: entity.status.into(),
            invitation_id: entity.invitation_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
