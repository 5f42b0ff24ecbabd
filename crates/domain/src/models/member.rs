//! Member domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Role within a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Leader,
    Staff,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Leader => "leader",
            MemberRole::Staff => "staff",
        }
    }
}

impl FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "leader" => Ok(MemberRole::Leader),
            "staff" => Ok(MemberRole::Staff),
            _ => Err(format!("Invalid member role: {}", s)),
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Membership status. Removal flips a member to inactive; rows are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Inactive,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A person's membership record within a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Member {
    pub id: Uuid,
    pub auth_user_id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: MemberRole,
    pub is_leader: bool,
    pub status: MemberStatus,
    pub invitation_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }

    /// Returns true if this member currently leads their team.
    pub fn is_active_leader(&self) -> bool {
        self.is_active() && self.is_leader
    }
}

/// Basic membership info for team responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MembershipInfo {
    pub id: Uuid,
    pub role: MemberRole,
    pub is_leader: bool,
    pub status: MemberStatus,
    pub joined_at: DateTime<Utc>,
}

impl From<&Member> for MembershipInfo {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            role: member.role,
            is_leader: member.is_leader,
            status: member.status,
            joined_at: member.created_at,
        }
    }
}

/// Member as listed in a roster.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MemberSummary {
    pub id: Uuid,
    pub auth_user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: MemberRole,
    pub is_leader: bool,
    pub status: MemberStatus,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Member> for MemberSummary {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            auth_user_id: member.auth_user_id,
            name: member.name,
            email: member.email,
            role: member.role,
            is_leader: member.is_leader,
            status: member.status,
            joined_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}

/// Query parameters for roster listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListMembersQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// Response for roster listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListMembersResponse {
    pub data: Vec<MemberSummary>,
}

/// Response after a removal request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RemoveMemberResponse {
    pub member_id: Uuid,
    pub status: MemberStatus,
    pub already_removed: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_role_parse() {
        assert_eq!("leader".parse::<MemberRole>().unwrap(), MemberRole::Leader);
        assert_eq!("STAFF".parse::<MemberRole>().unwrap(), MemberRole::Staff);
        assert!("owner".parse::<MemberRole>().is_err());
    }

    #[test]
    fn test_member_status_serialization() {
        assert_eq!(
            serde_json::to_string(&MemberStatus::Inactive).unwrap(),
            "\"inactive\""
        );
    }

    #[test]
    fn test_list_members_query_defaults() {
        let query: ListMembersQuery = serde_json::from_str("{}").unwrap();
        assert!(!query.include_inactive);
    }
}
