//! Team domain models for political office workspaces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::invitation::generate_access_code;
use super::member::MembershipInfo;

/// Length of generated registration codes.
pub const REGISTRATION_CODE_LENGTH: usize = 8;

/// Lifecycle status of a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamStatus {
    /// Created by an administrator, registration code not yet claimed.
    Pending,
    /// Claimed by its leader.
    Active,
    /// Switched off by an administrator.
    Inactive,
}

impl TeamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamStatus::Pending => "pending",
            TeamStatus::Active => "active",
            TeamStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for TeamStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TeamStatus::Pending),
            "active" => Ok(TeamStatus::Active),
            "inactive" => Ok(TeamStatus::Inactive),
            _ => Err(format!("Invalid team status: {}", s)),
        }
    }
}

impl fmt::Display for TeamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A political office's workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub politician_name: String,
    pub position: String,
    pub county_id: Option<Uuid>,
    pub district_id: Option<Uuid>,
    pub registration_code: String,
    pub status: TeamStatus,
    pub code_used: bool,
    pub leader_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Team {
    /// Returns true if the registration code can still be claimed.
    pub fn is_claimable(&self) -> bool {
        !self.code_used && self.status == TeamStatus::Pending
    }
}

/// Input for creating a team from the admin tooling.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct NewTeam {
    #[validate(length(
        min = 1,
        max = 120,
        message = "Name must be between 1 and 120 characters"
    ))]
    pub name: String,

    #[validate(length(
        min = 1,
        max = 120,
        message = "Politician name must be between 1 and 120 characters"
    ))]
    pub politician_name: String,

    #[validate(length(
        min = 1,
        max = 80,
        message = "Position must be between 1 and 80 characters"
    ))]
    pub position: String,

    pub county_id: Option<Uuid>,
    pub district_id: Option<Uuid>,
}

/// Request to claim a team with its one-time registration code.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ClaimTeamRequest {
    #[validate(custom(function = "shared::validation::validate_access_code"))]
    pub registration_code: String,

    #[validate(length(
        min = 1,
        max = 120,
        message = "Name must be between 1 and 120 characters"
    ))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Public team info returned alongside a membership.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TeamInfo {
    pub id: Uuid,
    pub name: String,
    pub politician_name: String,
    pub position: String,
    pub status: TeamStatus,
}

impl From<&Team> for TeamInfo {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id,
            name: team.name.clone(),
            politician_name: team.politician_name.clone(),
            position: team.position.clone(),
            status: team.status,
        }
    }
}

/// Response after claiming a team.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ClaimTeamResponse {
    pub team: TeamInfo,
    pub membership: MembershipInfo,
}

/// Team detail for members.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TeamDetail {
    pub id: Uuid,
    pub name: String,
    pub politician_name: String,
    pub position: String,
    pub county_id: Option<Uuid>,
    pub district_id: Option<Uuid>,
    pub status: TeamStatus,
    pub leader_id: Option<Uuid>,
    pub active_member_count: i64,
    pub created_at: DateTime<Utc>,
    pub your_membership: MembershipInfo,
}

/// Team listed for the signed-in user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TeamSummary {
    pub id: Uuid,
    pub name: String,
    pub politician_name: String,
    pub status: TeamStatus,
    pub active_member_count: i64,
    pub your_membership: MembershipInfo,
}

/// Response for listing the caller's teams.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListTeamsResponse {
    pub data: Vec<TeamSummary>,
}

/// Generate a registration code.
pub fn generate_registration_code() -> String {
    generate_access_code(REGISTRATION_CODE_LENGTH)
}
