//! Invitation domain models for admitting staff into a team.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use shared::validation::ACCESS_CODE_ALPHABET;

use super::member::MembershipInfo;
use super::team::TeamInfo;

/// Length of generated invitation codes.
pub const INVITE_CODE_LENGTH: usize = 8;

/// Hours an invitation stays valid unless the leader asks otherwise.
pub const DEFAULT_INVITATION_TTL_HOURS: i64 = 72;

/// Upper bound for a requested invitation lifetime (30 days).
pub const MAX_INVITATION_TTL_HOURS: i64 = 720;

/// Persisted invitation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Active,
    Exhausted,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Active => "active",
            InvitationStatus::Exhausted => "exhausted",
        }
    }

    /// The status implied by a usage counter.
    pub fn for_usage(current_uses: i32, max_uses: i32) -> Self {
        if current_uses >= max_uses {
            InvitationStatus::Exhausted
        } else {
            InvitationStatus::Active
        }
    }
}

impl FromStr for InvitationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(InvitationStatus::Active),
            "exhausted" => Ok(InvitationStatus::Exhausted),
            _ => Err(format!("Invalid invitation status: {}", s)),
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Effective state of an invitation at a point in time.
///
/// Expiry is never written to the database; it is derived from `expires_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationState {
    Active,
    Exhausted,
    Expired,
}

impl fmt::Display for InvitationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InvitationState::Active => "active",
            InvitationState::Exhausted => "exhausted",
            InvitationState::Expired => "expired",
        };
        write!(f, "{}", s)
    }
}

/// A team invitation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Invitation {
    pub id: Uuid,
    pub invite_code: String,
    pub group_id: Uuid,
    pub max_uses: i32,
    pub current_uses: i32,
    pub status: InvitationStatus,
    pub expires_at: DateTime<Utc>,
    pub used_by: Option<Uuid>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invitation {
    /// Effective state at `now`. Exhaustion wins over expiry.
    pub fn state_at(&self, now: DateTime<Utc>) -> InvitationState {
        if self.status == InvitationStatus::Exhausted || self.current_uses >= self.max_uses {
            InvitationState::Exhausted
        } else if self.expires_at <= now {
            InvitationState::Expired
        } else {
            InvitationState::Active
        }
    }

    pub fn remaining_uses(&self) -> i32 {
        (self.max_uses - self.current_uses).max(0)
    }
}

/// Request to create a new invitation.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateInvitationRequest {
    /// Maximum uses (1-100, default: 1)
    #[validate(range(min = 1, max = 100, message = "max_uses must be between 1 and 100"))]
    pub max_uses: Option<i32>,

    /// Hours until expiry (1-720, default: 72)
    #[validate(range(
        min = 1,
        max = 720,
        message = "expires_in_hours must be between 1 and 720"
    ))]
    pub expires_in_hours: Option<i64>,
}

impl CreateInvitationRequest {
    pub fn max_uses_or_default(&self) -> i32 {
        self.max_uses.unwrap_or(1)
    }

    /// Expiry for the new invitation, falling back to `default_ttl_hours`.
    pub fn expires_at_from(&self, now: DateTime<Utc>, default_ttl_hours: i64) -> DateTime<Utc> {
        now + Duration::hours(
            self.expires_in_hours
                .unwrap_or(default_ttl_hours)
                .clamp(1, MAX_INVITATION_TTL_HOURS),
        )
    }
}

/// Invitation as listed for the team leader.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InvitationSummary {
    pub id: Uuid,
    pub invite_code: String,
    pub max_uses: i32,
    pub current_uses: i32,
    pub status: InvitationStatus,
    pub state: InvitationState,
    pub expires_at: DateTime<Utc>,
    pub used_by: Option<Uuid>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl InvitationSummary {
    pub fn from_invitation(invitation: Invitation, now: DateTime<Utc>) -> Self {
        let state = invitation.state_at(now);
        Self {
            id: invitation.id,
            invite_code: invitation.invite_code,
            max_uses: invitation.max_uses,
            current_uses: invitation.current_uses,
            status: invitation.status,
            state,
            expires_at: invitation.expires_at,
            used_by: invitation.used_by,
            used_at: invitation.used_at,
            created_at: invitation.created_at,
        }
    }
}

/// Response for listing invitations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListInvitationsResponse {
    pub data: Vec<InvitationSummary>,
}

/// Public invitation info (for GET /invitations/:code).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PublicInvitationInfo {
    pub team_name: String,
    pub politician_name: String,
    pub state: InvitationState,
    pub expires_at: DateTime<Utc>,
    pub is_valid: bool,
}

/// Request to join a team with an invitation code.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct JoinTeamRequest {
    #[validate(custom(function = "shared::validation::validate_access_code"))]
    pub invite_code: String,

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

/// Response after redeeming an invitation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct JoinTeamResponse {
    pub team: TeamInfo,
    pub membership: MembershipInfo,
}

/// Generate a random code of `len` characters from the unambiguous alphabet.
pub fn generate_access_code(len: usize) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();

    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..ACCESS_CODE_ALPHABET.len());
            ACCESS_CODE_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate an invitation code.
pub fn generate_invite_code() -> String {
    generate_access_code(INVITE_CODE_LENGTH)
}
