//! Team membership rules.
//!
//! Covers the three state-changing workflows:
//! 1. Claiming a team with its registration code
//! 2. Redeeming an invitation code
//! 3. Removing (deactivating) a staff member

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::MembershipError;
use crate::models::{Invitation, InvitationStatus, Member, MemberStatus, Team, TeamStatus};

/// Checks that a team located by registration code can be claimed.
pub fn check_claimable(team: Option<&Team>) -> Result<&Team, MembershipError> {
    let team = team.ok_or(MembershipError::RegistrationCodeNotFound)?;

    if team.code_used {
        return Err(MembershipError::RegistrationCodeUsed);
    }
    if team.status != TeamStatus::Pending {
        return Err(MembershipError::TeamInactive);
    }

    Ok(team)
}

/// What happens to the joiner's membership row on redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipAction {
    /// No row exists for this user and team.
    Create,
    /// An inactive row exists and is switched back on as staff.
    Reactivate(Uuid),
}

/// Counter and membership changes for a valid redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedemptionPlan {
    pub invitation_id: Uuid,
    pub group_id: Uuid,
    pub new_uses: i32,
    pub new_status: InvitationStatus,
    pub membership: MembershipAction,
}

/// Decides whether an invitation can be redeemed by a user.
///
/// `existing` is the user's membership row in the invitation's team, if any.
pub fn plan_redemption(
    invitation: Option<&Invitation>,
    team_status: TeamStatus,
    existing: Option<&Member>,
    now: DateTime<Utc>,
) -> Result<RedemptionPlan, MembershipError> {
    let invitation = invitation.ok_or(MembershipError::InvitationNotFound)?;

    if invitation.status != InvitationStatus::Active {
        return Err(MembershipError::InvitationExhausted);
    }
    if invitation.expires_at <= now {
        return Err(MembershipError::InvitationExpired);
    }
    if invitation.current_uses >= invitation.max_uses {
        return Err(MembershipError::InvitationExhausted);
    }
    if team_status != TeamStatus::Active {
        return Err(MembershipError::TeamInactive);
    }

    let membership = match existing {
        Some(member) if member.is_active() => return Err(MembershipError::AlreadyMember),
        Some(member) => MembershipAction::Reactivate(member.id),
        None => MembershipAction::Create,
    };

    let new_uses = invitation.current_uses + 1;
    Ok(RedemptionPlan {
        invitation_id: invitation.id,
        group_id: invitation.group_id,
        new_uses,
        new_status: InvitationStatus::for_usage(new_uses, invitation.max_uses),
        membership,
    })
}

/// Requires `member` to be an active member of `team_id`.
pub fn require_member(team_id: Uuid, member: Option<&Member>) -> Result<&Member, MembershipError> {
    member
        .filter(|m| m.group_id == team_id && m.is_active())
        .ok_or(MembershipError::NotTeamMember)
}

/// Requires `member` to be the active leader of `team_id`.
pub fn require_leader(team_id: Uuid, member: Option<&Member>) -> Result<&Member, MembershipError> {
    let member = require_member(team_id, member)?;

    if !member.is_leader {
        return Err(MembershipError::NotLeader);
    }

    Ok(member)
}

/// Result of the removal checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalDecision {
    /// Flip the target to inactive.
    Deactivate,
    /// Target is already inactive; nothing to write.
    AlreadyRemoved,
}

/// Runs the removal preconditions in order.
pub fn evaluate_removal(
    team_id: Uuid,
    operator: Option<&Member>,
    target: Option<&Member>,
) -> Result<RemovalDecision, MembershipError> {
    let operator = require_leader(team_id, operator)?;

    let target = target
        .filter(|t| t.group_id == team_id)
        .ok_or(MembershipError::MemberNotFound)?;

    if target.id == operator.id || target.auth_user_id == operator.auth_user_id {
        return Err(MembershipError::CannotRemoveSelf);
    }
    if target.is_leader {
        return Err(MembershipError::CannotRemoveLeader);
    }
    if target.status == MemberStatus::Inactive {
        return Ok(RemovalDecision::AlreadyRemoved);
    }

    Ok(RemovalDecision::Deactivate)
}

/// Confirms the row written by a removal carries the expected status.
pub fn verify_removal(updated: Option<&Member>) -> Result<&Member, MembershipError> {
    match updated {
        Some(member) if member.status == MemberStatus::Inactive => Ok(member),
        _ => Err(MembershipError::RemovalNotApplied),
    }
}
