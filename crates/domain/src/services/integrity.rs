//! Consistency checks for teams and invitations.
//!
//! Used by the admin reports and repair commands.

use std::fmt;

use uuid::Uuid;

use crate::models::{Invitation, InvitationStatus, Team};

/// A data inconsistency found by an audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    UsageAboveLimit {
        invitation_id: Uuid,
        current_uses: i32,
        max_uses: i32,
    },
    StatusMismatch {
        invitation_id: Uuid,
        stored: InvitationStatus,
        expected: InvitationStatus,
    },
    UsedWithoutUsage {
        invitation_id: Uuid,
    },
    CodeUsedWithoutLeader {
        team_id: Uuid,
    },
    MultipleActiveLeaders {
        team_id: Uuid,
        count: i64,
    },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::UsageAboveLimit {
                invitation_id,
                current_uses,
                max_uses,
            } => write!(
                f,
                "invitation {} has {} uses but allows {}",
                invitation_id, current_uses, max_uses
            ),
            IntegrityIssue::StatusMismatch {
                invitation_id,
                stored,
                expected,
            } => write!(
                f,
                "invitation {} is {} but its usage implies {}",
                invitation_id, stored, expected
            ),
            IntegrityIssue::UsedWithoutUsage { invitation_id } => write!(
                f,
                "invitation {} records a redeemer but zero uses",
                invitation_id
            ),
            IntegrityIssue::CodeUsedWithoutLeader { team_id } => write!(
                f,
                "team {} has a used registration code but no leader",
                team_id
            ),
            IntegrityIssue::MultipleActiveLeaders { team_id, count } => {
                write!(f, "team {} has {} active leaders", team_id, count)
            }
        }
    }
}

/// Audits one invitation row.
pub fn audit_invitation(invitation: &Invitation) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();

    if invitation.current_uses > invitation.max_uses {
        issues.push(IntegrityIssue::UsageAboveLimit {
            invitation_id: invitation.id,
            current_uses: invitation.current_uses,
            max_uses: invitation.max_uses,
        });
    }

    if invitation.used_by.is_some() && invitation.current_uses == 0 {
        issues.push(IntegrityIssue::UsedWithoutUsage {
            invitation_id: invitation.id,
        });
    }

    let expected = InvitationStatus::for_usage(invitation.current_uses, invitation.max_uses);
    if invitation.status != expected {
        issues.push(IntegrityIssue::StatusMismatch {
            invitation_id: invitation.id,
            stored: invitation.status,
            expected,
        });
    }

    issues
}

/// Audits one team given its number of active leader rows.
pub fn audit_team(team: &Team, active_leaders: i64) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();

    if team.code_used && team.leader_id.is_none() {
        issues.push(IntegrityIssue::CodeUsedWithoutLeader { team_id: team.id });
    }
    if active_leaders > 1 {
        issues.push(IntegrityIssue::MultipleActiveLeaders {
            team_id: team.id,
            count: active_leaders,
        });
    }

    issues
}

/// Usage counter and status an invitation should carry after repair.
///
/// Only rows that name a redeemer while counting zero uses are touched.
pub fn repaired_usage(invitation: &Invitation) -> Option<(i32, InvitationStatus)> {
    if invitation.used_by.is_none() || invitation.current_uses != 0 {
        return None;
    }
    let uses = 1.min(invitation.max_uses);
    Some((uses, InvitationStatus::for_usage(uses, invitation.max_uses)))
}
