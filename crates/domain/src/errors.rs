//! Domain error types.

use thiserror::Error;

/// Rejections raised by the team membership workflows.
///
/// Each variant carries the message shown to the caller; the HTTP and CLI
/// layers only decide how to present it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembershipError {
    #[error("Registration code not found")]
    RegistrationCodeNotFound,

    #[error("Registration code has already been used")]
    RegistrationCodeUsed,

    #[error("Team not found")]
    TeamNotFound,

    #[error("Team is not active")]
    TeamInactive,

    #[error("Invitation not found")]
    InvitationNotFound,

    #[error("Invitation has reached its usage limit")]
    InvitationExhausted,

    #[error("Invitation has expired")]
    InvitationExpired,

    #[error("You are already a member of this team")]
    AlreadyMember,

    #[error("Team not found or you are not a member")]
    NotTeamMember,

    #[error("Only the team leader can perform this action")]
    NotLeader,

    #[error("Member not found")]
    MemberNotFound,

    #[error("You cannot remove yourself from the team")]
    CannotRemoveSelf,

    #[error("Team leaders cannot be removed")]
    CannotRemoveLeader,

    #[error("Member status change was not applied")]
    RemovalNotApplied,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_caller_facing() {
        assert_eq!(
            MembershipError::CannotRemoveSelf.to_string(),
            "You cannot remove yourself from the team"
        );
        assert_eq!(
            MembershipError::CannotRemoveLeader.to_string(),
            "Team leaders cannot be removed"
        );
        assert_eq!(
            MembershipError::RegistrationCodeUsed.to_string(),
            "Registration code has already been used"
        );
    }
}
