//! Domain services for Polify.
//!
//! Services contain business logic that operates on domain models. They never
//! touch the database: repositories load rows, call into these rules and
//! persist the outcome inside one transaction.

pub mod integrity;
pub mod membership;

pub use integrity::{audit_invitation, audit_team, repaired_usage, IntegrityIssue};
pub use membership::{
    check_claimable, evaluate_removal, plan_redemption, require_leader, require_member,
    verify_removal, MembershipAction, RedemptionPlan, RemovalDecision,
};
