//! Domain models for Polify.

pub mod calendar;
pub mod invitation;
pub mod member;
pub mod region;
pub mod summary;
pub mod team;

pub use invitation::{Invitation, InvitationState, InvitationStatus};
pub use member::{Member, MemberRole, MemberStatus};
pub use region::{County, District};
pub use team::{Team, TeamStatus};
