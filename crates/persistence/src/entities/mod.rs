//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod invitation;
pub mod member;
pub mod region;
pub mod team;

pub use invitation::{InvitationEntity, InvitationStatusDb, InvitationWithTeamEntity};
pub use member::{MemberEntity, MemberRoleDb, MemberStatusDb};
pub use region::{CountyEntity, DistrictEntity};
pub use team::{
    TeamEntity, TeamLeaderCountEntity, TeamReportEntity, TeamStatusDb, TeamWithMembershipEntity,
};
