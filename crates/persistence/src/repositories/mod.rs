//! Repository implementations for database operations.

pub mod invitation;
pub mod member;
pub mod region;
pub mod team;

pub use invitation::{InvitationRepository, Redemption};
pub use member::{MemberRepository, RemovalOutcome};
pub use region::RegionRepository;
pub use team::TeamRepository;
