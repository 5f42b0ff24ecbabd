//! Domain layer for the Polify backend.
//!
//! This crate contains:
//! - Domain models (Team, Invitation, Member, regions, edge-function payloads)
//! - Workflow rules for claiming teams, redeeming invitations and removing members
//! - Domain error types

pub mod errors;
pub mod models;
pub mod services;

pub use errors::MembershipError;
