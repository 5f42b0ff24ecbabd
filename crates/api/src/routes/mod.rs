//! HTTP route handlers.

pub mod ai_summary;
pub mod google_calendar;
pub mod health;
pub mod invitations;
pub mod members;
pub mod regions;
pub mod teams;
