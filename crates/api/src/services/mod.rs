//! Clients for the upstream APIs behind the edge functions.

pub mod calendar;
pub mod summary;

pub use calendar::{CalendarClient, CalendarError};
pub use summary::{SummaryClient, SummaryError};
