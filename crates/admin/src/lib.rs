//! # polify-admin
//!
//! Operator tooling for the Polify database. Every subcommand is a short
//! sequence of awaited repository calls against the same PostgreSQL schema
//! the API uses.
//!
//! ## Subcommands
//!
//! - `create-team`: register a pending team and print its registration code.
//! - `teams`, `members`, `invitations`: reports.
//! - `audit`: integrity audit; exits non-zero when problems are found.
//! - `repair-invitation-usage`, `sync-invitation-status`, `reset-invitation`,
//!   `remove-member`, `set-team-status`: data changes, each confirmed with
//!   `Proceed? [y/N]` unless `--yes` is given.

pub mod confirm;
pub mod repair;
pub mod reports;
pub mod teams;

use uuid::Uuid;

/// Shortens a UUID to its first block for table output.
pub fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

/// Pads or truncates `value` to exactly `width` characters.
pub fn cell(value: &str, width: usize) -> String {
    let count = value.chars().count();
    if count > width {
        let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    } else {
        format!("{}{}", value, " ".repeat(width - count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id() {
        let id = Uuid::parse_str("a1b2c3d4-0000-4000-8000-000000000000").unwrap();
        assert_eq!(short_id(id), "a1b2c3d4");
    }

    #[test]
    fn test_cell_pads_and_truncates() {
        assert_eq!(cell("abc", 5), "abc  ");
        assert_eq!(cell("abcdef", 4), "abc…");
        assert_eq!(cell("Nyeri", 5), "Nyeri");
    }
}
