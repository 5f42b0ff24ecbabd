//! Shared utilities and common types for the Polify backend.
//!
//! This crate provides common functionality used across all other crates:
//! - JWT access token validation (and issuance for tooling and tests)
//! - Access code normalisation and validation

pub mod jwt;
pub mod validation;
