//! # Noteflow Shared Library
//!
//! This crate contains shared types, utilities, and business logic used by
//! the Noteflow API server and its auxiliary binaries (seeding).
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, tenants, notes)
//! - `auth`: Authentication and authorization utilities
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Noteflow shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
