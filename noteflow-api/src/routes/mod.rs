/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Credential login
/// - `tenants`: Plan upgrade and user invites (admin only)
/// - `notes`: Tenant-scoped note CRUD

pub mod auth;
pub mod health;
pub mod notes;
pub mod tenants;
