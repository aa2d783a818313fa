/// Authentication and authorization utilities
///
/// This module provides the secure authentication primitives for Noteflow:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: JWT token generation and validation
/// - [`middleware`]: Request authentication context and role gating
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **JWT Tokens**: HS256 signing with configurable expiration
/// - **Constant-time Comparison**: Password verification uses constant-time
///   operations via the argon2 crate

pub mod jwt;
pub mod middleware;
pub mod password;
