/// Database layer for Noteflow
///
/// This module provides database connection pooling and the migration runner.
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `migrations`: Database migration runner
/// - Models are in the `models` module at crate root level

pub mod migrations;
pub mod pool;
