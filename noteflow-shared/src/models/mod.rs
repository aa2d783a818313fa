/// Database models for Noteflow
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `tenant`: Organizations/accounts for multi-tenancy, with plan and note cap
/// - `user`: User accounts with per-tenant roles (admin/member)
/// - `note`: Notes, always scoped to their owning tenant
///
/// # Example
///
/// ```no_run
/// use noteflow_shared::models::tenant::{CreateTenant, Tenant};
/// use noteflow_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let tenant = Tenant::create(&pool, CreateTenant::free("Acme")).await?;
/// # Ok(())
/// # }
/// ```

pub mod note;
pub mod tenant;
pub mod user;
