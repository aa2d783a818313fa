/// Tenant model and database operations
///
/// This module provides the Tenant model for multi-tenant isolation.
/// Every user and every note belongs to exactly one tenant.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tenants (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     plan VARCHAR(50) NOT NULL DEFAULT 'free',
///     max_notes INTEGER NOT NULL DEFAULT 3,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT tenants_plan_check CHECK (plan IN ('free', 'pro'))
/// );
/// ```
///
/// # Plans
///
/// - **free**: note count capped at `max_notes` (default 3)
/// - **pro**: unlimited notes (`max_notes = 0`)
///
/// # Example
///
/// ```no_run
/// use noteflow_shared::models::tenant::{CreateTenant, Tenant, TenantPlan};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let tenant = Tenant::create(&pool, CreateTenant::free("Acme")).await?;
/// assert_eq!(tenant.get_plan(), Some(TenantPlan::Free));
///
/// // Lift the note cap
/// let upgraded = Tenant::upgrade_to_pro(&pool, tenant.id).await?.unwrap();
/// assert_eq!(upgraded.max_notes, 0);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Subscription plan types
///
/// The plan determines whether the tenant's note count is capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
#[serde(rename_all = "lowercase")]
pub enum TenantPlan {
    /// Free plan, note count capped at `max_notes`
    Free,

    /// Pro plan, unlimited notes
    Pro,
}

impl TenantPlan {
    /// Converts plan to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantPlan::Free => "free",
            TenantPlan::Pro => "pro",
        }
    }

    /// Parses plan from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "free" => Some(TenantPlan::Free),
            "pro" => Some(TenantPlan::Pro),
            _ => None,
        }
    }
}

/// Default note cap for new free-plan tenants
pub const DEFAULT_FREE_MAX_NOTES: i32 = 3;

/// Tenant model representing an organization/account
///
/// Tenants are the top-level entity for multi-tenant isolation.
/// All users and notes belong to a tenant.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tenant {
    /// Unique tenant ID (UUID v4)
    pub id: Uuid,

    /// Organization/account name
    pub name: String,

    /// Current plan ("free" or "pro")
    pub plan: String,

    /// Maximum number of notes this tenant may hold
    ///
    /// 0 means unlimited (pro plan). Enforced only at note creation time;
    /// lowering the cap does not delete existing notes.
    pub max_notes: i32,

    /// When the tenant was created
    pub created_at: DateTime<Utc>,

    /// When the tenant was last updated
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Gets the parsed plan enum
    pub fn get_plan(&self) -> Option<TenantPlan> {
        TenantPlan::from_str(&self.plan)
    }

    /// Whether the tenant's note count is capped
    pub fn is_capped(&self) -> bool {
        self.max_notes > 0
    }
}

/// Input for creating a new tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    /// Organization/account name
    pub name: String,

    /// Initial plan
    pub plan: TenantPlan,

    /// Initial note cap (0 = unlimited)
    pub max_notes: i32,
}

impl CreateTenant {
    /// Creates input for a free-plan tenant with the default note cap
    pub fn free(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            plan: TenantPlan::Free,
            max_notes: DEFAULT_FREE_MAX_NOTES,
        }
    }
}

impl Tenant {
    /// Creates a new tenant in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use noteflow_shared::models::tenant::{CreateTenant, Tenant};
    /// # use sqlx::PgPool;
    /// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
    /// let tenant = Tenant::create(&pool, CreateTenant::free("Acme")).await?;
    /// println!("Created tenant: {}", tenant.id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create(pool: &PgPool, data: CreateTenant) -> Result<Self, sqlx::Error> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (name, plan, max_notes)
            VALUES ($1, $2, $3)
            RETURNING id, name, plan, max_notes, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.plan.as_str())
        .bind(data.max_notes)
        .fetch_one(pool)
        .await?;

        Ok(tenant)
    }

    /// Finds a tenant by ID
    ///
    /// # Returns
    ///
    /// The tenant if found, None otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, name, plan, max_notes, created_at, updated_at
            FROM tenants
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(tenant)
    }

    /// Upgrades a tenant to the pro plan and removes its note cap
    ///
    /// Idempotent: upgrading an already-pro tenant is a no-op that still
    /// returns the tenant.
    ///
    /// # Returns
    ///
    /// The updated tenant if found, None if the tenant doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use noteflow_shared::models::tenant::Tenant;
    /// # use sqlx::PgPool;
    /// # use uuid::Uuid;
    /// # async fn example(pool: PgPool, tenant_id: Uuid) -> Result<(), sqlx::Error> {
    /// if let Some(tenant) = Tenant::upgrade_to_pro(&pool, tenant_id).await? {
    ///     assert_eq!(tenant.plan, "pro");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn upgrade_to_pro(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            UPDATE tenants
            SET plan = 'pro', max_notes = 0, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, plan, max_notes, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(tenant)
    }

    /// Deletes a tenant by ID
    ///
    /// Cascades to all users and notes in the tenant. Used by test cleanup;
    /// there is no delete flow in the API.
    ///
    /// # Returns
    ///
    /// True if the tenant was deleted, false if it didn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
