//! # Database Seeder
//!
//! Creates two demo tenants with an admin and a member each, for local
//! development and manual testing:
//!
//! | Email             | Role   | Tenant | Password |
//! |-------------------|--------|--------|----------|
//! | admin@acme.test   | admin  | Acme   | password |
//! | user@acme.test    | member | Acme   | password |
//! | admin@globex.test | admin  | Globex | password |
//! | user@globex.test  | member | Globex | password |
//!
//! Both tenants start on the free plan with a cap of 3 notes.
//!
//! Idempotent: accounts that already exist are left untouched.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgres://... cargo run -p noteflow-api --bin seed
//! ```

use noteflow_shared::{
    auth::password,
    db,
    models::{
        tenant::{CreateTenant, Tenant},
        user::{CreateUser, User, UserRole},
    },
};
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SEED_PASSWORD: &str = "password";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

    let db_config = db::pool::DatabaseConfig {
        url: database_url,
        ..Default::default()
    };
    let pool = db::pool::create_pool(db_config).await?;

    db::migrations::run_migrations(&pool).await?;

    seed_tenant(&pool, "Acme", "admin@acme.test", "user@acme.test").await?;
    seed_tenant(&pool, "Globex", "admin@globex.test", "user@globex.test").await?;

    tracing::info!("Seed complete");

    Ok(())
}

/// Creates one free-plan tenant with an admin and a member account
///
/// Skipped entirely if the admin email is already registered.
async fn seed_tenant(
    pool: &PgPool,
    name: &str,
    admin_email: &str,
    member_email: &str,
) -> anyhow::Result<()> {
    if User::find_by_email(pool, admin_email).await?.is_some() {
        tracing::info!(tenant = name, "Already seeded, skipping");
        return Ok(());
    }

    let tenant = Tenant::create(pool, CreateTenant::free(name)).await?;
    tracing::info!(tenant = name, tenant_id = %tenant.id, "Tenant created");

    for (email, role) in [
        (admin_email, UserRole::Admin),
        (member_email, UserRole::Member),
    ] {
        let user = User::create(
            pool,
            CreateUser {
                email: email.to_string(),
                password_hash: password::hash_password(SEED_PASSWORD)?,
                role,
                tenant_id: tenant.id,
            },
        )
        .await?;
        tracing::info!(email = %user.email, role = %user.role, "User created");
    }

    Ok(())
}
