/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test tenant/user creation (one admin, one member per tenant)
/// - JWT token generation
/// - Request helpers

use axum::body::Body;
use axum::http::{Request, StatusCode};
use noteflow_api::app::{build_router, AppState};
use noteflow_api::config::Config;
use noteflow_shared::auth::jwt::{create_token, Claims};
use noteflow_shared::auth::password::hash_password;
use noteflow_shared::models::tenant::{CreateTenant, Tenant};
use noteflow_shared::models::user::{CreateUser, User, UserRole};
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

/// Password used for every seeded test account
pub const TEST_PASSWORD: &str = "password";

/// A tenant plus its admin and member accounts, with ready-made tokens
pub struct TestTenant {
    pub tenant: Tenant,
    pub admin: User,
    pub member: User,
    pub admin_token: String,
    pub member_token: String,
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub acme: TestTenant,
    pub globex: TestTenant,
}

impl TestContext {
    /// Creates a new test context with two freshly seeded tenants
    ///
    /// Both tenants start on the free plan with the default cap of 3 notes.
    pub async fn new() -> anyhow::Result<Self> {
        // Load test configuration
        let config = Config::from_env()?;

        // Connect to database
        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../migrations").run(&db).await?;

        let acme = seed_tenant(&db, &config, "Acme").await?;
        let globex = seed_tenant(&db, &config, "Globex").await?;

        // Build app
        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            acme,
            globex,
        })
    }

    /// Sends a request through the router and returns status plus parsed body
    pub async fn request(
        &mut self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };

        (status, json)
    }

    /// Cleans up test data
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        // Deleting the tenants cascades to users and notes
        Tenant::delete(&self.db, self.acme.tenant.id).await?;
        Tenant::delete(&self.db, self.globex.tenant.id).await?;
        Ok(())
    }
}

/// Creates a free-plan tenant with an admin and a member, plus tokens
async fn seed_tenant(db: &PgPool, config: &Config, name: &str) -> anyhow::Result<TestTenant> {
    // Unique suffix so parallel test runs don't collide on emails
    let suffix = Uuid::new_v4();

    let tenant = Tenant::create(db, CreateTenant::free(format!("{} {}", name, suffix))).await?;

    let password_hash = hash_password(TEST_PASSWORD)?;

    let admin = User::create(
        db,
        CreateUser {
            email: format!("admin-{}@{}.test", suffix, name.to_lowercase()),
            password_hash: password_hash.clone(),
            role: UserRole::Admin,
            tenant_id: tenant.id,
        },
    )
    .await?;

    let member = User::create(
        db,
        CreateUser {
            email: format!("user-{}@{}.test", suffix, name.to_lowercase()),
            password_hash,
            role: UserRole::Member,
            tenant_id: tenant.id,
        },
    )
    .await?;

    let admin_token = create_token(
        &Claims::new(admin.id, tenant.id, UserRole::Admin, config.token_lifetime()),
        &config.jwt.secret,
    )?;
    let member_token = create_token(
        &Claims::new(member.id, tenant.id, UserRole::Member, config.token_lifetime()),
        &config.jwt.secret,
    )?;

    Ok(TestTenant {
        tenant,
        admin,
        member,
        admin_token,
        member_token,
    })
}
