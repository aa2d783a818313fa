/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/login` - Authenticate with email/password and get a token

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
};
use axum::{extract::State, Json};
use noteflow_shared::{
    auth::{jwt, password},
    models::{tenant::Tenant, user::User},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Signed bearer token carrying user id, tenant id, and role
    pub token: String,

    /// Denormalized view of the authenticated user
    pub user: UserView,
}

/// User view returned on login
#[derive(Debug, Serialize, Deserialize)]
pub struct UserView {
    /// Email address
    pub email: String,

    /// Role within the tenant
    pub role: String,

    /// The user's tenant
    pub tenant: TenantView,
}

/// Tenant view embedded in API responses
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantView {
    /// Tenant ID
    pub id: Uuid,

    /// Tenant name
    pub name: String,

    /// Current plan ("free" or "pro")
    pub plan: String,

    /// Note cap (0 = unlimited)
    pub max_notes: i32,
}

impl From<Tenant> for TenantView {
    fn from(tenant: Tenant) -> Self {
        Self {
            id: tenant.id,
            name: tenant.name,
            plan: tenant.plan,
            max_notes: tenant.max_notes,
        }
    }
}

/// Login endpoint
///
/// Authenticates a user by email and password and returns a signed token
/// alongside a denormalized view of the user's tenant.
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// {
///   "email": "admin@acme.test",
///   "password": "password"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "token": "eyJ...",
///   "user": {
///     "email": "admin@acme.test",
///     "role": "admin",
///     "tenant": { "id": "uuid", "name": "Acme", "plan": "free", "maxNotes": 3 }
///   }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing or malformed email/password
/// - `401 Unauthorized`: Unknown email or wrong password. The error is
///   identical in both cases so login cannot be used to probe for
///   registered emails.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate().map_err(validation_error)?;

    let user = User::find_by_email(&state.db, &req.email.to_lowercase())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let tenant = Tenant::find_by_id(&state.db, user.tenant_id)
        .await?
        .ok_or_else(|| {
            ApiError::InternalError(format!("Tenant {} missing for user {}", user.tenant_id, user.id))
        })?;

    let role = user
        .get_role()
        .ok_or_else(|| ApiError::InternalError(format!("Unknown role '{}' stored for user", user.role)))?;

    User::update_last_login(&state.db, user.id).await?;

    let claims = jwt::Claims::new(user.id, tenant.id, role, state.config.token_lifetime());
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, tenant_id = %tenant.id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: UserView {
            email: user.email,
            role: user.role,
            tenant: tenant.into(),
        },
    }))
}
