/// Tenant management endpoints
///
/// Both endpoints require an authenticated admin, and only operate on the
/// admin's own tenant: an admin of tenant A gets 403 when targeting tenant B.
///
/// # Endpoints
///
/// - `POST /tenants/:tenant_id/upgrade` - Upgrade the tenant to pro
/// - `POST /tenants/:tenant_id/invite` - Invite a user into the tenant

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
    routes::auth::TenantView,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use noteflow_shared::{
    auth::{middleware::CurrentUser, password},
    models::{
        tenant::Tenant,
        user::{CreateUser, User, UserRole},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Initial password assigned to invited users
///
/// TODO: replace with a generated one-time credential and a forced password
/// reset on first login. A fixed, publicly-known initial password means any
/// invited account is open until its owner logs in and (manually) changes it.
const INVITE_INITIAL_PASSWORD: &str = "password";

/// Invite request
#[derive(Debug, Deserialize, Validate)]
pub struct InviteRequest {
    /// Email address for the new account
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Role for the new account ("admin" or "member", default "member")
    pub role: Option<String>,
}

/// Invite response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteResponse {
    /// Email of the created account
    pub email: String,

    /// The initial password the invitee must log in with
    pub initial_password: String,
}

/// Tenant upgrade endpoint
///
/// Upgrades the caller's tenant to the pro plan and removes its note cap.
/// Idempotent: upgrading an already-pro tenant succeeds and changes nothing.
///
/// # Endpoint
///
/// ```text
/// POST /tenants/:tenant_id/upgrade
/// Authorization: Bearer <token>
/// ```
///
/// # Response
///
/// ```json
/// { "id": "uuid", "name": "Acme", "plan": "pro", "maxNotes": 0 }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `403 Forbidden`: Caller is not an admin, or targets another tenant
/// - `404 Not Found`: Tenant does not exist
pub async fn upgrade_tenant(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(tenant_id): Path<Uuid>,
) -> ApiResult<Json<TenantView>> {
    if current.tenant.id != tenant_id {
        return Err(ApiError::Forbidden(
            "Cannot upgrade another tenant".to_string(),
        ));
    }

    let tenant = Tenant::upgrade_to_pro(&state.db, tenant_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tenant not found".to_string()))?;

    tracing::info!(tenant_id = %tenant.id, "Tenant upgraded to pro");

    Ok(Json(tenant.into()))
}

/// User invite endpoint
///
/// Creates a new account in the caller's tenant with a fixed initial
/// password. The email must not already be registered.
///
/// # Endpoint
///
/// ```text
/// POST /tenants/:tenant_id/invite
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// { "email": "new@acme.test", "role": "member" }
/// ```
///
/// # Response
///
/// ```json
/// { "email": "new@acme.test", "initialPassword": "password" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed email or unknown role
/// - `401 Unauthorized`: Missing or invalid token
/// - `403 Forbidden`: Caller is not an admin, or targets another tenant
/// - `409 Conflict`: Email already registered (no account is created)
pub async fn invite_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(tenant_id): Path<Uuid>,
    Json(req): Json<InviteRequest>,
) -> ApiResult<Json<InviteResponse>> {
    req.validate().map_err(validation_error)?;

    if current.tenant.id != tenant_id {
        return Err(ApiError::Forbidden(
            "Cannot invite into another tenant".to_string(),
        ));
    }

    let role = match req.role.as_deref() {
        None => UserRole::Member,
        Some(r) => UserRole::from_str(r)
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid role '{}'", r)))?,
    };

    let email = req.email.to_lowercase();

    if User::find_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::Conflict(
            "User with that email already exists".to_string(),
        ));
    }

    let password_hash = password::hash_password(INVITE_INITIAL_PASSWORD)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email,
            password_hash,
            role,
            tenant_id,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, tenant_id = %tenant_id, role = %user.role, "User invited");

    Ok(Json(InviteResponse {
        email: user.email,
        initial_password: INVITE_INITIAL_PASSWORD.to_string(),
    }))
}
