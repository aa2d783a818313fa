/// Authentication context and role gating for Axum
///
/// The API server's auth layer validates the bearer token, loads the user
/// and tenant records, and inserts a [`CurrentUser`] into request
/// extensions. Handlers extract it with Axum's `Extension` extractor;
/// admin-only routes add the [`require_admin`] middleware on top.
///
/// # Token Sources
///
/// Bearer tokens are accepted from either:
/// - The `Authorization: Bearer <token>` header
/// - The `accessToken` cookie
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use noteflow_shared::auth::middleware::CurrentUser;
///
/// async fn handler(Extension(current): Extension<CurrentUser>) -> String {
///     format!("User: {}, Tenant: {}", current.user.email, current.tenant.name)
/// }
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::{tenant::Tenant, user::User};

/// Authenticated request context
///
/// Carries the full user and tenant records loaded by the auth layer, so
/// handlers never re-fetch them and the tenant's plan/cap is always at hand.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The authenticated user
    pub user: User,

    /// The user's tenant (denormalized alongside the user, as every
    /// handler needs it for scoping)
    pub tenant: Tenant,
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// No token in Authorization header or accessToken cookie
    MissingCredentials,

    /// Token validation failed (bad signature, expired, wrong issuer)
    InvalidToken(String),

    /// Token was valid but the user it names no longer exists
    UnknownUser,

    /// Route requires the admin role
    AdminRequired,

    /// Database error while loading the user/tenant
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Same JSON envelope the API's error type produces
        let (status, error, message) = match self {
            AuthError::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Missing credentials".to_string(),
            ),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            AuthError::UnknownUser => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "User not found for this token".to_string(),
            ),
            AuthError::AdminRequired => (
                StatusCode::FORBIDDEN,
                "forbidden",
                "Admin access required".to_string(),
            ),
            AuthError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            ),
        };

        let body = Json(serde_json::json!({
            "error": error,
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Extracts a bearer token from a request's headers
///
/// Checks the `Authorization: Bearer <token>` header first, then falls back
/// to the `accessToken` cookie.
///
/// # Returns
///
/// The token string if present, None otherwise
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    // Authorization header takes precedence
    if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    // Fall back to the accessToken cookie
    let cookies = headers.get(header::COOKIE).and_then(|v| v.to_str().ok())?;
    for pair in cookies.split(';') {
        let mut parts = pair.trim().splitn(2, '=');
        if parts.next() == Some("accessToken") {
            return parts.next().map(|t| t.to_string());
        }
    }

    None
}

/// Admin role gating middleware
///
/// Must run AFTER the auth layer, which inserts [`CurrentUser`] into
/// request extensions.
///
/// # Errors
///
/// - 401 if no `CurrentUser` is present (auth layer missing or failed)
/// - 403 if the authenticated user is not an admin
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AuthError> {
    let current = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AuthError::MissingCredentials)?;

    if !current.user.is_admin() {
        return Err(AuthError::AdminRequired);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_token_from_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc123"),
        );

        assert_eq!(extract_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn test_extract_token_rejects_non_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );

        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn test_extract_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; accessToken=xyz789; lang=en"),
        );

        assert_eq!(extract_token(&headers), Some("xyz789".to_string()));
    }

    #[test]
    fn test_extract_token_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("accessToken=from-cookie"),
        );

        assert_eq!(extract_token(&headers), Some("from-header".to_string()));
    }

    #[test]
    fn test_extract_token_missing() {
        let headers = HeaderMap::new();
        assert_eq!(extract_token(&headers), None);
    }

    #[tokio::test]
    async fn test_auth_error_body_uses_json_envelope() {
        let response = AuthError::AdminRequired.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["error"], "forbidden");
        assert_eq!(json["message"], "Admin access required");
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(
            AuthError::MissingCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::AdminRequired.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::UnknownUser.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
