/// Integration tests for the NoteFlow API
///
/// These tests verify the full system works end-to-end:
/// - Credential login and token issuance
/// - Tenant-scoped note CRUD
/// - Cross-tenant isolation
/// - Free-plan note cap and pro upgrade
/// - Admin-only invite flow
/// - Authentication edge cases (missing/garbage tokens, cookie auth)

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{TestContext, TEST_PASSWORD};
use serde_json::json;
use tower::Service as _;

#[tokio::test]
async fn test_health_check() {
    let mut ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.request("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_login_success_returns_token_and_tenant() {
    let mut ctx = TestContext::new().await.unwrap();

    let email = ctx.acme.admin.email.clone();
    let (status, body) = ctx
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": TEST_PASSWORD })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["email"], ctx.acme.admin.email);
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["user"]["tenant"]["plan"], "free");
    assert_eq!(body["user"]["tenant"]["maxNotes"], 3);

    // The token itself carries the right user and tenant
    let claims = noteflow_shared::auth::jwt::validate_token(
        body["token"].as_str().unwrap(),
        &ctx.config.jwt.secret,
    )
    .expect("Login should return a valid token");
    assert_eq!(claims.sub, ctx.acme.admin.id);
    assert_eq!(claims.tenant_id, ctx.acme.tenant.id);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_login_failures_do_not_reveal_which_field_was_wrong() {
    let mut ctx = TestContext::new().await.unwrap();

    let email = ctx.acme.admin.email.clone();
    let (wrong_pw_status, wrong_pw_body) = ctx
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": "not-the-password" })),
        )
        .await;

    let (unknown_status, unknown_body) = ctx
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "nobody@nowhere.test", "password": TEST_PASSWORD })),
        )
        .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    // Identical error bodies: login cannot be used to probe for emails
    assert_eq!(wrong_pw_body["message"], unknown_body["message"]);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_login_rejects_malformed_email() {
    let mut ctx = TestContext::new().await.unwrap();

    let (status, _) = ctx
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "not-an-email", "password": "x" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_note_crud_lifecycle() {
    let mut ctx = TestContext::new().await.unwrap();
    let token = ctx.acme.member_token.clone();

    // Create
    let (status, created) = ctx
        .request(
            "POST",
            "/notes",
            Some(&token),
            Some(json!({ "title": "Standup", "content": "Ship the release" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["title"], "Standup");
    assert_eq!(created["authorId"], ctx.acme.member.id.to_string());
    let note_id = created["id"].as_str().unwrap().to_string();

    // List
    let (status, list) = ctx.request("GET", "/notes", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    // Get
    let (status, fetched) = ctx
        .request("GET", &format!("/notes/{}", note_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["content"], "Ship the release");

    // Update (partial: only the title)
    let (status, updated) = ctx
        .request(
            "PUT",
            &format!("/notes/{}", note_id),
            Some(&token),
            Some(json!({ "title": "Retro" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Retro");
    assert_eq!(updated["content"], "Ship the release");

    // Delete
    let (status, deleted) = ctx
        .request("DELETE", &format!("/notes/{}", note_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deleted"], true);

    // Gone
    let (status, _) = ctx
        .request("GET", &format!("/notes/{}", note_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_note_defaults_to_empty_title_and_content() {
    let mut ctx = TestContext::new().await.unwrap();
    let token = ctx.acme.member_token.clone();

    let (status, created) = ctx
        .request("POST", "/notes", Some(&token), Some(json!({})))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["title"], "");
    assert_eq!(created["content"], "");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_cross_tenant_note_access_looks_like_missing() {
    let mut ctx = TestContext::new().await.unwrap();
    let acme_token = ctx.acme.member_token.clone();
    let globex_token = ctx.globex.member_token.clone();

    let (_, created) = ctx
        .request(
            "POST",
            "/notes",
            Some(&acme_token),
            Some(json!({ "title": "Acme secret" })),
        )
        .await;
    let note_id = created["id"].as_str().unwrap().to_string();

    // Another tenant's token gets the same 404 as a nonexistent note
    let (status, _) = ctx
        .request("GET", &format!("/notes/{}", note_id), Some(&globex_token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .request(
            "PUT",
            &format!("/notes/{}", note_id),
            Some(&globex_token),
            Some(json!({ "title": "hijacked" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .request("DELETE", &format!("/notes/{}", note_id), Some(&globex_token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // And the note never shows up in the other tenant's listing
    let (_, list) = ctx.request("GET", "/notes", Some(&globex_token), None).await;
    assert!(list.as_array().unwrap().is_empty());

    // The owner still has it, untouched
    let (status, fetched) = ctx
        .request("GET", &format!("/notes/{}", note_id), Some(&acme_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Acme secret");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_free_plan_note_cap_and_upgrade() {
    let mut ctx = TestContext::new().await.unwrap();
    let member_token = ctx.acme.member_token.clone();
    let admin_token = ctx.acme.admin_token.clone();
    let tenant_id = ctx.acme.tenant.id;

    // Fill the free-plan cap of 3
    for i in 0..3 {
        let (status, _) = ctx
            .request(
                "POST",
                "/notes",
                Some(&member_token),
                Some(json!({ "title": format!("note {}", i) })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    // The fourth is rejected
    let (status, body) = ctx
        .request(
            "POST",
            "/notes",
            Some(&member_token),
            Some(json!({ "title": "one too many" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Note limit reached. Upgrade to Pro to add more notes."
    );

    // Upgrade to pro lifts the cap
    let (status, upgraded) = ctx
        .request(
            "POST",
            &format!("/tenants/{}/upgrade", tenant_id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(upgraded["plan"], "pro");
    assert_eq!(upgraded["maxNotes"], 0);

    let (status, _) = ctx
        .request(
            "POST",
            "/notes",
            Some(&member_token),
            Some(json!({ "title": "now it fits" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Upgrading again is a harmless no-op
    let (status, again) = ctx
        .request(
            "POST",
            &format!("/tenants/{}/upgrade", tenant_id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["plan"], "pro");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_note_creation_cannot_overshoot_cap() {
    use noteflow_shared::models::note::{CreateNote, Note};

    let ctx = TestContext::new().await.unwrap();
    let tenant_id = ctx.acme.tenant.id;
    let author_id = ctx.acme.member.id;
    let cap = ctx.acme.tenant.max_notes;

    // Fire more simultaneous creations than the cap allows. The tenant-row
    // lock serializes them, so exactly `cap` may succeed.
    let mut handles = vec![];
    for i in 0..8 {
        let pool = ctx.db.clone();
        handles.push(tokio::spawn(async move {
            Note::create_if_under_cap(
                &pool,
                CreateNote {
                    tenant_id,
                    author_id,
                    title: format!("racer {}", i),
                    content: String::new(),
                },
                cap,
            )
            .await
            .unwrap()
        }));
    }

    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap().is_some() {
            created += 1;
        }
    }

    assert_eq!(created, cap as usize, "exactly the cap may be created");

    let notes = Note::list_by_tenant(&ctx.db, tenant_id).await.unwrap();
    assert_eq!(notes.len(), cap as usize, "stored notes must not exceed the cap");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_upgrade_requires_admin_of_the_same_tenant() {
    let mut ctx = TestContext::new().await.unwrap();
    let member_token = ctx.acme.member_token.clone();
    let other_admin_token = ctx.globex.admin_token.clone();
    let tenant_id = ctx.acme.tenant.id;

    // A member of the tenant is refused, with the standard error envelope
    let (status, body) = ctx
        .request(
            "POST",
            &format!("/tenants/{}/upgrade", tenant_id),
            Some(&member_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
    assert_eq!(body["message"], "Admin access required");

    // So is an admin of a different tenant
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/tenants/{}/upgrade", tenant_id),
            Some(&other_admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // And the tenant is still on the free plan
    let tenant = noteflow_shared::models::tenant::Tenant::find_by_id(&ctx.db, tenant_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tenant.plan, "free");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_invite_creates_account_that_can_log_in() {
    let mut ctx = TestContext::new().await.unwrap();
    let admin_token = ctx.acme.admin_token.clone();
    let tenant_id = ctx.acme.tenant.id;
    let new_email = format!("invited-{}@acme.test", uuid::Uuid::new_v4());

    let (status, body) = ctx
        .request(
            "POST",
            &format!("/tenants/{}/invite", tenant_id),
            Some(&admin_token),
            Some(json!({ "email": new_email, "role": "member" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], new_email);
    let initial_password = body["initialPassword"].as_str().unwrap().to_string();

    // The invitee can log in with the returned initial password
    let (status, login) = ctx
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": new_email, "password": initial_password })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["user"]["role"], "member");
    assert_eq!(
        login["user"]["tenant"]["id"],
        tenant_id.to_string()
    );

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_invite_rejects_duplicates_bad_roles_and_non_admins() {
    let mut ctx = TestContext::new().await.unwrap();
    let admin_token = ctx.acme.admin_token.clone();
    let member_token = ctx.acme.member_token.clone();
    let tenant_id = ctx.acme.tenant.id;
    let other_tenant_id = ctx.globex.tenant.id;

    // Duplicate email
    let existing = ctx.acme.member.email.clone();
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/tenants/{}/invite", tenant_id),
            Some(&admin_token),
            Some(json!({ "email": existing })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Unknown role
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/tenants/{}/invite", tenant_id),
            Some(&admin_token),
            Some(json!({ "email": "fresh@acme.test", "role": "owner" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Member may not invite
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/tenants/{}/invite", tenant_id),
            Some(&member_token),
            Some(json!({ "email": "fresh@acme.test" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admin may not invite into another tenant
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/tenants/{}/invite", other_tenant_id),
            Some(&admin_token),
            Some(json!({ "email": "fresh@globex.test" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_requests_without_valid_token_are_rejected() {
    let mut ctx = TestContext::new().await.unwrap();

    let (status, _) = ctx.request("GET", "/notes", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .request("GET", "/notes", Some("not-a-real-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_token_for_deleted_user_is_rejected() {
    let mut ctx = TestContext::new().await.unwrap();
    let member_token = ctx.globex.member_token.clone();

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(ctx.globex.member.id)
        .execute(&ctx.db)
        .await
        .unwrap();

    let (status, _) = ctx.request("GET", "/notes", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_access_token_cookie_is_accepted() {
    let mut ctx = TestContext::new().await.unwrap();
    let token = ctx.acme.member_token.clone();

    let request = Request::builder()
        .method("GET")
        .uri("/notes")
        .header("cookie", format!("theme=dark; accessToken={}", token))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    ctx.cleanup().await.unwrap();
}
