#![cfg(feature = "integration_test")]

/// Integration tests for the TaskHive API
///
/// Run against a real PostgreSQL instance:
///
/// ```bash
/// DATABASE_URL=postgres://... JWT_SECRET=... \
///     cargo test -p taskhive-api --features integration_test
/// ```
///
/// Covered end-to-end:
/// - Registration, login, and token-gated access
/// - Role-scoped task visibility (admin / manager / user)
/// - Task creation with assignment notification
/// - Permission denials with no partial effect
/// - User administration (roles, manager links, deletion)

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use common::TestContext;
use serde_json::json;
use tower::Service as _;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, auth: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, auth: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", auth)
        .body(Body::empty())
        .unwrap()
}

fn create_task_body(assigned_to: uuid::Uuid) -> serde_json::Value {
    json!({
        "title": "Quarterly report",
        "description": "Compile the numbers",
        "priority": "high",
        "due_at": (Utc::now() + Duration::days(7)).to_rfc3339(),
        "remind_at": (Utc::now() + Duration::days(6)).to_rfc3339(),
        "assigned_to": assigned_to,
    })
}

#[tokio::test]
async fn test_register_login_and_me_roundtrip() {
    let ctx = TestContext::new().await.unwrap();
    let email = format!("new-{}@example.com", uuid::Uuid::new_v4());

    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/v1/auth/register",
            None,
            json!({"name": "New User", "email": email, "password": "password1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let registered = body_json(response).await;
    assert_eq!(registered["user"]["role"], "user");
    assert!(registered["access_token"].is_string());

    // Login with the same credentials.
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/v1/auth/login",
            None,
            json!({"email": email, "password": "password1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let logged_in = body_json(response).await;

    // The fresh token authenticates.
    let token = logged_in["access_token"].as_str().unwrap();
    let response = ctx
        .app
        .clone()
        .call(get_request("/v1/tasks", &format!("Bearer {token}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let user_id: uuid::Uuid =
        serde_json::from_value(registered["user"]["id"].clone()).unwrap();
    taskhive_shared::models::user::User::delete(&ctx.db, user_id)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/v1/auth/register",
            None,
            json!({
                "name": "Dup",
                "email": ctx.worker.user.email,
                "password": "password1"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/v1/auth/login",
            None,
            json!({"email": ctx.worker.user.email, "password": "wrong-password"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/tasks")
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_manager_creates_task_and_assignment_email_is_sent() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/v1/tasks",
            Some(&ctx.manager.auth_header()),
            create_task_body(ctx.worker.user.id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let task = body_json(response).await;
    assert_eq!(task["status"], "pending");
    assert_eq!(task["reminder_sent"], false);
    assert_eq!(task["assignee_name"], ctx.worker.user.name);

    // Dispatch is spawned; give it a moment.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    let sent = ctx.notifier.sent();
    assert!(sent.iter().any(|m| m.to == ctx.worker.user.email
        && m.subject.contains("Quarterly report")));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_worker_cannot_create_or_delete_tasks() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/v1/tasks",
            Some(&ctx.worker.auth_header()),
            create_task_body(ctx.worker.user.id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // No task was created despite the attempt.
    let response = ctx
        .app
        .clone()
        .call(get_request("/v1/tasks", &ctx.worker.auth_header()))
        .await
        .unwrap();
    let tasks = body_json(response).await;
    assert_eq!(tasks.as_array().unwrap().len(), 0);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_task_visibility_is_role_scoped() {
    let ctx = TestContext::new().await.unwrap();

    // Manager assigns a task to the worker.
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/v1/tasks",
            Some(&ctx.manager.auth_header()),
            create_task_body(ctx.worker.user.id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let task = body_json(response).await;
    let task_id = task["id"].as_str().unwrap().to_string();

    // Manager sees it (they created it).
    let response = ctx
        .app
        .clone()
        .call(get_request("/v1/tasks", &ctx.manager.auth_header()))
        .await
        .unwrap();
    let tasks = body_json(response).await;
    assert_eq!(tasks.as_array().unwrap().len(), 1);

    // Worker sees it (assigned to them).
    let response = ctx
        .app
        .clone()
        .call(get_request(
            &format!("/v1/tasks/{task_id}"),
            &ctx.worker.auth_header(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Admin sees everything.
    let response = ctx
        .app
        .clone()
        .call(get_request(
            &format!("/v1/tasks/{task_id}"),
            &ctx.admin.auth_header(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_status_update_is_open_to_assignee() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/v1/tasks",
            Some(&ctx.manager.auth_header()),
            create_task_body(ctx.worker.user.id),
        ))
        .await
        .unwrap();
    let task = body_json(response).await;
    let task_id = task["id"].as_str().unwrap().to_string();

    let response = ctx
        .app
        .clone()
        .call(json_request(
            "PATCH",
            &format!("/v1/tasks/{task_id}/status"),
            Some(&ctx.worker.auth_header()),
            json!({"status": "in_progress"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["status"], "in_progress");

    // Unknown status strings are rejected before any effect.
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "PATCH",
            &format!("/v1/tasks/{task_id}/status"),
            Some(&ctx.worker.auth_header()),
            json!({"status": "archived"}),
        ))
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_validation_collects_every_field() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/v1/tasks",
            Some(&ctx.manager.auth_header()),
            json!({
                "title": "",
                "description": "",
                "priority": "low",
                "due_at": Utc::now().to_rfc3339(),
                "remind_at": Utc::now().to_rfc3339(),
                "assigned_to": ctx.worker.user.id,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    let details = body["details"].as_array().unwrap();
    assert_eq!(details.len(), 2);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_task_with_unknown_assignee_is_not_found() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/v1/tasks",
            Some(&ctx.manager.auth_header()),
            create_task_body(uuid::Uuid::new_v4()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_deleted_assignee_renders_unknown_user() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/v1/tasks",
            Some(&ctx.manager.auth_header()),
            create_task_body(ctx.worker.user.id),
        ))
        .await
        .unwrap();
    let task = body_json(response).await;
    let task_id = task["id"].as_str().unwrap().to_string();

    // Admin deletes the assignee; the task's reference now dangles.
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/users/{}", ctx.worker.user.id))
        .header("authorization", ctx.admin.auth_header())
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = ctx
        .app
        .clone()
        .call(get_request(
            &format!("/v1/tasks/{task_id}"),
            &ctx.admin.auth_header(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let task = body_json(response).await;
    assert_eq!(task["assignee_name"], "Unknown user");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_user_administration_is_admin_only() {
    let ctx = TestContext::new().await.unwrap();

    // Manager cannot change roles.
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "PATCH",
            &format!("/v1/users/{}/role", ctx.worker.user.id),
            Some(&ctx.manager.auth_header()),
            json!({"role": "manager"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin can.
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "PATCH",
            &format!("/v1/users/{}/role", ctx.worker.user.id),
            Some(&ctx.admin.auth_header()),
            json!({"role": "manager"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Role change takes effect on the very next request: the promoted
    // account may now create tasks.
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/v1/tasks",
            Some(&ctx.worker.auth_header()),
            create_task_body(ctx.worker.user.id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_assign_manager_validates_target_role() {
    let ctx = TestContext::new().await.unwrap();

    // Target with role user is not a valid manager: 404.
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "PATCH",
            &format!("/v1/users/{}/manager", ctx.worker.user.id),
            Some(&ctx.admin.auth_header()),
            json!({"manager_id": ctx.worker.user.id}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // A real manager works.
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "PATCH",
            &format!("/v1/users/{}/manager", ctx.worker.user.id),
            Some(&ctx.admin.auth_header()),
            json!({"manager_id": ctx.manager.user.id}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The manager now sees the worker in their managed listing.
    let response = ctx
        .app
        .clone()
        .call(get_request("/v1/users/managed", &ctx.manager.auth_header()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let managed = body_json(response).await;
    assert!(managed
        .as_array()
        .unwrap()
        .iter()
        .any(|u| u["id"] == json!(ctx.worker.user.id)));

    // Non-admin callers fail on the role gate even with a valid target.
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "PATCH",
            &format!("/v1/users/{}/manager", ctx.worker.user.id),
            Some(&ctx.manager.auth_header()),
            json!({"manager_id": ctx.manager.user.id}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_manager_user_listing_is_deduplicated_assignees() {
    let ctx = TestContext::new().await.unwrap();

    // Before handing out any tasks the manager's listing is empty.
    let response = ctx
        .app
        .clone()
        .call(get_request("/v1/users", &ctx.manager.auth_header()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 0);

    // Two tasks assigned to the same worker.
    for _ in 0..2 {
        let response = ctx
            .app
            .clone()
            .call(json_request(
                "POST",
                "/v1/tasks",
                Some(&ctx.manager.auth_header()),
                create_task_body(ctx.worker.user.id),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // The listing shows that one assignee exactly once.
    let response = ctx
        .app
        .clone()
        .call(get_request("/v1/users", &ctx.manager.auth_header()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], json!(ctx.worker.user.id));

    // A freshly promoted manager has created nothing, so their listing
    // starts empty even though tasks are assigned to them.
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "PATCH",
            &format!("/v1/users/{}/role", ctx.worker.user.id),
            Some(&ctx.admin.auth_header()),
            json!({"role": "manager"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = ctx
        .app
        .clone()
        .call(get_request("/v1/users", &ctx.worker.auth_header()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 0);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_worker_cannot_list_users() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(get_request("/v1/users", &ctx.worker.auth_header()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_deleted_user_token_is_dead() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/users/{}", ctx.worker.user.id))
        .header("authorization", ctx.admin.auth_header())
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The deleted account's still-unexpired token no longer works.
    let response = ctx
        .app
        .clone()
        .call(get_request("/v1/tasks", &ctx.worker.auth_header()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}
