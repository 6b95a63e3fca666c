//! HTTP surface tests
//!
//! Drives the fully-layered router with `tower::ServiceExt::oneshot`, no
//! listening socket. Covers the authentication gate, per-verb permission
//! checks, the either-of read rule, and the error envelope.

use admin_server::api;
use admin_server::core::{Config, ServerState};
use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

async fn setup_app() -> (TempDir, ServerState, Router) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.db");
    let config = Config::with_overrides(db_path.to_string_lossy().to_string(), 0);

    let state = ServerState::initialize(&config)
        .await
        .expect("Failed to initialize state");
    let app = api::build_app(&state).with_state(state.clone());

    (dir, state, app)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("Failed to build request")
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": email, "password": password }),
        ))
        .await
        .expect("Login request failed");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    body["token"].as_str().expect("No token in response").to_string()
}

#[tokio::test]
async fn health_is_public() {
    let (_dir, _state, app) = setup_app().await;

    let response = app.oneshot(get_request("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn api_routes_require_a_session() {
    let (_dir, _state, app) = setup_app().await;

    let response = app
        .clone()
        .oneshot(get_request("/api/users", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "E3001");

    let response = app
        .oneshot(get_request("/api/users", Some("not-a-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "E3002");
}

#[tokio::test]
async fn login_returns_session_payload() {
    let (_dir, _state, app) = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "admin@example.com", "password": "Admin123!" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["email"], "admin@example.com");
    assert_eq!(body["user"]["roles"], json!(["admin"]));
    // Admin holds the full vocabulary
    assert_eq!(body["user"]["permissions"].as_array().unwrap().len(), 13);
}

#[tokio::test]
async fn wrong_credentials_share_one_message() {
    let (_dir, _state, app) = setup_app().await;

    let wrong_password = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "admin@example.com", "password": "nope-nope" }),
        ))
        .await
        .unwrap();
    assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
    let wrong_password = body_json(wrong_password).await;

    let unknown_email = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "nobody@example.com", "password": "whatever1" }),
        ))
        .await
        .unwrap();
    assert_eq!(unknown_email.status(), StatusCode::BAD_REQUEST);
    let unknown_email = body_json(unknown_email).await;

    // Identical envelope either way: no email enumeration
    assert_eq!(wrong_password["message"], unknown_email["message"]);
    assert_eq!(wrong_password["message"], "Invalid email or password");
}

#[tokio::test]
async fn me_reflects_the_issued_token() {
    let (_dir, _state, app) = setup_app().await;
    let token = login(&app, "user@example.com", "User123!").await;

    let response = app
        .oneshot(get_request("/api/auth/me", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["email"], "user@example.com");
    assert_eq!(
        body["permissions"],
        json!(["dashboard:access", "users:read"])
    );
}

#[tokio::test]
async fn current_user_extractor_authenticates_without_the_middleware_stack() {
    let (_dir, state, app) = setup_app().await;
    let token = login(&app, "user@example.com", "User123!").await;

    // Routes only: no layers, so the extractor must validate the header itself
    let bare = api::build_router().with_state(state);

    let response = bare
        .clone()
        .oneshot(get_request("/api/auth/me", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["email"], "user@example.com");

    let response = bare
        .clone()
        .oneshot(get_request("/api/auth/me", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "E3001");

    let response = bare
        .oneshot(get_request("/api/auth/me", Some("garbage")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "E3002");
}

#[tokio::test]
async fn missing_permission_is_forbidden() {
    let (_dir, _state, app) = setup_app().await;
    let token = login(&app, "user@example.com", "User123!").await;

    // Regular user has users:read but nothing on roles
    let response = app
        .clone()
        .oneshot(get_request("/api/roles", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "E2001");

    // Read is allowed, write is not: per-verb checks are independent
    let response = app
        .clone()
        .oneshot(get_request("/api/users", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/users",
            Some(&token),
            json!({ "name": "X", "email": "x@example.com", "password": "Password1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn permission_reads_accept_either_grant() {
    let (_dir, _state, app) = setup_app().await;

    // Manager holds roles:read (and permissions:read); the vocabulary is visible
    let manager = login(&app, "manager@example.com", "Manager123!").await;
    let response = app
        .clone()
        .oneshot(get_request("/api/permissions", Some(&manager)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Regular user holds neither read grant
    let regular = login(&app, "user@example.com", "User123!").await;
    let response = app
        .oneshot(get_request("/api/permissions", Some(&regular)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_can_manage_users() {
    let (_dir, _state, app) = setup_app().await;
    let token = login(&app, "admin@example.com", "Admin123!").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            Some(&token),
            json!({
                "name": "New Person",
                "email": "new@example.com",
                "password": "Password123!",
                "role_ids": []
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_i64().unwrap();
    assert!(created.get("hash_pass").is_none());

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/users/{id}"),
            Some(&token),
            json!({ "name": "Renamed Person" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "Renamed Person");

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/users/{id}"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn invalid_payloads_are_bad_requests() {
    let (_dir, _state, app) = setup_app().await;
    let token = login(&app, "admin@example.com", "Admin123!").await;

    // Malformed email
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            Some(&token),
            json!({ "name": "X", "email": "not-an-email", "password": "Password123!" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "E0002");

    // Duplicate email
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/users",
            Some(&token),
            json!({ "name": "X", "email": "user@example.com", "password": "Password123!" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "E0004");
}

#[tokio::test]
async fn self_deletion_is_refused() {
    let (_dir, state, app) = setup_app().await;
    let token = login(&app, "admin@example.com", "Admin123!").await;

    let admin_id = admin_server::db::repository::user::find_by_email(&state.pool, "admin@example.com")
        .await
        .unwrap()
        .unwrap()
        .id;

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/users/{admin_id}"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "E0005");
}

#[tokio::test]
async fn refresh_picks_up_grant_changes() {
    let (_dir, state, app) = setup_app().await;
    let token = login(&app, "user@example.com", "User123!").await;

    // Revoke users:read from the "user" role while the session is live
    let user_role = admin_server::db::repository::role::find_by_name(&state.pool, "user")
        .await
        .unwrap()
        .unwrap();
    let dashboard = admin_server::db::repository::permission::find_by_name(
        &state.pool,
        "dashboard:access",
    )
    .await
    .unwrap()
    .unwrap();
    admin_server::db::repository::role::set_permissions(&state.pool, user_role.id, vec![dashboard.id])
        .await
        .unwrap();

    // The live session still carries its issued set
    let response = app
        .clone()
        .oneshot(get_request("/api/auth/me", Some(&token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(
        body["permissions"],
        json!(["dashboard:access", "users:read"])
    );

    // Explicit refresh re-resolves from the store
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/refresh", Some(&token), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let refreshed = body_json(response).await;
    assert_eq!(refreshed["user"]["permissions"], json!(["dashboard:access"]));

    // And the new token reflects the revocation
    let new_token = refreshed["token"].as_str().unwrap();
    let response = app
        .oneshot(get_request("/api/users", Some(new_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn role_grant_replacement_roundtrip() {
    let (_dir, _state, app) = setup_app().await;
    let token = login(&app, "admin@example.com", "Admin123!").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/roles",
            Some(&token),
            json!({ "name": "viewer", "description": "Read only", "permission_ids": [] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let role = body_json(response).await;
    let role_id = role["id"].as_i64().unwrap();
    assert_eq!(role["permissions"], json!([]));

    // Find a permission id through the API
    let response = app
        .clone()
        .oneshot(get_request("/api/permissions", Some(&token)))
        .await
        .unwrap();
    let permissions = body_json(response).await;
    let users_read = permissions
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "users:read")
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/roles/{role_id}/permissions"),
            Some(&token),
            json!({ "permission_ids": [users_read] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["permissions"][0]["name"], "users:read");

    let response = app
        .oneshot(get_request(&format!("/api/roles/{role_id}/permissions"), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let grants = body_json(response).await;
    assert_eq!(grants.as_array().unwrap().len(), 1);
}
