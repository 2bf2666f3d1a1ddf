use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode, header},
};
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::json;
use tower::ServiceExt; // for `oneshot`
use uuid::Uuid;

use recipy_server::{
    auth::password::hash_password,
    db::entities::user,
    routes::API_PREFIX,
    test_helpers::{auth_header, fixtures::user_model, test_config, test_router, test_router_with},
};

fn api_path(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

async fn json_response(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("request should succeed");
    let status = response.status();
    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("body should be json");
    (status, json)
}

fn credentials(path: &str, username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(api_path(path))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "username": username, "password": password }).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn register_issues_a_bearer_token() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .append_query_results([[user_model(Uuid::new_v4(), "alice")]])
        .into_connection();

    let (status, json) =
        json_response(test_router(db), credentials("/register", "alice", "password123")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["message"], "registered");
    assert_eq!(json["data"]["token_type"], "Bearer");
    assert!(json["data"]["access_token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn register_rejects_taken_username() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user_model(Uuid::new_v4(), "alice")]])
        .into_connection();

    let (status, json) =
        json_response(test_router(db), credentials("/register", "alice", "password123")).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["message"], "User already exists");
}

#[tokio::test]
async fn register_rejects_short_password() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();

    let (status, json) =
        json_response(test_router(db), credentials("/register", "alice", "short")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Password must be at least 8 characters");
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let mut stored = user_model(Uuid::new_v4(), "alice");
    stored.password_hash = hash_password("password123").expect("hash password");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[stored]])
        .into_connection();

    let (status, json) =
        json_response(test_router(db), credentials("/login", "alice", "password124")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid credentials");
}

#[tokio::test]
async fn me_requires_a_token() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let request = Request::builder()
        .uri(api_path("/me"))
        .body(Body::empty())
        .unwrap();

    let (status, json) = json_response(test_router(db), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Missing/invalid Authorization header");
}

#[tokio::test]
async fn me_flags_the_demo_account() {
    let cfg = test_config();
    let id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user_model(id, &cfg.demo.username)]])
        .into_connection();

    let request = Request::builder()
        .uri(api_path("/me"))
        .header(header::AUTHORIZATION, auth_header(&id, &cfg.demo.username))
        .body(Body::empty())
        .unwrap();
    let (status, json) = json_response(test_router_with(cfg.clone(), db), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"], id.to_string());
    assert_eq!(json["data"]["username"], cfg.demo.username);
    assert_eq!(json["data"]["is_demo"], true);
}
