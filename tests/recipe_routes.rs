use std::collections::BTreeMap;

use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode, header},
};
use sea_orm::{
    DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value,
};
use serde_json::json;
use tower::ServiceExt; // for `oneshot`
use uuid::Uuid;

use recipy_server::{
    db::entities::{ingredient, recipe, step},
    routes::API_PREFIX,
    test_helpers::{
        auth_header, fixtures::{principal, recipe_model, step_model}, test_config, test_router,
        test_router_with,
    },
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

fn get(path: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(api_path(path));
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

fn send_json(method: &str, path: &str, auth: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(api_path(path))
        .header(header::AUTHORIZATION, auth)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Queues the three reads behind loading a recipe with its children.
fn with_graph(db: MockDatabase, recipe: recipe::Model, steps: Vec<step::Model>) -> MockDatabase {
    db.append_query_results([[recipe]])
        .append_query_results([steps])
        .append_query_results([Vec::<ingredient::Model>::new()])
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

#[tokio::test]
async fn listing_requires_authentication() {
    let (status, json) = json_response(test_router(empty_db()), get("/recipes", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Authentication required");
}

#[tokio::test]
async fn malformed_authorization_header_is_rejected() {
    let (status, json) = json_response(
        test_router(empty_db()),
        get("/recipes", Some("Token abc")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Missing/invalid Authorization header");
}

#[tokio::test]
async fn index_redirects_to_the_recipe_list() {
    let me = principal("cook");
    let auth = auth_header(&me.user_id, &me.username);
    let response = test_router(empty_db())
        .oneshot(get("/", Some(&auth)))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        &api_path("/recipes")
    );
}

#[tokio::test]
async fn listing_splits_own_and_public_recipes() {
    let me = principal("cook");
    let other = principal("chef");
    let mine = recipe_model(Uuid::new_v4(), me.user_id, "Pancakes", false);
    let theirs = recipe_model(Uuid::new_v4(), other.user_id, "Ramen", true);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[mine.clone(), theirs.clone()]])
        .append_query_results([[step_model(Uuid::new_v4(), mine.id, "Whisk", Some(75))]])
        .into_connection();

    let auth = auth_header(&me.user_id, &me.username);
    let (status, json) = json_response(test_router(db), get("/recipes", Some(&auth))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["user_recipes"][0]["title"], "Pancakes");
    assert_eq!(json["data"]["user_recipes"][0]["duration_display"], "1h 15min");
    assert_eq!(json["data"]["public_recipes"][0]["title"], "Ramen");
    assert_eq!(json["data"]["public_recipes"][0]["owner_id"], other.user_id.to_string());
}

#[tokio::test]
async fn private_recipe_of_another_user_reads_as_missing() {
    let me = principal("cook");
    let owner = principal("chef");
    let secret = recipe_model(Uuid::new_v4(), owner.user_id, "Secret sauce", false);
    let db = with_graph(MockDatabase::new(DatabaseBackend::Postgres), secret.clone(), Vec::new())
        .into_connection();

    let auth = auth_header(&me.user_id, &me.username);
    let (status, json) = json_response(
        test_router(db),
        get(&format!("/recipes/{}", secret.id), Some(&auth)),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Recipe not found");
}

#[tokio::test]
async fn public_recipe_of_another_user_is_readable_but_not_modifiable() {
    let me = principal("cook");
    let owner = principal("chef");
    let shared = recipe_model(Uuid::new_v4(), owner.user_id, "Ramen", true);
    let broth = step_model(Uuid::new_v4(), shared.id, "Broth", Some(240));
    let db = with_graph(
        MockDatabase::new(DatabaseBackend::Postgres),
        shared.clone(),
        vec![broth],
    )
    .into_connection();

    let auth = auth_header(&me.user_id, &me.username);
    let (status, json) = json_response(
        test_router(db),
        get(&format!("/recipes/{}", shared.id), Some(&auth)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["can_modify"], false);
    assert_eq!(json["data"]["recipe"]["duration_display"], "4h 0min");
    assert_eq!(json["data"]["steps"][0]["duration_display"], "4h 0min");
}

#[tokio::test]
async fn updating_a_public_recipe_of_another_user_is_forbidden() {
    let me = principal("cook");
    let owner = principal("chef");
    let shared = recipe_model(Uuid::new_v4(), owner.user_id, "Ramen", true);
    let db = with_graph(MockDatabase::new(DatabaseBackend::Postgres), shared.clone(), Vec::new())
        .into_connection();

    let auth = auth_header(&me.user_id, &me.username);
    let (status, json) = json_response(
        test_router(db),
        send_json(
            "PUT",
            &format!("/recipes/{}", shared.id),
            &auth,
            json!({ "title": "My ramen now" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "You do not have permission to modify this recipe");
}

#[tokio::test]
async fn create_with_blank_title_is_rejected_before_any_write() {
    let db = empty_db();
    let me = principal("cook");
    let auth = auth_header(&me.user_id, &me.username);

    let (status, json) = json_response(
        test_router(db.clone()),
        send_json("POST", "/recipes", &auth, json!({ "title": "  " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "title is required");
    assert!(db.into_transaction_log().is_empty());
}

#[tokio::test]
async fn create_returns_the_saved_recipe() {
    let me = principal("cook");
    let saved = recipe_model(Uuid::new_v4(), me.user_id, "Omelette", false);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[saved.clone()]])
        .into_connection();

    let auth = auth_header(&me.user_id, &me.username);
    let (status, json) = json_response(
        test_router(db),
        send_json("POST", "/recipes", &auth, json!({ "title": "Omelette", "steps": [{}] })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["recipe"]["id"], saved.id.to_string());
    assert_eq!(json["data"]["can_modify"], true);
    assert_eq!(json["data"]["steps"], json!([]));
}

#[tokio::test]
async fn demo_user_at_quota_is_redirected_with_a_warning() {
    let mut cfg = test_config();
    cfg.demo.recipe_limit = 3;
    let demo = principal(&cfg.demo.username);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[BTreeMap::from([("num_items", Value::BigInt(Some(3)))])]])
        .into_connection();

    let auth = auth_header(&demo.user_id, &demo.username);
    let response = test_router_with(cfg, db)
        .oneshot(send_json("POST", "/recipes", &auth, json!({ "title": "Toast" })))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        &api_path("/recipes")
    );
    let body = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        json["message"],
        "Demo user can have no more than 3 recipes. Also, keep in mind that the demo user data is deleted on daily basis."
    );
}

#[tokio::test]
async fn owner_can_delete_a_recipe() {
    let me = principal("cook");
    let mine = recipe_model(Uuid::new_v4(), me.user_id, "Pancakes", false);
    let db = with_graph(MockDatabase::new(DatabaseBackend::Postgres), mine.clone(), Vec::new())
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ])
        .into_connection();

    let auth = auth_header(&me.user_id, &me.username);
    let request = Request::builder()
        .method("DELETE")
        .uri(api_path(&format!("/recipes/{}", mine.id)))
        .header(header::AUTHORIZATION, auth)
        .body(Body::empty())
        .unwrap();
    let (status, json) = json_response(test_router(db), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"], mine.id.to_string());
}

#[tokio::test]
async fn direct_step_creation_requires_a_name() {
    let me = principal("cook");
    let mine = recipe_model(Uuid::new_v4(), me.user_id, "Pancakes", false);
    let db = with_graph(MockDatabase::new(DatabaseBackend::Postgres), mine.clone(), Vec::new())
        .into_connection();

    let auth = auth_header(&me.user_id, &me.username);
    let (status, json) = json_response(
        test_router(db),
        send_json(
            "POST",
            &format!("/recipes/{}/steps", mine.id),
            &auth,
            json!({ "duration_minutes": 5 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "step.name is required");
}

#[tokio::test]
async fn update_with_negative_step_duration_is_rejected() {
    let me = principal("cook");
    let mine = recipe_model(Uuid::new_v4(), me.user_id, "Pancakes", false);
    let db = with_graph(MockDatabase::new(DatabaseBackend::Postgres), mine.clone(), Vec::new())
        .into_connection();

    let auth = auth_header(&me.user_id, &me.username);
    let (status, json) = json_response(
        test_router(db),
        send_json(
            "PUT",
            &format!("/recipes/{}", mine.id),
            &auth,
            json!({ "title": "Pancakes", "steps": [{ "name": "Flip", "duration_minutes": -2 }] }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "steps[0].duration_minutes must not be negative");
}

#[tokio::test]
async fn create_checks_authentication_before_reading_the_body() {
    let db = empty_db();
    let request = Request::builder()
        .method("POST")
        .uri(api_path("/recipes"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, json) = json_response(test_router(db.clone()), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Authentication required");
    assert!(db.into_transaction_log().is_empty());
}

#[tokio::test]
async fn step_creation_checks_authentication_before_reading_the_body() {
    let request = Request::builder()
        .method("POST")
        .uri(api_path(&format!("/recipes/{}/steps", Uuid::new_v4())))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, json) = json_response(test_router(empty_db()), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Authentication required");
}

#[tokio::test]
async fn malformed_body_from_an_authenticated_caller_is_a_bad_request() {
    let me = principal("cook");
    let auth = auth_header(&me.user_id, &me.username);
    let request = Request::builder()
        .method("POST")
        .uri(api_path("/recipes"))
        .header(header::AUTHORIZATION, auth)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, json) = json_response(test_router(empty_db()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        json["message"]
            .as_str()
            .is_some_and(|message| message.starts_with("Failed to parse the request body as JSON"))
    );
}
