use std::sync::Arc;

use axum::{Router, middleware};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::{
    auth::jwt::{JwtKeys, encode_token, make_access_claims},
    config::AppConfig,
    routes::{catch_panic_layer, json_error_middleware, router},
    state::AppState,
};

pub const TEST_SECRET: &[u8] = b"recipy-test-secret";

pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.auth.jwt_secret = String::from_utf8_lossy(TEST_SECRET).into_owned();
    cfg
}

/// Full API router over `db`, with the same error layers as the server.
pub fn test_router(db: DatabaseConnection) -> Router {
    test_router_with(test_config(), db)
}

pub fn test_router_with(cfg: AppConfig, db: DatabaseConnection) -> Router {
    let state = AppState::new(cfg, db);
    router(Arc::clone(&state))
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
}

pub fn auth_header(user_id: &Uuid, username: &str) -> String {
    let claims = make_access_claims(user_id, username, 3600);
    let jwt = JwtKeys::from_secret(TEST_SECRET);
    let token = encode_token(&jwt, &claims).expect("encode token");
    format!("Bearer {token}")
}

pub mod fixtures {
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};
    use uuid::Uuid;

    use crate::{
        db::entities::{ingredient, recipe, step, user},
        domain::Principal,
    };

    pub fn ts() -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
            .fixed_offset()
    }

    pub fn principal(username: &str) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            username: username.to_string(),
        }
    }

    pub fn user_model(id: Uuid, username: &str) -> user::Model {
        user::Model {
            id,
            username: username.to_string(),
            password_hash: "hash".to_string(),
            last_login_at: None,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    pub fn recipe_model(id: Uuid, owner: Uuid, title: &str, is_public: bool) -> recipe::Model {
        recipe::Model {
            id,
            title: title.to_string(),
            description: String::new(),
            duration_minutes: None,
            image: None,
            is_public,
            user_id: owner,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    pub fn step_model(id: Uuid, recipe_id: Uuid, name: &str, duration_minutes: Option<i32>) -> step::Model {
        step::Model {
            id,
            name: name.to_string(),
            description: String::new(),
            duration_minutes,
            recipe_id,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    pub fn ingredient_model(id: Uuid, recipe_id: Uuid, name: &str) -> ingredient::Model {
        ingredient::Model {
            id,
            name: name.to_string(),
            quantity: None,
            measure: None,
            recipe_id,
            created_at: ts(),
            updated_at: ts(),
        }
    }
}
