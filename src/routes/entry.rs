use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

use super::api;

pub const API_PREFIX: &str = "/api/v1";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new().nest(API_PREFIX, api::router(state))
}

pub(crate) fn api_path(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}
