use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

use super::{account, auth, recipes};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(auth::router(state.clone()))
        .merge(account::router(state.clone()))
        .merge(recipes::router(state))
}
