use std::sync::Arc;

use axum::{Router, extract::State, routing::get};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    domain::is_demo_account,
    error::AppError,
    response::{ApiResult, JsonApiResponse},
    routes::AuthGuard,
    services::ServiceContext,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub username: String,
    pub is_demo: bool,
    pub last_login_at: Option<DateTimeWithTimeZone>,
    pub token_expires_at: usize,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new().route("/me", get(me)).with_state(state)
}

async fn me(State(state): State<Arc<AppState>>, claims: AuthGuard) -> ApiResult<MeResponse> {
    let principal = claims.principal()?;
    let user = ServiceContext::from_state(state.as_ref())
        .user()
        .find_by_id(&principal.user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("Account no longer exists"))?;

    JsonApiResponse::ok(MeResponse {
        id: user.id,
        is_demo: is_demo_account(&principal, &state.config.demo.username),
        username: user.username,
        last_login_at: user.last_login_at,
        token_expires_at: claims.exp,
    })
}
