use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::{Deserialize, Serialize};

use crate::{
    auth::TokenBundle,
    response::{ApiResult, JsonApiResponse},
    services::ServiceContext,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: usize,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .with_state(state)
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialsRequest>,
) -> ApiResult<TokenResponse> {
    let services = ServiceContext::from_state(state.as_ref());
    let service = services.auth(&state.jwt, access_ttl(&state));
    let tokens = service.register(&body.username, &body.password).await?;
    JsonApiResponse::with_status(StatusCode::CREATED, "registered", tokens.into())
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialsRequest>,
) -> ApiResult<TokenResponse> {
    let services = ServiceContext::from_state(state.as_ref());
    let service = services.auth(&state.jwt, access_ttl(&state));
    let tokens = service.login(&body.username, &body.password).await?;
    JsonApiResponse::ok(tokens.into())
}

fn access_ttl(state: &AppState) -> usize {
    usize::try_from(state.config.auth.access_ttl_secs).unwrap_or(usize::MAX)
}

impl From<TokenBundle> for TokenResponse {
    fn from(bundle: TokenBundle) -> Self {
        Self {
            access_token: bundle.access_token,
            token_type: bundle.token_type,
            expires_in: bundle.expires_in,
        }
    }
}
