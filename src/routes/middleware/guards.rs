use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::{
    auth::{Claims, jwt::decode_token},
    domain::Principal,
    error::AppError,
    state::AppState,
};

/// Rejects requests without a valid bearer token.
impl FromRequestParts<Arc<AppState>> for Claims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>().cloned() {
            return Ok(claims);
        }

        let token = bearer_token(parts)?
            .ok_or_else(|| AppError::unauthorized("Missing/invalid Authorization header"))?;
        let claims = decode_token(&state.jwt, token)?;

        parts.extensions.insert(claims.clone());
        Ok(claims)
    }
}

pub type AuthGuard = Claims;

/// The caller, if any. A missing header yields `None` so the policy chain
/// decides; a malformed or expired token is still rejected.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<Principal>);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if bearer_token(parts)?.is_none() {
            return Ok(Self(None));
        }
        let claims = Claims::from_request_parts(parts, state).await?;
        Ok(Self(Some(claims.principal()?)))
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(Some)
        .ok_or_else(|| AppError::unauthorized("Missing/invalid Authorization header"))
}
