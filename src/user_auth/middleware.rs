use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::service::Claims;
use crate::account::ProfileRepository;
use crate::gateway::{
    state::AppState,
    types::{ApiError, error_codes},
};

pub const ADMIN_REQUIRED_MSG: &str = "Access denied. Administrator privileges required.";

/// Authenticated caller, inserted into request extensions
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub claims: Claims,
}

/// Caller on routes where login is optional
#[derive(Debug, Clone, Default)]
pub struct MaybeUser(pub Option<AuthUser>);

/// `Ok(None)` when there is no Authorization header at all
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid token format"))?;
    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim())),
        _ => Err(ApiError::unauthorized("Invalid token format")),
    }
}

fn authenticate(state: &AppState, token: &str) -> Result<AuthUser, ApiError> {
    let claims = state.user_auth.verify_token(token)?;
    let user_id = claims
        .user_id()
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;
    Ok(AuthUser { user_id, claims })
}

pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?.ok_or_else(|| {
        ApiError::new(
            axum::http::StatusCode::UNAUTHORIZED,
            error_codes::MISSING_AUTH,
            "Missing Authorization header",
        )
    })?;

    let user = authenticate(&state, token)?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Like [`jwt_auth_middleware`] but lets anonymous requests through.
/// A token that is present but invalid is still rejected.
pub async fn optional_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let user = match bearer_token(request.headers())? {
        Some(token) => Some(authenticate(&state, token)?),
        None => None,
    };
    request.extensions_mut().insert(MaybeUser(user));
    Ok(next.run(request).await)
}

/// Must run inside [`jwt_auth_middleware`]
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let profile = ProfileRepository::get_by_user(state.db.pool(), user.user_id).await?;
    if !profile.is_some_and(|p| p.is_admin()) {
        tracing::warn!(user_id = user.user_id, "admin route refused");
        return Err(ApiError::forbidden(ADMIN_REQUIRED_MSG));
    }
    Ok(next.run(request).await)
}
