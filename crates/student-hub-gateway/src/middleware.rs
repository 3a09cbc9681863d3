//! Request logging, bearer-token authentication and the admin guard.

use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;
use axum::Extension;
use chrono::Utc;
use student_hub_core::{auth, User};

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller, inserted into request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token_id: i64,
}

pub async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    tracing::info!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "request"
    );
    response
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .ok_or(ApiError::Unauthenticated)?
        .to_string();
    let ttl = state.config.token_ttl();
    let authenticated = state
        .store
        .call(move |s| auth::authenticate(s, &token, ttl, Utc::now()))
        .await
        .map_err(|e| ApiError::from_hub(&state, "Không thể xác thực người dùng", e))?
        .ok_or(ApiError::Unauthenticated)?;

    request.extensions_mut().insert(AuthUser {
        user: authenticated.user,
        token_id: authenticated.token_id,
    });
    Ok(next.run(request).await)
}

/// Runs inside [`require_auth`]; refuses callers without the admin flag.
pub async fn require_admin(
    Extension(auth): Extension<AuthUser>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if !auth.user.is_admin {
        tracing::warn!(user_id = auth.user.id, path = request.uri().path(), "admin route refused");
        return Err(ApiError::Forbidden);
    }
    Ok(next.run(request).await)
}
