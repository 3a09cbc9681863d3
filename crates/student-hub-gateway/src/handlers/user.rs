//! GET /user, GET|PUT /user/profile, GET /user/dashboard.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde_json::{json, Value};
use student_hub_core::auth::ProfileUpdateForm;
use student_hub_core::{dashboard, User};

use crate::error::ApiError;
use crate::handlers::auth::ensure_email_free;
use crate::middleware::AuthUser;
use crate::state::AppState;

pub async fn current(Extension(auth): Extension<AuthUser>) -> Json<User> {
    Json(auth.user)
}

pub async fn profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let summary = state
        .store
        .call(move |s| dashboard::profile_summary(s, auth.user, Utc::now()))
        .await
        .map_err(|e| ApiError::from_hub(&state, "Không thể tải thông tin hồ sơ", e))?;
    Ok(Json(json!({ "success": true, "data": summary })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<ProfileUpdateForm>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    const UPDATE_FAILED: &str = "Không thể cập nhật hồ sơ";

    let Json(form) = payload?;
    let update = form.validate()?;
    if let Some(email) = &update.email {
        ensure_email_free(&state, email, Some(auth.user.id), UPDATE_FAILED).await?;
    }

    let user_id = auth.user.id;
    let user = state
        .store
        .call(move |s| s.update_user(user_id, update.name.as_deref(), update.email.as_deref()))
        .await
        .map_err(|e| ApiError::from_hub(&state, UPDATE_FAILED, e))?;
    Ok(Json(json!({
        "success": true,
        "message": "Cập nhật hồ sơ thành công",
        "data": user,
    })))
}

pub async fn dashboard_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let summary = state
        .store
        .call(move |s| dashboard::dashboard_summary(s, &auth.user, Utc::now()))
        .await
        .map_err(|e| ApiError::from_hub(&state, "Không thể tải thống kê dashboard", e))?;
    Ok(Json(json!({ "success": true, "data": summary })))
}
