//! GET /consultation/history, GET /consultation/{id}. Owner-scoped.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use student_hub_core::PageRequest;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let page = PageRequest::new(query.page, query.per_page, state.config.history_per_page);
    let user_id = auth.user.id;
    let consultations = state
        .store
        .call(move |s| s.list_consultations_for_user(user_id, page))
        .await
        .map_err(|e| ApiError::from_hub(&state, "Không thể tải lịch sử tư vấn", e))?;
    Ok(Json(json!({
        "success": true,
        "data": consultations,
        "message": "Lịch sử tư vấn được tải thành công",
    })))
}

/// A foreign, missing or non-numeric id is a 404.
pub async fn show(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Ok(Path(id)) = id else {
        return Err(ApiError::NotFound);
    };
    let user_id = auth.user.id;
    let consultation = state
        .store
        .call(move |s| s.get_consultation_for_user(user_id, id))
        .await
        .map_err(|e| ApiError::from_hub(&state, "Không thể tải chi tiết tư vấn", e))?;
    Ok(Json(json!({
        "success": true,
        "data": consultation,
        "message": "Chi tiết tư vấn được tải thành công",
    })))
}
