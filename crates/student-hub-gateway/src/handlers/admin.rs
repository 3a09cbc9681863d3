//! GET /admin/statistics, GET /admin/consultations. Mounted behind the admin guard.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use student_hub_core::{dashboard, PageRequest};

use crate::error::ApiError;
use crate::state::AppState;

const ADMIN_PER_PAGE: u32 = 20;

#[derive(Debug, Default, Deserialize)]
pub struct ConsultationListQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn statistics(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let overview = state
        .store
        .call(|s| dashboard::admin_overview(s, Utc::now()))
        .await
        .map_err(|e| ApiError::from_hub(&state, "Không thể tải thống kê", e))?;
    Ok(Json(json!({
        "success": true,
        "data": { "overview": overview },
    })))
}

pub async fn consultations(
    State(state): State<AppState>,
    query: Result<Query<ConsultationListQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let page = PageRequest::new(query.page, query.per_page, ADMIN_PER_PAGE);
    let listing = state
        .store
        .call(move |s| s.list_all_consultations(query.search.as_deref(), page))
        .await
        .map_err(|e| ApiError::from_hub(&state, "Không thể tải danh sách tư vấn", e))?;
    Ok(Json(json!({ "success": true, "data": listing })))
}
