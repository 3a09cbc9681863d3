//! JSON error envelope: `{success: false, error, errors?, details?}`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use student_hub_core::{HubError, ValidationErrors};
use thiserror::Error;

use crate::state::AppState;

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("The given data was invalid.")]
    Validation(ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthenticated.")]
    Unauthenticated,

    #[error("The provided credentials are incorrect.")]
    InvalidCredentials,

    #[error("Forbidden. Admin access required.")]
    Forbidden,

    #[error("Record not found.")]
    NotFound,

    #[error("{message}")]
    Internal {
        message: &'static str,
        details: Option<String>,
    },
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a ValidationErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

impl ApiError {
    /// 500 with a fixed client message. The cause is logged, and only echoed back as
    /// `details` when the environment allows it.
    pub fn internal(state: &AppState, message: &'static str, cause: impl std::fmt::Display) -> Self {
        tracing::error!(error = %cause, "{message}");
        ApiError::Internal {
            message,
            details: state
                .config
                .exposes_error_details()
                .then(|| cause.to_string()),
        }
    }

    /// Maps store/account errors; anything unexpected becomes a 500 with `message`.
    pub fn from_hub(state: &AppState, message: &'static str, err: HubError) -> Self {
        match err {
            HubError::NotFound => ApiError::NotFound,
            HubError::InvalidCredentials => ApiError::InvalidCredentials,
            HubError::EmailTaken => ApiError::Validation(ValidationErrors::single(
                "email",
                "The email has already been taken.",
            )),
            other => ApiError::internal(state, message, other),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            // Valid JSON, wrong field types.
            JsonRejection::JsonDataError(e) => {
                let (field, message) = data_error_field(&e.body_text());
                ApiError::Validation(ValidationErrors::single(&field, message))
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

/// Splits a JSON data-error text into `(field, message)`. The field is the serde path in
/// dotted form (`scores.math`, `interests.0`); errors without a path land under `body`.
fn data_error_field(text: &str) -> (String, String) {
    let detail = text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(text);
    match detail.split_once(": ") {
        Some((path, message)) if !path.is_empty() && !path.contains(char::is_whitespace) => {
            (path.replace('[', ".").replace(']', ""), message.to_string())
        }
        _ => ("body".to_string(), detail.to_string()),
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (errors, details) = match &self {
            ApiError::Validation(errors) => (Some(errors), None),
            ApiError::Internal { details, .. } => (None, details.as_deref()),
            _ => (None, None),
        };
        let body = ErrorBody {
            success: false,
            error: self.to_string(),
            errors,
            details,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_error_lists_fields() {
        let (status, json) =
            body_json(ApiError::from(ValidationErrors::single("careerGoal", "required"))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["success"], false);
        assert_eq!(json["errors"]["careerGoal"][0], "required");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn data_errors_are_keyed_by_field_path() {
        let (field, message) = data_error_field(
            "Failed to deserialize the JSON body into the target type: interests: invalid type: \
             string \"coding\", expected a sequence at line 1 column 23",
        );
        assert_eq!(field, "interests");
        assert!(message.starts_with("invalid type: string"));

        let (field, _) = data_error_field(
            "Failed to deserialize the JSON body into the target type: scores.math: invalid type",
        );
        assert_eq!(field, "scores.math");

        let (field, _) = data_error_field(
            "Failed to deserialize the JSON body into the target type: interests[1]: invalid type",
        );
        assert_eq!(field, "interests.1");
    }

    #[test]
    fn data_errors_without_a_path_use_body() {
        let (field, message) = data_error_field(
            "Failed to deserialize the JSON body into the target type: invalid type: integer `3`, \
             expected struct SurveyForm at line 1 column 1",
        );
        assert_eq!(field, "body");
        assert!(message.starts_with("invalid type: integer"));
    }

    #[tokio::test]
    async fn internal_error_hides_missing_details() {
        let (status, json) = body_json(ApiError::Internal {
            message: "Không thể tải thống kê",
            details: None,
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Không thể tải thống kê");
        assert!(json.get("details").is_none());
    }
}
