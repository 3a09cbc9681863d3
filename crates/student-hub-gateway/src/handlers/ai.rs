//! POST /ai/process (free-form chat) and POST /ai/survey (major consultation).
//!
//! Neither endpoint reports an upstream model failure as an error: the advisor answers from
//! the fallback responder and the response carries `fallback: true`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use student_hub_core::{SurveyForm, ValidationErrors};

use crate::error::ApiError;
use crate::handlers::timestamp;
use crate::middleware::AuthUser;
use crate::state::AppState;

const MESSAGE_MAX_CHARS: usize = 2000;
const ADVISOR_UNAVAILABLE: &str = "AI advisor temporarily unavailable";
const SURVEY_FALLBACK_WARNING: &str =
    "AI advisor temporarily unavailable; a general answer was stored without major recommendations";

#[derive(Debug, Default, Deserialize)]
pub struct ChatForm {
    pub message: Option<String>,
}

impl ChatForm {
    fn validate(self) -> Result<String, ValidationErrors> {
        match self.message {
            Some(m) if m.trim().is_empty() => Err(ValidationErrors::single(
                "message",
                "The message field is required.",
            )),
            Some(m) if m.chars().count() > MESSAGE_MAX_CHARS => Err(ValidationErrors::single(
                "message",
                format!("The message may not be greater than {MESSAGE_MAX_CHARS} characters."),
            )),
            Some(m) => Ok(m),
            None => Err(ValidationErrors::single(
                "message",
                "The message field is required.",
            )),
        }
    }
}

pub async fn process(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<ChatForm>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(form) = payload?;
    let message = form.validate()?;
    let user_id = auth.user.id;

    let chat = state.consultations.chat(user_id, &message).await;
    let fallback = chat.reply.is_fallback();
    let status_message = if fallback {
        "AI response generated (fallback mode)"
    } else {
        "AI response generated successfully"
    };

    let mut body = json!({
        "success": true,
        "result": chat.reply.text,
        "message": status_message,
        "user_id": user_id,
        "timestamp": timestamp(),
        "powered_by": chat.powered_by,
        "fallback": fallback,
    });
    if fallback {
        body["error"] = json!(ADVISOR_UNAVAILABLE);
    }
    Ok(Json(body))
}

pub async fn survey(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<SurveyForm>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(form) = payload?;
    let submission = form.validate()?;

    let outcome = state
        .consultations
        .consult(auth.user.id, &submission)
        .await
        .map_err(|e| {
            ApiError::internal(
                &state,
                "Có lỗi xảy ra khi xử lý khảo sát. Vui lòng thử lại sau.",
                e,
            )
        })?;

    let mut body = json!({
        "success": true,
        "result": outcome.result,
        "consultation_id": outcome.consultation_id,
        "session_id": outcome.session_id,
        "recommended_majors": outcome.recommended_majors,
        "study_suggestions": outcome.study_suggestions,
        "confidence_score": outcome.confidence_score,
        "fallback": outcome.fallback,
        "timestamp": timestamp(),
    });
    if outcome.fallback {
        body["warning"] = json!(SURVEY_FALLBACK_WARNING);
    }
    Ok(Json(body))
}
