//! Consultation pipeline: survey -> prompt -> advisor -> parser -> store.
//!
//! The advisor never fails, so the only error a caller sees is a store failure. Fallback
//! replies are stored as they are, with nothing parsed out of them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::advisor::{Advisor, AdvisorReply};
use crate::error::HubResult;
use crate::parser::{parse_consultation, ParsedConsultation};
use crate::prompt::consultation_prompt;
use crate::store::{HubStore, NewConsultation};
use crate::survey::SurveySubmission;

/// Result of one survey consultation, already persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ConsultationOutcome {
    pub consultation_id: i64,
    pub session_id: String,
    pub result: String,
    pub recommended_majors: Vec<String>,
    pub study_suggestions: Vec<String>,
    pub confidence_score: f64,
    pub fallback: bool,
    pub created_at: DateTime<Utc>,
}

/// Answer to a free-form chat message. Chat messages are not stored.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub reply: AdvisorReply,
    pub powered_by: &'static str,
}

#[derive(Clone)]
pub struct ConsultationService {
    advisor: Arc<dyn Advisor>,
    store: HubStore,
}

impl ConsultationService {
    pub fn new(advisor: Arc<dyn Advisor>, store: HubStore) -> Self {
        Self { advisor, store }
    }

    pub fn store(&self) -> &HubStore {
        &self.store
    }

    pub fn advisor_name(&self) -> &'static str {
        self.advisor.name()
    }

    pub async fn chat(&self, user_id: i64, message: &str) -> ChatReply {
        ChatReply {
            reply: self.advisor.advise(user_id, message).await,
            powered_by: self.advisor.name(),
        }
    }

    pub async fn consult(&self, user_id: i64, survey: &SurveySubmission) -> HubResult<ConsultationOutcome> {
        let session_id = Uuid::new_v4().to_string();
        let prompt = consultation_prompt(survey);
        let reply = self.advisor.advise(user_id, &prompt).await;

        let parsed = if reply.is_fallback() {
            ParsedConsultation::unparsed()
        } else {
            parse_consultation(&reply.text)
        };

        let new = NewConsultation {
            user_id,
            input_data: serde_json::to_value(survey)?,
            ai_result: reply.text.clone(),
            recommended_majors: parsed.majors,
            study_suggestions: parsed.suggestions,
            confidence_score: parsed.confidence,
            session_id: session_id.clone(),
        };
        let record = self.store.call(move |s| s.create_consultation(&new)).await?;

        tracing::info!(
            user_id,
            consultation_id = record.id,
            session_id = %session_id,
            fallback = reply.is_fallback(),
            majors = record.recommended_majors.len(),
            "consultation stored"
        );

        Ok(ConsultationOutcome {
            consultation_id: record.id,
            session_id,
            result: record.ai_result,
            recommended_majors: record.recommended_majors,
            study_suggestions: record.study_suggestions,
            confidence_score: record.confidence_score,
            fallback: reply.is_fallback(),
            created_at: record.created_at,
        })
    }
}
