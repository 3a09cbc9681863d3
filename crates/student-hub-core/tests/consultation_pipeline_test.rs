//! Consultation pipeline: survey in, parsed and persisted consultation out.
//!
//! Run with: `cargo test --test consultation_pipeline_test`

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use student_hub_core::{
    Advisor, AdvisorReply, ConsultationService, FallbackResponder, HubStore, LocalAdvisor,
    PageRequest, ReplySource, SurveyForm, SurveySubmission, FIXED_CONFIDENCE,
};

const LIVE_REPLY: &str = "Dựa trên hồ sơ, ngành Công nghệ thông tin và IT phù hợp nhất. \
Bạn nên học thêm Python. Bạn cần tập trung vào toán rời rạc. Thiết kế đồ họa cũng là lựa chọn.";

/// Records the prompts it receives and answers with a fixed live reply.
struct ScriptedAdvisor {
    reply: &'static str,
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl Advisor for ScriptedAdvisor {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn advise(&self, _user_id: i64, message: &str) -> AdvisorReply {
        self.prompts.lock().unwrap().push(message.to_string());
        AdvisorReply {
            text: self.reply.to_string(),
            source: ReplySource::Live,
        }
    }
}

fn survey() -> SurveySubmission {
    let form: SurveyForm = serde_json::from_value(json!({
        "interests": ["Lập trình", "Game", "Âm nhạc"],
        "skills": ["Tư duy logic"],
        "favoriteSubjects": ["Toán"],
        "scores": {"math": 9, "physics": 7, "chemistry": 6, "english": 8, "literature": 5},
        "careerGoal": "Trở thành kỹ sư phần mềm",
        "technologyLevel": 5
    }))
    .unwrap();
    form.validate().unwrap()
}

fn setup(advisor: Arc<dyn Advisor>) -> (tempfile::TempDir, ConsultationService, i64) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = HubStore::new(dir.path().join("pipeline.sqlite")).expect("open store");
    let user = store
        .create_user("Nguyễn Văn An", "an@student.com", "hash", false)
        .expect("create user");
    (dir, ConsultationService::new(advisor, store), user.id)
}

#[tokio::test]
async fn live_reply_is_parsed_and_persisted() {
    let advisor = Arc::new(ScriptedAdvisor {
        reply: LIVE_REPLY,
        prompts: Mutex::new(Vec::new()),
    });
    let (_dir, service, user_id) = setup(advisor.clone());

    let outcome = service.consult(user_id, &survey()).await.expect("consult");
    assert!(!outcome.fallback);
    assert_eq!(outcome.result, LIVE_REPLY);
    assert_eq!(
        outcome.recommended_majors,
        vec!["Công nghệ thông tin", "IT", "Thiết kế đồ họa"]
    );
    assert_eq!(
        outcome.study_suggestions,
        vec!["nên học thêm Python.", "cần tập trung vào toán rời rạc."]
    );
    assert_eq!(outcome.confidence_score, FIXED_CONFIDENCE);
    assert!(uuid::Uuid::parse_str(&outcome.session_id).is_ok());

    let prompts = advisor.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Toán: 9, Lý: 7, Hóa: 6, Anh: 8, Văn: 5"));
    assert!(prompts[0].contains("Công nghệ: 5/5, Sáng tạo: ?/5"));

    let stored = service
        .store()
        .get_consultation_for_user(user_id, outcome.consultation_id)
        .expect("stored record");
    assert_eq!(stored.recommended_majors, outcome.recommended_majors);
    assert_eq!(stored.session_id, outcome.session_id);
    assert_eq!(stored.input_data["favoriteSubjects"], json!(["Toán"]));
    assert_eq!(stored.input_data["scores"]["math"], json!(9.0));
    assert_eq!(stored.input_data["technologyLevel"], json!(5));
}

#[tokio::test]
async fn fallback_reply_is_stored_without_parsing() {
    let advisor = Arc::new(LocalAdvisor::new(Arc::new(FallbackResponder::seeded(11))));
    let (_dir, service, user_id) = setup(advisor);

    let outcome = service.consult(user_id, &survey()).await.expect("consult");
    assert!(outcome.fallback);
    assert!(!outcome.result.is_empty());
    assert!(outcome.recommended_majors.is_empty());
    assert!(outcome.study_suggestions.is_empty());
    assert_eq!(outcome.confidence_score, FIXED_CONFIDENCE);

    let history = service
        .store()
        .list_consultations_for_user(user_id, PageRequest::new(None, None, 10))
        .expect("history");
    assert_eq!(history.total, 1);
    assert_eq!(history.data[0].ai_result, outcome.result);
}

#[tokio::test]
async fn every_consultation_gets_its_own_session() {
    let advisor = Arc::new(ScriptedAdvisor {
        reply: LIVE_REPLY,
        prompts: Mutex::new(Vec::new()),
    });
    let (_dir, service, user_id) = setup(advisor);

    let first = service.consult(user_id, &survey()).await.expect("first");
    let second = service.consult(user_id, &survey()).await.expect("second");
    assert_ne!(first.session_id, second.session_id);
    assert_ne!(first.consultation_id, second.consultation_id);

    let history = service
        .store()
        .list_consultations_for_user(user_id, PageRequest::new(None, None, 10))
        .expect("history");
    assert_eq!(history.data[0].id, second.consultation_id);
}

#[tokio::test]
async fn chat_reports_the_advisor_name() {
    let advisor = Arc::new(LocalAdvisor::new(Arc::new(FallbackResponder::seeded(5))));
    let (_dir, service, user_id) = setup(advisor);

    let chat = service.chat(user_id, "Xin chào").await;
    assert!(chat.reply.is_fallback());
    assert!(chat.reply.text.contains("Xin chào bạn!"));
    assert_eq!(chat.powered_by, service.advisor_name());
}
