//! Student Hub core library.
//! Major-consultation pipeline, account credentials and the SQLite record store behind the gateway.

pub mod advisor;
pub mod ai_gateway;
pub mod auth;
pub mod config;
pub mod consultation;
pub mod dashboard;
pub mod error;
pub mod fallback;
pub mod majors;
pub mod parser;
pub mod prompt;
pub mod store;
pub mod survey;

pub use advisor::{advisor_from_config, Advisor, AdvisorReply, LiveAdvisor, LocalAdvisor, ReplySource};
pub use ai_gateway::{GeminiClient, GeminiSettings};
pub use config::{AdvisorMode, HubConfig};
pub use consultation::{ChatReply, ConsultationOutcome, ConsultationService};
pub use error::{GatewayError, HubError, HubResult, ValidationErrors};
pub use fallback::FallbackResponder;
pub use parser::{parse_consultation, ParsedConsultation, FIXED_CONFIDENCE};
pub use store::{ConsultationRecord, HubStore, NewConsultation, OwnedConsultation, Page, PageRequest, User};
pub use survey::{SurveyForm, SurveySubmission};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
