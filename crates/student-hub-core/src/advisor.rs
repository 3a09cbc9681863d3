//! Advisor capability: answers a message, always. Two implementations, picked by
//! [`AdvisorMode`]: the live one asks Gemini and falls back on any gateway error, the
//! local one only uses canned replies.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::ai_gateway::{GeminiClient, GeminiSettings};
use crate::config::{AdvisorMode, HubConfig};
use crate::fallback::FallbackResponder;

/// Where a reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    Live,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorReply {
    pub text: String,
    pub source: ReplySource,
}

impl AdvisorReply {
    pub fn is_fallback(&self) -> bool {
        self.source == ReplySource::Fallback
    }
}

#[async_trait]
pub trait Advisor: Send + Sync {
    /// Short label for logs and the `powered_by` field.
    fn name(&self) -> &'static str;

    /// Never fails: unavailable models degrade to a fallback reply.
    async fn advise(&self, user_id: i64, message: &str) -> AdvisorReply;
}

pub struct LiveAdvisor {
    gemini: GeminiClient,
    fallback: Arc<FallbackResponder>,
}

impl LiveAdvisor {
    pub fn new(gemini: GeminiClient, fallback: Arc<FallbackResponder>) -> Self {
        Self { gemini, fallback }
    }
}

#[async_trait]
impl Advisor for LiveAdvisor {
    fn name(&self) -> &'static str {
        "Google Gemini AI"
    }

    async fn advise(&self, user_id: i64, message: &str) -> AdvisorReply {
        match self.gemini.generate(message, Some(user_id)).await {
            Ok(text) => AdvisorReply {
                text,
                source: ReplySource::Live,
            },
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Gemini unavailable, answering from fallback");
                AdvisorReply {
                    text: self.fallback.respond(message),
                    source: ReplySource::Fallback,
                }
            }
        }
    }
}

pub struct LocalAdvisor {
    fallback: Arc<FallbackResponder>,
}

impl LocalAdvisor {
    pub fn new(fallback: Arc<FallbackResponder>) -> Self {
        Self { fallback }
    }
}

#[async_trait]
impl Advisor for LocalAdvisor {
    fn name(&self) -> &'static str {
        "Student Hub local advisor"
    }

    async fn advise(&self, _user_id: i64, message: &str) -> AdvisorReply {
        AdvisorReply {
            text: self.fallback.respond(message),
            source: ReplySource::Fallback,
        }
    }
}

/// Advisor for the configured mode.
pub fn advisor_from_config(cfg: &HubConfig, fallback: Arc<FallbackResponder>) -> Arc<dyn Advisor> {
    match cfg.advisor_mode {
        AdvisorMode::Live => {
            let gemini = GeminiClient::new(GeminiSettings::from_config(cfg));
            Arc::new(LiveAdvisor::new(gemini, fallback))
        }
        AdvisorMode::Local => Arc::new(LocalAdvisor::new(fallback)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn local_advisor_answers_from_fallback() {
        let cfg = HubConfig {
            advisor_mode: AdvisorMode::Local,
            ..HubConfig::default()
        };
        let advisor = advisor_from_config(&cfg, Arc::new(FallbackResponder::seeded(3)));
        let reply = advisor.advise(1, "hello").await;
        assert!(reply.is_fallback());
        assert!(reply.text.contains("Hello there"));
    }

    #[tokio::test]
    async fn live_advisor_without_key_degrades_to_fallback() {
        let gemini = GeminiClient::new(GeminiSettings {
            api_key: None,
            model: "m".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(1),
        });
        let advisor = LiveAdvisor::new(gemini, Arc::new(FallbackResponder::seeded(3)));
        let reply = advisor.advise(1, "quy chế thi").await;
        assert_eq!(reply.source, ReplySource::Fallback);
        assert!(reply.text.contains("Quy chế thi cử"));
    }

    #[tokio::test]
    async fn live_advisor_on_unreachable_host_degrades_to_fallback() {
        let gemini = GeminiClient::new(GeminiSettings {
            api_key: Some("k".to_string()),
            model: "m".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(1),
        });
        let advisor = LiveAdvisor::new(gemini, Arc::new(FallbackResponder::seeded(3)));
        let reply = advisor.advise(1, "anything").await;
        assert!(reply.is_fallback());
        assert!(!reply.text.is_empty());
    }
}
