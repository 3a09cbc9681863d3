//! Hub configuration: defaults, then an optional TOML file, then `HUB__*` environment variables.
//!
//! | Key | Env | Default |
//! |-----|-----|---------|
//! | app_name | HUB__APP_NAME | Student Hub |
//! | bind_addr | HUB__BIND_ADDR | 127.0.0.1:8000 |
//! | database_path | HUB__DATABASE_PATH | ./data/student_hub.sqlite |
//! | environment | HUB__ENVIRONMENT | production (`local` exposes error details) |
//! | advisor_mode | HUB__ADVISOR_MODE | live (`local` never calls the model) |
//! | gemini_api_key | HUB__GEMINI_API_KEY or GEMINI_API_KEY | unset |
//! | gemini_model | HUB__GEMINI_MODEL | gemini-2.0-flash |
//! | gemini_base_url | HUB__GEMINI_BASE_URL | https://generativelanguage.googleapis.com |
//! | request_timeout_secs | HUB__REQUEST_TIMEOUT_SECS | 30 |
//! | history_per_page | HUB__HISTORY_PER_PAGE | 10 |
//! | token_ttl_hours | HUB__TOKEN_TTL_HOURS | 0 (never expire) |
//! | admin_email | HUB__ADMIN_EMAIL | unset (registering with this email grants admin) |

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the advisor answers: through the hosted model or from canned replies only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisorMode {
    #[default]
    Live,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    pub app_name: String,
    pub bind_addr: String,
    pub database_path: String,
    pub environment: String,
    #[serde(default)]
    pub advisor_mode: AdvisorMode,
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub request_timeout_secs: u64,
    pub history_per_page: u32,
    pub token_ttl_hours: u64,
    #[serde(default)]
    pub admin_email: Option<String>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            app_name: "Student Hub".to_string(),
            bind_addr: "127.0.0.1:8000".to_string(),
            database_path: "./data/student_hub.sqlite".to_string(),
            environment: "production".to_string(),
            advisor_mode: AdvisorMode::Live,
            gemini_api_key: None,
            gemini_model: "gemini-2.0-flash".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            request_timeout_secs: 30,
            history_per_page: 10,
            token_ttl_hours: 0,
            admin_email: None,
        }
    }
}

impl HubConfig {
    /// Load config. File path: env `HUB_CONFIG` > `config/hub.toml`; a missing file is skipped.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("HUB_CONFIG").unwrap_or_else(|_| "config/hub.toml".to_string());
        let defaults = Self::default();
        let builder = config::Config::builder()
            .set_default("app_name", defaults.app_name)?
            .set_default("bind_addr", defaults.bind_addr)?
            .set_default("database_path", defaults.database_path)?
            .set_default("environment", defaults.environment)?
            .set_default("advisor_mode", "live")?
            .set_default("gemini_model", defaults.gemini_model)?
            .set_default("gemini_base_url", defaults.gemini_base_url)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .set_default("history_per_page", i64::from(defaults.history_per_page))?
            .set_default("token_ttl_hours", defaults.token_ttl_hours)?;

        let path = Path::new(&config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let mut cfg: Self = builder
            .add_source(config::Environment::with_prefix("HUB").separator("__"))
            .build()?
            .try_deserialize()?;

        if cfg.gemini_api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            cfg.gemini_api_key = env_opt_string("GEMINI_API_KEY");
        }
        Ok(cfg)
    }

    /// True when internal error messages may be returned to clients.
    pub fn exposes_error_details(&self) -> bool {
        self.environment.trim().eq_ignore_ascii_case("local")
    }

    /// True when `email` is the configured bootstrap admin address.
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_email
            .as_deref()
            .map(str::trim)
            .is_some_and(|admin| !admin.is_empty() && admin.eq_ignore_ascii_case(email.trim()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// `None` when tokens never expire.
    pub fn token_ttl(&self) -> Option<chrono::Duration> {
        match self.token_ttl_hours {
            0 => None,
            h => i64::try_from(h).ok().and_then(chrono::Duration::try_hours),
        }
    }
}

fn env_opt_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
