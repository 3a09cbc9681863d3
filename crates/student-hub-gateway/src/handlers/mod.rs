//! Route handlers, one module per resource.

pub mod admin;
pub mod ai;
pub mod auth;
pub mod consultation;
pub mod user;

use chrono::{SecondsFormat, Utc};

pub async fn health() -> &'static str {
    "OK"
}

/// ISO-8601 timestamp with milliseconds, `Z` suffix.
pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
