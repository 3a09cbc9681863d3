//! Student Hub Gateway: accounts, dashboard and AI major consultation over JSON.
//! Default bind 127.0.0.1:8000; see `HubConfig` for the HUB__* overrides.

mod error;
mod handlers;
mod middleware;
mod routes;
mod state;

use student_hub_core::HubConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = HubConfig::load()?;
    if config.gemini_api_key.is_none() {
        tracing::warn!("Gemini API key not configured; answers will come from the fallback responder");
    }
    let bind_addr = config.bind_addr.clone();
    tracing::info!(
        app = %config.app_name,
        version = student_hub_core::version(),
        advisor_mode = ?config.advisor_mode,
        database = %config.database_path,
        "starting gateway"
    );

    let state = AppState::from_config(config)?;
    let app = routes::build_app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
