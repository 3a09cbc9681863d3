//! Shared handler state.

use std::path::PathBuf;
use std::sync::Arc;

use student_hub_core::{
    advisor_from_config, Advisor, ConsultationService, FallbackResponder, HubConfig, HubResult,
    HubStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<HubConfig>,
    pub store: HubStore,
    pub consultations: ConsultationService,
}

impl AppState {
    pub fn new(config: HubConfig, store: HubStore, advisor: Arc<dyn Advisor>) -> Self {
        Self {
            config: Arc::new(config),
            consultations: ConsultationService::new(advisor, store.clone()),
            store,
        }
    }

    /// Opens the configured database and picks the advisor for `advisor_mode`.
    pub fn from_config(config: HubConfig) -> HubResult<Self> {
        let store = HubStore::new(PathBuf::from(&config.database_path))?;
        let advisor = advisor_from_config(&config, Arc::new(FallbackResponder::from_entropy()));
        Ok(Self::new(config, store, advisor))
    }
}
