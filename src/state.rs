use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Storage;
use crate::geo::Geography;

/// Shared handler state; cloned per request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub storage: Arc<dyn Storage>,
    pub geography: Arc<Geography>,
}

impl AppState {
    pub fn new(config: AppConfig, storage: Arc<dyn Storage>, geography: Geography) -> Self {
        Self {
            config: Arc::new(config),
            storage,
            geography: Arc::new(geography),
        }
    }
}
