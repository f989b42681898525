use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::AppResult;
use crate::model::settings::Settings;
use crate::store::Store;
use crate::utils::settings_cache::SettingsCache;

/// Shared with every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub settings: SettingsCache,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        AppState {
            settings: SettingsCache::new(Duration::from_secs(config.settings_cache_ttl_secs)),
            store,
            config,
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub async fn settings(&self) -> AppResult<Settings> {
        Ok(self.settings.get(&self.store).await?)
    }

    /// Working days from the request, or the configured default.
    pub fn working_days(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or(self.config.default_working_days)
    }
}
