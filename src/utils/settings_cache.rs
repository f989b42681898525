use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, info};

use crate::model::settings::Settings;
use crate::store::{Batch, Mutation, Store, StoreResult};

/// Read-through cache over the settings singleton.
#[derive(Clone)]
pub struct SettingsCache {
    cache: Cache<(), Settings>,
}

impl SettingsCache {
    pub fn new(ttl: Duration) -> Self {
        SettingsCache {
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    /// Cached settings, or the stored ones, or the defaults when nothing is stored.
    pub async fn get(&self, store: &Arc<dyn Store>) -> StoreResult<Settings> {
        if let Some(settings) = self.cache.get(&()).await {
            return Ok(settings);
        }

        let settings = match store.load_settings().await? {
            Some(settings) => settings,
            None => {
                debug!("No stored settings, using defaults");
                Settings::default()
            }
        };
        self.cache.insert((), settings.clone()).await;
        Ok(settings)
    }

    /// Writes through the store, then refreshes the cached copy.
    pub async fn save(&self, store: &Arc<dyn Store>, settings: Settings) -> StoreResult<Settings> {
        store
            .apply(Batch::single(Mutation::PutSettings(settings.clone())))
            .await?;
        self.cache.insert((), settings.clone()).await;
        info!(
            threshold = %settings.on_time_threshold,
            permission_limit = settings.permission_limit,
            "Settings saved"
        );
        Ok(settings)
    }
}
