use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;

/// Per-user app gating. An app is usable by a user when it is enabled
/// instance-wide and the user has not disabled it.
pub struct AppGate {
    store: Store,
    config: Arc<RwLock<Config>>,
}

impl AppGate {
    #[must_use]
    pub const fn new(store: Store, config: Arc<RwLock<Config>>) -> Self {
        Self { store, config }
    }

    pub async fn is_enabled_for_user(&self, app_id: &str, user_id: &str) -> Result<bool> {
        if !self.config.read().await.app_enabled(app_id) {
            return Ok(false);
        }

        let disabled = self.store.get_disabled_apps(user_id).await?;
        Ok(!disabled.iter().any(|a| a == app_id))
    }
}
