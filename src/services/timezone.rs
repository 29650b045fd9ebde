use std::sync::Arc;

use anyhow::Result;
use chrono_tz::Tz;
use tokio::sync::RwLock;
use tracing::warn;

use crate::config::Config;
use crate::db::Store;

/// Resolves a user's IANA timezone: user setting, then the configured
/// instance default, then UTC. Unparseable names fall through with a
/// warning instead of failing the request.
pub struct TimezoneService {
    store: Store,
    config: Arc<RwLock<Config>>,
}

impl TimezoneService {
    #[must_use]
    pub const fn new(store: Store, config: Arc<RwLock<Config>>) -> Self {
        Self { store, config }
    }

    pub async fn get_user_timezone(&self, user_id: &str) -> Result<Tz> {
        if let Some(name) = self.store.get_user_timezone(user_id).await? {
            match name.parse::<Tz>() {
                Ok(tz) => return Ok(tz),
                Err(_) => {
                    warn!(user_id, timezone = %name, "Ignoring invalid user timezone");
                }
            }
        }

        let default_name = self.config.read().await.absence.default_timezone.clone();
        match default_name.parse::<Tz>() {
            Ok(tz) => Ok(tz),
            Err(_) => {
                warn!(timezone = %default_name, "Invalid default timezone, using UTC");
                Ok(Tz::UTC)
            }
        }
    }
}
