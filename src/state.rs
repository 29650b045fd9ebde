use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use crate::config::Config;
use crate::db::Store;
use crate::domain::events::NotificationEvent;
use crate::services::{
    AbsenceService, AppGate, Clock, ContactsSearchProvider, EventsSearchProvider,
    SeaOrmAbsenceService, SearchProvider, SystemClock, TasksSearchProvider, TimezoneService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub clock: Arc<dyn Clock>,

    pub timezones: Arc<TimezoneService>,

    pub app_gate: Arc<AppGate>,

    pub providers: Vec<Arc<dyn SearchProvider>>,

    pub absence_service: Arc<dyn AbsenceService>,

    pub event_bus: broadcast::Sender<NotificationEvent>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size);
        Self::with_parts(config, event_bus, Arc::new(SystemClock)).await
    }

    /// Wiring hook for tests: inject the event bus and the clock.
    pub async fn with_parts(
        config: Config,
        event_bus: broadcast::Sender<NotificationEvent>,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let config_arc = Arc::new(RwLock::new(config));

        let timezones = Arc::new(TimezoneService::new(store.clone(), config_arc.clone()));
        let app_gate = Arc::new(AppGate::new(store.clone(), config_arc.clone()));

        let providers: Vec<Arc<dyn SearchProvider>> = vec![
            Arc::new(ContactsSearchProvider::new(
                store.clone(),
                app_gate.clone(),
                config_arc.clone(),
            )),
            Arc::new(EventsSearchProvider::new(
                store.clone(),
                app_gate.clone(),
                config_arc.clone(),
            )),
            Arc::new(TasksSearchProvider::new(
                store.clone(),
                app_gate.clone(),
                config_arc.clone(),
            )),
        ];

        let absence_service = Arc::new(SeaOrmAbsenceService::new(
            store.clone(),
            timezones.clone(),
            clock.clone(),
            event_bus.clone(),
        )) as Arc<dyn AbsenceService>;

        Ok(Self {
            config: config_arc,
            store,
            clock,
            timezones,
            app_gate,
            providers,
            absence_service,
            event_bus,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }

    /// Look up a search provider by its route id.
    #[must_use]
    pub fn provider(&self, id: &str) -> Option<&Arc<dyn SearchProvider>> {
        self.providers.iter().find(|p| p.id() == id)
    }
}
