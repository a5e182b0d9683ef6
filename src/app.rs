//! App Core for X Eyes.
//!
//! The long-lived background process: owns the settings, the redirect
//! guard and interceptor, and runs the stats owner as a task.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use crate::host::{KeyValueStorage, TabNavigator};
use crate::managers::redirect_guard::{Generation, RedirectGuard};
use crate::managers::stats_store::StatsStore;
use crate::messaging::{StatsClient, DEFAULT_QUEUE_DEPTH};
use crate::services::navigation_interceptor::{
    Decision, NavigationInterceptor, NavigationInterceptorTrait,
};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::errors::SettingsError;
use crate::types::navigation::NavigationEvent;

/// Central background struct. Must be created inside a tokio runtime.
pub struct App<N: TabNavigator> {
    pub settings_engine: SettingsEngine,
    pub interceptor: NavigationInterceptor<RedirectGuard, N>,
    stats_client: StatsClient,
    stats_service: JoinHandle<()>,
}

impl<N: TabNavigator> App<N> {
    /// Wires the components from already-loaded settings.
    pub fn new<S: KeyValueStorage>(
        settings_engine: SettingsEngine,
        storage: S,
        navigator: Arc<N>,
    ) -> Self {
        let settings = settings_engine.get_settings().clone();

        let guard = RedirectGuard::new(Duration::from_millis(settings.redirect.safety_net_ms));
        let interceptor = NavigationInterceptor::new(guard, navigator, settings.redirect);

        let store = StatsStore::new(storage, settings.storage.stats_key);
        let (stats_client, stats_service) = store.spawn(DEFAULT_QUEUE_DEPTH);

        Self {
            settings_engine,
            interceptor,
            stats_client,
            stats_service,
        }
    }

    /// Loads settings from the platform config dir and opens the SQLite
    /// store in the platform data dir.
    #[cfg(feature = "sqlite")]
    pub fn open(navigator: Arc<N>) -> Result<Self, crate::types::errors::AppError> {
        use crate::database::{Database, SqliteStorage};
        use crate::types::errors::AppError;

        let mut settings_engine = SettingsEngine::new(None);
        settings_engine.load()?;

        let data_dir = crate::platform::get_data_dir();
        std::fs::create_dir_all(&data_dir).map_err(|e| AppError::Database(e.to_string()))?;
        let db_path = data_dir.join(&settings_engine.get_settings().storage.database_file);
        let db = Database::open(&db_path).map_err(|e| AppError::Database(e.to_string()))?;
        info!(path = %db_path.display(), "stats database opened");

        Ok(Self::new(settings_engine, SqliteStorage::new(Arc::new(db)), navigator))
    }

    /// Synchronous verdict for one navigation event.
    pub fn on_before_navigate(&self, event: &NavigationEvent) -> Decision {
        self.interceptor.on_before_navigate(event)
    }

    /// Returns whether a tracked redirect was ended.
    pub fn on_redirect_settled(&self, tab_id: i64, redirect: Option<Generation>) -> bool {
        self.interceptor.on_redirect_settled(tab_id, redirect)
    }

    /// A requester handle for a new foreground view.
    pub fn stats_client(&self) -> StatsClient {
        self.stats_client.clone()
    }

    /// Changes one setting, persists it, and applies redirect changes
    /// immediately. `redirect.safety_net_ms` and the storage settings take
    /// effect on the next start.
    pub fn set_setting(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        self.settings_engine.set_value(key, value)?;
        let redirect = self.settings_engine.get_settings().redirect.clone();
        self.interceptor.update_settings(redirect);
        Ok(())
    }

    /// Stops the stats service. Requests already queued are dropped
    /// unanswered, which requesters see as a closed service.
    pub fn shutdown(self) {
        self.stats_service.abort();
        info!("background stopped");
    }
}
