use std::{sync::Arc, time::Instant};

use tracing::warn;

use crate::{
    auth::JwtKeys,
    config::AppConfig,
    store::{MemoryStore, PgStore, Store},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
    pub store: Arc<dyn Store>,
    pub started_at: Instant,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let store = if config.uses_memory_store() {
            warn!("using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::default()) as Arc<dyn Store>
        } else {
            Arc::new(PgStore::connect(&config).await?) as Arc<dyn Store>
        };
        Ok(Self::from_parts(Arc::new(config), store))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn Store>) -> Self {
        let keys = JwtKeys::new(&config.jwt);
        Self {
            config,
            keys,
            store,
            started_at: Instant::now(),
        }
    }

    /// Memory-backed state with test configuration.
    pub fn fake() -> Self {
        Self::from_parts(
            Arc::new(AppConfig::fake()),
            Arc::new(MemoryStore::default()),
        )
    }
}
