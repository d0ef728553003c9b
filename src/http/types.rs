use std::sync::Arc;

use tracing::{info, warn};

use crate::calc::{self, ReportCard};
use crate::config::{Config, StoreBackend};
use crate::db::{NewReport, MemoryStore, ReportStore, SqliteStore, StoredReport};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn ReportStore>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ReportStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    /// Latest stored report and its evaluation. Store calls run on the
    /// blocking pool since rusqlite is synchronous.
    pub async fn latest_report(&self) -> anyhow::Result<Option<(StoredReport, ReportCard)>> {
        let store = self.store.clone();
        let row = tokio::task::spawn_blocking(move || store.latest()).await??;
        Ok(row.map(|r| {
            let card = calc::evaluate(&r);
            (r, card)
        }))
    }

    pub async fn insert_report(&self, report: NewReport) -> anyhow::Result<i64> {
        let store = self.store.clone();
        let id = tokio::task::spawn_blocking(move || store.insert(&report)).await??;
        Ok(id)
    }
}

/// Builds the configured store. A SQLite file that cannot be opened is
/// logged here and surfaced again on each request; it never stops startup.
pub fn open_store(config: &Config) -> Arc<dyn ReportStore> {
    match &config.store {
        StoreBackend::Memory => {
            info!("using in-memory report store");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Sqlite(path) => {
            let store = SqliteStore::new(path.clone());
            match store.connect() {
                Ok(_) => info!(path = %path.display(), "report database ready"),
                Err(e) => warn!(path = %path.display(), error = %e, "report database unavailable"),
            }
            Arc::new(store)
        }
    }
}
