use std::sync::Arc;

use chrono::{DateTime, Utc};

use stocktrack_infra::{InMemoryInventoryStore, InventoryStore};

/// Shared handles for request handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn InventoryStore>,
    started_at: DateTime<Utc>,
}

impl AppServices {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self {
            store,
            started_at: Utc::now(),
        }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryInventoryStore::new()))
    }

    pub fn store(&self) -> &dyn InventoryStore {
        self.store.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

#[cfg(feature = "postgres")]
pub(crate) async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<AppServices> {
    use anyhow::Context;
    use stocktrack_infra::PostgresInventoryStore;

    let store = PostgresInventoryStore::connect(database_url, max_connections)
        .await
        .context("failed to open Postgres inventory store")?;
    tracing::info!(max_connections, "using Postgres inventory store");
    Ok(AppServices::new(Arc::new(store)))
}

#[cfg(not(feature = "postgres"))]
pub(crate) async fn connect(_database_url: &str, _max_connections: u32) -> anyhow::Result<AppServices> {
    tracing::warn!("DATABASE_URL set but postgres feature not enabled, falling back to in-memory");
    Ok(AppServices::in_memory())
}
