//! Infrastructure layer: record storage and runtime configuration.

pub mod config;
pub mod store;

pub use config::{Config, ConfigError};
pub use store::{InMemoryInventoryStore, InventoryStore, StoreError, StoreResult};
#[cfg(feature = "postgres")]
pub use store::PostgresInventoryStore;
