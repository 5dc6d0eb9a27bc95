pub mod postgres;
pub mod rest;
pub mod store;

use std::sync::Arc;

pub use postgres::PgStore;
pub use rest::RestStore;
pub use store::{Direction, ListQuery, OrderBy, Projection, ResourceStore, StoreError};

use crate::config::{AppConfig, StoreBackend};

/// Build the service-role store for the configured backend.
pub fn service_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ResourceStore>> {
    let store: Arc<dyn ResourceStore> = match config.store_backend()? {
        StoreBackend::Postgres { url } => {
            tracing::info!("Using direct Postgres store");
            Arc::new(PgStore::connect_lazy(&url, &config.database)?)
        }
        StoreBackend::Rest { url, service_role_key } => {
            tracing::info!("Using Supabase REST store at {}", url);
            Arc::new(RestStore::new(&url, service_role_key)?)
        }
    };
    Ok(store)
}
