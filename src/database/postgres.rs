use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use super::store::{ListQuery, Projection, ResourceStore, StoreError};
use crate::config::DatabaseConfig;

/// Reads straight from Postgres with the service-role connection string.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build the pool lazily so startup does not block on the database.
    pub fn connect_lazy(url: &str, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy(url)?;

        info!("Created database pool (max_connections={})", config.max_connections);
        Ok(Self::new(pool))
    }

    /// Render the single SELECT for a listing. Rows come back as one jsonb
    /// object each so the payload is relayed without a typed model.
    pub fn build_sql(query: &ListQuery) -> Result<String, StoreError> {
        query.validate()?;

        let table = quote_identifier(&query.table);
        let order = format!(
            "s.{} {}",
            quote_identifier(&query.order.column),
            query.order.direction.as_sql()
        );

        let sql = match &query.projection {
            Projection::All => format!("SELECT to_jsonb(s) FROM {} s ORDER BY {}", table, order),
            Projection::Columns(columns) => {
                let columns = columns
                    .iter()
                    .map(|c| format!("s.{}", quote_identifier(c)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "SELECT to_jsonb(p) FROM {} s, LATERAL (SELECT {}) p ORDER BY {}",
                    table, columns, order
                )
            }
        };

        Ok(sql)
    }
}

#[async_trait]
impl ResourceStore for PgStore {
    async fn select(&self, query: &ListQuery) -> Result<Vec<Value>, StoreError> {
        let sql = Self::build_sql(query)?;
        let rows: Vec<Value> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
