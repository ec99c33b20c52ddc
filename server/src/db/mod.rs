// salesdesk/server/src/db/mod.rs

//! Postgres access: pool setup, the transactional order store, counters,
//! the typed filter queries used by list endpoints and the catalog write statements.

pub mod counters;
pub mod filters;
pub mod order_store;
pub mod statements;

pub use order_store::PgOrderStore;

use crate::config::AppConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

pub async fn connect(config: &AppConfig) -> Result<PgPool, sqlx::Error> {
  PgPoolOptions::new()
    .max_connections(config.database_max_connections)
    .acquire_timeout(Duration::from_secs(5))
    .connect(&config.database_url)
    .await
}
