// salesdesk/server/src/main.rs

mod config;
mod db;
mod errors;
mod models;
mod reports;
mod state;
mod web;

use crate::config::{AppConfig, LogFormat};
use crate::db::PgOrderStore;
use crate::state::AppState;

use actix_web::{web as actix_data, App, HttpServer};
use salesdesk::OrderPlacementService;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing
use tracing_subscriber::EnvFilter;

fn init_tracing(log_format: LogFormat) {
  // RUST_LOG overrides the default level.
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration
  match log_format {
    LogFormat::Text => builder.init(),
    LogFormat::Json => builder.json().init(),
  }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // The log format is itself configuration, so load first and report failures once tracing is up.
  let loaded_config = AppConfig::from_env();
  init_tracing(loaded_config.as_ref().map(|c| c.log_format).unwrap_or(LogFormat::Text));

  tracing::info!("Starting salesdesk server...");

  let app_config = match loaded_config {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::other(e.to_string()));
    }
  };

  let db_pool = match db::connect(&app_config).await {
    Ok(pool) => {
      tracing::info!(
        max_connections = app_config.database_max_connections,
        "Successfully connected to the database."
      );
      pool
    }
    Err(e) => {
      tracing::error!(error = %e, "Failed to connect to the database.");
      return Err(std::io::Error::other(e));
    }
  };

  let order_store = Arc::new(PgOrderStore::new(db_pool.clone()));
  let orders = Arc::new(OrderPlacementService::new(order_store).with_stock_policy(app_config.stock_policy));
  tracing::info!(stock_policy = ?orders.stock_policy(), "Order placement service ready.");

  let app_state = AppState {
    db_pool,
    orders,
    config: app_config.clone(),
  };

  let server_address = app_config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
