#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web server for the crash dashboard.
//!
//! Serves the server-rendered dashboard page at `/` and a JSON API under
//! `/api` with one endpoint per report section, the filter options, the
//! hourly CSV export and the result cache. Every request resolves its
//! filters, runs the needed reports on Actix's blocking pool and renders
//! failed reports as failed sections rather than HTTP errors.

mod handlers;
pub mod interactive;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use crash_dashboard_query::TableRef;
use crash_dashboard_warehouse::{
    CachedWarehouse, DuckDbWarehouse, QueryExecutor, Warehouse, WarehouseConfig, WarehouseError,
};
use crash_dashboard_warehouse_models::TabularResult;
use thiserror::Error;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The warehouse configuration was invalid.
    #[error(transparent)]
    Warehouse(#[from] WarehouseError),

    /// Binding or serving failed.
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// Cached query access to the warehouse.
    pub executor: Arc<dyn QueryExecutor>,
    /// Table every report reads from.
    pub table: TableRef,
}

impl AppState {
    /// Creates state over an arbitrary executor.
    #[must_use]
    pub fn new(executor: Arc<dyn QueryExecutor>, table: TableRef) -> Self {
        Self { executor, table }
    }

    /// Opens the configured warehouse read-only behind a result cache.
    ///
    /// A warehouse that cannot be opened does not stop the server: every
    /// query then fails and each report shows its inline error.
    #[must_use]
    pub fn from_config(config: &WarehouseConfig) -> Self {
        let executor: Arc<dyn QueryExecutor> =
            match DuckDbWarehouse::open(&config.db_path, config.pool_size, true) {
                Ok(warehouse) => Arc::new(CachedWarehouse::new(warehouse, config.cache_ttl)),
                Err(e) => {
                    log::error!(
                        "Failed to open warehouse {}: {e}",
                        config.db_path.display()
                    );
                    Arc::new(CachedWarehouse::new(
                        OfflineWarehouse {
                            message: e.to_string(),
                        },
                        config.cache_ttl,
                    ))
                }
            };

        Self::new(executor, config.table.clone())
    }
}

/// Stand-in for a warehouse that failed to open.
struct OfflineWarehouse {
    message: String,
}

impl Warehouse for OfflineWarehouse {
    fn query(&self, _sql: &str) -> Result<TabularResult, WarehouseError> {
        Err(WarehouseError::Unavailable {
            message: self.message.clone(),
        })
    }
}

/// Registers the page and API routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::dashboard_page))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(handlers::health))
                .route("/filters", web::get().to(handlers::filters))
                .route(
                    "/reports/top-intersections",
                    web::get().to(handlers::top_intersections_report),
                )
                .route("/reports/hourly", web::get().to(handlers::hourly_report))
                .route(
                    "/reports/hourly/export",
                    web::get().to(handlers::hourly_export),
                )
                .route("/reports/heatmap", web::get().to(handlers::heatmap_report))
                .route("/reports/monthly", web::get().to(handlers::monthly_report))
                .service(
                    web::resource("/cache")
                        .route(web::get().to(handlers::cache_stats))
                        .route(web::delete().to(handlers::clear_cache)),
                ),
        );
}

/// Default listen host.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Host and port the server listens on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindAddress {
    /// Host name or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Default for BindAddress {
    fn default() -> Self {
        Self {
            host: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl BindAddress {
    /// Reads `BIND_ADDR` and `PORT`, falling back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an arbitrary variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("BIND_ADDR")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let port = lookup("PORT").map_or(DEFAULT_PORT, |p| {
            p.trim().parse().unwrap_or_else(|_| {
                log::warn!("Ignoring invalid PORT={p:?}, using {DEFAULT_PORT}");
                DEFAULT_PORT
            })
        });
        Self { host, port }
    }
}

impl std::fmt::Display for BindAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Starts the crash dashboard server.
///
/// Opens the warehouse described by `config` and serves on `bind`. This is
/// a regular async function; the caller provides the Actix runtime and
/// initialises logging.
///
/// # Errors
///
/// Returns [`ServerError::Io`] if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: WarehouseConfig, bind: BindAddress) -> Result<(), ServerError> {
    let state = web::Data::new(AppState::from_config(&config));

    log::info!(
        "Starting server on {bind} (table {}, cache ttl {}s)",
        config.table,
        config.cache_ttl.as_secs()
    );

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind.host, bind.port))?
    .run()
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;

    #[test]
    fn missing_warehouse_file_fails_every_query_without_caching() {
        let config = WarehouseConfig {
            db_path: PathBuf::from("/nonexistent/dir/crashes.duckdb"),
            table: TableRef::new("processed_crash_data").unwrap(),
            cache_ttl: Duration::from_secs(60),
            pool_size: 1,
        };
        let state = AppState::from_config(&config);

        let outcome = state.executor.execute("SELECT 1");
        let message = outcome.into_result().unwrap_err();
        assert!(message.starts_with("Error executing query: Warehouse unavailable:"));
        assert_eq!(state.executor.cache_stats().unwrap().entries, 0);
    }

    #[test]
    fn bind_address_reads_host_and_port() {
        let bind = BindAddress::from_lookup(|key| match key {
            "BIND_ADDR" => Some("0.0.0.0".to_string()),
            "PORT" => Some("9000".to_string()),
            _ => None,
        });
        assert_eq!(bind.to_string(), "0.0.0.0:9000");
    }

    #[test]
    fn bind_address_falls_back_to_defaults() {
        assert_eq!(BindAddress::from_lookup(|_| None), BindAddress::default());

        let bind = BindAddress::from_lookup(|key| (key == "PORT").then(|| "http".to_string()));
        assert_eq!(bind.port, DEFAULT_PORT);
    }
}
