#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone entry point for the crash dashboard server.
//!
//! Reads the warehouse settings and `BIND_ADDR`/`PORT` from the environment
//! and serves until interrupted.

use crash_dashboard_server::{BindAddress, ServerError, run_server};
use crash_dashboard_warehouse::WarehouseConfig;

#[actix_web::main]
async fn main() -> Result<(), ServerError> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = WarehouseConfig::from_env()?;
    run_server(config, BindAddress::from_env()).await
}
