//! Interactive startup for the dashboard server.
//!
//! Shows the warehouse being served, asks where to listen and starts the
//! server once confirmed.

use crash_dashboard_warehouse::WarehouseConfig;
use dialoguer::{Confirm, Input};

use crate::{BindAddress, ServerError};

/// Prompts for the listen address, pre-filled from `defaults`, and starts
/// the server on the answer.
///
/// A prompt that cannot be shown keeps its default. Declining the final
/// confirmation returns without serving.
///
/// # Errors
///
/// Returns [`ServerError`] if the underlying server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run(config: WarehouseConfig, defaults: BindAddress) -> Result<(), ServerError> {
    println!("Crash Dashboard Server");
    println!("  warehouse: {}", config.db_path.display());
    println!("  table:     {}", config.table);
    println!();

    let host: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.host.clone())
        .interact_text()
        .unwrap_or_else(|_| defaults.host.clone());

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()
        .unwrap_or(defaults.port);

    let bind = BindAddress { host, port };

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    crate::run_server(config, bind).await
}
