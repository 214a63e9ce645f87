//! Interactive mode for the server.
//!
//! Prompts the user for bind address, port and payload location before
//! starting the server.

use std::path::PathBuf;

use dialoguer::{Confirm, Input};
use pacify_aggregate::AggregateSource;

use crate::{ServerConfig, ServerError};

/// Runs the server in interactive mode, prompting for configuration.
///
/// Values from the environment (see [`ServerConfig::from_env`]) are
/// offered as defaults.
///
/// # Errors
///
/// Returns [`ServerError`] if the underlying server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run() -> Result<(), ServerError> {
    println!("Pacify Map Server");
    println!();

    let defaults = ServerConfig::from_env();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.bind_addr.clone())
        .interact_text()
        .unwrap_or_else(|_| defaults.bind_addr.clone());

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()
        .unwrap_or(defaults.port);

    let aggregates: String = Input::new()
        .with_prompt("Aggregates file or URL")
        .default(defaults.aggregates.to_string())
        .interact_text()
        .unwrap_or_else(|_| defaults.aggregates.to_string());

    let static_dir: String = Input::new()
        .with_prompt("Static directory")
        .default(defaults.static_dir.display().to_string())
        .interact_text()
        .unwrap_or_else(|_| defaults.static_dir.display().to_string());

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    crate::run_server(ServerConfig {
        bind_addr,
        port,
        aggregates: AggregateSource::parse(&aggregates),
        static_dir: PathBuf::from(static_dir),
    })
    .await
}
