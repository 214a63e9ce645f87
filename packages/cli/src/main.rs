#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the pacify map.
//!
//! `pacify inspect` summarises an aggregates payload, `pacify play` runs a
//! headless timeline session driven by stdin, and `pacify serve` starts
//! the HTTP API. Without a subcommand an interactive menu picks one.
//!
//! Uses `indicatif-log-bridge` (via [`pacify_cli_utils::init_logger`]) to
//! route `log` output through `indicatif::MultiProgress` so that log lines
//! and progress bars never fight for the terminal.

mod inspect;
mod play;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input, Select};
use pacify_aggregate::AggregateSource;
use pacify_cli_utils::MultiProgress;
use pacify_dashboard::{ConfigError, DashboardConfig};
use pacify_render::LayerMode;
use pacify_server::ServerConfig;

#[derive(Parser)]
#[command(name = "pacify", about = "Gun violence map timeline tools")]
struct Cli {
    /// Dashboard config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the windows, cell counts and totals of an aggregates payload
    Inspect {
        /// Payload file or URL
        #[arg(long)]
        aggregates: Option<String>,
    },
    /// Run a headless playback session controlled from stdin
    Play {
        /// Payload file or URL
        #[arg(long)]
        aggregates: Option<String>,
        /// Playback tick interval in milliseconds
        #[arg(long)]
        tick_ms: Option<u64>,
        /// Initial visualization (heatmap or circle)
        #[arg(long)]
        mode: Option<LayerMode>,
        /// Start playing as soon as the data is loaded
        #[arg(long)]
        autoplay: bool,
    },
    /// Start the HTTP server
    Serve {
        /// Payload file or URL
        #[arg(long)]
        aggregates: Option<String>,
        /// Directory with the built frontend
        #[arg(long)]
        static_dir: Option<PathBuf>,
        #[arg(long)]
        port: Option<u16>,
    },
}

/// Top-level tool selection for the interactive menu.
enum Tool {
    Inspect,
    Play,
    Serve,
}

impl Tool {
    const ALL: &[Self] = &[Self::Inspect, Self::Play, Self::Serve];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Inspect => "Inspect aggregates",
            Self::Play => "Play the timeline",
            Self::Serve => "Start server",
        }
    }
}

/// Config from file and environment, with command-line flags on top.
fn dashboard_config(
    path: Option<&Path>,
    aggregates: Option<String>,
    tick_ms: Option<u64>,
    mode: Option<LayerMode>,
    autoplay: bool,
) -> Result<DashboardConfig, ConfigError> {
    let mut config = DashboardConfig::load(path)?;
    if let Some(aggregates) = aggregates {
        config.aggregates = aggregates;
    }
    if let Some(tick_ms) = tick_ms {
        config.tick_ms = tick_ms;
    }
    if let Some(mode) = mode {
        config.default_mode = mode;
    }
    config.autoplay |= autoplay;
    config.validate()?;
    Ok(config)
}

async fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // The server uses actix-web's runtime, so we need to run it
    // in a blocking task to avoid nesting tokio runtimes.
    tokio::task::spawn_blocking(|| {
        actix_web::rt::System::new().block_on(pacify_server::run_server(config))
    })
    .await??;
    Ok(())
}

async fn interactive(
    multi: &MultiProgress,
    config: DashboardConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Pacify Map");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Inspect => {
            let aggregates: String = Input::new()
                .with_prompt("Aggregates file or URL")
                .default(config.aggregates.clone())
                .interact_text()?;
            inspect::run(multi, &AggregateSource::parse(&aggregates)).await?;
        }
        Tool::Play => {
            let aggregates: String = Input::new()
                .with_prompt("Aggregates file or URL")
                .default(config.aggregates.clone())
                .interact_text()?;
            let tick_ms: u64 = Input::new()
                .with_prompt("Tick interval (ms)")
                .default(config.tick_ms)
                .interact_text()?;
            let autoplay = Confirm::new()
                .with_prompt("Start playing immediately?")
                .default(config.autoplay)
                .interact()?;

            let config = DashboardConfig {
                aggregates,
                tick_ms,
                autoplay,
                ..config
            };
            config.validate()?;
            play::run(multi, config).await;
        }
        Tool::Serve => {
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(pacify_server::interactive::run())
            })
            .await??;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = pacify_cli_utils::init_logger();
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        None => interactive(&multi, DashboardConfig::load(config_path)?).await?,
        Some(Commands::Inspect { aggregates }) => {
            let config = dashboard_config(config_path, aggregates, None, None, false)?;
            inspect::run(&multi, &config.source()).await?;
        }
        Some(Commands::Play {
            aggregates,
            tick_ms,
            mode,
            autoplay,
        }) => {
            let config = dashboard_config(config_path, aggregates, tick_ms, mode, autoplay)?;
            play::run(&multi, config).await;
        }
        Some(Commands::Serve {
            aggregates,
            static_dir,
            port,
        }) => {
            let mut server = ServerConfig::from_env();
            if let Some(aggregates) = aggregates {
                server.aggregates = AggregateSource::parse(&aggregates);
            }
            if let Some(static_dir) = static_dir {
                server.static_dir = static_dir;
            }
            if let Some(port) = port {
                server.port = port;
            }
            serve(server).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let config = dashboard_config(
            None,
            Some("data/aggregates.json".to_string()),
            Some(500),
            Some(LayerMode::Circle),
            true,
        )
        .unwrap();

        assert_eq!(config.aggregates, "data/aggregates.json");
        assert_eq!(config.tick_ms, 500);
        assert_eq!(config.default_mode, LayerMode::Circle);
        assert!(config.autoplay);
    }

    #[test]
    fn zero_tick_flag_is_rejected() {
        let result = dashboard_config(None, None, Some(0), None, false);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn parses_play_flags() {
        let cli = Cli::parse_from(["pacify", "play", "--tick-ms", "1500", "--mode", "circle"]);
        let Some(Commands::Play { tick_ms, mode, .. }) = cli.command else {
            panic!("expected play");
        };
        assert_eq!(tick_ms, Some(1500));
        assert_eq!(mode, Some(LayerMode::Circle));
    }
}
