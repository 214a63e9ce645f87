//! `pacify play`: a headless playback session driven by stdin.

use std::str::FromStr;

use pacify_aggregate::AggregateStore;
use pacify_cli_utils::{IndicatifProgress, MultiProgress};
use pacify_dashboard::driver::{self, TokioScheduler};
use pacify_dashboard::{Dashboard, DashboardConfig, Intent, Status};
use pacify_map::{HeadlessSurface, MapOptions};
use pacify_render::LayerMode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

pub const HELP: &str =
    "commands: play | pause | toggle | seek <n> | next | prev | mode [heatmap|circle] | quit";

/// Errors in a typed session command.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),
    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
    #[error("Invalid argument for {command}: {value}")]
    InvalidArgument {
        command: &'static str,
        value: String,
    },
}

/// Parses one input line. Blank lines yield `Ok(None)`.
///
/// # Errors
///
/// Returns [`CommandError`] for unknown commands and bad arguments.
pub fn parse_command(line: &str) -> Result<Option<Intent>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let argument = words.next();

    let intent = match command.to_ascii_lowercase().as_str() {
        "play" => Intent::Play,
        "pause" => Intent::Pause,
        "toggle" | "p" => Intent::TogglePlay,
        "next" | "n" => Intent::StepForward,
        "prev" | "b" => Intent::StepBack,
        "quit" | "exit" | "q" => Intent::Teardown,
        "seek" => {
            let value = argument.ok_or(CommandError::MissingArgument("seek"))?;
            let index = value.parse().map_err(|_| CommandError::InvalidArgument {
                command: "seek",
                value: value.to_string(),
            })?;
            Intent::Seek(index)
        }
        "mode" => match argument {
            None => Intent::ToggleMode,
            Some(value) => Intent::SetMode(LayerMode::from_str(value).map_err(|_| {
                CommandError::InvalidArgument {
                    command: "mode",
                    value: value.to_string(),
                }
            })?),
        },
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(intent))
}

async fn read_commands(tx: mpsc::Sender<Intent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        match parse_command(&line) {
            Ok(Some(intent)) => {
                if tx.send(intent).await.is_err() || intent == Intent::Teardown {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => eprintln!("{e}"),
        }
    }
}

/// One-line summary of the session, printed whenever it changes.
fn status_line(dashboard: &Dashboard<HeadlessSurface, TokioScheduler>) -> String {
    let controls = dashboard.controls();
    match dashboard.status() {
        Status::Ready => format!(
            "{} [{}/{}] {} {}",
            controls.legend,
            controls.slider.value,
            controls.slider.max,
            if controls.playing { "playing" } else { "paused" },
            LayerMode::from(controls.circle_mode),
        ),
        Status::Failed => format!("{} (type quit to exit)", controls.legend),
        Status::Loading | Status::TornDown => controls.legend.to_string(),
    }
}

/// Runs the session until `quit` or end of input.
pub async fn run(multi: &MultiProgress, config: DashboardConfig) {
    let source = config.source();
    let progress = IndicatifProgress::fetch_bar(multi, &format!("Loading {source}"));
    let mut dashboard = Dashboard::new(
        config,
        HeadlessSurface::loaded(MapOptions::default()),
        TokioScheduler::new(),
    );

    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(read_commands(tx));
    println!("{HELP}");

    let load = AggregateStore::load_with_progress(&source, progress);
    let mut last = String::new();
    driver::run(&mut dashboard, load, rx, |d| {
        if d.status() == Status::TornDown {
            return;
        }
        let line = status_line(d);
        if line != last {
            println!("{line}");
            last = line;
        }
    })
    .await;

    if let Some(error) = dashboard.error() {
        log::error!("Session ended after a load failure: {error}");
    }
}
