//! Single-task event loop for a dashboard session.
//!
//! Multiplexes the one-time payload load, the playback deadline and user
//! intents with `tokio::select!`. Branches are polled in that order so a
//! due tick is always applied before an intent that arrived at the same
//! time.

use std::future::Future;

use pacify_aggregate::{AggregateStore, LoadError};
use pacify_map::MapSurface;
use pacify_timeline::{TickScheduler, TickToken};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

use crate::session::Dashboard;
use crate::{Intent, Status};

/// Holds the single outstanding tick as a tokio deadline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler {
    next: Option<(Instant, TickToken)>,
}

impl TokioScheduler {
    #[must_use]
    pub const fn new() -> Self {
        Self { next: None }
    }

    /// When the outstanding tick is due, and its token.
    #[must_use]
    pub const fn deadline(&self) -> Option<(Instant, TickToken)> {
        self.next
    }
}

impl TickScheduler for TokioScheduler {
    fn schedule(&mut self, token: TickToken, delay: Duration) {
        self.next = Some((Instant::now() + delay, token));
    }

    fn cancel(&mut self, token: TickToken) {
        if self.next.is_some_and(|(_, t)| t == token) {
            self.next = None;
        }
    }
}

async fn next_tick(deadline: Option<(Instant, TickToken)>) -> TickToken {
    match deadline {
        Some((at, token)) => {
            tokio::time::sleep_until(at).await;
            token
        }
        None => std::future::pending().await,
    }
}

/// Runs `dashboard` until it is torn down.
///
/// `load` is polled alongside playback and input; its result is applied
/// through the dashboard's load guard. The loop tears the session down
/// when an [`Intent::Teardown`] arrives or when every intent sender has
/// been dropped. `on_update` is called after every applied event.
pub async fn run<S, F>(
    dashboard: &mut Dashboard<S, TokioScheduler>,
    load: F,
    mut intents: mpsc::Receiver<Intent>,
    mut on_update: impl FnMut(&Dashboard<S, TokioScheduler>),
) where
    S: MapSurface,
    F: Future<Output = Result<AggregateStore, LoadError>>,
{
    let ticket = dashboard.begin_load();
    let mut load = std::pin::pin!(load);
    let mut loading = true;

    while dashboard.status() != Status::TornDown {
        let deadline = dashboard.scheduler().and_then(TokioScheduler::deadline);

        tokio::select! {
            biased;

            token = next_tick(deadline) => {
                if dashboard.fire_tick(token) {
                    on_update(dashboard);
                }
            }
            result = load.as_mut(), if loading => {
                loading = false;
                match dashboard.complete_load(ticket, result) {
                    Ok(true) | Err(_) => on_update(dashboard),
                    Ok(false) => {}
                }
            }
            intent = intents.recv() => {
                let intent = intent.unwrap_or_else(|| {
                    log::debug!("Intent channel closed");
                    Intent::Teardown
                });
                if dashboard.dispatch(intent) {
                    on_update(dashboard);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pacify_aggregate::{Window, WindowIndex};
    use pacify_map::{HeadlessSurface, MapOptions};
    use pacify_render::HEATMAP_SOURCE;
    use pacify_timeline::TimelineController;

    use super::*;
    use crate::DashboardConfig;

    const PAYLOAD: &str = r#"{
        "meta": { "windows": [ { "start": 1995, "end": 1999 }, { "start": 2000, "end": 2004 } ] },
        "features": [
            { "w": [1995, 1999], "lat": 40.0, "lon": -74.0, "n": 3 },
            { "w": [2000, 2004], "lat": 34.0, "lon": -118.0, "n": 7 }
        ]
    }"#;

    fn dashboard() -> Dashboard<HeadlessSurface, TokioScheduler> {
        Dashboard::new(
            DashboardConfig {
                tick_ms: 1500,
                ..DashboardConfig::default()
            },
            HeadlessSurface::loaded(MapOptions::default()),
            TokioScheduler::new(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn plays_wraps_and_stops_on_pause() {
        let mut dashboard = dashboard();
        let (tx, rx) = mpsc::channel(8);
        let mut indices = Vec::new();

        let script = async move {
            tx.send(Intent::Play).await.unwrap();
            tokio::time::sleep(Duration::from_millis(4600)).await;
            tx.send(Intent::Pause).await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        };

        let load = async { AggregateStore::from_slice(PAYLOAD.as_bytes()) };
        tokio::join!(
            run(&mut dashboard, load, rx, |d| indices.push(d.current_index())),
            script
        );

        assert_eq!(dashboard.status(), Status::TornDown);
        assert_eq!(dashboard.current_index(), Some(1));
        assert!(!dashboard.timeline().unwrap().is_playing());
        // initial render plus three ticks
        let surface = dashboard.surface().unwrap();
        assert_eq!(surface.write_count(HEATMAP_SOURCE), 4);
        assert!(indices.contains(&Some(0)));
    }

    #[tokio::test(start_paused = true)]
    async fn load_failure_shows_error_legend() {
        let mut dashboard = dashboard();
        let (tx, rx) = mpsc::channel(1);
        let mut legends = Vec::new();

        let load = async { Err(LoadError::EmptyDataset) };
        drop(tx);
        run(&mut dashboard, load, rx, |d| legends.push(d.legend().to_string())).await;

        assert_eq!(dashboard.status(), Status::TornDown);
        assert_eq!(legends.first().map(String::as_str), Some("Error loading data…"));
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_before_load_drops_completion() {
        let mut dashboard = dashboard();
        let (tx, rx) = mpsc::channel(1);
        tx.send(Intent::Teardown).await.unwrap();

        let load = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            AggregateStore::from_slice(PAYLOAD.as_bytes())
        };
        run(&mut dashboard, load, rx, |_| {}).await;

        assert_eq!(dashboard.status(), Status::TornDown);
        assert!(dashboard.store().is_none());
    }

    #[test]
    fn scheduler_tracks_the_outstanding_tick() {
        let index = WindowIndex::new(vec![Window::new(1995, 1999), Window::new(2000, 2004)]);
        let mut timeline =
            TimelineController::new(index, TokioScheduler::new(), Duration::from_millis(1500));
        assert!(timeline.scheduler().deadline().is_none());

        timeline.play();
        let (_, token) = timeline.scheduler().deadline().unwrap();
        assert_eq!(timeline.pending_tick(), Some(token));

        timeline.pause();
        assert!(timeline.scheduler().deadline().is_none());
    }
}
