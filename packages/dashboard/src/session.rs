//! The dashboard session.

use std::sync::Arc;

use pacify_aggregate::{AggregateSource, AggregateStore, LoadError};
use pacify_map::MapSurface;
use pacify_render::{RenderBinder, RenderError};
use pacify_timeline::{TickScheduler, TickToken, TimelineController};

use crate::config::DashboardConfig;
use crate::controls::{ControlsView, LegendView, SliderView};
use crate::{DashboardError, Intent, Status};

/// Identifies one load attempt.
///
/// Only the completion carrying the latest ticket is applied; completions
/// that arrive after teardown or after a newer `begin_load` are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

#[derive(Debug)]
struct Session<S: MapSurface, T: TickScheduler> {
    timeline: TimelineController<T>,
    binder: RenderBinder<S>,
}

impl<S: MapSurface, T: TickScheduler> Session<S, T> {
    fn start(config: &DashboardConfig, store: AggregateStore, surface: S, scheduler: T) -> Self {
        let store = Arc::new(store);
        log::info!(
            "Dataset ready: {} windows, {} features",
            store.window_index().size(),
            store.feature_count()
        );

        let mut binder = RenderBinder::new(surface, Arc::clone(&store), config.default_mode);
        if let Err(e) = binder.bind() {
            log::error!("Failed to install map layers: {e}");
        }

        let mut timeline = TimelineController::new(
            store.window_index().clone(),
            scheduler,
            config.tick_interval(),
        );
        timeline.seek(0, &mut binder);
        if config.autoplay {
            timeline.play();
        }

        Self { timeline, binder }
    }

    fn apply(&mut self, intent: Intent) -> bool {
        let Self { timeline, binder } = self;

        match intent {
            Intent::Play => timeline.play(),
            Intent::Pause => {
                timeline.pause();
                true
            }
            Intent::TogglePlay => {
                timeline.toggle();
                true
            }
            Intent::Seek(i) | Intent::Scrub(i) => timeline.seek(i, binder).is_some(),
            Intent::BeginScrub => {
                timeline.begin_scrub();
                true
            }
            Intent::EndScrub => {
                timeline.end_scrub();
                true
            }
            Intent::StepForward => timeline.step_forward(binder).is_some(),
            Intent::StepBack => timeline.step_back(binder).is_some(),
            Intent::SetMode(mode) => logged(binder.set_mode(mode)),
            Intent::ToggleMode => {
                let mode = binder.mode().toggled();
                logged(binder.set_mode(mode))
            }
            Intent::StyleLoaded => logged(binder.handle_style_loaded()),
            Intent::Teardown => {
                timeline.teardown();
                true
            }
        }
    }

    fn view(&self, interactive: bool) -> ControlsView {
        let index = self.timeline.window_index();
        let current = self.timeline.current_index();
        let window_label = index.at(current).map(|w| w.to_string());
        let legend = window_label
            .clone()
            .map_or(LegendView::Error, |label| LegendView::Window {
                label,
                total: self.binder.store().total_at(current),
            });
        let disabled = !interactive || index.is_empty();

        ControlsView {
            slider: SliderView {
                min: 0,
                max: index.last_index().unwrap_or(0),
                value: current,
                step: 1,
                disabled,
            },
            playing: self.timeline.is_playing(),
            play_disabled: disabled,
            circle_mode: self.binder.mode().is_circle(),
            mode_disabled: disabled,
            window_label,
            legend,
        }
    }
}

fn logged(result: Result<(), RenderError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            log::error!("Render error: {e}");
            false
        }
    }
}

#[derive(Debug)]
enum Phase<S: MapSurface, T: TickScheduler> {
    Loading { surface: S, scheduler: T },
    Ready(Session<S, T>),
    Failed { error: String },
    TornDown { session: Option<Session<S, T>> },
}

/// Owns one map session from load to teardown.
#[derive(Debug)]
pub struct Dashboard<S: MapSurface, T: TickScheduler> {
    config: DashboardConfig,
    phase: Phase<S, T>,
    load_generation: u64,
}

impl<S: MapSurface, T: TickScheduler> Dashboard<S, T> {
    /// Creates a session waiting for its payload.
    #[must_use]
    pub const fn new(config: DashboardConfig, surface: S, scheduler: T) -> Self {
        Self {
            config,
            phase: Phase::Loading { surface, scheduler },
            load_generation: 0,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Starts a load attempt. Only the latest ticket is honored.
    pub const fn begin_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        LoadTicket {
            generation: self.load_generation,
        }
    }

    /// Applies the outcome of the load started with `ticket`.
    ///
    /// Returns `Ok(false)` if the ticket is stale or the session is no
    /// longer loading; the result is dropped in that case.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Load`] if the load failed. The session is
    /// then [`Status::Failed`] and shows the error legend.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<AggregateStore, LoadError>,
    ) -> Result<bool, DashboardError> {
        if ticket.generation != self.load_generation {
            log::debug!(
                "Dropping stale load completion (generation {} != {})",
                ticket.generation,
                self.load_generation
            );
            return Ok(false);
        }

        match std::mem::replace(&mut self.phase, Phase::TornDown { session: None }) {
            Phase::Loading { surface, scheduler } => match result {
                Ok(store) => {
                    self.phase =
                        Phase::Ready(Session::start(&self.config, store, surface, scheduler));
                    Ok(true)
                }
                Err(e) => {
                    log::error!("Failed to load aggregates: {e}");
                    self.phase = Phase::Failed {
                        error: e.to_string(),
                    };
                    Err(e.into())
                }
            },
            other => {
                log::debug!("Dropping load completion: session is no longer loading");
                self.phase = other;
                Ok(false)
            }
        }
    }

    /// Loads the payload at `source` and applies the result.
    ///
    /// # Errors
    ///
    /// See [`complete_load`](Self::complete_load).
    pub async fn init(&mut self, source: &AggregateSource) -> Result<(), DashboardError> {
        let ticket = self.begin_load();
        let result = AggregateStore::load(source).await;
        self.complete_load(ticket, result).map(|_| ())
    }

    /// Handles a user intent or map event. Returns whether it had an
    /// effect.
    ///
    /// Everything except [`Intent::Teardown`] is ignored unless the
    /// session is ready.
    pub fn dispatch(&mut self, intent: Intent) -> bool {
        if intent == Intent::Teardown {
            self.teardown();
            return true;
        }
        match &mut self.phase {
            Phase::Ready(session) => session.apply(intent),
            _ => {
                log::debug!("Ignoring {intent:?} while {}", self.status());
                false
            }
        }
    }

    /// Delivers a playback tick. Stale tokens and ticks outside the ready
    /// phase are dropped.
    pub fn fire_tick(&mut self, token: TickToken) -> bool {
        match &mut self.phase {
            Phase::Ready(Session { timeline, binder }) => timeline.fire(token, binder),
            _ => {
                log::trace!("Dropping tick while {}", self.status());
                false
            }
        }
    }

    /// Cancels playback and invalidates any in-flight load.
    pub fn teardown(&mut self) {
        self.load_generation += 1;
        let session = match std::mem::replace(&mut self.phase, Phase::TornDown { session: None })
        {
            Phase::Ready(mut session) => {
                session.apply(Intent::Teardown);
                Some(session)
            }
            Phase::TornDown { session } => session,
            Phase::Loading { .. } | Phase::Failed { .. } => None,
        };
        self.phase = Phase::TornDown { session };
        log::info!("Dashboard torn down");
    }

    #[must_use]
    pub const fn status(&self) -> Status {
        match self.phase {
            Phase::Loading { .. } => Status::Loading,
            Phase::Ready(_) => Status::Ready,
            Phase::Failed { .. } => Status::Failed,
            Phase::TornDown { .. } => Status::TornDown,
        }
    }

    /// Message of the load failure, if the session failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed { error } => Some(error),
            _ => None,
        }
    }

    #[must_use]
    pub fn store(&self) -> Option<&Arc<AggregateStore>> {
        self.session().map(|s| s.binder.store())
    }

    #[must_use]
    pub fn timeline(&self) -> Option<&TimelineController<T>> {
        self.session().map(|s| &s.timeline)
    }

    #[must_use]
    pub fn binder(&self) -> Option<&RenderBinder<S>> {
        self.session().map(|s| &s.binder)
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.timeline().map(TimelineController::current_index)
    }

    /// The map surface, unless it was dropped by a failed load.
    #[must_use]
    pub fn surface(&self) -> Option<&S> {
        match &self.phase {
            Phase::Loading { surface, .. } => Some(surface),
            _ => self.binder().map(RenderBinder::surface),
        }
    }

    /// The tick scheduler, while one is owned.
    #[must_use]
    pub fn scheduler(&self) -> Option<&T> {
        match &self.phase {
            Phase::Loading { scheduler, .. } => Some(scheduler),
            _ => self.timeline().map(TimelineController::scheduler),
        }
    }

    /// The current state of every control.
    #[must_use]
    pub fn controls(&self) -> ControlsView {
        match &self.phase {
            Phase::Ready(session) => session.view(true),
            Phase::TornDown {
                session: Some(session),
            } => session.view(false),
            Phase::Loading { .. } | Phase::TornDown { session: None } => {
                self.inert_view(LegendView::Loading)
            }
            Phase::Failed { .. } => self.inert_view(LegendView::Error),
        }
    }

    #[must_use]
    pub fn legend(&self) -> LegendView {
        self.controls().legend
    }

    fn inert_view(&self, legend: LegendView) -> ControlsView {
        ControlsView {
            slider: SliderView::disabled(),
            playing: false,
            play_disabled: true,
            circle_mode: self.config.default_mode.is_circle(),
            mode_disabled: true,
            window_label: None,
            legend,
        }
    }

    const fn session(&self) -> Option<&Session<S, T>> {
        match &self.phase {
            Phase::Ready(session)
            | Phase::TornDown {
                session: Some(session),
            } => Some(session),
            _ => None,
        }
    }
}
