#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The session object that owns the aggregate store, the timeline and the
//! render binder.
//!
//! A [`Dashboard`] starts in [`Status::Loading`], becomes
//! [`Status::Ready`] once the payload has loaded (or [`Status::Failed`]
//! if it could not), and ends in [`Status::TornDown`]. All user input
//! arrives as [`Intent`]s; all playback ticks arrive through
//! [`Dashboard::fire_tick`]. [`driver::run`] multiplexes both on a single
//! task.

pub mod config;
pub mod controls;
pub mod driver;
pub mod session;

use pacify_aggregate::LoadError;
use pacify_render::LayerMode;
use strum_macros::{AsRefStr, Display};

pub use config::{ConfigError, DashboardConfig};
pub use controls::{ControlsView, LegendView, SliderView};
pub use driver::TokioScheduler;
pub use session::{Dashboard, LoadTicket};

/// Errors surfaced by a dashboard session.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// The aggregate payload could not be loaded. The session shows the
    /// error legend.
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Status {
    Loading,
    Ready,
    Failed,
    TornDown,
}

/// A user action or a map event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Play,
    Pause,
    TogglePlay,
    /// Jump to a window ordinal; clamped into range.
    Seek(i64),
    BeginScrub,
    /// A slider value change while dragging.
    Scrub(i64),
    EndScrub,
    StepForward,
    StepBack,
    SetMode(LayerMode),
    ToggleMode,
    /// The map surface finished loading its style.
    StyleLoaded,
    Teardown,
}
