#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Playback state machine for the time slider.
//!
//! [`TimelineController`] serializes every window change (ticks, seeks,
//! manual steps) into a single [`ChangeObserver::on_change`] call. Ticks
//! are scheduled through a [`TickScheduler`] and tracked by one
//! generation-tagged handle, so a paused or torn-down controller can never
//! deliver a stale tick.

pub mod controller;
pub mod scheduler;

use strum_macros::{AsRefStr, Display};

pub use controller::TimelineController;
pub use scheduler::{TickScheduler, TickToken, VirtualClock};

/// Default playback tick interval.
pub const DEFAULT_TICK_MS: u64 = 2000;

/// Receives the current window ordinal after every change.
///
/// Delivery is synchronous: the controller call that produced the change
/// does not return until `on_change` has.
pub trait ChangeObserver {
    fn on_change(&mut self, index: usize);
}

impl<F: FnMut(usize)> ChangeObserver for F {
    fn on_change(&mut self, index: usize) {
        self(index);
    }
}

/// Observable playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum PlaybackState {
    /// Never started.
    Idle,
    /// Ticks are scheduled.
    Playing,
    /// The slider is being dragged.
    Scrubbing,
    /// Stopped after having played.
    Paused,
}
