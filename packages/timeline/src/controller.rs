//! The playback state machine.

use std::time::Duration;

use pacify_aggregate::WindowIndex;

use crate::scheduler::{TickScheduler, TickToken, VirtualClock};
use crate::{ChangeObserver, PlaybackState};

/// Owns the current window ordinal and the playback tick.
///
/// At most one tick is outstanding at any time. Every transition that
/// touches playback (`play`, `pause`, `teardown` and each delivered tick)
/// retires the outstanding handle and bumps the generation, so a token
/// that was already in flight is recognised as stale by
/// [`fire`](Self::fire) and dropped.
#[derive(Debug)]
pub struct TimelineController<S: TickScheduler> {
    index: WindowIndex,
    scheduler: S,
    tick_interval: Duration,
    current: usize,
    playing: bool,
    scrubbing: bool,
    has_played: bool,
    torn_down: bool,
    generation: u64,
    handle: Option<TickToken>,
}

impl<S: TickScheduler> TimelineController<S> {
    /// Creates an idle controller positioned on the first window.
    #[must_use]
    pub const fn new(index: WindowIndex, scheduler: S, tick_interval: Duration) -> Self {
        Self {
            index,
            scheduler,
            tick_interval,
            current: 0,
            playing: false,
            scrubbing: false,
            has_played: false,
            torn_down: false,
            generation: 0,
            handle: None,
        }
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    #[must_use]
    pub const fn is_scrubbing(&self) -> bool {
        self.scrubbing
    }

    #[must_use]
    pub const fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    #[must_use]
    pub const fn window_index(&self) -> &WindowIndex {
        &self.index
    }

    /// The outstanding tick, if one is scheduled.
    #[must_use]
    pub const fn pending_tick(&self) -> Option<TickToken> {
        self.handle
    }

    #[must_use]
    pub const fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub const fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        if self.scrubbing {
            PlaybackState::Scrubbing
        } else if self.playing {
            PlaybackState::Playing
        } else if self.has_played {
            PlaybackState::Paused
        } else {
            PlaybackState::Idle
        }
    }

    /// Starts periodic playback from the current window.
    ///
    /// Returns `false` without scheduling anything if already playing, if
    /// there are no windows, or after teardown.
    pub fn play(&mut self) -> bool {
        if self.playing || self.torn_down || self.index.is_empty() {
            return false;
        }
        log::debug!("Playback started at window {}", self.current);
        self.playing = true;
        self.has_played = true;
        self.arm();
        true
    }

    /// Stops playback. The outstanding tick is cancelled before this
    /// returns.
    pub fn pause(&mut self) {
        self.disarm();
        if self.playing {
            log::debug!("Playback paused at window {}", self.current);
            self.playing = false;
        }
    }

    /// Plays if paused, pauses if playing. Returns the new playing flag.
    pub fn toggle(&mut self) -> bool {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
        self.playing
    }

    /// Jumps to `i` clamped into `[0, size-1]` and notifies `observer`.
    ///
    /// Does not change whether playback is running. Returns the new
    /// ordinal, or `None` when there are no windows or after teardown.
    pub fn seek(&mut self, i: i64, observer: &mut impl ChangeObserver) -> Option<usize> {
        if self.torn_down || self.index.is_empty() {
            return None;
        }
        self.current = self.index.clamp(i);
        observer.on_change(self.current);
        Some(self.current)
    }

    /// Manual step to the next window, clamped at the last one.
    pub fn step_forward(&mut self, observer: &mut impl ChangeObserver) -> Option<usize> {
        let next = self.index.step_next(self.current);
        self.seek(i64::try_from(next).unwrap_or(i64::MAX), observer)
    }

    /// Manual step to the previous window, clamped at the first one.
    pub fn step_back(&mut self, observer: &mut impl ChangeObserver) -> Option<usize> {
        let prev = self.index.prev(self.current);
        self.seek(i64::try_from(prev).unwrap_or(0), observer)
    }

    /// Marks the start of a slider drag. Playback keeps running.
    pub fn begin_scrub(&mut self) {
        if !self.torn_down {
            self.scrubbing = true;
        }
    }

    /// Marks the end of a slider drag.
    pub fn end_scrub(&mut self) {
        self.scrubbing = false;
    }

    /// Cancels the outstanding tick and stops accepting any further
    /// events.
    pub fn teardown(&mut self) {
        self.pause();
        self.scrubbing = false;
        self.torn_down = true;
    }

    /// Delivers a scheduled tick.
    ///
    /// Advances to the next window (wrapping from the last to the first),
    /// notifies `observer` and schedules the following tick. Tokens that
    /// are not the outstanding handle are dropped; returns whether the
    /// tick was applied.
    pub fn fire(&mut self, token: TickToken, observer: &mut impl ChangeObserver) -> bool {
        if self.torn_down || !self.playing || self.handle != Some(token) {
            log::trace!("Dropping stale tick (generation {})", token.generation);
            return false;
        }
        self.current = self.index.next(self.current);
        observer.on_change(self.current);
        self.arm();
        true
    }

    fn arm(&mut self) {
        self.disarm();
        let token = TickToken {
            generation: self.generation,
        };
        self.handle = Some(token);
        self.scheduler.schedule(token, self.tick_interval);
    }

    fn disarm(&mut self) {
        if let Some(token) = self.handle.take() {
            self.scheduler.cancel(token);
        }
        self.generation += 1;
    }
}

impl TimelineController<VirtualClock> {
    /// Advances virtual time by `by`, delivering every tick that falls due
    /// in order. Returns the number of ticks applied.
    pub fn advance(&mut self, by: Duration, observer: &mut impl ChangeObserver) -> usize {
        let until = self.scheduler.now() + by;
        let mut fired = 0;
        while let Some(token) = self.scheduler.pop_due(until) {
            if self.fire(token, observer) {
                fired += 1;
            }
        }
        self.scheduler.set_now(until);
        fired
    }
}
