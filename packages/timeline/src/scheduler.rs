//! Tick scheduling backends.

use std::time::Duration;

/// Identifies one scheduled tick.
///
/// Tokens are minted by the controller with a fresh generation on every
/// playback transition; a token whose generation no longer matches the
/// controller's outstanding handle is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickToken {
    pub(crate) generation: u64,
}

impl TickToken {
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.generation
    }
}

/// Arranges for a tick to be delivered back to the controller after a
/// delay.
///
/// The scheduler does not call the controller itself; its owner observes
/// due tokens and passes them to
/// [`TimelineController::fire`](crate::TimelineController::fire).
pub trait TickScheduler {
    /// Schedules `token` to fire after `delay`.
    fn schedule(&mut self, token: TickToken, delay: Duration);

    /// Cancels a previously scheduled token. Unknown tokens are ignored.
    fn cancel(&mut self, token: TickToken);
}

/// Deterministic scheduler driven by explicit time advancement.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    now: Duration,
    pending: Vec<(Duration, TickToken)>,
}

impl VirtualClock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
            pending: Vec::new(),
        }
    }

    /// Virtual time elapsed since creation.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Number of ticks currently scheduled.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Deadline of the earliest scheduled tick.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|(at, _)| *at).min()
    }

    /// Removes and returns the earliest tick due at or before `until`,
    /// moving the clock to its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<TickToken> {
        let (pos, (at, token)) = self
            .pending
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, (at, _))| *at <= until)
            .min_by_key(|(_, (at, _))| *at)?;
        self.pending.remove(pos);
        self.now = self.now.max(at);
        Some(token)
    }

    /// Moves the clock forward to `to` without firing anything.
    pub fn set_now(&mut self, to: Duration) {
        self.now = self.now.max(to);
    }
}

impl TickScheduler for VirtualClock {
    fn schedule(&mut self, token: TickToken, delay: Duration) {
        self.pending.push((self.now + delay, token));
    }

    fn cancel(&mut self, token: TickToken) {
        self.pending.retain(|(_, t)| *t != token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_due_ticks_in_deadline_order() {
        let mut clock = VirtualClock::new();
        clock.schedule(TickToken { generation: 2 }, Duration::from_millis(300));
        clock.schedule(TickToken { generation: 1 }, Duration::from_millis(100));

        assert_eq!(clock.next_deadline(), Some(Duration::from_millis(100)));
        assert_eq!(
            clock.pop_due(Duration::from_millis(500)),
            Some(TickToken { generation: 1 })
        );
        assert_eq!(clock.now(), Duration::from_millis(100));
        assert_eq!(clock.pop_due(Duration::from_millis(200)), None);
        assert_eq!(clock.pending_count(), 1);
    }

    #[test]
    fn cancel_removes_only_the_matching_token() {
        let mut clock = VirtualClock::new();
        clock.schedule(TickToken { generation: 1 }, Duration::from_millis(10));
        clock.schedule(TickToken { generation: 2 }, Duration::from_millis(10));

        clock.cancel(TickToken { generation: 1 });
        clock.cancel(TickToken { generation: 99 });

        assert_eq!(
            clock.pop_due(Duration::from_secs(1)),
            Some(TickToken { generation: 2 })
        );
        assert_eq!(clock.pending_count(), 0);
    }
}
