//! Ordinal access to the loaded time windows.
//!
//! Playback wraps around (`next` of the last window is the first), while
//! manual stepping clamps at both ends.

use std::collections::HashMap;

use pacify_aggregate_models::{Window, WindowKey};

/// Ordered, finite list of windows with O(1) lookup in both directions.
#[derive(Debug, Clone, Default)]
pub struct WindowIndex {
    windows: Vec<Window>,
    positions: HashMap<WindowKey, usize>,
}

impl WindowIndex {
    /// Builds an index over already-validated, ordered windows.
    #[must_use]
    pub fn new(windows: Vec<Window>) -> Self {
        let positions = windows
            .iter()
            .enumerate()
            .map(|(i, w)| (w.key(), i))
            .collect();
        Self { windows, positions }
    }

    /// Number of windows.
    #[must_use]
    pub fn size(&self) -> usize {
        self.windows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// The window at ordinal `i`.
    #[must_use]
    pub fn at(&self, i: usize) -> Option<Window> {
        self.windows.get(i).copied()
    }

    /// The ordinal of the window with the given key.
    #[must_use]
    pub fn index_of(&self, key: WindowKey) -> Option<usize> {
        self.positions.get(&key).copied()
    }

    /// Playback successor: `(i + 1) mod size`.
    #[must_use]
    pub fn next(&self, i: usize) -> usize {
        match self.size() {
            0 => 0,
            size => (i % size + 1) % size,
        }
    }

    /// Manual predecessor, clamped to `[0, size-1]`.
    #[must_use]
    pub fn prev(&self, i: usize) -> usize {
        self.last_index().map_or(0, |last| i.saturating_sub(1).min(last))
    }

    /// Manual successor, clamped at the last window.
    #[must_use]
    pub fn step_next(&self, i: usize) -> usize {
        self.last_index().map_or(0, |last| i.saturating_add(1).min(last))
    }

    /// Clamps an arbitrary (possibly negative) position into `[0, size-1]`.
    ///
    /// Returns `0` for an empty index.
    #[must_use]
    pub fn clamp(&self, i: i64) -> usize {
        let Some(last) = self.last_index() else {
            return 0;
        };
        if i < 0 {
            return 0;
        }
        usize::try_from(i).map_or(last, |i| i.min(last))
    }

    /// Ordinal of the last window, if any.
    #[must_use]
    pub fn last_index(&self) -> Option<usize> {
        self.size().checked_sub(1)
    }

    /// Iterates over the windows in order.
    pub fn iter(&self) -> impl Iterator<Item = Window> + '_ {
        self.windows.iter().copied()
    }

    /// The windows as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Window] {
        &self.windows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(n: i64) -> WindowIndex {
        WindowIndex::new(
            (0..n)
                .map(|i| Window::new(1995 + i * 5, 1999 + i * 5))
                .collect(),
        )
    }

    #[test]
    fn next_wraps_and_prev_clamps() {
        let wi = index(3);
        assert_eq!(wi.next(0), 1);
        assert_eq!(wi.next(2), 0);
        assert_eq!(wi.prev(0), 0);
        assert_eq!(wi.prev(2), 1);
        assert_eq!(wi.step_next(2), 2);
        assert_eq!(wi.step_next(0), 1);
    }

    #[test]
    fn next_and_prev_are_inverse_inside_the_range() {
        let wi = index(5);
        for i in 1..wi.size() {
            assert_eq!(wi.next(wi.prev(i)), i);
        }
        for i in 0..wi.size() - 1 {
            assert_eq!(wi.prev(wi.next(i)), i);
        }
    }

    #[test]
    fn clamp_handles_out_of_range_positions() {
        let wi = index(4);
        assert_eq!(wi.clamp(-5), 0);
        assert_eq!(wi.clamp(1_000_000_000), 3);
        assert_eq!(wi.clamp(2), 2);
        assert_eq!(WindowIndex::default().clamp(7), 0);
    }

    #[test]
    fn looks_up_windows_by_key() {
        let wi = index(2);
        assert_eq!(wi.index_of(WindowKey(2000, 2004)), Some(1));
        assert_eq!(wi.index_of(WindowKey(2030, 2034)), None);
        assert_eq!(wi.at(0), Some(Window::new(1995, 1999)));
        assert_eq!(wi.at(2), None);
    }

    #[test]
    fn empty_index_navigation_is_inert() {
        let wi = WindowIndex::default();
        assert!(wi.is_empty());
        assert_eq!(wi.next(0), 0);
        assert_eq!(wi.step_next(0), 0);
        assert_eq!(wi.prev(4), 0);
        assert_eq!(wi.last_index(), None);
    }

    #[test]
    fn stepping_from_past_the_end_lands_on_the_last_window() {
        let wi = index(3);
        assert_eq!(wi.prev(100), 2);
        assert_eq!(wi.step_next(100), 2);
        assert_eq!(wi.prev(3), 2);
    }
}
