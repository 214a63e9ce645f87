//! Read-only view of the UI controls the session exposes.

use std::fmt;

/// Legend text shown in place of the readout when loading fails.
pub const ERROR_LEGEND: &str = "Error loading data…";
pub const LOADING_LEGEND: &str = "Loading data…";

/// The time slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderView {
    pub min: usize,
    pub max: usize,
    pub value: usize,
    pub step: usize,
    pub disabled: bool,
}

impl SliderView {
    pub(crate) const fn disabled() -> Self {
        Self {
            min: 0,
            max: 0,
            value: 0,
            step: 1,
            disabled: true,
        }
    }
}

/// The legend readout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegendView {
    Loading,
    /// Current window label and its `Σ count`.
    Window { label: String, total: u64 },
    /// Loading failed; the detailed error has been logged.
    Error,
}

impl fmt::Display for LegendView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => f.write_str(LOADING_LEGEND),
            Self::Window { label, total } => write!(f, "{label} • {total} incidents"),
            Self::Error => f.write_str(ERROR_LEGEND),
        }
    }
}

/// Everything a UI needs to draw the controls for the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlsView {
    pub slider: SliderView,
    pub playing: bool,
    pub play_disabled: bool,
    /// `true` when the circle visualization is shown.
    pub circle_mode: bool,
    pub mode_disabled: bool,
    /// `"<start>–<end>"` of the current window.
    pub window_label: Option<String>,
    pub legend: LegendView,
}

impl ControlsView {
    /// Whether every control is disabled.
    #[must_use]
    pub const fn all_disabled(&self) -> bool {
        self.slider.disabled && self.play_disabled && self.mode_disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legend_text() {
        let legend = LegendView::Window {
            label: "1995–1999".to_string(),
            total: 3,
        };
        assert_eq!(legend.to_string(), "1995–1999 • 3 incidents");
        assert_eq!(LegendView::Error.to_string(), "Error loading data…");
        assert_eq!(
            LegendView::Window {
                label: "2000–2004".to_string(),
                total: 0
            }
            .to_string(),
            "2000–2004 • 0 incidents"
        );
    }
}
