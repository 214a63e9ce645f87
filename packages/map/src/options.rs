//! Initial camera and zoom bounds, plus the map controls.

use serde::Serialize;
use strum_macros::{AsRefStr, Display};

/// Geographic center of the contiguous United States, `[lon, lat]`.
pub const DEFAULT_CENTER: [f64; 2] = [-98.5795, 39.8283];
pub const DEFAULT_ZOOM: f64 = 4.0;
pub const MIN_ZOOM: f64 = 3.0;
pub const MAX_ZOOM: f64 = 12.0;

/// Camera options the map is created with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    /// Initial center as `[lon, lat]`.
    pub center: [f64; 2],
    /// Initial zoom.
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

/// Built-in map controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MapControl {
    /// Zoom buttons and compass.
    Navigation,
    /// Fullscreen toggle.
    Fullscreen,
}

/// Corner a control is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}
