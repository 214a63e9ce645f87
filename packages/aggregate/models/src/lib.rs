#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregate payload and time window types.
//!
//! These types mirror the `aggregates.json` document produced by the offline
//! aggregation pipeline: a list of time windows plus a flat list of
//! geolocated count cells, each tagged with the window it belongs to.
//! Unknown fields (per-cell H3 ids, bin ids) are ignored on deserialization.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A closed time interval `[start, end]` over which incidents are counted.
///
/// The pipeline uses years as the unit, so a window of `1995..=1999` covers
/// five years of incidents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Window {
    /// Inclusive start of the window.
    pub start: i64,
    /// Inclusive end of the window.
    pub end: i64,
}

impl Window {
    /// Creates a new window. Does not validate `start <= end`.
    #[must_use]
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Returns the key that features use to reference this window.
    #[must_use]
    pub const fn key(self) -> WindowKey {
        WindowKey(self.start, self.end)
    }

    /// Whether `start <= end`.
    #[must_use]
    pub const fn is_well_formed(self) -> bool {
        self.start <= self.end
    }

    /// Whether the two windows share at least one unit of time.
    #[must_use]
    pub const fn overlaps(self, other: Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\u{2013}{}", self.start, self.end)
    }
}

impl From<WindowKey> for Window {
    fn from(key: WindowKey) -> Self {
        Self::new(key.0, key.1)
    }
}

/// The `[start, end]` pair a feature uses to reference its window.
///
/// Serialized as a two-element JSON array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowKey(pub i64, pub i64);

impl fmt::Display for WindowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Window::from(*self).fmt(f)
    }
}

impl From<Window> for WindowKey {
    fn from(window: Window) -> Self {
        window.key()
    }
}

/// A geolocated count cell for one time window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateFeature {
    /// Window this cell belongs to.
    #[serde(rename = "w")]
    pub window_key: WindowKey,
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lon: f64,
    /// Number of incidents aggregated into this cell.
    #[serde(rename = "n")]
    pub count: u64,
}

/// Spatial grid the pipeline binned incidents into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GridKind {
    /// Uber H3 hexagonal cells; `resolution` is the H3 resolution.
    H3,
    /// Fixed lat/lon bins; `resolution` is the bin size in degrees.
    Bin,
    /// A grid name this crate does not know about.
    Other(String),
}

impl From<String> for GridKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "h3" => Self::H3,
            "bin" => Self::Bin,
            _ => Self::Other(value),
        }
    }
}

impl From<GridKind> for String {
    fn from(value: GridKind) -> Self {
        match value {
            GridKind::H3 => "h3".to_string(),
            GridKind::Bin => "bin".to_string(),
            GridKind::Other(name) => name,
        }
    }
}

impl fmt::Display for GridKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::H3 => f.write_str("h3"),
            Self::Bin => f.write_str("bin"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// The `meta` block of the aggregate payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMeta {
    /// Ordered list of time windows.
    pub windows: Vec<Window>,
    /// Grid the cells were binned into, when the producer recorded it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridKind>,
    /// Grid resolution (H3 resolution or bin size), when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<f64>,
}

/// The full `aggregates.json` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatePayload {
    /// Dataset metadata.
    pub meta: DatasetMeta,
    /// All count cells across all windows.
    pub features: Vec<AggregateFeature>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_displays_with_en_dash() {
        assert_eq!(Window::new(1995, 1999).to_string(), "1995\u{2013}1999");
        assert_eq!(WindowKey(2000, 2004).to_string(), "2000\u{2013}2004");
    }

    #[test]
    fn window_overlap_is_inclusive() {
        let a = Window::new(1995, 1999);
        assert!(a.overlaps(Window::new(1999, 2003)));
        assert!(!a.overlaps(Window::new(2000, 2004)));
    }

    #[test]
    fn deserializes_payload_and_ignores_unknown_fields() {
        let json = r#"{
            "meta": {
                "grid": "h3",
                "resolution": 6,
                "windows": [{"start": 1995, "end": 1999}],
                "generated_by": "pipeline"
            },
            "features": [
                {"w": [1995, 1999], "lat": 40.0, "lon": -74.0, "n": 3, "c": "862a1072fffffff"}
            ]
        }"#;

        let payload: AggregatePayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.meta.windows, vec![Window::new(1995, 1999)]);
        assert_eq!(payload.meta.grid, Some(GridKind::H3));
        assert_eq!(payload.features.len(), 1);

        let feature = payload.features[0];
        assert_eq!(feature.window_key, WindowKey(1995, 1999));
        assert_eq!(feature.count, 3);
    }

    #[test]
    fn rejects_fractional_counts() {
        let json = r#"{"w": [1995, 1999], "lat": 40.0, "lon": -74.0, "n": 2.5}"#;
        assert!(serde_json::from_str::<AggregateFeature>(json).is_err());
    }

    #[test]
    fn keeps_unrecognized_grid_names() {
        let grid: GridKind = serde_json::from_str("\"s2\"").unwrap();
        assert_eq!(grid, GridKind::Other("s2".to_string()));
        assert_eq!(serde_json::to_string(&GridKind::Bin).unwrap(), "\"bin\"");
    }
}
