//! Style document rendering.
//!
//! Produces the JSON a browser client needs to recreate the map: camera
//! options, `GeoJSON` sources, layers with their paint expressions and the
//! attached controls.

use std::collections::BTreeMap;

use geojson::FeatureCollection;
use serde::Serialize;

use crate::layer::LayerSpec;
use crate::options::{ControlPosition, MapControl, MapOptions};

/// Style spec version emitted in documents.
pub const STYLE_VERSION: u8 = 8;

/// A `GeoJSON` source entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoJsonSource {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: FeatureCollection,
}

impl GeoJsonSource {
    #[must_use]
    pub const fn new(data: FeatureCollection) -> Self {
        Self {
            kind: "geojson",
            data,
        }
    }
}

/// A control and where it is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlPlacement {
    #[serde(rename = "type")]
    pub control: MapControl,
    pub position: ControlPosition,
}

/// Everything needed to rebuild the map on a client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleDocument {
    pub version: u8,
    #[serde(flatten)]
    pub options: MapOptions,
    pub sources: BTreeMap<String, GeoJsonSource>,
    pub layers: Vec<LayerSpec>,
    pub controls: Vec<ControlPlacement>,
}
