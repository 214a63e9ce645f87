#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Translates `(store, window, mode)` into map source updates.
//!
//! The [`RenderBinder`] is the only component that mutates map sources.
//! The same feature collection is written to both the heatmap and the
//! circle source on every refresh; the active visualization is selected
//! purely through layer visibility.

pub mod binder;
pub mod geometry;
pub mod mode;

use pacify_map::SurfaceError;

pub use binder::RenderBinder;
pub use geometry::{to_feature_collection, to_point_feature, window_features};
pub use mode::LayerMode;

pub const HEATMAP_SOURCE: &str = "heatmap-source";
pub const CIRCLE_SOURCE: &str = "circle-source";
pub const HEATMAP_LAYER: &str = "heatmap-layer";
pub const CIRCLE_LAYER: &str = "circle-layer";

/// Errors raised while writing to the map surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The map style has not loaded, so sources cannot be written yet.
    /// Refreshes hitting this are queued and replayed on style load.
    #[error("Map style not loaded yet")]
    RenderPrecondition,

    /// The map surface rejected an operation.
    #[error(transparent)]
    Surface(SurfaceError),

    /// The requested window ordinal does not exist.
    #[error("Window {index} out of range (have {size})")]
    WindowOutOfRange {
        index: usize,
        size: usize,
    },
}

impl From<SurfaceError> for RenderError {
    fn from(value: SurfaceError) -> Self {
        match value {
            SurfaceError::StyleNotLoaded => Self::RenderPrecondition,
            other => Self::Surface(other),
        }
    }
}
