#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map surface facade for the pacify map.
//!
//! Exposes only what the aggregate renderer needs from a `MapLibre`-style
//! map: named `GeoJSON` sources, layers with expression-based paint, layer
//! visibility and the navigation/fullscreen controls. Any renderer that can
//! implement [`MapSurface`] is acceptable; [`HeadlessSurface`] keeps
//! everything in memory and can emit the equivalent style document.

pub mod expression;
pub mod headless;
pub mod layer;
pub mod options;
pub mod style;

use geojson::FeatureCollection;

pub use expression::Expression;
pub use headless::HeadlessSurface;
pub use layer::{LayerKind, LayerSpec, Visibility, circle_layer, heatmap_layer};
pub use options::{ControlPosition, MapControl, MapOptions};
pub use style::StyleDocument;

/// Errors reported by a [`MapSurface`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// The map style has not finished loading; sources and layers cannot be
    /// touched yet.
    #[error("Map style is not loaded yet")]
    StyleNotLoaded,

    /// No source with this name has been added.
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// No layer with this id has been added.
    #[error("Unknown layer: {0}")]
    UnknownLayer(String),

    /// A source with this name already exists.
    #[error("Source already exists: {0}")]
    DuplicateSource(String),

    /// A layer with this id already exists.
    #[error("Layer already exists: {0}")]
    DuplicateLayer(String),
}

/// The subset of a map library the aggregate renderer depends on.
///
/// Style loading is asynchronous in real map libraries. Implementations
/// report it through [`is_style_loaded`](Self::is_style_loaded), and the
/// owner of the surface forwards the style-loaded event to whoever needs to
/// replay deferred work.
pub trait MapSurface {
    /// Whether the style has loaded and sources/layers may be mutated.
    fn is_style_loaded(&self) -> bool;

    /// Adds a named `GeoJSON` source with initial data.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::StyleNotLoaded`] before the style has loaded
    /// and [`SurfaceError::DuplicateSource`] if the name is taken.
    fn add_source(&mut self, name: &str, data: FeatureCollection) -> Result<(), SurfaceError>;

    /// Whether a source with this name exists.
    fn has_source(&self, name: &str) -> bool;

    /// Replaces the data of an existing source.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::StyleNotLoaded`] before the style has loaded
    /// and [`SurfaceError::UnknownSource`] if the source does not exist.
    fn set_data(&mut self, name: &str, data: FeatureCollection) -> Result<(), SurfaceError>;

    /// Adds a layer drawing an existing source.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::StyleNotLoaded`] before the style has loaded,
    /// [`SurfaceError::UnknownSource`] if the layer's source does not exist
    /// and [`SurfaceError::DuplicateLayer`] if the id is taken.
    fn add_layer(&mut self, layer: LayerSpec) -> Result<(), SurfaceError>;

    /// Whether a layer with this id exists.
    fn has_layer(&self, id: &str) -> bool;

    /// Shows or hides a layer.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::UnknownLayer`] if the layer does not exist.
    fn set_layer_visibility(&mut self, id: &str, visible: bool) -> Result<(), SurfaceError>;

    /// Attaches a map control.
    fn add_control(&mut self, control: MapControl, position: ControlPosition);
}

/// An empty `GeoJSON` feature collection.
#[must_use]
pub const fn empty_feature_collection() -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: Vec::new(),
        foreign_members: None,
    }
}
