//! In-memory [`MapSurface`] implementation.
//!
//! Keeps source data, layers and controls exactly as a browser map would
//! hold them, without drawing anything. Used by the HTTP server to build
//! the style document, by the CLI for terminal sessions, and by tests to
//! observe what the renderer wrote.

use std::collections::BTreeMap;

use geojson::FeatureCollection;

use crate::layer::{LayerSpec, Visibility};
use crate::options::{ControlPosition, MapControl, MapOptions};
use crate::style::{ControlPlacement, GeoJsonSource, STYLE_VERSION, StyleDocument};
use crate::{MapSurface, SurfaceError};

#[derive(Debug, Clone)]
struct SourceState {
    data: FeatureCollection,
    writes: usize,
}

/// A map surface that renders nothing and remembers everything.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    options: MapOptions,
    style_loaded: bool,
    sources: BTreeMap<String, SourceState>,
    layers: Vec<LayerSpec>,
    controls: Vec<ControlPlacement>,
}

impl HeadlessSurface {
    /// Creates a surface whose style has not loaded yet.
    #[must_use]
    pub fn new(options: MapOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Creates a surface whose style is already loaded.
    #[must_use]
    pub fn loaded(options: MapOptions) -> Self {
        let mut surface = Self::new(options);
        surface.load_style();
        surface
    }

    /// Marks the style as loaded.
    pub fn load_style(&mut self) {
        if !self.style_loaded {
            log::debug!("Headless map style loaded");
        }
        self.style_loaded = true;
    }

    #[must_use]
    pub const fn options(&self) -> &MapOptions {
        &self.options
    }

    /// Current data of a source.
    #[must_use]
    pub fn source_data(&self, name: &str) -> Option<&FeatureCollection> {
        self.sources.get(name).map(|s| &s.data)
    }

    /// Number of `set_data` calls a source has received.
    #[must_use]
    pub fn write_count(&self, name: &str) -> usize {
        self.sources.get(name).map_or(0, |s| s.writes)
    }

    /// A layer by id.
    #[must_use]
    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Whether a layer is visible, or `None` if it does not exist.
    #[must_use]
    pub fn is_layer_visible(&self, id: &str) -> Option<bool> {
        self.layer(id).map(LayerSpec::is_visible)
    }

    /// Attached controls in attachment order.
    #[must_use]
    pub fn controls(&self) -> &[ControlPlacement] {
        &self.controls
    }

    /// Renders the current sources, layers and controls as a style
    /// document.
    #[must_use]
    pub fn style_document(&self) -> StyleDocument {
        StyleDocument {
            version: STYLE_VERSION,
            options: self.options,
            sources: self
                .sources
                .iter()
                .map(|(name, state)| (name.clone(), GeoJsonSource::new(state.data.clone())))
                .collect(),
            layers: self.layers.clone(),
            controls: self.controls.clone(),
        }
    }

    const fn ensure_style_loaded(&self) -> Result<(), SurfaceError> {
        if self.style_loaded {
            Ok(())
        } else {
            Err(SurfaceError::StyleNotLoaded)
        }
    }
}

impl MapSurface for HeadlessSurface {
    fn is_style_loaded(&self) -> bool {
        self.style_loaded
    }

    fn add_source(&mut self, name: &str, data: FeatureCollection) -> Result<(), SurfaceError> {
        self.ensure_style_loaded()?;
        if self.sources.contains_key(name) {
            return Err(SurfaceError::DuplicateSource(name.to_string()));
        }
        self.sources
            .insert(name.to_string(), SourceState { data, writes: 0 });
        Ok(())
    }

    fn has_source(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    fn set_data(&mut self, name: &str, data: FeatureCollection) -> Result<(), SurfaceError> {
        self.ensure_style_loaded()?;
        let source = self
            .sources
            .get_mut(name)
            .ok_or_else(|| SurfaceError::UnknownSource(name.to_string()))?;
        log::trace!("set_data({name}): {} features", data.features.len());
        source.data = data;
        source.writes += 1;
        Ok(())
    }

    fn add_layer(&mut self, layer: LayerSpec) -> Result<(), SurfaceError> {
        self.ensure_style_loaded()?;
        if !self.sources.contains_key(&layer.source) {
            return Err(SurfaceError::UnknownSource(layer.source));
        }
        if self.has_layer(&layer.id) {
            return Err(SurfaceError::DuplicateLayer(layer.id));
        }
        self.layers.push(layer);
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    fn set_layer_visibility(&mut self, id: &str, visible: bool) -> Result<(), SurfaceError> {
        let layer = self
            .layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| SurfaceError::UnknownLayer(id.to_string()))?;
        layer.layout.visibility = Visibility::from(visible);
        Ok(())
    }

    fn add_control(&mut self, control: MapControl, position: ControlPosition) {
        self.controls.push(ControlPlacement { control, position });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::empty_feature_collection;
    use crate::layer::heatmap_layer;

    #[test]
    fn rejects_mutation_before_style_load() {
        let mut surface = HeadlessSurface::new(MapOptions::default());
        assert_eq!(
            surface.add_source("heatmap-source", empty_feature_collection()),
            Err(SurfaceError::StyleNotLoaded)
        );

        surface.load_style();
        surface
            .add_source("heatmap-source", empty_feature_collection())
            .unwrap();
        assert!(surface.has_source("heatmap-source"));
    }

    #[test]
    fn counts_writes_per_source() {
        let mut surface = HeadlessSurface::loaded(MapOptions::default());
        surface
            .add_source("heatmap-source", empty_feature_collection())
            .unwrap();
        surface
            .set_data("heatmap-source", empty_feature_collection())
            .unwrap();
        surface
            .set_data("heatmap-source", empty_feature_collection())
            .unwrap();

        assert_eq!(surface.write_count("heatmap-source"), 2);
        assert_eq!(
            surface.set_data("circle-source", empty_feature_collection()),
            Err(SurfaceError::UnknownSource("circle-source".to_string()))
        );
    }

    #[test]
    fn layers_require_their_source_and_unique_ids() {
        let mut surface = HeadlessSurface::loaded(MapOptions::default());
        let layer = heatmap_layer("heatmap-layer", "heatmap-source");

        assert_eq!(
            surface.add_layer(layer.clone()),
            Err(SurfaceError::UnknownSource("heatmap-source".to_string()))
        );

        surface
            .add_source("heatmap-source", empty_feature_collection())
            .unwrap();
        surface.add_layer(layer.clone()).unwrap();
        assert_eq!(
            surface.add_layer(layer),
            Err(SurfaceError::DuplicateLayer("heatmap-layer".to_string()))
        );

        surface.set_layer_visibility("heatmap-layer", false).unwrap();
        assert_eq!(surface.is_layer_visible("heatmap-layer"), Some(false));
    }

    #[test]
    fn style_document_lists_sources_layers_and_controls() {
        let mut surface = HeadlessSurface::loaded(MapOptions::default());
        surface
            .add_source("heatmap-source", empty_feature_collection())
            .unwrap();
        surface
            .add_layer(heatmap_layer("heatmap-layer", "heatmap-source"))
            .unwrap();
        surface.add_control(MapControl::Navigation, ControlPosition::TopRight);

        let value = serde_json::to_value(surface.style_document()).unwrap();
        assert_eq!(value["version"], 8);
        assert_eq!(value["minZoom"], 3.0);
        assert_eq!(value["maxZoom"], 12.0);
        assert_eq!(value["sources"]["heatmap-source"]["type"], "geojson");
        assert_eq!(value["layers"][0]["id"], "heatmap-layer");
        assert_eq!(value["controls"][0]["type"], "navigation");
        assert_eq!(value["controls"][0]["position"], "top-right");
    }
}
