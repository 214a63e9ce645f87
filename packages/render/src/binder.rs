//! The render binder.

use std::sync::Arc;

use pacify_aggregate::AggregateStore;
use pacify_map::{
    ControlPosition, MapControl, MapSurface, circle_layer, empty_feature_collection, heatmap_layer,
};
use pacify_timeline::ChangeObserver;

use crate::geometry::window_features;
use crate::mode::LayerMode;
use crate::{CIRCLE_LAYER, CIRCLE_SOURCE, HEATMAP_LAYER, HEATMAP_SOURCE, RenderError};

/// Owns the map surface and keeps it in sync with the selected window.
///
/// Installation of sources and layers needs a loaded style. Until the
/// surface reports one, [`bind`](Self::bind) only records the request and
/// [`refresh`](Self::refresh) queues its index; the latest queued index is
/// written once [`handle_style_loaded`](Self::handle_style_loaded) runs.
#[derive(Debug)]
pub struct RenderBinder<S: MapSurface> {
    surface: S,
    store: Arc<AggregateStore>,
    mode: LayerMode,
    bind_requested: bool,
    installed: bool,
    pending: Option<usize>,
    rendered: Option<usize>,
}

impl<S: MapSurface> RenderBinder<S> {
    #[must_use]
    pub const fn new(surface: S, store: Arc<AggregateStore>, mode: LayerMode) -> Self {
        Self {
            surface,
            store,
            mode,
            bind_requested: false,
            installed: false,
            pending: None,
            rendered: None,
        }
    }

    /// Installs the two sources, the two layers and the map controls.
    ///
    /// Repeated calls are no-ops. If the style has not loaded yet the
    /// installation happens in [`handle_style_loaded`](Self::handle_style_loaded).
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Surface`] if the surface rejects a source or
    /// layer.
    pub fn bind(&mut self) -> Result<(), RenderError> {
        self.bind_requested = true;
        if self.installed {
            return Ok(());
        }
        if !self.surface.is_style_loaded() {
            log::debug!("Map style not loaded; deferring source installation");
            return Ok(());
        }
        self.install()
    }

    /// Writes the features of window `i` into both sources.
    ///
    /// Before the style has loaded the index is queued instead and
    /// `Ok(())` is returned.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::WindowOutOfRange`] for an unknown ordinal and
    /// [`RenderError::Surface`] if the surface rejects the write.
    pub fn refresh(&mut self, i: usize) -> Result<(), RenderError> {
        let size = self.store.window_index().size();
        if i >= size {
            return Err(RenderError::WindowOutOfRange { index: i, size });
        }

        match self.write(i) {
            Err(RenderError::RenderPrecondition) => {
                log::debug!("Queueing refresh of window {i} until the map style loads");
                self.pending = Some(i);
                Ok(())
            }
            other => other,
        }
    }

    /// Shows the layer for `mode` and hides the other. Source data is not
    /// touched.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Surface`] if a layer is missing.
    pub fn set_mode(&mut self, mode: LayerMode) -> Result<(), RenderError> {
        self.mode = mode;
        if self.installed {
            self.apply_mode()?;
        }
        Ok(())
    }

    /// Completes a deferred [`bind`](Self::bind) and replays the latest
    /// queued refresh exactly once.
    ///
    /// # Errors
    ///
    /// See [`bind`](Self::bind) and [`refresh`](Self::refresh).
    pub fn handle_style_loaded(&mut self) -> Result<(), RenderError> {
        if !self.bind_requested {
            return Ok(());
        }
        if !self.installed {
            self.install()?;
        }
        if let Some(i) = self.pending.take() {
            log::debug!("Replaying queued refresh of window {i}");
            self.write(i)?;
        }
        Ok(())
    }

    #[must_use]
    pub const fn mode(&self) -> LayerMode {
        self.mode
    }

    /// Whether sources and layers have been installed on the surface.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.installed
    }

    /// The refresh waiting for the style to load, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<usize> {
        self.pending
    }

    /// The window whose data the sources currently hold.
    #[must_use]
    pub const fn rendered(&self) -> Option<usize> {
        self.rendered
    }

    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface, for delivering its own events.
    /// Sources must not be written through it.
    pub const fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<AggregateStore> {
        &self.store
    }

    fn install(&mut self) -> Result<(), RenderError> {
        for source in [HEATMAP_SOURCE, CIRCLE_SOURCE] {
            if !self.surface.has_source(source) {
                self.surface.add_source(source, empty_feature_collection())?;
            }
        }
        if !self.surface.has_layer(HEATMAP_LAYER) {
            self.surface
                .add_layer(heatmap_layer(HEATMAP_LAYER, HEATMAP_SOURCE))?;
        }
        if !self.surface.has_layer(CIRCLE_LAYER) {
            self.surface
                .add_layer(circle_layer(CIRCLE_LAYER, CIRCLE_SOURCE))?;
        }
        self.surface
            .add_control(MapControl::Navigation, ControlPosition::TopRight);
        self.surface
            .add_control(MapControl::Fullscreen, ControlPosition::TopRight);

        self.installed = true;
        self.apply_mode()?;
        log::debug!("Installed map sources and layers in {} mode", self.mode);
        Ok(())
    }

    fn apply_mode(&mut self) -> Result<(), RenderError> {
        self.surface
            .set_layer_visibility(HEATMAP_LAYER, self.mode == LayerMode::Heatmap)?;
        self.surface
            .set_layer_visibility(CIRCLE_LAYER, self.mode == LayerMode::Circle)?;
        Ok(())
    }

    fn write(&mut self, i: usize) -> Result<(), RenderError> {
        if !self.installed {
            return Err(RenderError::RenderPrecondition);
        }
        let data = window_features(&self.store, i);
        self.surface.set_data(HEATMAP_SOURCE, data.clone())?;
        self.surface.set_data(CIRCLE_SOURCE, data)?;
        self.rendered = Some(i);
        Ok(())
    }
}

impl<S: MapSurface> ChangeObserver for RenderBinder<S> {
    fn on_change(&mut self, index: usize) {
        if let Err(e) = self.refresh(index) {
            log::error!("Failed to render window {index}: {e}");
        }
    }
}
