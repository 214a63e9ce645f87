//! Layer specifications for the two aggregate visualizations.
//!
//! Both layers draw point features carrying a single numeric `count`
//! property. The heatmap weights points by count and colors pixels by
//! density; the graduated-circle layer sizes and colors each cell by its
//! count.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::expression::Expression;

/// Feature property every paint rule reads.
pub const COUNT_PROPERTY: &str = "count";

/// Zoom above which the heatmap layer is not drawn.
pub const HEATMAP_MAX_ZOOM: f64 = 12.0;

/// `heatmap-weight` stops on `count`; saturates at 1 for cells of 100+.
pub const HEATMAP_WEIGHT_STOPS: [(f64, f64); 3] = [(0.0, 0.0), (1.0, 1.0), (100.0, 1.0)];

/// `heatmap-intensity` stops on zoom.
pub const HEATMAP_INTENSITY_STOPS: [(f64, f64); 3] = [(0.0, 0.3), (6.0, 0.8), (12.0, 1.2)];

/// `heatmap-radius` stops on zoom, in pixels.
pub const HEATMAP_RADIUS_STOPS: [(f64, f64); 3] = [(0.0, 2.0), (6.0, 20.0), (12.0, 40.0)];

/// `heatmap-color` ramp on density.
pub const HEATMAP_COLOR_STOPS: [(f64, &str); 7] = [
    (0.0, "rgba(33, 102, 172, 0)"),
    (0.1, "rgba(33, 102, 172, 0.4)"),
    (0.3, "rgb(0, 255, 255)"),
    (0.5, "rgb(0, 255, 0)"),
    (0.7, "rgb(255, 255, 0)"),
    (0.9, "rgb(255, 140, 0)"),
    (1.0, "rgb(255, 0, 0)"),
];

/// `circle-radius` stops on `sqrt(count)`, in pixels.
pub const CIRCLE_RADIUS_STOPS: [(f64, f64); 5] = [
    (0.0, 0.0),
    (1.0, 2.0),
    (10.0, 8.0),
    (100.0, 25.0),
    (1000.0, 50.0),
];

/// `circle-color` stops on `count`.
pub const CIRCLE_COLOR_STOPS: [(f64, &str); 6] = [
    (0.0, "#0066cc"),
    (1.0, "#00ccff"),
    (10.0, "#00ff00"),
    (100.0, "#ffff00"),
    (1000.0, "#ff6600"),
    (10000.0, "#ff0000"),
];

pub const CIRCLE_STROKE_WIDTH: f64 = 1.0;
pub const CIRCLE_STROKE_COLOR: &str = "rgba(255, 255, 255, 0.3)";
pub const CIRCLE_OPACITY: f64 = 0.7;

/// Kind of a style layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Heatmap,
    Circle,
}

/// Layout visibility of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    None,
}

impl From<bool> for Visibility {
    fn from(visible: bool) -> Self {
        if visible { Self::Visible } else { Self::None }
    }
}

/// Layout properties of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub visibility: Visibility,
}

/// A style layer drawing one source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSpec {
    /// Unique layer id.
    pub id: String,
    /// Layer type.
    #[serde(rename = "type")]
    pub kind: LayerKind,
    /// Name of the source the layer draws.
    pub source: String,
    /// Zoom above which the layer is hidden.
    #[serde(rename = "maxzoom", skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<f64>,
    /// Layout properties.
    pub layout: Layout,
    /// Paint properties keyed by style-spec name.
    pub paint: BTreeMap<String, Expression>,
}

impl LayerSpec {
    /// Whether the layer is currently visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.layout.visibility == Visibility::Visible
    }

    /// Looks up a paint property.
    #[must_use]
    pub fn paint_property(&self, name: &str) -> Option<&Expression> {
        self.paint.get(name)
    }
}

/// Builds the heatmap layer over `source`.
#[must_use]
pub fn heatmap_layer(id: &str, source: &str) -> LayerSpec {
    let count = || Expression::get(COUNT_PROPERTY);

    let paint = BTreeMap::from([
        (
            "heatmap-weight".to_string(),
            Expression::linear(count(), HEATMAP_WEIGHT_STOPS),
        ),
        (
            "heatmap-intensity".to_string(),
            Expression::linear(Expression::Zoom, HEATMAP_INTENSITY_STOPS),
        ),
        (
            "heatmap-radius".to_string(),
            Expression::linear(Expression::Zoom, HEATMAP_RADIUS_STOPS),
        ),
        (
            "heatmap-color".to_string(),
            Expression::linear(Expression::HeatmapDensity, HEATMAP_COLOR_STOPS),
        ),
    ]);

    LayerSpec {
        id: id.to_string(),
        kind: LayerKind::Heatmap,
        source: source.to_string(),
        max_zoom: Some(HEATMAP_MAX_ZOOM),
        layout: Layout {
            visibility: Visibility::Visible,
        },
        paint,
    }
}

/// Builds the graduated-circle layer over `source`.
#[must_use]
pub fn circle_layer(id: &str, source: &str) -> LayerSpec {
    let count = || Expression::get(COUNT_PROPERTY);

    let paint = BTreeMap::from([
        (
            "circle-radius".to_string(),
            Expression::linear(Expression::sqrt(count()), CIRCLE_RADIUS_STOPS),
        ),
        (
            "circle-color".to_string(),
            Expression::linear(count(), CIRCLE_COLOR_STOPS),
        ),
        (
            "circle-stroke-width".to_string(),
            Expression::Number(CIRCLE_STROKE_WIDTH),
        ),
        (
            "circle-stroke-color".to_string(),
            Expression::from(CIRCLE_STROKE_COLOR),
        ),
        (
            "circle-opacity".to_string(),
            Expression::Number(CIRCLE_OPACITY),
        ),
    ]);

    LayerSpec {
        id: id.to_string(),
        kind: LayerKind::Circle,
        source: source.to_string(),
        max_zoom: None,
        layout: Layout {
            visibility: Visibility::Visible,
        },
        paint,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::expression::EvalContext;

    fn eval_count(layer: &LayerSpec, property: &str, count: f64) -> f64 {
        let props = [(COUNT_PROPERTY, count)];
        layer
            .paint_property(property)
            .unwrap()
            .evaluate(&EvalContext::with_properties(&props))
            .unwrap()
    }

    #[test]
    fn heatmap_weight_saturates_at_one_hundred() {
        let layer = heatmap_layer("heatmap-layer", "heatmap-source");
        assert!(eval_count(&layer, "heatmap-weight", 0.0).abs() < 1e-9);
        assert!((eval_count(&layer, "heatmap-weight", 1.0) - 1.0).abs() < 1e-9);
        assert!((eval_count(&layer, "heatmap-weight", 100.0) - 1.0).abs() < 1e-9);
        assert!((eval_count(&layer, "heatmap-weight", 5000.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn heatmap_radius_and_intensity_follow_zoom() {
        let layer = heatmap_layer("heatmap-layer", "heatmap-source");
        let radius = layer.paint_property("heatmap-radius").unwrap();
        let intensity = layer.paint_property("heatmap-intensity").unwrap();

        assert_eq!(radius.evaluate(&EvalContext::at_zoom(0.0)), Some(2.0));
        assert_eq!(radius.evaluate(&EvalContext::at_zoom(12.0)), Some(40.0));
        let mid = intensity.evaluate(&EvalContext::at_zoom(6.0)).unwrap();
        assert!((mid - 0.8).abs() < 1e-9);
        assert_eq!(layer.max_zoom, Some(12.0));
    }

    #[test]
    fn circle_radius_grows_with_square_root_of_count() {
        let layer = circle_layer("circle-layer", "circle-source");
        assert!(eval_count(&layer, "circle-radius", 0.0).abs() < 1e-9);
        assert!((eval_count(&layer, "circle-radius", 1.0) - 2.0).abs() < 1e-9);
        assert!((eval_count(&layer, "circle-radius", 100.0) - 8.0).abs() < 1e-9);
        assert!((eval_count(&layer, "circle-radius", 10_000.0) - 25.0).abs() < 1e-9);
        assert!((eval_count(&layer, "circle-radius", 1_000_000.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn serializes_as_style_layer() {
        let layer = circle_layer("circle-layer", "circle-source");
        let value = serde_json::to_value(&layer).unwrap();

        assert_eq!(value["id"], json!("circle-layer"));
        assert_eq!(value["type"], json!("circle"));
        assert_eq!(value["source"], json!("circle-source"));
        assert_eq!(value["layout"]["visibility"], json!("visible"));
        assert_eq!(value["paint"]["circle-opacity"], json!(0.7));
        assert_eq!(
            value["paint"]["circle-color"],
            json!([
                "interpolate", ["linear"], ["get", "count"],
                0.0, "#0066cc", 1.0, "#00ccff", 10.0, "#00ff00",
                100.0, "#ffff00", 1000.0, "#ff6600", 10000.0, "#ff0000"
            ])
        );
        assert!(value.get("maxzoom").is_none());
    }
}
