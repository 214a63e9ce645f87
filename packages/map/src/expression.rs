//! Data-driven paint expressions.
//!
//! A small typed subset of the `MapLibre` style expression language:
//! literals, `get`, `sqrt`, `zoom`, `heatmap-density` and linear
//! `interpolate`. Expressions serialize to the JSON array form the style
//! spec expects and can be evaluated numerically for a given feature
//! context.

use serde::{Serialize, Serializer};
use serde_json::{Value, json};

/// A paint expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A numeric literal.
    Number(f64),
    /// A CSS color literal.
    Color(String),
    /// Reads a numeric feature property.
    Get(String),
    /// Square root of the inner expression.
    Sqrt(Box<Self>),
    /// The current map zoom.
    Zoom,
    /// The kernel density estimate of a heatmap pixel, in `[0, 1]`.
    HeatmapDensity,
    /// Linear interpolation of `input` over ascending `(stop, output)` pairs.
    Interpolate {
        /// Expression producing the interpolation input.
        input: Box<Self>,
        /// Ascending stops and the output at each stop.
        stops: Vec<(f64, Self)>,
    },
}

impl Expression {
    /// `["get", property]`.
    #[must_use]
    pub fn get(property: &str) -> Self {
        Self::Get(property.to_string())
    }

    /// `["sqrt", input]`.
    #[must_use]
    pub fn sqrt(input: Self) -> Self {
        Self::Sqrt(Box::new(input))
    }

    /// `["interpolate", ["linear"], input, stop, output, ...]`.
    #[must_use]
    pub fn linear<O: Into<Self>>(input: Self, stops: impl IntoIterator<Item = (f64, O)>) -> Self {
        Self::Interpolate {
            input: Box::new(input),
            stops: stops.into_iter().map(|(s, o)| (s, o.into())).collect(),
        }
    }

    /// Renders the expression in style-spec JSON form.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Number(n) => json!(n),
            Self::Color(c) => json!(c),
            Self::Get(property) => json!(["get", property]),
            Self::Sqrt(input) => json!(["sqrt", input.to_json()]),
            Self::Zoom => json!(["zoom"]),
            Self::HeatmapDensity => json!(["heatmap-density"]),
            Self::Interpolate { input, stops } => {
                let mut parts = vec![json!("interpolate"), json!(["linear"]), input.to_json()];
                for (stop, output) in stops {
                    parts.push(json!(stop));
                    parts.push(output.to_json());
                }
                Value::Array(parts)
            }
        }
    }

    /// Evaluates a numeric expression.
    ///
    /// Returns `None` for color outputs and for properties missing from
    /// the context.
    #[must_use]
    pub fn evaluate(&self, ctx: &EvalContext<'_>) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Color(_) => None,
            Self::Get(property) => ctx.property(property),
            Self::Sqrt(input) => input.evaluate(ctx).map(f64::sqrt),
            Self::Zoom => Some(ctx.zoom),
            Self::HeatmapDensity => Some(ctx.heatmap_density),
            Self::Interpolate { input, stops } => {
                let x = input.evaluate(ctx)?;
                interpolate(x, stops, ctx)
            }
        }
    }
}

fn interpolate(x: f64, stops: &[(f64, Expression)], ctx: &EvalContext<'_>) -> Option<f64> {
    let (first, last) = (stops.first()?, stops.last()?);
    if x <= first.0 {
        return first.1.evaluate(ctx);
    }
    if x >= last.0 {
        return last.1.evaluate(ctx);
    }

    stops.windows(2).find_map(|pair| {
        let ((lo, lo_out), (hi, hi_out)) = (&pair[0], &pair[1]);
        if x < *lo || x > *hi {
            return None;
        }
        let (a, b) = (lo_out.evaluate(ctx)?, hi_out.evaluate(ctx)?);
        let t = if (hi - lo).abs() < f64::EPSILON {
            0.0
        } else {
            (x - lo) / (hi - lo)
        };
        Some(t.mul_add(b - a, a))
    })
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Expression {
    fn from(value: &str) -> Self {
        Self::Color(value.to_string())
    }
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Inputs available when evaluating an expression for one feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvalContext<'a> {
    /// Current map zoom.
    pub zoom: f64,
    /// Heatmap density at the pixel being colored.
    pub heatmap_density: f64,
    /// Numeric feature properties.
    pub properties: &'a [(&'a str, f64)],
}

impl<'a> EvalContext<'a> {
    /// Context for a feature with the given numeric properties.
    #[must_use]
    pub const fn with_properties(properties: &'a [(&'a str, f64)]) -> Self {
        Self {
            zoom: 0.0,
            heatmap_density: 0.0,
            properties,
        }
    }

    /// Context at a given zoom with no feature properties.
    #[must_use]
    pub const fn at_zoom(zoom: f64) -> Self {
        Self {
            zoom,
            heatmap_density: 0.0,
            properties: &[],
        }
    }

    fn property(&self, name: &str) -> Option<f64> {
        self.properties
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_interpolate_in_style_spec_form() {
        let expr = Expression::linear(Expression::sqrt(Expression::get("count")), [(0.0, 0.0), (1.0, 2.0)]);
        assert_eq!(
            expr.to_json(),
            json!(["interpolate", ["linear"], ["sqrt", ["get", "count"]], 0.0, 0.0, 1.0, 2.0])
        );
        assert_eq!(serde_json::to_value(&expr).unwrap(), expr.to_json());
    }

    #[test]
    fn interpolates_linearly_and_clamps_at_the_ends() {
        let expr = Expression::linear(Expression::Zoom, [(0.0, 2.0), (6.0, 20.0), (12.0, 40.0)]);

        let at = |zoom| expr.evaluate(&EvalContext::at_zoom(zoom)).unwrap();
        assert!((at(-1.0) - 2.0).abs() < 1e-9);
        assert!((at(3.0) - 11.0).abs() < 1e-9);
        assert!((at(6.0) - 20.0).abs() < 1e-9);
        assert!((at(9.0) - 30.0).abs() < 1e-9);
        assert!((at(20.0) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn missing_property_does_not_evaluate() {
        let expr = Expression::get("count");
        assert_eq!(expr.evaluate(&EvalContext::default()), None);
        assert_eq!(
            expr.evaluate(&EvalContext::with_properties(&[("count", 4.0)])),
            Some(4.0)
        );
    }

    #[test]
    fn color_outputs_do_not_evaluate_numerically() {
        let expr = Expression::linear(Expression::get("count"), [(0.0, "#000000"), (1.0, "#ffffff")]);
        assert_eq!(
            expr.evaluate(&EvalContext::with_properties(&[("count", 0.5)])),
            None
        );
    }
}
