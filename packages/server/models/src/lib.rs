#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API response types for the pacify map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the aggregate store types to allow independent evolution of the
//! API contract.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// One time window as listed by `GET /api/windows`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiWindow {
    /// Ordinal of the window, usable as a slider value.
    pub index: usize,
    /// First year of the window.
    pub start: i64,
    /// Last year of the window.
    pub end: i64,
    /// `"<start>–<end>"`.
    pub label: String,
    /// Sum of all cell counts in the window.
    pub total: u64,
    /// Number of non-empty cells in the window.
    pub feature_count: usize,
}

/// Dataset summary returned by `GET /api/meta`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMeta {
    /// Number of windows.
    pub window_count: usize,
    /// Number of cells across all windows.
    pub feature_count: usize,
    /// Grid the cells were binned into (`h3`, `bin`, ...), if recorded.
    pub grid: Option<String>,
    /// Grid resolution, if recorded.
    pub resolution: Option<f64>,
}

/// Error body for non-success responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error message.
    pub error: String,
}

impl ApiError {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_uses_camel_case() {
        let window = ApiWindow {
            index: 0,
            start: 1995,
            end: 1999,
            label: "1995–1999".to_string(),
            total: 3,
            feature_count: 1,
        };
        let value = serde_json::to_value(&window).unwrap();
        assert_eq!(value["featureCount"], 1);
        assert_eq!(value["label"], "1995–1999");
    }
}
