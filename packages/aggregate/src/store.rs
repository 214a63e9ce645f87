//! The immutable, window-indexed feature store.

use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;

use pacify_aggregate_models::{AggregateFeature, AggregatePayload, GridKind, Window, WindowKey};
use serde::de::IgnoredAny;

use crate::LoadError;
use crate::progress::{ProgressCallback, null_progress};
use crate::source::AggregateSource;
use crate::window_index::WindowIndex;

/// Loaded aggregate dataset, indexed by time window.
///
/// Features are stored contiguously grouped by window, so
/// [`features_for`](Self::features_for) is a slice lookup and never scans
/// other windows. Nothing mutates the store after construction.
#[derive(Debug)]
pub struct AggregateStore {
    index: WindowIndex,
    features: Vec<AggregateFeature>,
    /// Per-window slice of `features`, parallel to `index`.
    ranges: Vec<Range<usize>>,
    /// Per-window `Σ count`, parallel to `index`.
    totals: Vec<u64>,
    grid: Option<GridKind>,
    resolution: Option<f64>,
}

impl AggregateStore {
    /// Fetches, parses and validates the payload at `source`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the payload cannot be fetched, is not JSON,
    /// violates the schema, or declares no windows.
    pub async fn load(source: &AggregateSource) -> Result<Self, LoadError> {
        Self::load_with_progress(source, null_progress()).await
    }

    /// Like [`load`](Self::load), reporting fetch progress to `progress`.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub async fn load_with_progress(
        source: &AggregateSource,
        progress: Arc<dyn ProgressCallback>,
    ) -> Result<Self, LoadError> {
        log::info!("Loading aggregates from {source}");

        let result = async {
            let bytes = source.fetch(progress.as_ref()).await?;
            progress.set_message(format!("Indexing {} bytes", bytes.len()));
            Self::from_slice(&bytes)
        }
        .await;

        match &result {
            Ok(store) => {
                progress.finish(format!(
                    "Loaded {} features across {} windows",
                    store.feature_count(),
                    store.index.size()
                ));
                log::info!(
                    "Loaded {} features across {} windows from {source}",
                    store.feature_count(),
                    store.index.size()
                );
            }
            Err(e) => {
                progress.finish(format!("Failed to load {source}"));
                log::warn!("Failed to load aggregates from {source}: {e}");
            }
        }

        result
    }

    /// Parses and validates a raw `aggregates.json` document.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ParseFailed`] for non-UTF-8 input or malformed
    /// JSON and
    /// [`LoadError::SchemaInvalid`] / [`LoadError::EmptyDataset`] as
    /// described in [`from_payload`](Self::from_payload).
    pub fn from_slice(bytes: &[u8]) -> Result<Self, LoadError> {
        // IgnoredAny skips string contents unchecked, so decode the whole
        // document up front.
        let text = std::str::from_utf8(bytes).map_err(|e| LoadError::ParseFailed(e.into()))?;

        // Syntax check first so structural mismatches are never reported as
        // parse failures and vice versa.
        serde_json::from_str::<IgnoredAny>(text).map_err(|e| LoadError::ParseFailed(e.into()))?;

        let payload: AggregatePayload =
            serde_json::from_str(text).map_err(|e| LoadError::schema(e.to_string()))?;

        Self::from_payload(payload)
    }

    /// Validates a decoded payload and builds the window index.
    ///
    /// # Errors
    ///
    /// * [`LoadError::EmptyDataset`] if `meta.windows` is empty.
    /// * [`LoadError::SchemaInvalid`] if a window has `start > end`, the
    ///   windows are not strictly increasing and non-overlapping, or a
    ///   feature references a window not listed in `meta.windows`.
    pub fn from_payload(payload: AggregatePayload) -> Result<Self, LoadError> {
        let AggregatePayload { meta, features } = payload;

        if meta.windows.is_empty() {
            return Err(LoadError::EmptyDataset);
        }
        validate_windows(&meta.windows)?;

        let index = WindowIndex::new(meta.windows);

        let mut positioned = Vec::with_capacity(features.len());
        let mut dropped = 0_usize;
        for (i, feature) in features.into_iter().enumerate() {
            let Some(position) = index.index_of(feature.window_key) else {
                return Err(LoadError::schema(format!(
                    "feature {i} references window {} which is not in meta.windows",
                    feature.window_key
                )));
            };
            if feature.count == 0 {
                dropped += 1;
                continue;
            }
            positioned.push((position, feature));
        }
        if dropped > 0 {
            log::debug!("Dropped {dropped} zero-count features");
        }

        // Stable, so producer order is kept within a window.
        positioned.sort_by_key(|(position, _)| *position);

        let mut ranges = Vec::with_capacity(index.size());
        let mut totals = Vec::with_capacity(index.size());
        let mut features = Vec::with_capacity(positioned.len());
        let mut cursor = positioned.into_iter().peekable();
        for window in 0..index.size() {
            let start = features.len();
            let mut total = 0_u64;
            while let Some((_, feature)) = cursor.next_if(|(position, _)| *position == window) {
                total = total.saturating_add(feature.count);
                features.push(feature);
            }
            ranges.push(start..features.len());
            totals.push(total);
        }

        Ok(Self {
            index,
            features,
            ranges,
            totals,
            grid: meta.grid,
            resolution: meta.resolution,
        })
    }

    /// The ordered windows.
    #[must_use]
    pub fn windows(&self) -> &[Window] {
        self.index.as_slice()
    }

    /// The window index derived from this store.
    #[must_use]
    pub const fn window_index(&self) -> &WindowIndex {
        &self.index
    }

    /// All features of the window with the given key.
    ///
    /// Unknown keys yield an empty slice.
    #[must_use]
    pub fn features_for(&self, key: WindowKey) -> &[AggregateFeature] {
        self.index
            .index_of(key)
            .map(|i| self.features_at(i))
            .unwrap_or_default()
    }

    /// All features of the window at ordinal `i`.
    #[must_use]
    pub fn features_at(&self, i: usize) -> &[AggregateFeature] {
        self.ranges
            .get(i)
            .and_then(|range| self.features.get(range.clone()))
            .unwrap_or(&[])
    }

    /// `Σ count` over the window at ordinal `i`, or `0` if out of range.
    #[must_use]
    pub fn total_at(&self, i: usize) -> u64 {
        self.totals.get(i).copied().unwrap_or(0)
    }

    /// `Σ count` over the window with the given key.
    #[must_use]
    pub fn total_for(&self, key: WindowKey) -> u64 {
        self.index.index_of(key).map_or(0, |i| self.total_at(i))
    }

    /// Number of features across all windows.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Grid the producer binned incidents into, if recorded.
    #[must_use]
    pub const fn grid(&self) -> Option<&GridKind> {
        self.grid.as_ref()
    }

    /// Grid resolution, if recorded.
    #[must_use]
    pub const fn resolution(&self) -> Option<f64> {
        self.resolution
    }
}

fn validate_windows(windows: &[Window]) -> Result<(), LoadError> {
    let mut seen = HashSet::with_capacity(windows.len());

    for (i, window) in windows.iter().enumerate() {
        if !window.is_well_formed() {
            return Err(LoadError::schema(format!(
                "window {i} has start {} after end {}",
                window.start, window.end
            )));
        }
        if !seen.insert(window.key()) {
            return Err(LoadError::schema(format!("window {window} is listed twice")));
        }
    }

    for (i, pair) in windows.windows(2).enumerate() {
        let (prev, next) = (pair[0], pair[1]);
        if next.start <= prev.start || prev.overlaps(next) {
            return Err(LoadError::schema(format!(
                "windows {i} ({prev}) and {} ({next}) are out of order or overlap",
                i + 1
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseError;

    const TWO_WINDOWS: &str = r#"{
        "meta": { "windows": [ { "start": 1995, "end": 1999 }, { "start": 2000, "end": 2004 } ] },
        "features": [
            { "w": [1995, 1999], "lat": 40.0, "lon": -74.0, "n": 3 },
            { "w": [2000, 2004], "lat": 34.0, "lon": -118.0, "n": 7 }
        ]
    }"#;

    #[test]
    fn loads_and_indexes_by_window() {
        let store = AggregateStore::from_slice(TWO_WINDOWS.as_bytes()).unwrap();

        assert_eq!(store.windows().len(), 2);
        assert_eq!(store.feature_count(), 2);

        let first = store.features_for(WindowKey(1995, 1999));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].count, 3);
        assert!((first[0].lon - -74.0).abs() < f64::EPSILON);

        assert_eq!(store.total_at(0), 3);
        assert_eq!(store.total_for(WindowKey(2000, 2004)), 7);
    }

    #[test]
    fn every_feature_references_a_known_window() {
        let store = AggregateStore::from_slice(TWO_WINDOWS.as_bytes()).unwrap();
        for i in 0..store.window_index().size() {
            let window = store.window_index().at(i).unwrap();
            for feature in store.features_at(i) {
                assert_eq!(feature.window_key, window.key());
            }
        }
    }

    #[test]
    fn groups_interleaved_features_per_window() {
        let json = r#"{
            "meta": { "windows": [ { "start": 1, "end": 1 }, { "start": 2, "end": 2 } ] },
            "features": [
                { "w": [2, 2], "lat": 1.0, "lon": 1.0, "n": 1 },
                { "w": [1, 1], "lat": 2.0, "lon": 2.0, "n": 2 },
                { "w": [2, 2], "lat": 3.0, "lon": 3.0, "n": 4 }
            ]
        }"#;
        let store = AggregateStore::from_slice(json.as_bytes()).unwrap();

        assert_eq!(store.features_at(0).len(), 1);
        let second: Vec<u64> = store.features_at(1).iter().map(|f| f.count).collect();
        assert_eq!(second, vec![1, 4]);
        assert_eq!(store.total_at(1), 5);
    }

    #[test]
    fn unknown_window_key_is_a_schema_violation() {
        let json = r#"{
            "meta": { "windows": [ { "start": 1995, "end": 1999 } ] },
            "features": [ { "w": [2030, 2034], "lat": 40.0, "lon": -74.0, "n": 1 } ]
        }"#;
        let err = AggregateStore::from_slice(json.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::SchemaInvalid { .. }), "{err}");
    }

    #[test]
    fn missing_windows_is_a_schema_violation() {
        let json = r#"{ "meta": {}, "features": [] }"#;
        let err = AggregateStore::from_slice(json.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::SchemaInvalid { .. }), "{err}");
    }

    #[test]
    fn non_numeric_count_is_a_schema_violation() {
        let json = r#"{
            "meta": { "windows": [ { "start": 1995, "end": 1999 } ] },
            "features": [ { "w": [1995, 1999], "lat": 40.0, "lon": -74.0, "n": "three" } ]
        }"#;
        let err = AggregateStore::from_slice(json.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::SchemaInvalid { .. }), "{err}");
    }

    #[test]
    fn invalid_json_is_a_parse_failure() {
        let err = AggregateStore::from_slice(b"{ \"meta\": ").unwrap_err();
        assert!(matches!(err, LoadError::ParseFailed(_)), "{err}");
    }

    #[test]
    fn invalid_utf8_is_a_parse_failure() {
        let ignored_field = b"{\"meta\":{\"windows\":[{\"start\":1995,\"end\":1999}]},\"features\":[],\"note\":\"\xff\xfe\"}";
        let err = AggregateStore::from_slice(ignored_field).unwrap_err();
        assert!(
            matches!(err, LoadError::ParseFailed(ParseError::Utf8(_))),
            "{err}"
        );

        let typed_field = b"{\"meta\":{\"grid\":\"\xff\xfe\",\"windows\":[{\"start\":1995,\"end\":1999}]},\"features\":[]}";
        let err = AggregateStore::from_slice(typed_field).unwrap_err();
        assert!(
            matches!(err, LoadError::ParseFailed(ParseError::Utf8(_))),
            "{err}"
        );
    }

    #[test]
    fn empty_window_list_is_an_empty_dataset() {
        let json = r#"{ "meta": { "windows": [] }, "features": [] }"#;
        let err = AggregateStore::from_slice(json.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::EmptyDataset), "{err}");
    }

    #[test]
    fn rejects_overlapping_or_unordered_windows() {
        for windows in [
            r#"[ { "start": 2000, "end": 2004 }, { "start": 1995, "end": 1999 } ]"#,
            r#"[ { "start": 1995, "end": 2000 }, { "start": 2000, "end": 2004 } ]"#,
            r#"[ { "start": 1999, "end": 1995 } ]"#,
            r#"[ { "start": 1995, "end": 1999 }, { "start": 1995, "end": 1999 } ]"#,
        ] {
            let json = format!(r#"{{ "meta": {{ "windows": {windows} }}, "features": [] }}"#);
            let err = AggregateStore::from_slice(json.as_bytes()).unwrap_err();
            assert!(matches!(err, LoadError::SchemaInvalid { .. }), "{windows}: {err}");
        }
    }

    #[test]
    fn drops_zero_count_features() {
        let json = r#"{
            "meta": { "windows": [ { "start": 1995, "end": 1999 } ] },
            "features": [
                { "w": [1995, 1999], "lat": 40.0, "lon": -74.0, "n": 0 },
                { "w": [1995, 1999], "lat": 41.0, "lon": -75.0, "n": 2 }
            ]
        }"#;
        let store = AggregateStore::from_slice(json.as_bytes()).unwrap();
        assert_eq!(store.features_at(0).len(), 1);
        assert_eq!(store.total_at(0), 2);
    }

    #[test]
    fn window_without_features_yields_empty_slice() {
        let json = r#"{
            "meta": { "windows": [ { "start": 1995, "end": 1999 }, { "start": 2000, "end": 2004 } ] },
            "features": [ { "w": [2000, 2004], "lat": 34.0, "lon": -118.0, "n": 7 } ]
        }"#;
        let store = AggregateStore::from_slice(json.as_bytes()).unwrap();
        assert!(store.features_at(0).is_empty());
        assert_eq!(store.total_at(0), 0);
        assert!(store.features_at(9).is_empty());
        assert!(store.features_for(WindowKey(1, 2)).is_empty());
    }

    #[test]
    fn keeps_grid_metadata() {
        let json = r#"{
            "meta": { "grid": "bin", "resolution": 0.1, "windows": [ { "start": 1995, "end": 1997 } ] },
            "features": []
        }"#;
        let store = AggregateStore::from_slice(json.as_bytes()).unwrap();
        assert_eq!(store.grid(), Some(&GridKind::Bin));
        assert!((store.resolution().unwrap() - 0.1).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn loads_payload_from_file() {
        let path = std::env::temp_dir().join(format!(
            "pacify_aggregate_store_load_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, TWO_WINDOWS).unwrap();

        let store = AggregateStore::load(&AggregateSource::File(path.clone()))
            .await
            .unwrap();
        assert_eq!(store.window_index().size(), 2);

        let _ = std::fs::remove_file(&path);
    }
}
