//! Aggregate features to `GeoJSON`.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use pacify_aggregate::{AggregateFeature, AggregateStore};
use pacify_map::layer::COUNT_PROPERTY;

/// A point at `[lon, lat]` whose only property is `count`.
#[must_use]
pub fn to_point_feature(feature: &AggregateFeature) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert(COUNT_PROPERTY.to_string(), JsonValue::from(feature.count));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![feature.lon, feature.lat]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

#[must_use]
pub fn to_feature_collection(features: &[AggregateFeature]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: features.iter().map(to_point_feature).collect(),
        foreign_members: None,
    }
}

/// The collection written to both sources for window `i`.
///
/// Out-of-range ordinals yield an empty collection.
#[must_use]
pub fn window_features(store: &AggregateStore, i: usize) -> FeatureCollection {
    to_feature_collection(store.features_at(i))
}

#[cfg(test)]
mod tests {
    use pacify_aggregate::WindowKey;
    use serde_json::json;

    use super::*;

    #[test]
    fn point_carries_only_count() {
        let feature = AggregateFeature {
            window_key: WindowKey(1995, 1999),
            lat: 40.0,
            lon: -74.0,
            count: 3,
        };

        let value = serde_json::to_value(to_point_feature(&feature)).unwrap();
        assert_eq!(value["geometry"]["type"], "Point");
        assert_eq!(value["geometry"]["coordinates"], json!([-74.0, 40.0]));
        assert_eq!(value["properties"], json!({ "count": 3 }));
    }

    #[test]
    fn empty_input_gives_empty_collection() {
        let collection = to_feature_collection(&[]);
        assert!(collection.features.is_empty());

        let value = serde_json::to_value(&collection).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"], json!([]));
    }
}
