//! `pacify inspect`: summarises an aggregates payload.

use std::fmt::Write as _;

use pacify_aggregate::{AggregateSource, AggregateStore, LoadError};
use pacify_cli_utils::{IndicatifProgress, MultiProgress};

/// Loads the payload at `source` and prints its windows.
///
/// # Errors
///
/// Returns [`LoadError`] if the payload cannot be loaded.
pub async fn run(multi: &MultiProgress, source: &AggregateSource) -> Result<(), LoadError> {
    let progress = IndicatifProgress::fetch_bar(multi, &format!("Loading {source}"));
    let store = AggregateStore::load_with_progress(source, progress).await?;

    print!("{}", report(&store));
    Ok(())
}

/// One line of dataset metadata followed by one line per window.
#[must_use]
pub fn report(store: &AggregateStore) -> String {
    let mut out = String::new();

    let grid = store
        .grid()
        .map_or_else(|| "unknown".to_string(), ToString::to_string);
    let resolution = store
        .resolution()
        .map_or_else(String::new, |r| format!(" (resolution {r})"));
    let _ = writeln!(
        out,
        "{} windows, {} cells, grid {grid}{resolution}",
        store.window_index().size(),
        store.feature_count(),
    );

    for (i, window) in store.window_index().iter().enumerate() {
        let _ = writeln!(
            out,
            "  [{i}] {window}: {} cells, {} incidents",
            store.features_at(i).len(),
            store.total_at(i),
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_every_window() {
        let payload = r#"{
            "meta": { "windows": [ { "start": 1995, "end": 1999 }, { "start": 2000, "end": 2004 } ], "grid": "bin", "resolution": 0.5 },
            "features": [
                { "w": [1995, 1999], "lat": 40.0, "lon": -74.0, "n": 3 },
                { "w": [2000, 2004], "lat": 34.0, "lon": -118.0, "n": 7 }
            ]
        }"#;
        let store = AggregateStore::from_slice(payload.as_bytes()).unwrap();

        assert_eq!(
            report(&store),
            "2 windows, 2 cells, grid bin (resolution 0.5)\n\
             \x20 [0] 1995–1999: 1 cells, 3 incidents\n\
             \x20 [1] 2000–2004: 1 cells, 7 incidents\n"
        );
    }
}
