#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Window-indexed aggregate store.
//!
//! Loads the `aggregates.json` payload once, validates it, and indexes the
//! features by time window so that selecting a window never scans the full
//! feature set. The store is immutable after loading; the [`WindowIndex`]
//! derived from it provides ordinal navigation over the windows.

pub mod progress;
pub mod source;
pub mod store;
pub mod window_index;

pub use pacify_aggregate_models::{
    AggregateFeature, AggregatePayload, DatasetMeta, GridKind, Window, WindowKey,
};
pub use source::AggregateSource;
pub use store::AggregateStore;
pub use window_index::WindowIndex;

/// Errors that can occur while loading the aggregate payload.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Transport-level failure reading the payload.
    #[error("Failed to fetch aggregates from {location}: {message}")]
    FetchFailed {
        /// File path or URL that was being fetched.
        location: String,
        /// Description of the transport failure.
        message: String,
    },

    /// The payload is not valid UTF-8 JSON.
    #[error("Aggregate payload is not valid JSON: {0}")]
    ParseFailed(#[source] ParseError),

    /// The payload is valid JSON but does not match the expected schema.
    #[error("Aggregate payload violates the schema: {message}")]
    SchemaInvalid {
        /// Description of the violation.
        message: String,
    },

    /// The payload declares no time windows, so there is nothing to show.
    #[error("Aggregate payload contains no time windows")]
    EmptyDataset,
}

/// Why a payload could not be read as a JSON document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl LoadError {
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::SchemaInvalid {
            message: message.into(),
        }
    }
}
