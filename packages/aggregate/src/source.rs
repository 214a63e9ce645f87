//! Where the aggregate payload comes from.
//!
//! A payload location is either a local file or an `http(s)://` URL. Both
//! are read fully into memory; the payload is small enough (tens of MB at
//! most) that streaming the parse is not worth it.

use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::LoadError;
use crate::progress::ProgressCallback;

/// Default payload path written by the aggregation pipeline.
pub const DEFAULT_AGGREGATES_PATH: &str = "dist/aggregates.json";

/// Location of an `aggregates.json` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateSource {
    /// A file on the local filesystem.
    File(PathBuf),
    /// A remote document fetched over HTTP(S).
    Url(String),
}

impl AggregateSource {
    /// Interprets `location` as a URL when it has an `http://` or
    /// `https://` scheme and as a file path otherwise.
    #[must_use]
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }

    /// Reads the raw payload bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::FetchFailed`] if the file cannot be read, the
    /// HTTP request fails, or the server answers with a non-success status.
    pub async fn fetch(&self, progress: &dyn ProgressCallback) -> Result<Vec<u8>, LoadError> {
        progress.set_message(format!("Fetching {self}"));

        match self {
            Self::File(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| self.fetch_failed(e))?;
                progress.set_total(bytes.len() as u64);
                progress.inc(bytes.len() as u64);
                Ok(bytes)
            }
            Self::Url(url) => {
                let mut response = reqwest::get(url.as_str())
                    .await
                    .and_then(reqwest::Response::error_for_status)
                    .map_err(|e| self.fetch_failed(e))?;

                if let Some(len) = response.content_length() {
                    progress.set_total(len);
                }

                let mut bytes = Vec::new();
                while let Some(chunk) = response.chunk().await.map_err(|e| self.fetch_failed(e))? {
                    progress.inc(chunk.len() as u64);
                    bytes.extend_from_slice(&chunk);
                }
                Ok(bytes)
            }
        }
    }

    fn fetch_failed(&self, error: impl fmt::Display) -> LoadError {
        LoadError::FetchFailed {
            location: self.to_string(),
            message: error.to_string(),
        }
    }
}

impl Default for AggregateSource {
    fn default() -> Self {
        Self::File(PathBuf::from(DEFAULT_AGGREGATES_PATH))
    }
}

impl fmt::Display for AggregateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

impl FromStr for AggregateSource {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
