//! Session configuration.
//!
//! Read from an optional TOML file, then overridden by `PACIFY_*`
//! environment variables.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use pacify_aggregate::AggregateSource;
use pacify_aggregate::source::DEFAULT_AGGREGATES_PATH;
use pacify_render::LayerMode;
use pacify_timeline::DEFAULT_TICK_MS;
use serde::{Deserialize, Serialize};

pub const AGGREGATES_ENV: &str = "PACIFY_AGGREGATES";
pub const TICK_MS_ENV: &str = "PACIFY_TICK_MS";
pub const MODE_ENV: &str = "PACIFY_MODE";

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A setting has a value that cannot be used.
    #[error("Invalid value for {key}: {value:?} ({message})")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

/// Settings of one dashboard session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// File path or `http(s)://` URL of the aggregate payload.
    pub aggregates: String,
    /// Playback tick interval in milliseconds.
    pub tick_ms: u64,
    /// Visualization shown when the session starts.
    pub default_mode: LayerMode,
    /// Start playing as soon as the dataset is ready.
    pub autoplay: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            aggregates: DEFAULT_AGGREGATES_PATH.to_string(),
            tick_ms: DEFAULT_TICK_MS,
            default_mode: LayerMode::default(),
            autoplay: false,
        }
    }
}

impl DashboardConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::InvalidValue`] for out-of-range settings.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise see
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Loads the optional file at `path` (defaults otherwise) and applies
    /// `PACIFY_*` environment overrides.
    ///
    /// # Errors
    ///
    /// See [`from_file`](Self::from_file) and [`apply_env`](Self::apply_env).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up by environment variable name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if an override cannot be
    /// parsed or leaves the configuration invalid.
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(aggregates) = lookup(AGGREGATES_ENV) {
            self.aggregates = aggregates;
        }
        if let Some(tick_ms) = lookup(TICK_MS_ENV) {
            self.tick_ms = tick_ms
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| invalid(TICK_MS_ENV, &tick_ms, e))?;
        }
        if let Some(mode) = lookup(MODE_ENV) {
            self.default_mode = LayerMode::from_str(mode.trim())
                .map_err(|_| invalid(MODE_ENV, &mode, "expected heatmap or circle"))?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Checks settings that the type system does not.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an empty payload location
    /// or a zero tick interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(invalid("tick_ms", "0", "must be greater than zero"));
        }
        if self.aggregates.trim().is_empty() {
            return Err(invalid("aggregates", &self.aggregates, "must not be empty"));
        }
        Ok(())
    }

    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    #[must_use]
    pub fn source(&self) -> AggregateSource {
        AggregateSource::parse(&self.aggregates)
    }
}

fn invalid(key: &str, value: &str, message: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}
