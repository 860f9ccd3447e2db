//! Engine settings.
//!
//! Settings are read once, typically at process start, and then shared
//! read-only by every classification. Two environment variables can override
//! the defaults:
//!
//! - `MAX_ERROR_DEPTH`: maximum number of leaves and attributes kept per error
//! - `ERROR_SEPERATOR`: separator placed between leaves when rendering

use config::{Config, ConfigError, Environment, Map};
use serde::Deserialize;
use thiserror::Error;

/// Default bound on leaves, attributes and decomposition depth.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Default separator between rendered leaves.
pub const DEFAULT_SEPARATOR: &str = "; ";

/// Environment variable overriding [`Settings::max_depth`].
pub const MAX_DEPTH_VAR: &str = "MAX_ERROR_DEPTH";

/// Environment variable overriding [`Settings::separator`].
pub const SEPARATOR_VAR: &str = "ERROR_SEPERATOR";

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A value could not be parsed.
    #[error("failed to parse settings: {0}")]
    Parse(#[from] ConfigError),

    /// The depth bound must keep at least one leaf.
    #[error("MAX_ERROR_DEPTH must be at least 1, got {0}")]
    InvalidDepth(usize),
}

/// Immutable engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Maximum number of leaves and attributes kept per error.
    #[serde(rename = "max_error_depth")]
    pub max_depth: usize,
    /// Separator placed between leaves when rendering.
    #[serde(rename = "error_seperator")]
    pub separator: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl Settings {
    /// Create settings with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the depth bound.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the leaf separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Load settings from the process environment.
    ///
    /// Only [`MAX_DEPTH_VAR`] and [`SEPARATOR_VAR`] are consulted; unset
    /// variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `MAX_ERROR_DEPTH` is not a positive integer.
    pub fn from_env() -> Result<Self, SettingsError> {
        let vars: Map<String, String> = [MAX_DEPTH_VAR, SEPARATOR_VAR]
            .into_iter()
            .filter_map(|name| std::env::var(name).ok().map(|value| (name.to_string(), value)))
            .collect();
        Self::from_vars(vars)
    }

    /// Load settings from an explicit set of environment-style variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `MAX_ERROR_DEPTH` is not a positive integer.
    pub fn from_vars(vars: Map<String, String>) -> Result<Self, SettingsError> {
        let config = Config::builder()
            .set_default("max_error_depth", DEFAULT_MAX_DEPTH as i64)?
            .set_default("error_seperator", DEFAULT_SEPARATOR)?
            .add_source(Environment::default().source(Some(vars)).try_parsing(true))
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()
    }

    fn validate(self) -> Result<Self, SettingsError> {
        if self.max_depth == 0 {
            return Err(SettingsError::InvalidDepth(self.max_depth));
        }
        Ok(self)
    }
}
