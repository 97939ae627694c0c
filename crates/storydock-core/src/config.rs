//! Engine configuration.
//!
//! Every tunable the layout, drag and logging layers read lives in one
//! [`StoryConfig`] that can be loaded from TOML or JSON at startup:
//!
//! ```toml
//! # storydock.toml
//! [layout]
//! min_region_size = 200
//! default_side_size = 240
//!
//! [drag]
//! cancel_timeout_ms = 300
//!
//! [logging]
//! filter = "storydock=debug"
//! json = false
//! ```
//!
//! Missing sections and keys fall back to [`StoryConfig::default`].

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Smallest size, in layout units, a visible side region may be rendered at.
pub const DEFAULT_MIN_REGION_SIZE: u16 = 200;

/// How long a drag gesture may stay open without hitting a drop target.
pub const DEFAULT_CANCEL_TIMEOUT_MS: u64 = 300;

const CANCEL_TIMEOUT_RANGE_MS: std::ops::RangeInclusive<u64> = 50..=5_000;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    pub layout: LayoutConfig,
    pub drag: DragConfig,
    pub logging: LoggingConfig,
}

/// Region sizing parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Lower bound enforced on every visible side region before rendering and
    /// on every resize.
    pub min_region_size: u16,
    /// Size assigned to a side region that has never been resized.
    pub default_side_size: u16,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_region_size: DEFAULT_MIN_REGION_SIZE,
            default_side_size: DEFAULT_MIN_REGION_SIZE,
        }
    }
}

/// Drag gesture parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Milliseconds after drag-start before an unaccepted gesture is cancelled.
    pub cancel_timeout_ms: u64,
}

impl DragConfig {
    #[must_use]
    pub const fn cancel_timeout(&self) -> Duration {
        Duration::from_millis(self.cancel_timeout_ms)
    }
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            cancel_timeout_ms: DEFAULT_CANCEL_TIMEOUT_MS,
        }
    }
}

/// Diagnostics output parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `STORYDOCK_LOG` is unset.
    pub filter: String,
    /// Emit newline-delimited JSON instead of human-readable lines.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            json: false,
        }
    }
}

/// Errors from loading a [`StoryConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl StoryConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validated()
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validated()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Check every parameter is within range.
    ///
    /// An empty list means the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.layout.min_region_size == 0 {
            errors.push("layout.min_region_size must be > 0".into());
        }
        if self.layout.default_side_size < self.layout.min_region_size {
            errors.push(format!(
                "layout.default_side_size ({}) must be >= layout.min_region_size ({})",
                self.layout.default_side_size, self.layout.min_region_size
            ));
        }
        if !CANCEL_TIMEOUT_RANGE_MS.contains(&self.drag.cancel_timeout_ms) {
            errors.push(format!(
                "drag.cancel_timeout_ms must be in {}..={}, got {}",
                CANCEL_TIMEOUT_RANGE_MS.start(),
                CANCEL_TIMEOUT_RANGE_MS.end(),
                self.drag.cancel_timeout_ms
            ));
        }
        if self.logging.filter.trim().is_empty() {
            errors.push("logging.filter must not be empty".into());
        }

        errors
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}
