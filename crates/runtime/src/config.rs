//! Runtime configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sohl_content::{ConfigLoader, ContentFactory};
use sohl_core::SohlConfig;

use crate::error::{Result, RuntimeError};

/// Session settings plus the runtime's own knobs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub sohl: SohlConfig,
    /// Filter directive used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl RuntimeConfig {
    pub const DEFAULT_LOG_FILTER: &'static str = "info";

    pub fn new(sohl: SohlConfig) -> Self {
        Self {
            sohl,
            log_filter: Self::DEFAULT_LOG_FILTER.to_string(),
        }
    }

    /// Loads the session settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let sohl =
            ConfigLoader::load(path).map_err(|e| RuntimeError::Content(format!("{e:#}")))?;
        Ok(Self::new(sohl))
    }

    /// Loads the session settings of a content directory, falling back to the
    /// embedded defaults.
    pub fn from_content(factory: &ContentFactory) -> Result<Self> {
        let sohl = factory
            .load_config_or_default()
            .map_err(|e| RuntimeError::Content(format!("{e:#}")))?;
        Ok(Self::new(sohl))
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(SohlConfig::default())
    }
}
