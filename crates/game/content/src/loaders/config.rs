//! Session configuration loader.

use std::path::Path;

use sohl_core::SohlConfig;

use crate::loaders::{LoadResult, read_file};

/// Configuration shipped with the crate.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../data/config.toml");

/// Loader for session configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys fall back to [`SohlConfig::default`].
    pub fn load(path: &Path) -> LoadResult<SohlConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
    }

    /// Parse config data from TOML text.
    pub fn parse(content: &str) -> LoadResult<SohlConfig> {
        let config: SohlConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.id_length == 0 {
            anyhow::bail!("id_length must be at least 1");
        }
        if config.schema_version.is_empty() {
            anyhow::bail!("schema_version must not be empty");
        }

        Ok(config)
    }

    /// The configuration embedded in the crate.
    pub fn embedded() -> LoadResult<SohlConfig> {
        Self::parse(DEFAULT_CONFIG_TOML)
    }
}
