//! Content factory for loading session data from a directory.

use std::path::{Path, PathBuf};

use sohl_core::{ClassRegistry, SohlConfig};

use crate::loaders::{ConfigLoader, LoadResult, LogicLoader, LogicPack};

/// Content factory that loads session content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── logics/
///     ├── starter.json
///     └── bestiary.json
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Factory over the data directory shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    /// Load session configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<SohlConfig> {
        let path = self.data_dir.join("config.toml");
        ConfigLoader::load(&path)
    }

    /// Load `config.toml`, or the embedded defaults when the file is absent.
    pub fn load_config_or_default(&self) -> LoadResult<SohlConfig> {
        let path = self.data_dir.join("config.toml");
        if path.exists() {
            ConfigLoader::load(&path)
        } else {
            ConfigLoader::embedded()
        }
    }

    /// Load the logic pack `logics/{pack}.json`, checked against `registry`.
    pub fn load_logic_pack(&self, pack: &str, registry: &ClassRegistry) -> LoadResult<LogicPack> {
        LogicLoader::load_validated(&self.logic_pack_path(pack), registry)
    }

    /// Names of every pack under `logics/`, sorted.
    pub fn logic_pack_names(&self) -> LoadResult<Vec<String>> {
        let dir = self.data_dir.join("logics");
        let entries = std::fs::read_dir(&dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn logic_pack_path(&self, pack: &str) -> PathBuf {
        self.data_dir.join("logics").join(format!("{}.json", pack))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
