//! Content loaders for reading session data from files.
//!
//! Configuration is TOML, logic packs are JSON arrays of persisted `logicObj`
//! documents.

pub mod config;
pub mod factory;
pub mod logic;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use logic::{LogicLoader, LogicPack};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
