//! Data-driven content for a Song of Heroic Lands session.
//!
//! This crate provides loaders for the files a session starts from:
//! - Session configuration (TOML, with an embedded default)
//! - Logic packs: JSON arrays of persisted `logicObj` documents
//!
//! Loaded logic documents are plain JSON until a host rebuilds them through
//! the class registry of `sohl-core`.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LoadResult, LogicLoader, LogicPack};
