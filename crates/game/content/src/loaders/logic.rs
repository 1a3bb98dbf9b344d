//! Logic pack loader.

use std::path::Path;

use serde_json::Value;
use sohl_core::{BuildContext, ClassRegistry, DocumentRef, SohlLogic};

use crate::loaders::{LoadResult, read_file};

/// A named list of persisted root logic documents.
#[derive(Clone, Debug, PartialEq)]
pub struct LogicPack {
    name: String,
    documents: Vec<Value>,
}

impl LogicPack {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn documents(&self) -> &[Value] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The root document whose `name` is `name`.
    pub fn find(&self, name: &str) -> Option<&Value> {
        self.documents
            .iter()
            .find(|doc| doc.get("name").and_then(Value::as_str) == Some(name))
    }

    /// Checks every class tag in the pack, nested children included.
    pub fn validate(&self, registry: &ClassRegistry) -> LoadResult<()> {
        for (index, document) in self.documents.iter().enumerate() {
            registry.validate_tree(document).map_err(|e| {
                anyhow::anyhow!("Invalid document {} in pack {}: {}", index, self.name, e)
            })?;
        }
        Ok(())
    }

    /// Rebuilds document `index` as the root logic of `document`.
    pub fn instantiate(
        &self,
        index: usize,
        document: DocumentRef,
        ctx: &mut BuildContext<'_>,
    ) -> LoadResult<SohlLogic> {
        let data = self.documents.get(index).ok_or_else(|| {
            anyhow::anyhow!("Pack {} has no document {}", self.name, index)
        })?;
        ctx.logic_from_data(data, Some(document.into()))
            .map_err(|e| {
                anyhow::anyhow!(
                    "Failed to build document {} in pack {}: {}",
                    index,
                    self.name,
                    e
                )
            })
    }
}

/// Loader for logic packs from JSON files.
pub struct LogicLoader;

impl LogicLoader {
    /// Load a pack from a JSON file. The pack is named after the file stem.
    pub fn load(path: &Path) -> LoadResult<LogicPack> {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();
        let content = read_file(path)?;
        Self::parse(name, &content)
    }

    /// Load a pack and check it against `registry`.
    pub fn load_validated(path: &Path, registry: &ClassRegistry) -> LoadResult<LogicPack> {
        let pack = Self::load(path)?;
        pack.validate(registry)?;
        Ok(pack)
    }

    /// Parse a pack from JSON text: an array of objects.
    pub fn parse(name: impl Into<String>, content: &str) -> LoadResult<LogicPack> {
        let name = name.into();
        let value: Value = serde_json::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse logic pack {}: {}", name, e))?;
        let Value::Array(documents) = value else {
            anyhow::bail!("Logic pack {} must be a JSON array", name);
        };
        if let Some(index) = documents.iter().position(|doc| !doc.is_object()) {
            anyhow::bail!("Logic pack {}: document {} is not an object", name, index);
        }
        Ok(LogicPack { name, documents })
    }
}
