//! Polymorphic root of every persisted core object.
//!
//! Each persisted object carries a [`ClassTag`] (`class` + `schemaVersion`)
//! that the [`ClassRegistry`] uses to rebuild it from JSON, plus a
//! non-owning [`ParentRef`] naming the logic node or host document that owns
//! it. Children never hold pointers to their parents; the parent reference is
//! an id that callers resolve against the tree or the host when needed.

mod context;
mod error;
mod registry;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use context::BuildContext;
pub use error::RegistryError;
pub use registry::{ClassEntry, ClassRegistry, LogicFactory, SohlObject};

use crate::config::SohlConfig;
use crate::utils::merge_object;

/// Type tag persisted with every object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassTag {
    pub class: String,
    pub schema_version: String,
}

impl ClassTag {
    pub fn new(class: impl Into<String>, schema_version: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            schema_version: schema_version.into(),
        }
    }

    /// Reads the tag from a persisted object, defaulting missing parts from
    /// `metadata`.
    pub fn from_value(data: &Value, metadata: &ClassMetadata) -> Self {
        let class = data
            .get("class")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(metadata.name);
        let schema_version = data
            .get("schemaVersion")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(metadata.schema_version);
        Self::new(class, schema_version)
    }

    /// Writes `class` and `schemaVersion` into a JSON object.
    pub fn write_into(&self, object: &mut serde_json::Map<String, Value>) {
        object.insert("class".into(), Value::String(self.class.clone()));
        object.insert(
            "schemaVersion".into(),
            Value::String(self.schema_version.clone()),
        );
    }
}

/// Static description of a concrete class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassMetadata {
    pub name: &'static str,
    pub schema_version: &'static str,
}

impl ClassMetadata {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            schema_version: SohlConfig::DEFAULT_SCHEMA_VERSION,
        }
    }

    pub fn tag(&self) -> ClassTag {
        ClassTag::new(self.name, self.schema_version)
    }

    /// Fills in `class`/`schemaVersion` on `data` when they are absent.
    pub fn stamp(&self, data: &mut Value) {
        if let Value::Object(object) = data {
            object
                .entry("class")
                .or_insert_with(|| Value::String(self.name.to_string()));
            object
                .entry("schemaVersion")
                .or_insert_with(|| Value::String(self.schema_version.to_string()));
        }
    }
}

/// Kind of host document a root logic node is attached to.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DocumentKind {
    Actor,
    Item,
}

/// Handle to a host document.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    pub kind: DocumentKind,
    pub id: String,
}

impl DocumentRef {
    pub fn new(kind: DocumentKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn actor(id: impl Into<String>) -> Self {
        Self::new(DocumentKind::Actor, id)
    }

    pub fn item(id: impl Into<String>) -> Self {
        Self::new(DocumentKind::Item, id)
    }
}

impl std::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Which side of the host boundary a parent sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum ParentKind {
    /// An in-memory logic node.
    Logic,
    /// A host document's data model.
    Document,
}

/// Non-owning back reference from a child to its owner.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParentRef {
    /// Owning logic node, by id.
    Logic(String),
    /// Owning host document.
    Document(DocumentRef),
}

impl ParentRef {
    pub fn logic(id: impl Into<String>) -> Self {
        Self::Logic(id.into())
    }

    pub fn kind(&self) -> ParentKind {
        match self {
            Self::Logic(_) => ParentKind::Logic,
            Self::Document(_) => ParentKind::Document,
        }
    }

    pub fn logic_id(&self) -> Option<&str> {
        match self {
            Self::Logic(id) => Some(id),
            Self::Document(_) => None,
        }
    }

    pub fn document(&self) -> Option<&DocumentRef> {
        match self {
            Self::Document(doc) => Some(doc),
            Self::Logic(_) => None,
        }
    }
}

impl From<DocumentRef> for ParentRef {
    fn from(doc: DocumentRef) -> Self {
        Self::Document(doc)
    }
}

/// Behavior shared by every persisted core object.
pub trait SohlBase {
    /// Metadata of the concrete type.
    const METADATA: ClassMetadata;

    fn tag(&self) -> &ClassTag;

    fn parent(&self) -> Option<&ParentRef>;

    /// Persisted form. Feeding it back through
    /// [`ClassRegistry::from_data`] yields an equal object.
    fn to_json(&self) -> Value;

    fn class_name(&self) -> &str {
        &self.tag().class
    }

    fn schema_version(&self) -> &str {
        &self.tag().schema_version
    }

    /// Deep copy with `overrides` merged over the persisted form.
    ///
    /// The copy is rebuilt through the registry with the same parent, so it
    /// shares no state with `self`.
    fn clone_with(
        &self,
        overrides: &Value,
        ctx: &mut BuildContext<'_>,
    ) -> Result<SohlObject, RegistryError> {
        let data = merge_object(&self.to_json(), overrides);
        ctx.from_data(&data, self.parent().cloned())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn tag_defaults_from_metadata() {
        const META: ClassMetadata = ClassMetadata::new("Thing");
        let tag = ClassTag::from_value(&json!({"class": "Other"}), &META);
        assert_eq!(tag, ClassTag::new("Other", "0.6.0"));

        let tag = ClassTag::from_value(&json!({}), &META);
        assert_eq!(tag.class, "Thing");
    }

    #[test]
    fn stamp_keeps_existing_tag() {
        const META: ClassMetadata = ClassMetadata::new("Thing");
        let mut data = json!({"class": "Custom"});
        META.stamp(&mut data);
        assert_eq!(data, json!({"class": "Custom", "schemaVersion": "0.6.0"}));
    }

    #[test]
    fn document_ref_display() {
        assert_eq!(DocumentRef::actor("A1").to_string(), "actor:A1");
    }

    #[test]
    fn parent_kind_tags() {
        let logic = ParentRef::logic("abc");
        assert_eq!(logic.kind(), ParentKind::Logic);
        assert_eq!(logic.logic_id(), Some("abc"));

        let doc = ParentRef::from(DocumentRef::item("i1"));
        assert_eq!(doc.kind(), ParentKind::Document);
        assert_eq!(doc.document().map(|d| d.kind), Some(DocumentKind::Item));
    }
}
