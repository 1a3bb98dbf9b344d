//! Host document persistence contract.
//!
//! The host owns documents; the runtime reads them, writes partial updates
//! (`{"logicObj": ...}`) and deletes them through a [`DocumentStore`].

mod memory;

pub use memory::InMemoryDocumentStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sohl_core::DocumentRef;

use crate::error::HostError;

/// Field of a document's system data holding its persisted logic tree.
pub const LOGIC_OBJ: &str = "logicObj";

/// A host document as the runtime sees it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HostDocument {
    pub reference: DocumentRef,
    pub name: String,
    /// Owning document, for items embedded in an actor.
    #[serde(default)]
    pub owner: Option<DocumentRef>,
    /// System data. The logic tree lives under [`LOGIC_OBJ`].
    #[serde(default)]
    pub system: Value,
}

impl HostDocument {
    pub fn new(reference: DocumentRef, name: impl Into<String>) -> Self {
        Self {
            reference,
            name: name.into(),
            owner: None,
            system: json!({}),
        }
    }

    pub fn with_owner(mut self, owner: DocumentRef) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_logic(mut self, logic_obj: Value) -> Self {
        if !self.system.is_object() {
            self.system = json!({});
        }
        if let Some(system) = self.system.as_object_mut() {
            system.insert(LOGIC_OBJ.to_string(), logic_obj);
        }
        self
    }

    /// The persisted logic tree, if any.
    pub fn logic_obj(&self) -> Option<&Value> {
        self.system
            .get(LOGIC_OBJ)
            .filter(|logic| logic.as_object().is_some_and(|object| !object.is_empty()))
    }
}

/// Persistence the host provides.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Load a document.
    async fn get(&self, document: &DocumentRef) -> Result<Option<HostDocument>, HostError>;

    /// Documents whose owner is `owner`, in creation order.
    async fn owned_by(&self, owner: &DocumentRef) -> Result<Vec<HostDocument>, HostError>;

    /// Store a new document.
    async fn create(&self, document: HostDocument) -> Result<(), HostError>;

    /// Deep-merge `patch` into a document's system data and return the result.
    async fn update(&self, document: &DocumentRef, patch: &Value)
    -> Result<HostDocument, HostError>;

    /// Delete a document and every document it owns. Returns whether it
    /// existed.
    async fn delete(&self, document: &DocumentRef) -> Result<bool, HostError>;
}
