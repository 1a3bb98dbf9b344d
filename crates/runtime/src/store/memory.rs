//! In-memory DocumentStore implementation for tests and headless runs.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use sohl_core::{DocumentRef, merge_into};

use super::{DocumentStore, HostDocument};
use crate::error::HostError;

/// In-memory implementation of DocumentStore.
///
/// Keeps documents in creation order so owned documents list
/// deterministically.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<DocumentRef, (u64, HostDocument)>>,
    next_seq: RwLock<u64>,
}

impl InMemoryDocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `documents`.
    pub fn with_documents(documents: impl IntoIterator<Item = HostDocument>) -> Self {
        let mut map = HashMap::new();
        let mut seq = 0;
        for document in documents {
            map.insert(document.reference.clone(), (seq, document));
            seq += 1;
        }
        Self {
            documents: RwLock::new(map),
            next_seq: RwLock::new(seq),
        }
    }

    /// Number of stored documents. Still answers after a writer panicked.
    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, document: &DocumentRef) -> Result<Option<HostDocument>, HostError> {
        let documents = self
            .documents
            .read()
            .map_err(|_| HostError::LockPoisoned)?;
        Ok(documents.get(document).map(|(_, doc)| doc.clone()))
    }

    async fn owned_by(&self, owner: &DocumentRef) -> Result<Vec<HostDocument>, HostError> {
        let documents = self
            .documents
            .read()
            .map_err(|_| HostError::LockPoisoned)?;
        let mut owned: Vec<&(u64, HostDocument)> = documents
            .values()
            .filter(|(_, doc)| doc.owner.as_ref() == Some(owner))
            .collect();
        owned.sort_by_key(|(seq, _)| *seq);
        Ok(owned.into_iter().map(|(_, doc)| doc.clone()).collect())
    }

    async fn create(&self, document: HostDocument) -> Result<(), HostError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| HostError::LockPoisoned)?;
        if documents.contains_key(&document.reference) {
            return Err(HostError::AlreadyExists(document.reference));
        }
        let mut seq = self.next_seq.write().map_err(|_| HostError::LockPoisoned)?;
        documents.insert(document.reference.clone(), (*seq, document));
        *seq += 1;
        Ok(())
    }

    async fn update(
        &self,
        document: &DocumentRef,
        patch: &Value,
    ) -> Result<HostDocument, HostError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| HostError::LockPoisoned)?;
        let (_, stored) = documents
            .get_mut(document)
            .ok_or_else(|| HostError::NotFound(document.clone()))?;
        merge_into(&mut stored.system, patch);
        Ok(stored.clone())
    }

    async fn delete(&self, document: &DocumentRef) -> Result<bool, HostError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| HostError::LockPoisoned)?;
        let existed = documents.remove(document).is_some();
        documents.retain(|_, (_, doc)| doc.owner.as_ref() != Some(document));
        Ok(existed)
    }
}
