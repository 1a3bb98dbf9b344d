//! Bridge between one host document and its root logic node.

use serde_json::{Value, json};
use sohl_core::{
    BuildContext, DocumentContext, DocumentRef, SohlAction, SohlBase, SohlEffect, SohlLogic,
    SohlMap, WorldClock,
};
use tracing::debug;

use crate::error::{Result, RuntimeError};
use crate::logging::PIPELINE_TARGET;
use crate::store::{HostDocument, LOGIC_OBJ};

/// A host document's data model: its persisted snapshot and the logic tree
/// rebuilt from it.
#[derive(Clone, Debug)]
pub struct SohlDataModel {
    document: HostDocument,
    logic: SohlLogic,
}

impl SohlDataModel {
    /// Builds the root logic node from the document's `logicObj`.
    pub fn from_document(document: HostDocument, ctx: &mut BuildContext<'_>) -> Result<Self> {
        let logic = Self::build_logic(&document, ctx)?;
        let mut model = Self { document, logic };
        model.pin_snapshot();
        Ok(model)
    }

    fn build_logic(document: &HostDocument, ctx: &mut BuildContext<'_>) -> Result<SohlLogic> {
        let data = document
            .logic_obj()
            .ok_or_else(|| RuntimeError::MissingLogic(document.reference.clone()))?;
        Ok(ctx.logic_from_data(data, Some(document.reference.clone().into()))?)
    }

    /// Writes the freshly built tree back into the snapshot.
    ///
    /// Building fills in whatever the stored data leaves out: generated ids
    /// and the activation and expiry times of events, which are derived from
    /// the clock. Keeping them in the snapshot fixes those values for every
    /// later rebuild, whether or not the tree has been flushed yet.
    fn pin_snapshot(&mut self) {
        let built = self.logic.to_json();
        if let Some(system) = self.document.system.as_object_mut() {
            if system.get(LOGIC_OBJ) != Some(&built) {
                debug!(
                    target: PIPELINE_TARGET,
                    document = %self.document.reference,
                    "derived fields pinned to snapshot"
                );
                system.insert(LOGIC_OBJ.to_string(), built);
            }
        }
    }

    pub fn reference(&self) -> &DocumentRef {
        &self.document.reference
    }

    pub fn document(&self) -> &HostDocument {
        &self.document
    }

    pub fn logic(&self) -> &SohlLogic {
        &self.logic
    }

    pub fn logic_mut(&mut self) -> &mut SohlLogic {
        &mut self.logic
    }

    /// Replaces the persisted snapshot, typically with what the store
    /// returned from an update. The logic tree is rebuilt on the next
    /// [`prepare_base_data`](Self::prepare_base_data).
    pub fn sync(&mut self, document: HostDocument) {
        self.document = document;
    }

    /// Starts a cycle: rebuilds the tree from the snapshot, pins derived
    /// fields, derives virtual nodes and prepares base data.
    pub fn prepare_base_data(&mut self, ctx: &mut BuildContext<'_>) -> Result<()> {
        self.logic = Self::build_logic(&self.document, ctx)?;
        self.pin_snapshot();

        let doc = DocumentContext {
            document: &self.document.reference,
            name: &self.document.name,
            system: &self.document.system,
        };
        self.logic.create_virtual_logics(&doc, ctx)?;
        self.logic.prepare_base_data()?;

        debug!(
            target: PIPELINE_TARGET,
            document = %self.document.reference,
            logic = self.logic.id(),
            "base data prepared"
        );
        Ok(())
    }

    /// Runs the rest of the cycle with no siblings, for documents that are not
    /// part of an actor.
    pub fn prepare_derived_data(
        &mut self,
        actions: &SohlMap<String, SohlAction>,
        effects: &SohlMap<String, SohlEffect>,
    ) -> Result<()> {
        self.logic.process_effects(effects)?;
        self.logic.process_actions(actions)?;
        sohl_core::with_siblings(&mut [&mut self.logic], |logic, siblings| {
            logic.process_siblings(siblings)
        })?;
        self.logic.post_process()?;
        Ok(())
    }

    /// Partial document data persisting the current tree.
    pub fn logic_patch(&self) -> Value {
        json!({ LOGIC_OBJ: self.logic.to_json() })
    }

    /// Removes expired effects from the tree. Returns them.
    pub fn remove_expired_effects(&mut self, clock: &dyn WorldClock) -> Vec<SohlEffect> {
        self.logic.remove_expired_effects(clock)
    }
}
