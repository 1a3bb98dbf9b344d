//! Actors, their items, and the recompute cycle across all of them.

use sohl_core::{
    BuildContext, DocumentRef, Itr, SohlAction, SohlEffect, SohlLogic, SohlMap, WorldClock,
    with_siblings,
};
use tracing::{debug, info, info_span};

use crate::data_model::SohlDataModel;
use crate::error::{HostError, Result, RuntimeError};
use crate::logging::PIPELINE_TARGET;
use crate::store::{DocumentStore, HostDocument};

/// An item document.
#[derive(Clone, Debug)]
pub struct SohlItem {
    data: SohlDataModel,
}

impl SohlItem {
    pub fn from_document(document: HostDocument, ctx: &mut BuildContext<'_>) -> Result<Self> {
        Ok(Self {
            data: SohlDataModel::from_document(document, ctx)?,
        })
    }

    pub fn id(&self) -> &str {
        &self.data.reference().id
    }

    pub fn name(&self) -> &str {
        &self.data.document().name
    }

    pub fn data(&self) -> &SohlDataModel {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut SohlDataModel {
        &mut self.data
    }

    pub fn logic(&self) -> &SohlLogic {
        self.data.logic()
    }

    /// Full cycle for an item outside any actor. Its own actions and effects
    /// are the only inputs and it has no siblings.
    pub fn prepare(&mut self, ctx: &mut BuildContext<'_>) -> Result<()> {
        self.data.prepare_base_data(ctx)?;
        let mut actions = SohlMap::new();
        let mut effects = SohlMap::new();
        collect(self.data.logic(), &mut actions, &mut effects);
        self.data.prepare_derived_data(&actions, &effects)
    }
}

/// An actor document and the items it owns.
///
/// Every base pass rebuilds flat collections over all logic nodes, actions
/// and effects found in the actor's tree and its items' trees. The flat
/// actions and effects feed every node's `process_actions` and
/// `process_effects`; the roots of all trees are each other's siblings.
#[derive(Clone, Debug)]
pub struct SohlActor {
    data: SohlDataModel,
    items: SohlMap<String, SohlItem>,
    logics: SohlMap<String, DocumentRef>,
    actions: SohlMap<String, SohlAction>,
    effects: SohlMap<String, SohlEffect>,
}

impl SohlActor {
    /// Loads the actor and its items from `store` and runs a full cycle.
    pub async fn load(
        store: &dyn DocumentStore,
        actor: &DocumentRef,
        ctx: &mut BuildContext<'_>,
    ) -> Result<Self> {
        let document = store
            .get(actor)
            .await?
            .ok_or_else(|| HostError::NotFound(actor.clone()))?;
        let items = store.owned_by(actor).await?;

        let mut actor = Self::from_documents(document, items, ctx)?;
        actor.prepare(ctx)?;
        Ok(actor)
    }

    /// Builds the actor without running the cycle.
    pub fn from_documents(
        document: HostDocument,
        items: impl IntoIterator<Item = HostDocument>,
        ctx: &mut BuildContext<'_>,
    ) -> Result<Self> {
        let data = SohlDataModel::from_document(document, ctx)?;
        let mut owned = SohlMap::new();
        for item in items {
            let item = SohlItem::from_document(item, ctx)?;
            owned.set(item.id().to_string(), item);
        }
        Ok(Self {
            data,
            items: owned,
            logics: SohlMap::new(),
            actions: SohlMap::new(),
            effects: SohlMap::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.data.reference().id
    }

    pub fn reference(&self) -> &DocumentRef {
        self.data.reference()
    }

    pub fn data(&self) -> &SohlDataModel {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut SohlDataModel {
        &mut self.data
    }

    pub fn items(&self) -> &SohlMap<String, SohlItem> {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&SohlItem> {
        self.items.get(id)
    }

    pub fn item_mut(&mut self, id: &str) -> Option<&mut SohlItem> {
        self.items.get_mut(id)
    }

    /// Adds an item built elsewhere. No-op if the id is taken.
    pub fn add_item(&mut self, item: SohlItem) -> bool {
        self.items.insert_if_absent(item.id().to_string(), item)
    }

    pub fn remove_item(&mut self, id: &str) -> Option<SohlItem> {
        self.items.delete(id)
    }

    /// Data model of the actor (`document` is the actor) or of one of its
    /// items.
    pub fn data_model(&self, document: &DocumentRef) -> Option<&SohlDataModel> {
        if document == self.data.reference() {
            return Some(&self.data);
        }
        self.items.get(document.id.as_str()).map(SohlItem::data)
    }

    pub fn data_model_mut(&mut self, document: &DocumentRef) -> Option<&mut SohlDataModel> {
        if document == self.data.reference() {
            return Some(&mut self.data);
        }
        self.items
            .get_mut(document.id.as_str())
            .map(SohlItem::data_mut)
    }

    // ===== flat collections =====

    /// Every logic node of the actor and its items, with its owning document.
    pub fn logics(&self) -> Itr<impl Iterator<Item = (&String, &DocumentRef)>> {
        self.logics.entries()
    }

    /// Looks a logic node up by id anywhere in the actor.
    pub fn logic(&self, id: &str) -> Option<&SohlLogic> {
        let document = self.logics.get(id)?;
        self.data_model(document)?.logic().find(id)
    }

    pub fn actions(&self) -> &SohlMap<String, SohlAction> {
        &self.actions
    }

    pub fn effects(&self) -> &SohlMap<String, SohlEffect> {
        &self.effects
    }

    pub fn add_logic(&mut self, id: impl Into<String>, document: DocumentRef) -> bool {
        self.logics.insert_if_absent(id.into(), document)
    }

    pub fn add_action(&mut self, action: SohlAction) -> bool {
        self.actions.insert_if_absent(action.id().to_string(), action)
    }

    pub fn add_effect(&mut self, effect: SohlEffect) -> bool {
        self.effects.insert_if_absent(effect.id().to_string(), effect)
    }

    // ===== recompute cycle =====

    /// Runs one full cycle over the actor and its items.
    pub fn prepare(&mut self, ctx: &mut BuildContext<'_>) -> Result<()> {
        let span = info_span!(target: PIPELINE_TARGET, "prepare", actor = self.id());
        let _enter = span.enter();

        self.prepare_base_data(ctx)?;
        self.prepare_derived_data()?;

        info!(
            target: PIPELINE_TARGET,
            logics = self.logics.len(),
            actions = self.actions.len(),
            effects = self.effects.len(),
            items = self.items.len(),
            "cycle finalized"
        );
        Ok(())
    }

    /// Rebuilds every tree, prepares base data, and refills the flat
    /// collections.
    pub fn prepare_base_data(&mut self, ctx: &mut BuildContext<'_>) -> Result<()> {
        self.data.prepare_base_data(ctx)?;
        for item in self.items.values_mut() {
            item.data.prepare_base_data(ctx)?;
        }

        let mut logics = SohlMap::new();
        let mut actions = SohlMap::new();
        let mut effects = SohlMap::new();
        let models = std::iter::once(&self.data).chain(self.items.values().map(SohlItem::data));
        for model in models {
            index_logics(model.logic(), model.reference(), &mut logics);
            collect(model.logic(), &mut actions, &mut effects);
        }
        self.logics = logics;
        self.actions = actions;
        self.effects = effects;
        Ok(())
    }

    /// Effects, actions, siblings and post-processing, each phase across
    /// every tree before the next starts.
    pub fn prepare_derived_data(&mut self) -> Result<()> {
        let Self {
            data,
            items,
            actions,
            effects,
            ..
        } = self;

        let mut roots: Vec<&mut SohlLogic> = std::iter::once(data.logic_mut())
            .chain(items.values_mut().map(|item| item.data.logic_mut()))
            .collect();

        for root in roots.iter_mut() {
            root.process_effects(effects)?;
            root.process_actions(actions)?;
        }
        debug!(target: PIPELINE_TARGET, roots = roots.len(), "actions applied");

        with_siblings(&mut roots, |root, siblings| root.process_siblings(siblings))?;

        for root in roots.iter_mut() {
            root.post_process()?;
        }
        Ok(())
    }

    /// Removes expired effects from every tree. Returns the documents that
    /// changed and must be persisted.
    pub fn remove_expired_effects(&mut self, clock: &dyn WorldClock) -> Vec<DocumentRef> {
        let mut changed = Vec::new();
        let models = std::iter::once(&mut self.data)
            .chain(self.items.values_mut().map(|item| &mut item.data));
        for model in models {
            let removed = model.remove_expired_effects(clock);
            if removed.is_empty() {
                continue;
            }
            for effect in &removed {
                self.effects.delete(effect.id());
            }
            debug!(
                target: PIPELINE_TARGET,
                document = %model.reference(),
                removed = removed.len(),
                "expired effects removed"
            );
            changed.push(model.reference().clone());
        }
        changed
    }

    /// Finds the document whose tree holds logic node `id`.
    pub fn owner_of(&self, id: &str) -> Result<&DocumentRef> {
        self.logics
            .get(id)
            .ok_or_else(|| RuntimeError::UnknownLogic {
                document: self.data.reference().clone(),
                id: id.to_string(),
            })
    }
}

fn index_logics(
    logic: &SohlLogic,
    document: &DocumentRef,
    logics: &mut SohlMap<String, DocumentRef>,
) {
    logics.insert_if_absent(logic.id().to_string(), document.clone());
    for child in logic.logics().values() {
        index_logics(child, document, logics);
    }
}

fn collect(
    logic: &SohlLogic,
    actions: &mut SohlMap<String, SohlAction>,
    effects: &mut SohlMap<String, SohlEffect>,
) {
    for action in logic.actions().values() {
        actions.insert_if_absent(action.id().to_string(), action.clone());
    }
    for effect in logic.effects().values() {
        effects.insert_if_absent(effect.id().to_string(), effect.clone());
    }
    for child in logic.logics().values() {
        collect(child, actions, effects);
    }
}
