//! Carries core create/update/delete decisions across to the host store.

use serde_json::Value;
use sohl_core::{BuildContext, CreateOutcome, CreateTarget, DeleteTarget, SohlLogic, WorldClock};
use tracing::{info, warn};

use crate::actor::SohlActor;
use crate::data_model::SohlDataModel;
use crate::error::{Result, RuntimeError};
use crate::logging::PERSISTENCE_TARGET;
use crate::store::DocumentStore;

/// Writes the model's current tree to its document and adopts the stored
/// result as the new snapshot.
pub async fn flush(store: &dyn DocumentStore, model: &mut SohlDataModel) -> Result<()> {
    let patch = model.logic_patch();
    let result = store.update(model.reference(), &patch).await;
    match result {
        Ok(document) => {
            info!(target: PERSISTENCE_TARGET, document = %document.reference, "logic flushed");
            model.sync(document);
            Ok(())
        }
        Err(e) => {
            warn!(
                target: PERSISTENCE_TARGET,
                document = %model.reference(),
                error = ?e,
                "flush failed"
            );
            Err(e.into())
        }
    }
}

/// Creates a logic node. Under a logic node it is only registered in memory;
/// as a document root it is written to the store.
pub async fn create_logic(
    store: &dyn DocumentStore,
    data: &Value,
    target: CreateTarget<'_>,
    ctx: &mut BuildContext<'_>,
) -> Result<CreateOutcome> {
    let outcome = SohlLogic::create(data, target, ctx)?;
    if let CreateOutcome::Persist(request) = &outcome {
        store.update(&request.document, &request.patch).await?;
        info!(
            target: PERSISTENCE_TARGET,
            document = %request.document,
            logic = request.logic.id(),
            "root logic created"
        );
    }
    Ok(outcome)
}

/// Patches logic node `logic_id` of `model` and persists the tree.
pub async fn update_logic(
    store: &dyn DocumentStore,
    model: &mut SohlDataModel,
    logic_id: &str,
    patch: &Value,
    ctx: &mut BuildContext<'_>,
) -> Result<()> {
    let document = model.reference().clone();
    let node = model
        .logic_mut()
        .find_mut(logic_id)
        .ok_or_else(|| RuntimeError::UnknownLogic {
            document,
            id: logic_id.to_string(),
        })?;
    node.update(patch, ctx)?;
    flush(store, model).await
}

/// Deletes logic node `logic_id`. A nested node is removed from its parent
/// and the tree persisted; a root node takes its whole document with it.
pub async fn delete_logic(
    store: &dyn DocumentStore,
    model: &mut SohlDataModel,
    logic_id: &str,
) -> Result<DeleteTarget> {
    let target = model
        .logic()
        .find(logic_id)
        .map(SohlLogic::delete_target)
        .ok_or_else(|| RuntimeError::UnknownLogic {
            document: model.reference().clone(),
            id: logic_id.to_string(),
        })?;

    match &target {
        DeleteTarget::Logic { id, .. } => {
            model.logic_mut().remove_descendant(id);
            flush(store, model).await?;
        }
        DeleteTarget::Document(document) => {
            store.delete(document).await?;
            info!(target: PERSISTENCE_TARGET, document = %document, "document deleted");
        }
    }
    Ok(target)
}

/// Drops expired effects from every tree of `actor` and persists the trees
/// that changed. Returns how many documents were written.
pub async fn sweep_expired_effects(
    store: &dyn DocumentStore,
    actor: &mut SohlActor,
    clock: &dyn WorldClock,
) -> Result<usize> {
    let changed = actor.remove_expired_effects(clock);
    for document in &changed {
        if let Some(model) = actor.data_model_mut(document) {
            flush(store, model).await?;
        }
    }
    Ok(changed.len())
}
