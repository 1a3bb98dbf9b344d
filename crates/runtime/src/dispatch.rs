//! Action execution.
//!
//! Intrinsic actions name a function registered with the
//! [`ActionDispatcher`]; script actions hand their body to the host's
//! [`ScriptHost`]. A script whose action sets `useAsync` is awaited, any
//! other script is detached onto its own task.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sohl_core::{ActionKind, ActionScope, DocumentRef, SohlAction, SohlLogic};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::actor::SohlActor;
use crate::error::{Result, RuntimeError};
use crate::logging::DISPATCH_TARGET;

/// Everything an intrinsic function sees when invoked.
#[derive(Clone, Copy, Debug)]
pub struct ActionCall<'a> {
    pub action: &'a SohlAction,
    /// Logic node that owns the action.
    pub logic: &'a SohlLogic,
    pub document: &'a DocumentRef,
    pub args: &'a Value,
}

/// A registered intrinsic function.
pub type IntrinsicFunction = dyn Fn(&ActionCall<'_>) -> Result<Value> + Send + Sync;

/// A script invocation, detached from the actor so it can outlive the call.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptRequest {
    pub action_id: String,
    pub action_name: String,
    pub script: String,
    pub scope: ActionScope,
    pub logic_id: String,
    pub document: DocumentRef,
    pub args: Value,
}

/// Runs script bodies on behalf of the runtime.
#[async_trait]
pub trait ScriptHost: Send + Sync {
    async fn run(&self, request: ScriptRequest) -> Result<Value>;
}

/// Result of [`ActionDispatcher::execute`].
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The action ran to completion.
    Completed(Value),
    /// The script runs on its own task.
    Detached(JoinHandle<Result<Value>>),
}

impl DispatchOutcome {
    /// The value of a completed action, awaiting a detached one.
    pub async fn into_value(self) -> Result<Value> {
        match self {
            Self::Completed(value) => Ok(value),
            Self::Detached(handle) => handle
                .await
                .map_err(|e| RuntimeError::action_failed("detached script", e.to_string()))?,
        }
    }
}

/// Routes actions to intrinsic functions or the script host.
#[derive(Default)]
pub struct ActionDispatcher {
    intrinsics: HashMap<String, Arc<IntrinsicFunction>>,
    script_host: Option<Arc<dyn ScriptHost>>,
}

impl ActionDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script_host(mut self, host: impl ScriptHost + 'static) -> Self {
        self.script_host = Some(Arc::new(host));
        self
    }

    /// Registers `function` as `name`, returning the function it replaced.
    pub fn register_intrinsic<F>(
        &mut self,
        name: impl Into<String>,
        function: F,
    ) -> Option<Arc<IntrinsicFunction>>
    where
        F: Fn(&ActionCall<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.intrinsics.insert(name.into(), Arc::new(function))
    }

    pub fn has_intrinsic(&self, name: &str) -> bool {
        self.intrinsics.contains_key(name)
    }

    /// Runs one action.
    pub async fn execute(&self, call: ActionCall<'_>) -> Result<DispatchOutcome> {
        let action = call.action;
        match action.kind() {
            ActionKind::Intrinsic { function_name } => {
                let function = self
                    .intrinsics
                    .get(function_name)
                    .ok_or_else(|| RuntimeError::UnknownIntrinsic(function_name.clone()))?;
                debug!(
                    target: DISPATCH_TARGET,
                    action = action.id(),
                    function = function_name.as_str(),
                    "running intrinsic"
                );
                function(&call).map(DispatchOutcome::Completed)
            }
            ActionKind::Script { script, use_async } => {
                let host = self
                    .script_host
                    .as_ref()
                    .map(Arc::clone)
                    .ok_or(RuntimeError::NoScriptHost)?;
                let request = ScriptRequest {
                    action_id: action.id().to_string(),
                    action_name: action.name().to_string(),
                    script: script.clone(),
                    scope: action.scope(),
                    logic_id: call.logic.id().to_string(),
                    document: call.document.clone(),
                    args: call.args.clone(),
                };

                if *use_async {
                    debug!(target: DISPATCH_TARGET, action = action.id(), "awaiting script");
                    return host.run(request).await.map(DispatchOutcome::Completed);
                }

                debug!(target: DISPATCH_TARGET, action = action.id(), "detaching script");
                let handle = tokio::spawn(async move {
                    let action_id = request.action_id.clone();
                    let result = host.run(request).await;
                    if let Err(e) = &result {
                        warn!(
                            target: DISPATCH_TARGET,
                            action = %action_id,
                            error = ?e,
                            "detached script failed"
                        );
                    }
                    result
                });
                Ok(DispatchOutcome::Detached(handle))
            }
        }
    }

    /// Runs action `action_id` of `actor` with its owning node and document
    /// resolved from the actor's flat collections.
    pub async fn execute_in(
        &self,
        actor: &SohlActor,
        action_id: &str,
        args: &Value,
    ) -> Result<DispatchOutcome> {
        let action = actor.actions().get(action_id).ok_or_else(|| {
            RuntimeError::action_failed(action_id, "not found on the actor")
        })?;
        let logic_id = action.event().parent().logic_id().ok_or_else(|| {
            RuntimeError::action_failed(action_id, "action is not owned by a logic node")
        })?;
        let document = actor.owner_of(logic_id)?;
        let logic = actor.logic(logic_id).ok_or_else(|| RuntimeError::UnknownLogic {
            document: document.clone(),
            id: logic_id.to_string(),
        })?;

        self.execute(ActionCall {
            action,
            logic,
            document,
            args,
        })
        .await
    }
}
