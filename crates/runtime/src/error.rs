//! Unified error types surfaced by the runtime.
//!
//! Wraps failures from the host document store, the core rebuild and
//! pipeline, and action dispatch so callers can bubble them up with
//! consistent context.

use sohl_core::{DocumentRef, LogicError, RegistryError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors raised by a [`DocumentStore`](crate::store::DocumentStore).
#[derive(Debug, Error)]
pub enum HostError {
    #[error("document store lock was poisoned")]
    LockPoisoned,

    #[error("document {0} not found")]
    NotFound(DocumentRef),

    #[error("document {0} already exists")]
    AlreadyExists(DocumentRef),

    #[error("host rejected the update of {document}: {reason}")]
    Rejected {
        document: DocumentRef,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Logic(#[from] LogicError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("document {0} has no logicObj")]
    MissingLogic(DocumentRef),

    #[error("document {document} has no logic node {id}")]
    UnknownLogic { document: DocumentRef, id: String },

    #[error("no intrinsic function registered as {0}")]
    UnknownIntrinsic(String),

    #[error("no script host configured")]
    NoScriptHost,

    #[error("action {action} failed: {reason}")]
    ActionFailed { action: String, reason: String },

    #[error("content error: {0}")]
    Content(String),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

impl RuntimeError {
    pub fn action_failed(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ActionFailed {
            action: action.into(),
            reason: reason.into(),
        }
    }
}
