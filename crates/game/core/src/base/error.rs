//! Errors raised while resolving and rebuilding persisted objects.

use crate::error::{ErrorSeverity, SohlError};
use crate::event::EventError;
use crate::logic::LogicError;
use crate::modifier::ModifierError;

/// Failure to rebuild an object from its persisted form.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("persisted object has no class tag")]
    MissingClassTag,

    #[error("class {0:?} is not registered")]
    UnregisteredClass(String),

    #[error("class {class:?} is not a {expected}")]
    KindMismatch {
        class: String,
        expected: &'static str,
    },

    #[error("{parent} already holds a child with id {id:?}")]
    DuplicateId { parent: String, id: String },

    #[error(transparent)]
    Modifier(#[from] ModifierError),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Logic(Box<LogicError>),
}

impl From<LogicError> for RegistryError {
    fn from(err: LogicError) -> Self {
        match err {
            LogicError::Build(inner) => inner,
            other => Self::Logic(Box::new(other)),
        }
    }
}

impl RegistryError {
    pub fn duplicate_id(parent: impl Into<String>, id: impl Into<String>) -> Self {
        Self::DuplicateId {
            parent: parent.into(),
            id: id.into(),
        }
    }
}

impl SohlError for RegistryError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MissingClassTag | Self::UnregisteredClass(_) | Self::DuplicateId { .. } => {
                ErrorSeverity::Validation
            }
            Self::KindMismatch { .. } => ErrorSeverity::Internal,
            Self::Modifier(inner) => inner.severity(),
            Self::Event(inner) => inner.severity(),
            Self::Logic(inner) => inner.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingClassTag => "REGISTRY_MISSING_CLASS_TAG",
            Self::UnregisteredClass(_) => "REGISTRY_UNREGISTERED_CLASS",
            Self::KindMismatch { .. } => "REGISTRY_KIND_MISMATCH",
            Self::DuplicateId { .. } => "REGISTRY_DUPLICATE_ID",
            Self::Modifier(inner) => inner.error_code(),
            Self::Event(inner) => inner.error_code(),
            Self::Logic(inner) => inner.error_code(),
        }
    }
}
