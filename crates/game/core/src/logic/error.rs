use super::LogicPhase;
use crate::base::RegistryError;
use crate::error::{ErrorSeverity, SohlError};
use crate::modifier::ModifierError;

/// Failure to build a logic node or to run one of its phases.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LogicError {
    #[error("logic nodes require a parent")]
    MissingParent,

    #[error("logic nodes require a name and type")]
    MissingNameOrType,

    #[error("malformed logic data: {0}")]
    Decode(String),

    #[error("logic {logic}: {operation} requires phase {expected}, found {actual}")]
    PhaseViolation {
        logic: String,
        operation: &'static str,
        expected: LogicPhase,
        actual: LogicPhase,
    },

    #[error("logic {logic} has no modifier named {name:?}")]
    UnknownModifier { logic: String, name: String },

    #[error("logic {logic}: {message}")]
    Rule { logic: String, message: String },

    #[error(transparent)]
    Modifier(#[from] ModifierError),

    #[error(transparent)]
    Build(#[from] RegistryError),
}

impl LogicError {
    /// Failure raised by a rule set.
    pub fn rule(logic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rule {
            logic: logic.into(),
            message: message.into(),
        }
    }
}

impl SohlError for LogicError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MissingParent | Self::MissingNameOrType | Self::Decode(_) => {
                ErrorSeverity::Validation
            }
            Self::PhaseViolation { .. } | Self::UnknownModifier { .. } => ErrorSeverity::Internal,
            Self::Rule { .. } => ErrorSeverity::Validation,
            Self::Modifier(inner) => inner.severity(),
            Self::Build(inner) => inner.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingParent => "LOGIC_MISSING_PARENT",
            Self::MissingNameOrType => "LOGIC_MISSING_NAME_OR_TYPE",
            Self::Decode(_) => "LOGIC_DECODE",
            Self::PhaseViolation { .. } => "LOGIC_PHASE_VIOLATION",
            Self::UnknownModifier { .. } => "LOGIC_UNKNOWN_MODIFIER",
            Self::Rule { .. } => "LOGIC_RULE",
            Self::Modifier(inner) => inner.error_code(),
            Self::Build(inner) => inner.error_code(),
        }
    }
}
