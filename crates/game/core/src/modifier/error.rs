//! Errors raised by the delta/modifier algebra.

use crate::error::{ErrorSeverity, SohlError};

/// Invalid delta shape or operator.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum DeltaError {
    #[error("delta {name:?} requires an abbreviation")]
    EmptyAbbrev { name: String },

    #[error("delta name {name:?} is not namespaced")]
    InvalidName { name: String },

    #[error("custom delta {abbrev:?} requires a \"true\"/\"false\" value")]
    CustomRequiresFlag { abbrev: String },

    #[error("delta {abbrev:?} requires a finite numeric value")]
    NonNumericValue { abbrev: String },

    #[error("unknown delta operator {0}")]
    UnknownOperator(u8),
}

impl SohlError for DeltaError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownOperator(_) => ErrorSeverity::Internal,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyAbbrev { .. } => "DELTA_EMPTY_ABBREV",
            Self::InvalidName { .. } => "DELTA_INVALID_NAME",
            Self::CustomRequiresFlag { .. } => "DELTA_CUSTOM_REQUIRES_FLAG",
            Self::NonNumericValue { .. } => "DELTA_NON_NUMERIC_VALUE",
            Self::UnknownOperator(_) => "DELTA_UNKNOWN_OPERATOR",
        }
    }
}

/// Contract violations raised by [`BaseModifier`](super::BaseModifier).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ModifierError {
    #[error("modifier name {name:?} is not namespaced")]
    InvalidModifierName { name: String },

    #[error("no custom handler is configured for custom delta {abbrev:?}")]
    NoCustomHandler { abbrev: String },

    #[error("value {value} is not numeric")]
    NonNumericValue { value: String },

    #[error("modifier requires a parent")]
    MissingParent,

    #[error("invalid delta: {0}")]
    InvalidDelta(#[from] DeltaError),

    #[error("malformed modifier data: {0}")]
    Decode(String),
}

impl SohlError for ModifierError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidDelta(inner) => inner.severity(),
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidModifierName { .. } => "MODIFIER_INVALID_NAME",
            Self::NoCustomHandler { .. } => "MODIFIER_NO_CUSTOM_HANDLER",
            Self::NonNumericValue { .. } => "MODIFIER_NON_NUMERIC_VALUE",
            Self::MissingParent => "MODIFIER_MISSING_PARENT",
            Self::InvalidDelta(inner) => inner.error_code(),
            Self::Decode(_) => "MODIFIER_DECODE",
        }
    }
}
