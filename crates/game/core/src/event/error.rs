use crate::error::{ErrorSeverity, SohlError};

/// Failure to build an event, action or effect.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EventError {
    #[error("events require a parent")]
    MissingParent,

    #[error("intrinsic action must have a function name")]
    MissingFunctionName,

    #[error("script action must have a script")]
    MissingScript,

    #[error("scheduled event {name:?} has no activation time")]
    MissingActivationTime { name: String },

    #[error("malformed event data: {0}")]
    Decode(String),
}

impl SohlError for EventError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingParent => "EVENT_MISSING_PARENT",
            Self::MissingFunctionName => "EVENT_MISSING_FUNCTION_NAME",
            Self::MissingScript => "EVENT_MISSING_SCRIPT",
            Self::MissingActivationTime { .. } => "EVENT_MISSING_ACTIVATION_TIME",
            Self::Decode(_) => "EVENT_DECODE",
        }
    }
}
