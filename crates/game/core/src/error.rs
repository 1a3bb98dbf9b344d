//! Common error infrastructure for sohl-core.
//!
//! Domain-specific errors (e.g. [`ModifierError`](crate::modifier::ModifierError),
//! [`LogicError`](crate::logic::LogicError)) live beside the types they guard.
//! This module holds the shared classification used by all of them.
//!
//! Every error raised by the core is a contract violation detected at the
//! point of the call. Nothing is retried or degraded inside the crate; callers
//! decide how to surface failures.

/// Severity level of an error, used for categorization by hosts and loggers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    /// Invalid input from the caller: bad names, missing required fields,
    /// malformed persisted documents.
    Validation,

    /// Internal inconsistency: a recompute phase invoked out of order, a class
    /// resolved to the wrong family.
    Internal,

    /// Unrecoverable: the registry or document tree cannot be trusted anymore.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all sohl-core errors.
///
/// - All error enums implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - `error_code` is stable and suitable for metrics and assertions
pub trait SohlError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
