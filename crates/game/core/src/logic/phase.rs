use super::LogicError;

/// Where a logic node stands in the current recompute cycle.
///
/// ```text
/// Uninitialized -> BaseReady -> ActionsApplied -> SiblingsApplied -> Finalized
/// ```
///
/// `prepare_base_data` may run from any state and starts a new cycle.
/// Rebuilding a node or synthesizing virtual children drops it back to
/// `Uninitialized`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
pub enum LogicPhase {
    #[default]
    Uninitialized,
    BaseReady,
    ActionsApplied,
    SiblingsApplied,
    Finalized,
}

impl LogicPhase {
    pub const fn is_finalized(self) -> bool {
        matches!(self, Self::Finalized)
    }

    pub(crate) fn require(
        self,
        expected: LogicPhase,
        logic: &str,
        operation: &'static str,
    ) -> Result<(), LogicError> {
        if self == expected {
            Ok(())
        } else {
            Err(LogicError::PhaseViolation {
                logic: logic.to_string(),
                operation,
                expected,
                actual: self,
            })
        }
    }
}
