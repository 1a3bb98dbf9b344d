//! Computation core of the Song of Heroic Lands rules engine.
//!
//! `sohl-core` defines the modifier algebra, the class registry that rebuilds
//! persisted objects, the event/action/effect types and the logic tree with
//! its phased recompute pipeline. Everything here is synchronous and free of
//! I/O: the world clock, the id registry and the class registry are injected
//! through [`BuildContext`], and persistence is left to the host.
pub mod base;
pub mod config;
pub mod error;
pub mod event;
pub mod i18n;
pub mod logic;
pub mod modifier;
pub mod time;
pub mod utils;

pub use base::{
    BuildContext, ClassEntry, ClassMetadata, ClassRegistry, ClassTag, DocumentKind, DocumentRef,
    LogicFactory, ParentKind, ParentRef, RegistryError, SohlBase, SohlObject,
};
pub use config::SohlConfig;
pub use error::{ErrorSeverity, SohlError};
pub use event::{
    ActionClass, ActionKind, ActionScope, EventActivation, EventError, EventRepeat, EventTerm,
    SohlAction, SohlEffect, SohlEvent,
};
pub use i18n::{KeyFormatter, MessageFormatter};
pub use logic::{
    BasicLogic, CreateOutcome, CreateTarget, DeleteTarget, DocumentContext, LogicCore, LogicError,
    LogicPhase, LogicRules, PersistRequest, Siblings, SohlLogic, with_siblings,
};
pub use modifier::{
    BaseModifier, CustomFn, DeltaError, DeltaInfo, DeltaKey, DeltaValue, Disable, ModifierError,
    ValueDelta, ValueDeltaOperator, ValueModifier,
};
pub use time::{DurationValue, FixedClock, SohlTemporal, TemporalDirection, WorldClock, WorldTime};
pub use utils::{IdRegistry, Itr, SohlMap, merge_into, merge_object};
