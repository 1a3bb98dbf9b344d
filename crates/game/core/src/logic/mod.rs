//! The logic tree and its recompute pipeline.
//!
//! A [`SohlLogic`] node owns nested logic nodes, actions and effects, each in
//! an insertion-ordered [`SohlMap`](crate::utils::SohlMap) keyed by id. Game
//! rules plug in through [`LogicRules`]; the class registry maps each logic
//! class name to the factory of its rule set.
//!
//! Every cycle runs the same phases over the whole tree, in order:
//!
//! 1. `create_virtual_logics` (optional, document roots only)
//! 2. `prepare_base_data`
//! 3. `process_effects`, then `process_actions`
//! 4. `process_siblings`
//! 5. `post_process`
//!
//! [`LogicPhase`] tracks each node's progress and rejects calls made out of
//! order, as well as stable modifier reads before the cycle is finalized.

mod error;
mod node;
mod phase;
mod rules;
mod siblings;

pub use error::LogicError;
pub use node::{CreateOutcome, CreateTarget, DeleteTarget, LogicCore, PersistRequest, SohlLogic};
pub use phase::LogicPhase;
pub use rules::{BasicLogic, DocumentContext, LOGIC_FIELDS, LogicRules, extra_fields};
pub use siblings::{Siblings, with_siblings};
