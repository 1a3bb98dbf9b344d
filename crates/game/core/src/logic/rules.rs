//! Per-class behavior plugged into a logic node.

use std::fmt;

use serde_json::{Map, Value};

use super::{LogicCore, LogicError, Siblings};
use crate::base::{BuildContext, DocumentRef};
use crate::event::{SohlAction, SohlEffect};
use crate::utils::SohlMap;

/// Fields every logic node persists itself. Anything else in a persisted
/// `logicObj` belongs to the node's rule set.
pub const LOGIC_FIELDS: [&str; 10] = [
    "class",
    "schemaVersion",
    "id",
    "name",
    "type",
    "description",
    "img",
    "nestedLogicObjs",
    "nestedEffectObjs",
    "nestedActionObjs",
];

/// Copies the fields of `data` that are not [`LOGIC_FIELDS`].
pub fn extra_fields(data: &Map<String, Value>) -> Map<String, Value> {
    data.iter()
        .filter(|(key, _)| !LOGIC_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Read-only view of the host document a root logic node belongs to.
#[derive(Clone, Copy, Debug)]
pub struct DocumentContext<'a> {
    pub document: &'a DocumentRef,
    pub name: &'a str,
    /// Host-side system data, excluding the persisted logic tree.
    pub system: &'a Value,
}

/// Game rules of one logic class.
///
/// Every hook defaults to a no-op. Hooks receive the node's [`LogicCore`] and
/// never the rule set's own node, so a rule set can hold state of its own
/// while mutating the node it belongs to.
pub trait LogicRules: fmt::Debug + Send + Sync {
    fn clone_box(&self) -> Box<dyn LogicRules>;

    /// Extra persisted fields, merged into the node's `to_json`.
    fn to_data(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Adds nodes derived from the owning document; see
    /// [`LogicCore::add_virtual_logic`].
    fn create_virtual_logics(
        &mut self,
        _core: &mut LogicCore,
        _doc: &DocumentContext<'_>,
        _ctx: &mut BuildContext<'_>,
    ) -> Result<(), LogicError> {
        Ok(())
    }

    /// Defines this cycle's modifiers from persisted base fields.
    fn prepare_base_data(&mut self, _core: &mut LogicCore) -> Result<(), LogicError> {
        Ok(())
    }

    fn process_effects(
        &mut self,
        _core: &mut LogicCore,
        _effects: &SohlMap<String, SohlEffect>,
    ) -> Result<(), LogicError> {
        Ok(())
    }

    fn process_actions(
        &mut self,
        _core: &mut LogicCore,
        _actions: &SohlMap<String, SohlAction>,
    ) -> Result<(), LogicError> {
        Ok(())
    }

    /// Applies contributions to and from other nodes. `siblings` never
    /// contains this node.
    fn process_siblings(
        &mut self,
        _core: &mut LogicCore,
        _siblings: &mut Siblings<'_, '_>,
    ) -> Result<(), LogicError> {
        Ok(())
    }

    fn post_process(&mut self, _core: &mut LogicCore) -> Result<(), LogicError> {
        Ok(())
    }
}

impl Clone for Box<dyn LogicRules> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Rule set with no behavior, registered as `SohlLogic`.
///
/// Keeps unknown persisted fields so they survive a round trip.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BasicLogic {
    extra: Map<String, Value>,
}

impl BasicLogic {
    pub fn factory(data: &Map<String, Value>) -> Result<Box<dyn LogicRules>, LogicError> {
        Ok(Box::new(Self {
            extra: extra_fields(data),
        }))
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

impl LogicRules for BasicLogic {
    fn clone_box(&self) -> Box<dyn LogicRules> {
        Box::new(self.clone())
    }

    fn to_data(&self) -> Map<String, Value> {
        self.extra.clone()
    }
}
