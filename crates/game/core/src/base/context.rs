use serde_json::Value;

use super::{ClassEntry, ClassRegistry, ParentRef, RegistryError, SohlObject};
use crate::event::{ActionClass, SohlAction, SohlEffect};
use crate::logic::SohlLogic;
use crate::modifier::ValueModifier;
use crate::time::{WorldClock, WorldTime};
use crate::utils::IdRegistry;

/// Everything a rebuild needs from the session: the class registry, the id
/// registry and the current world time.
pub struct BuildContext<'a> {
    pub registry: &'a ClassRegistry,
    pub ids: &'a mut IdRegistry,
    pub clock: &'a dyn WorldClock,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        registry: &'a ClassRegistry,
        ids: &'a mut IdRegistry,
        clock: &'a dyn WorldClock,
    ) -> Self {
        Self {
            registry,
            ids,
            clock,
        }
    }

    pub fn world_time(&self) -> WorldTime {
        self.clock.world_time()
    }

    /// Uses `id` if non-empty, otherwise mints one. Either way the id is
    /// claimed in the session.
    pub fn claim_or_generate_id(&mut self, id: Option<&str>) -> String {
        match id.filter(|id| !id.is_empty()) {
            Some(id) => {
                self.ids.claim(id);
                id.to_string()
            }
            None => self.ids.generate_unique_id(),
        }
    }

    /// Rebuilds any registered object from its persisted form.
    pub fn from_data(
        &mut self,
        data: &Value,
        parent: Option<ParentRef>,
    ) -> Result<SohlObject, RegistryError> {
        let (_, entry) = self.registry.resolve(data)?;
        let object = match entry {
            ClassEntry::ValueModifier => {
                SohlObject::ValueModifier(ValueModifier::from_data(data, parent)?)
            }
            ClassEntry::Logic(factory) => {
                SohlObject::Logic(SohlLogic::build(data, parent, factory, self)?)
            }
            ClassEntry::IntrinsicAction => SohlObject::Action(SohlAction::from_data(
                data,
                parent,
                ActionClass::Intrinsic,
                self,
            )?),
            ClassEntry::ScriptAction => SohlObject::Action(SohlAction::from_data(
                data,
                parent,
                ActionClass::Script,
                self,
            )?),
            ClassEntry::Effect => SohlObject::Effect(SohlEffect::from_data(data, parent, self)?),
        };
        Ok(object)
    }

    pub fn logic_from_data(
        &mut self,
        data: &Value,
        parent: Option<ParentRef>,
    ) -> Result<SohlLogic, RegistryError> {
        self.from_data(data, parent)?.into_logic()
    }

    pub fn action_from_data(
        &mut self,
        data: &Value,
        parent: Option<ParentRef>,
    ) -> Result<SohlAction, RegistryError> {
        self.from_data(data, parent)?.into_action()
    }

    pub fn effect_from_data(
        &mut self,
        data: &Value,
        parent: Option<ParentRef>,
    ) -> Result<SohlEffect, RegistryError> {
        self.from_data(data, parent)?.into_effect()
    }

    pub fn modifier_from_data(
        &mut self,
        data: &Value,
        parent: Option<ParentRef>,
    ) -> Result<ValueModifier, RegistryError> {
        self.from_data(data, parent)?.into_modifier()
    }
}
