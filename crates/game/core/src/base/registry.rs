//! Class registry and the closed set of objects it can rebuild.

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::{ClassTag, ParentRef, RegistryError, SohlBase};
use crate::event::{SohlAction, SohlEffect};
use crate::logic::{BasicLogic, LogicError, LogicRules, SohlLogic};
use crate::modifier::ValueModifier;

/// Builds the rule set of a logic class from its persisted fields.
pub type LogicFactory = fn(&Map<String, Value>) -> Result<Box<dyn LogicRules>, LogicError>;

/// Family a registered class name resolves to.
///
/// Logic classes carry the factory for their rule set; every other family is
/// a fixed type.
#[derive(Clone, Copy, Debug)]
pub enum ClassEntry {
    ValueModifier,
    Logic(LogicFactory),
    IntrinsicAction,
    ScriptAction,
    Effect,
}

impl ClassEntry {
    pub const fn family(&self) -> &'static str {
        match self {
            Self::ValueModifier => "modifier",
            Self::Logic(_) => "logic",
            Self::IntrinsicAction | Self::ScriptAction => "action",
            Self::Effect => "effect",
        }
    }
}

/// Maps persisted class names to the family that rebuilds them.
///
/// Built once per session and passed by reference. Registering an existing
/// name replaces the previous entry.
#[derive(Clone, Debug, Default)]
pub struct ClassRegistry {
    entries: HashMap<String, ClassEntry>,
}

impl ClassRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with every built-in class.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ValueModifier::METADATA.name, ClassEntry::ValueModifier);
        registry.register(SohlLogic::METADATA.name, ClassEntry::Logic(BasicLogic::factory));
        registry.register(SohlAction::INTRINSIC.name, ClassEntry::IntrinsicAction);
        registry.register(SohlAction::SCRIPT.name, ClassEntry::ScriptAction);
        registry.register(SohlEffect::METADATA.name, ClassEntry::Effect);
        registry
    }

    /// Registers `name`, returning the entry it replaced.
    pub fn register(&mut self, name: impl Into<String>, entry: ClassEntry) -> Option<ClassEntry> {
        self.entries.insert(name.into(), entry)
    }

    pub fn register_logic(
        &mut self,
        name: impl Into<String>,
        factory: LogicFactory,
    ) -> Option<ClassEntry> {
        self.register(name, ClassEntry::Logic(factory))
    }

    pub fn get(&self, name: &str) -> Option<ClassEntry> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Looks up the class tag of a persisted object.
    pub fn resolve<'d>(&self, data: &'d Value) -> Result<(&'d str, ClassEntry), RegistryError> {
        let class = data
            .get("class")
            .and_then(Value::as_str)
            .filter(|class| !class.is_empty())
            .ok_or(RegistryError::MissingClassTag)?;
        let entry = self
            .get(class)
            .ok_or_else(|| RegistryError::UnregisteredClass(class.to_string()))?;
        Ok((class, entry))
    }

    /// Checks that `data` and every nested child resolve, without building.
    pub fn validate_tree(&self, data: &Value) -> Result<(), RegistryError> {
        self.resolve(data)?;
        for key in ["nestedLogicObjs", "nestedActionObjs", "nestedEffectObjs"] {
            if let Some(children) = data.get(key).and_then(Value::as_array) {
                for child in children {
                    self.validate_tree(child)?;
                }
            }
        }
        Ok(())
    }
}

/// Any object the registry can rebuild.
#[derive(Debug)]
pub enum SohlObject {
    ValueModifier(ValueModifier),
    Logic(SohlLogic),
    Action(SohlAction),
    Effect(SohlEffect),
}

impl SohlObject {
    pub fn tag(&self) -> &ClassTag {
        match self {
            Self::ValueModifier(m) => m.tag(),
            Self::Logic(l) => l.tag(),
            Self::Action(a) => a.tag(),
            Self::Effect(e) => e.tag(),
        }
    }

    pub fn parent(&self) -> Option<&ParentRef> {
        match self {
            Self::ValueModifier(m) => m.parent(),
            Self::Logic(l) => l.parent(),
            Self::Action(a) => a.parent(),
            Self::Effect(e) => e.parent(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::ValueModifier(m) => m.to_json(),
            Self::Logic(l) => l.to_json(),
            Self::Action(a) => a.to_json(),
            Self::Effect(e) => e.to_json(),
        }
    }

    fn mismatch(&self, expected: &'static str) -> RegistryError {
        RegistryError::KindMismatch {
            class: self.tag().class.clone(),
            expected,
        }
    }

    pub fn into_logic(self) -> Result<SohlLogic, RegistryError> {
        match self {
            Self::Logic(logic) => Ok(logic),
            other => Err(other.mismatch("logic")),
        }
    }

    pub fn into_action(self) -> Result<SohlAction, RegistryError> {
        match self {
            Self::Action(action) => Ok(action),
            other => Err(other.mismatch("action")),
        }
    }

    pub fn into_effect(self) -> Result<SohlEffect, RegistryError> {
        match self {
            Self::Effect(effect) => Ok(effect),
            other => Err(other.mismatch("effect")),
        }
    }

    pub fn into_modifier(self) -> Result<ValueModifier, RegistryError> {
        match self {
            Self::ValueModifier(modifier) => Ok(modifier),
            other => Err(other.mismatch("modifier")),
        }
    }
}
