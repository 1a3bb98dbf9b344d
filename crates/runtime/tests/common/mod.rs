#![allow(dead_code)]

use serde_json::{Map, Value, json};
use sohl_core::{
    BuildContext, ClassRegistry, DocumentContext, DocumentRef, LogicCore, LogicError, LogicRules,
    ParentRef, Siblings, SohlAction, SohlEffect, SohlMap,
};
use sohl_runtime::{HostDocument, RuntimeConfig, Session};

/// Actor body: `protection` from `armor`, a virtual `Swim` skill for merfolk.
#[derive(Clone, Debug)]
pub struct Body {
    armor: f64,
}

impl Body {
    pub fn factory(data: &Map<String, Value>) -> Result<Box<dyn LogicRules>, LogicError> {
        let armor = data.get("armor").and_then(Value::as_f64).unwrap_or(0.0);
        Ok(Box::new(Self { armor }))
    }
}

impl LogicRules for Body {
    fn clone_box(&self) -> Box<dyn LogicRules> {
        Box::new(self.clone())
    }

    fn to_data(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("armor".into(), json!(self.armor));
        data
    }

    fn create_virtual_logics(
        &mut self,
        core: &mut LogicCore,
        doc: &DocumentContext<'_>,
        ctx: &mut BuildContext<'_>,
    ) -> Result<(), LogicError> {
        if doc.system.get("species").and_then(Value::as_str) != Some("merfolk") {
            return Ok(());
        }
        let swim = ctx.logic_from_data(
            &json!({"class": "SkillLogic", "id": "swim", "name": "Swim", "type": "skill", "base": 60}),
            Some(ParentRef::logic(core.id())),
        )?;
        core.add_virtual_logic(swim);
        Ok(())
    }

    fn prepare_base_data(&mut self, core: &mut LogicCore) -> Result<(), LogicError> {
        core.define_modifier("protection", self.armor)?;
        Ok(())
    }
}

/// Skill: `mastery` from `base`, +5 while an effect named `Inspired` exists,
/// +10 for each action named `Train`.
#[derive(Clone, Debug)]
pub struct Skill {
    base: f64,
}

impl Skill {
    pub fn factory(data: &Map<String, Value>) -> Result<Box<dyn LogicRules>, LogicError> {
        let base = data.get("base").and_then(Value::as_f64).unwrap_or(0.0);
        Ok(Box::new(Self { base }))
    }
}

impl LogicRules for Skill {
    fn clone_box(&self) -> Box<dyn LogicRules> {
        Box::new(self.clone())
    }

    fn to_data(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("base".into(), json!(self.base));
        data
    }

    fn prepare_base_data(&mut self, core: &mut LogicCore) -> Result<(), LogicError> {
        core.define_modifier("mastery", self.base)?;
        Ok(())
    }

    fn process_effects(
        &mut self,
        core: &mut LogicCore,
        effects: &SohlMap<String, SohlEffect>,
    ) -> Result<(), LogicError> {
        if effects.some(|effect, _| effect.name() == "Inspired") {
            if let Some(mastery) = core.modifier_mut("mastery") {
                mastery.add(("SOHL.DELTAINFO.Inspired", "Insp"), 5.0)?;
            }
        }
        Ok(())
    }

    fn process_actions(
        &mut self,
        core: &mut LogicCore,
        actions: &SohlMap<String, SohlAction>,
    ) -> Result<(), LogicError> {
        let trained = actions.filter(|action, _| action.name() == "Train").len();
        if trained > 0 {
            if let Some(mastery) = core.modifier_mut("mastery") {
                mastery.add(("SOHL.DELTAINFO.Trained", "Trn"), 10.0 * trained as f64)?;
            }
        }
        Ok(())
    }
}

/// Worn armor: adds `bonus` to the protection of every `body` sibling.
#[derive(Clone, Debug)]
pub struct Armor {
    bonus: f64,
}

impl Armor {
    pub fn factory(data: &Map<String, Value>) -> Result<Box<dyn LogicRules>, LogicError> {
        let bonus = data.get("bonus").and_then(Value::as_f64).unwrap_or(0.0);
        Ok(Box::new(Self { bonus }))
    }
}

impl LogicRules for Armor {
    fn clone_box(&self) -> Box<dyn LogicRules> {
        Box::new(self.clone())
    }

    fn to_data(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("bonus".into(), json!(self.bonus));
        data
    }

    fn process_siblings(
        &mut self,
        core: &mut LogicCore,
        siblings: &mut Siblings<'_, '_>,
    ) -> Result<(), LogicError> {
        let abbrev = format!("Arm{}", core.id());
        for sibling in siblings.iter_mut() {
            if sibling.logic_type() != "body" {
                continue;
            }
            if let Some(protection) = sibling.modifier_mut("protection") {
                protection.add(("SOHL.DELTAINFO.Armor", abbrev.as_str()), self.bonus)?;
            }
        }
        Ok(())
    }
}

pub fn registry() -> ClassRegistry {
    let mut registry = ClassRegistry::with_defaults();
    registry.register_logic("BodyLogic", Body::factory);
    registry.register_logic("SkillLogic", Skill::factory);
    registry.register_logic("ArmorLogic", Armor::factory);
    registry
}

pub fn session() -> Session {
    Session::new(RuntimeConfig::default(), registry())
}

pub fn hero() -> HostDocument {
    HostDocument::new(DocumentRef::actor("A1"), "Hero").with_logic(json!({
        "class": "BodyLogic", "id": "body", "name": "Body", "type": "body", "armor": 2,
        "nestedLogicObjs": [
            {"class": "SkillLogic", "id": "sword", "name": "Sword", "type": "skill", "base": 40,
             "nestedActionObjs": [
                {"class": "SohlIntrinsicAction", "id": "train", "name": "Train", "functionName": "train"}
             ]}
        ],
        "nestedEffectObjs": [
            {"class": "SohlEffect", "id": "inspired", "name": "Inspired", "duration": 60}
        ]
    }))
}

pub fn mail_shirt() -> HostDocument {
    HostDocument::new(DocumentRef::item("I1"), "Mail Shirt")
        .with_owner(DocumentRef::actor("A1"))
        .with_logic(json!({
            "class": "ArmorLogic", "id": "mail", "name": "Mail Shirt", "type": "armor", "bonus": 4,
            "nestedActionObjs": [
                {"class": "SohlScriptAction", "id": "polish", "name": "Polish",
                 "script": "polish()", "useAsync": true},
                {"class": "SohlScriptAction", "id": "clank", "name": "Clank",
                 "script": "clank()", "useAsync": false}
            ]
        }))
}
