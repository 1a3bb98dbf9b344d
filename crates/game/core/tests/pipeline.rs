use serde_json::{Map, Value, json};
use sohl_core::{
    BuildContext, ClassRegistry, DocumentRef, FixedClock, IdRegistry, LogicCore, LogicError,
    LogicPhase, LogicRules, ParentRef, RegistryError, Siblings, SohlAction, SohlBase, SohlEffect,
    SohlLogic, SohlMap, with_siblings,
};

/// Defines `protection` from the persisted `armor` field.
#[derive(Clone, Debug)]
struct BodyPart {
    armor: f64,
}

impl BodyPart {
    fn factory(data: &Map<String, Value>) -> Result<Box<dyn LogicRules>, LogicError> {
        let armor = data.get("armor").and_then(Value::as_f64).unwrap_or(0.0);
        Ok(Box::new(Self { armor }))
    }
}

impl LogicRules for BodyPart {
    fn clone_box(&self) -> Box<dyn LogicRules> {
        Box::new(self.clone())
    }

    fn to_data(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("armor".into(), json!(self.armor));
        data
    }

    fn prepare_base_data(&mut self, core: &mut LogicCore) -> Result<(), LogicError> {
        core.define_modifier("protection", self.armor)?;
        Ok(())
    }

    fn process_effects(
        &mut self,
        core: &mut LogicCore,
        effects: &SohlMap<String, SohlEffect>,
    ) -> Result<(), LogicError> {
        if effects.some(|effect, _| effect.name() == "Weakened") {
            if let Some(protection) = core.modifier_mut("protection") {
                protection.add(("SOHL.DELTAINFO.Weak", "Weak"), -1.0)?;
            }
        }
        Ok(())
    }
}

/// Adds its bonus to every body part's protection.
#[derive(Clone, Debug)]
struct Shield {
    bonus: f64,
}

impl Shield {
    fn factory(data: &Map<String, Value>) -> Result<Box<dyn LogicRules>, LogicError> {
        let bonus = data.get("bonus").and_then(Value::as_f64).unwrap_or(0.0);
        Ok(Box::new(Self { bonus }))
    }
}

impl LogicRules for Shield {
    fn clone_box(&self) -> Box<dyn LogicRules> {
        Box::new(self.clone())
    }

    fn process_siblings(
        &mut self,
        core: &mut LogicCore,
        siblings: &mut Siblings<'_, '_>,
    ) -> Result<(), LogicError> {
        let abbrev = format!("Shd{}", core.id());
        for sibling in siblings.iter_mut() {
            if sibling.logic_type() != "bodypart" {
                continue;
            }
            if let Some(protection) = sibling.modifier_mut("protection") {
                protection.add(("SOHL.DELTAINFO.Shield", abbrev.as_str()), self.bonus)?;
            }
        }
        Ok(())
    }
}

/// Totals the protection of its children once they are final.
#[derive(Clone, Debug)]
struct Body;

impl Body {
    fn factory(_: &Map<String, Value>) -> Result<Box<dyn LogicRules>, LogicError> {
        Ok(Box::new(Self))
    }
}

impl LogicRules for Body {
    fn clone_box(&self) -> Box<dyn LogicRules> {
        Box::new(self.clone())
    }

    fn post_process(&mut self, core: &mut LogicCore) -> Result<(), LogicError> {
        let total = core.logics().reduce(0.0, |sum, child, _| {
            sum + child
                .peek_modifier("protection")
                .map(|m| m.effective())
                .unwrap_or(0.0)
        });
        core.define_modifier("total", total)?;
        Ok(())
    }
}

fn registry() -> ClassRegistry {
    let mut registry = ClassRegistry::with_defaults();
    registry.register_logic("BodyPartLogic", BodyPart::factory);
    registry.register_logic("ShieldLogic", Shield::factory);
    registry.register_logic("BodyLogic", Body::factory);
    registry
}

fn run_cycle(roots: &mut [&mut SohlLogic], effects: &SohlMap<String, SohlEffect>) {
    let actions: SohlMap<String, SohlAction> = SohlMap::new();
    for root in roots.iter_mut() {
        root.prepare_base_data().unwrap();
    }
    for root in roots.iter_mut() {
        root.process_effects(effects).unwrap();
        root.process_actions(&actions).unwrap();
    }
    with_siblings(roots, |root, siblings| root.process_siblings(siblings)).unwrap();
    for root in roots.iter_mut() {
        root.post_process().unwrap();
    }
}

#[test]
fn sibling_contributions_reach_every_body_part() {
    let registry = registry();
    let mut ids = IdRegistry::default();
    let clock = FixedClock::new(0);
    let mut ctx = BuildContext::new(&registry, &mut ids, &clock);

    let mut head = ctx
        .logic_from_data(
            &json!({"class": "BodyPartLogic", "id": "head", "name": "Head", "type": "bodypart", "armor": 2}),
            Some(DocumentRef::item("I1").into()),
        )
        .unwrap();
    let mut torso = ctx
        .logic_from_data(
            &json!({"class": "BodyPartLogic", "id": "torso", "name": "Torso", "type": "bodypart", "armor": 5}),
            Some(DocumentRef::item("I2").into()),
        )
        .unwrap();
    let mut shield = ctx
        .logic_from_data(
            &json!({"class": "ShieldLogic", "id": "shield", "name": "Kite", "type": "gear", "bonus": 3}),
            Some(DocumentRef::item("I3").into()),
        )
        .unwrap();

    run_cycle(&mut [&mut head, &mut torso, &mut shield], &SohlMap::new());

    assert_eq!(head.effective("protection").unwrap(), 5.0);
    assert_eq!(torso.effective("protection").unwrap(), 8.0);
    assert_eq!(shield.phase(), LogicPhase::Finalized);

    // A second cycle starts from scratch rather than stacking.
    run_cycle(&mut [&mut head, &mut torso, &mut shield], &SohlMap::new());
    assert_eq!(head.effective("protection").unwrap(), 5.0);
}

#[test]
fn nested_children_finish_before_their_parent() {
    let registry = registry();
    let mut ids = IdRegistry::default();
    let clock = FixedClock::new(0);
    let mut ctx = BuildContext::new(&registry, &mut ids, &clock);

    let mut body = ctx
        .logic_from_data(
            &json!({
                "class": "BodyLogic", "id": "body", "name": "Body", "type": "anatomy",
                "nestedLogicObjs": [
                    {"class": "BodyPartLogic", "id": "arm", "name": "Arm", "type": "bodypart", "armor": 1},
                    {"class": "BodyPartLogic", "id": "leg", "name": "Leg", "type": "bodypart", "armor": 4},
                    {"class": "ShieldLogic", "id": "buckler", "name": "Buckler", "type": "gear", "bonus": 2}
                ]
            }),
            Some(DocumentRef::actor("A1").into()),
        )
        .unwrap();

    let weakened = ctx
        .effect_from_data(
            &json!({"class": "SohlEffect", "name": "Weakened", "term": "permanent"}),
            Some(ParentRef::logic("body")),
        )
        .unwrap();
    let mut effects = SohlMap::new();
    effects.set(weakened.id().to_string(), weakened);

    run_cycle(&mut [&mut body], &effects);

    // arm: 1 - 1 + 2, leg: 4 - 1 + 2
    assert_eq!(body.effective("total").unwrap(), 7.0);
    let arm = body.find("arm").unwrap();
    assert_eq!(arm.modifier("protection").unwrap().abbrev(), "Weak -1, Shdbuckler +2");
}

#[test]
fn registry_dispatch_and_round_trip() {
    let registry = registry();
    let mut ids = IdRegistry::default();
    let clock = FixedClock::new(10);
    let mut ctx = BuildContext::new(&registry, &mut ids, &clock);

    let modifier = ctx
        .from_data(
            &json!({"class": "ValueModifier", "schemaVersion": "0.6.0", "baseValue": 3}),
            Some(ParentRef::logic("x")),
        )
        .unwrap()
        .into_modifier()
        .unwrap();
    assert_eq!(modifier.effective(), 3.0);

    assert_eq!(
        ctx.from_data(&json!({"class": "Bogus"}), Some(ParentRef::logic("x")))
            .unwrap_err(),
        RegistryError::UnregisteredClass("Bogus".into())
    );

    let data = json!({
        "class": "BodyPartLogic", "id": "hand", "name": "Hand", "type": "bodypart", "armor": 1,
        "nestedActionObjs": [
            {"class": "SohlScriptAction", "id": "wave", "name": "Wave", "script": "wave()", "useAsync": false}
        ],
        "nestedEffectObjs": [
            {"class": "SohlEffect", "id": "numb", "name": "Numb", "duration": 60}
        ]
    });
    let hand = ctx
        .logic_from_data(&data, Some(DocumentRef::item("I7").into()))
        .unwrap();
    let json = hand.to_json();
    let rebuilt = ctx
        .logic_from_data(&json, Some(DocumentRef::item("I7").into()))
        .unwrap();
    assert_eq!(rebuilt.to_json(), json);
    assert_eq!(json["nestedEffectObjs"][0]["expire"], 70);
}

#[test]
fn isolated_registries_do_not_share_ids() {
    let registry = ClassRegistry::with_defaults();
    let clock = FixedClock::new(0);

    let mut first = IdRegistry::new(7);
    let mut second = IdRegistry::new(7);
    let a = BuildContext::new(&registry, &mut first, &clock).claim_or_generate_id(None);
    let b = BuildContext::new(&registry, &mut second, &clock).claim_or_generate_id(None);
    assert_eq!(a, b);

    first.reset();
    assert!(first.is_empty());
}
