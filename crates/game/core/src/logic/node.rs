use std::ops::{Deref, DerefMut};

use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::{
    DocumentContext, LogicError, LogicPhase, LogicRules, Siblings, with_siblings,
};
use crate::base::{
    BuildContext, ClassMetadata, ClassTag, DocumentRef, LogicFactory, ParentRef, RegistryError,
    SohlBase,
};
use crate::event::{SohlAction, SohlEffect};
use crate::modifier::{ModifierError, ValueModifier};
use crate::time::WorldClock;
use crate::utils::{Itr, SohlMap, merge_object};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogicData {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    logic_type: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    img: Option<String>,
    #[serde(default)]
    nested_logic_objs: Vec<Value>,
    #[serde(default)]
    nested_effect_objs: Vec<Value>,
    #[serde(default)]
    nested_action_objs: Vec<Value>,
}

/// State of a logic node that its rule set may read and mutate.
#[derive(Clone, Debug)]
pub struct LogicCore {
    tag: ClassTag,
    parent: ParentRef,
    id: String,
    name: String,
    logic_type: String,
    description: String,
    img: String,
    logics: SohlMap<String, SohlLogic>,
    actions: SohlMap<String, SohlAction>,
    effects: SohlMap<String, SohlEffect>,
    modifiers: SohlMap<String, ValueModifier>,
    phase: LogicPhase,
    is_virtual: bool,
}

impl LogicCore {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn logic_type(&self) -> &str {
        &self.logic_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn img(&self) -> &str {
        &self.img
    }

    pub fn parent_ref(&self) -> &ParentRef {
        &self.parent
    }

    pub fn phase(&self) -> LogicPhase {
        self.phase
    }

    /// Derived from the owning document rather than persisted.
    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    // ===== nested logic nodes =====

    pub fn logics(&self) -> &SohlMap<String, SohlLogic> {
        &self.logics
    }

    pub fn nested_logics(&self) -> Itr<impl Iterator<Item = (&String, &SohlLogic)>> {
        self.logics.entries()
    }

    pub fn logic_mut(&mut self, id: &str) -> Option<&mut SohlLogic> {
        self.logics.get_mut(id)
    }

    /// Adds `logic` unless a child with its id exists. Returns whether it
    /// was added.
    pub fn add_logic(&mut self, logic: SohlLogic) -> bool {
        self.logics.insert_if_absent(logic.core.id.clone(), logic)
    }

    /// Adds a child that exists only for the current cycle. It is skipped
    /// by `to_json` and replaced on the next `create_virtual_logics`.
    pub fn add_virtual_logic(&mut self, mut logic: SohlLogic) -> bool {
        logic.core.is_virtual = true;
        self.add_logic(logic)
    }

    pub fn delete_logic(&mut self, id: &str) -> Option<SohlLogic> {
        self.logics.delete(id)
    }

    // ===== actions =====

    pub fn actions(&self) -> &SohlMap<String, SohlAction> {
        &self.actions
    }

    pub fn nested_actions(&self) -> Itr<impl Iterator<Item = (&String, &SohlAction)>> {
        self.actions.entries()
    }

    pub fn add_action(&mut self, action: SohlAction) -> bool {
        self.actions.insert_if_absent(action.id().to_string(), action)
    }

    pub fn delete_action(&mut self, id: &str) -> Option<SohlAction> {
        self.actions.delete(id)
    }

    // ===== effects =====

    pub fn effects(&self) -> &SohlMap<String, SohlEffect> {
        &self.effects
    }

    pub fn nested_effects(&self) -> Itr<impl Iterator<Item = (&String, &SohlEffect)>> {
        self.effects.entries()
    }

    pub fn add_effect(&mut self, effect: SohlEffect) -> bool {
        self.effects.insert_if_absent(effect.id().to_string(), effect)
    }

    pub fn delete_effect(&mut self, id: &str) -> Option<SohlEffect> {
        self.effects.delete(id)
    }

    // ===== modifiers =====

    pub fn modifiers(&self) -> &SohlMap<String, ValueModifier> {
        &self.modifiers
    }

    /// Starts this cycle's modifier `name` at `base`, replacing any previous
    /// one.
    pub fn define_modifier(
        &mut self,
        name: impl Into<String>,
        base: f64,
    ) -> Result<&mut ValueModifier, ModifierError> {
        let modifier = ValueModifier::with_base(ParentRef::logic(self.id.clone()), base)?;
        Ok(self.modifiers.upsert(name.into(), modifier))
    }

    /// Reads a modifier without checking the phase. Meant for rule sets
    /// while the pipeline runs.
    pub fn peek_modifier(&self, name: &str) -> Option<&ValueModifier> {
        self.modifiers.get(name)
    }

    pub fn modifier_mut(&mut self, name: &str) -> Option<&mut ValueModifier> {
        self.modifiers.get_mut(name)
    }

    fn require_phase(&self, expected: LogicPhase, operation: &'static str) -> Result<(), LogicError> {
        self.phase.require(expected, &self.id, operation)
    }
}

/// Where [`SohlLogic::create`] attaches the new node.
#[derive(Debug)]
pub enum CreateTarget<'a> {
    /// Register under an in-memory logic node.
    Logic(&'a mut SohlLogic),
    /// Make the node the root of a host document.
    Document(DocumentRef),
}

/// A document update the host must persist.
#[derive(Debug)]
pub struct PersistRequest {
    pub document: DocumentRef,
    /// Partial data for the document, `{"logicObj": ...}`.
    pub patch: Value,
    pub logic: SohlLogic,
}

#[derive(Debug)]
pub enum CreateOutcome {
    Registered { id: String },
    Persist(PersistRequest),
}

/// What [`SohlLogic::delete_target`] says must be removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteTarget {
    /// Remove the node from its parent logic node.
    Logic { parent: String, id: String },
    /// The node is a document root: delete the whole document.
    Document(DocumentRef),
}

/// A node of the logic tree: persisted fields, nested children, this cycle's
/// modifiers, and the rule set of its class.
#[derive(Debug)]
pub struct SohlLogic {
    core: LogicCore,
    rules: Box<dyn LogicRules>,
}

impl SohlLogic {
    /// Builds a node from persisted data with the rule set made by `factory`.
    ///
    /// Nested children are rebuilt through the registry with this node as
    /// their parent.
    pub fn build(
        data: &Value,
        parent: Option<ParentRef>,
        factory: LogicFactory,
        ctx: &mut BuildContext<'_>,
    ) -> Result<Self, LogicError> {
        let parent = parent.ok_or(LogicError::MissingParent)?;
        let object = data
            .as_object()
            .ok_or_else(|| LogicError::Decode("logic data must be an object".into()))?;
        let decoded =
            LogicData::deserialize(data).map_err(|e| LogicError::Decode(e.to_string()))?;

        let (name, logic_type) = match (decoded.name, decoded.logic_type) {
            (Some(name), Some(logic_type)) if !name.is_empty() && !logic_type.is_empty() => {
                (name, logic_type)
            }
            _ => return Err(LogicError::MissingNameOrType),
        };

        let rules = factory(object)?;
        let id = ctx.claim_or_generate_id(decoded.id.as_deref());
        let owner = ParentRef::logic(id.clone());

        let mut logics = SohlMap::new();
        for child in &decoded.nested_logic_objs {
            let logic = ctx.logic_from_data(child, Some(owner.clone()))?;
            logics.set(logic.core.id.clone(), logic);
        }
        let mut effects = SohlMap::new();
        for child in &decoded.nested_effect_objs {
            let effect = ctx.effect_from_data(child, Some(owner.clone()))?;
            effects.set(effect.id().to_string(), effect);
        }
        let mut actions = SohlMap::new();
        for child in &decoded.nested_action_objs {
            let action = ctx.action_from_data(child, Some(owner.clone()))?;
            actions.set(action.id().to_string(), action);
        }

        Ok(Self {
            core: LogicCore {
                tag: ClassTag::from_value(data, &Self::METADATA),
                parent,
                id,
                name,
                logic_type,
                description: decoded.description.unwrap_or_default(),
                img: decoded.img.unwrap_or_default(),
                logics,
                actions,
                effects,
                modifiers: SohlMap::new(),
                phase: LogicPhase::Uninitialized,
                is_virtual: false,
            },
            rules,
        })
    }

    /// Builds a node and attaches it to `target`.
    ///
    /// Under a logic node the child is registered in memory, failing with
    /// [`RegistryError::DuplicateId`] if the parent already holds that id. For
    /// a document the node is handed back as a [`PersistRequest`] for the host
    /// to store.
    pub fn create(
        data: &Value,
        target: CreateTarget<'_>,
        ctx: &mut BuildContext<'_>,
    ) -> Result<CreateOutcome, LogicError> {
        let mut data = data.clone();
        Self::METADATA.stamp(&mut data);
        match target {
            CreateTarget::Logic(parent) => {
                let logic = ctx.logic_from_data(&data, Some(ParentRef::logic(parent.id())))?;
                let id = logic.core.id.clone();
                if !parent.add_logic(logic) {
                    return Err(RegistryError::duplicate_id(parent.id(), id).into());
                }
                Ok(CreateOutcome::Registered { id })
            }
            CreateTarget::Document(document) => {
                let logic =
                    ctx.logic_from_data(&data, Some(ParentRef::Document(document.clone())))?;
                let patch = json!({ "logicObj": logic.to_json() });
                Ok(CreateOutcome::Persist(PersistRequest {
                    document,
                    patch,
                    logic,
                }))
            }
        }
    }

    /// New node with `patch` merged over this node's persisted form.
    ///
    /// `self` is untouched. The result starts a fresh cycle, so derived
    /// state must be recomputed by running the pipeline again.
    pub fn with_patch(&self, patch: &Value, ctx: &mut BuildContext<'_>) -> Result<Self, LogicError> {
        let data = merge_object(&self.to_json(), patch);
        let mut logic = ctx.logic_from_data(&data, Some(self.core.parent.clone()))?;
        logic.core.is_virtual = self.core.is_virtual;
        Ok(logic)
    }

    /// Replaces this node with [`with_patch`](Self::with_patch).
    pub fn update(&mut self, patch: &Value, ctx: &mut BuildContext<'_>) -> Result<(), LogicError> {
        *self = self.with_patch(patch, ctx)?;
        Ok(())
    }

    pub fn delete_target(&self) -> DeleteTarget {
        match &self.core.parent {
            ParentRef::Logic(parent) => DeleteTarget::Logic {
                parent: parent.clone(),
                id: self.core.id.clone(),
            },
            ParentRef::Document(document) => DeleteTarget::Document(document.clone()),
        }
    }

    pub fn rules(&self) -> &dyn LogicRules {
        self.rules.as_ref()
    }

    // ===== tree navigation =====

    /// This node or a descendant with `id`.
    pub fn find(&self, id: &str) -> Option<&SohlLogic> {
        if self.core.id == id {
            return Some(self);
        }
        self.core.logics.values().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut SohlLogic> {
        if self.core.id == id {
            return Some(self);
        }
        self.core
            .logics
            .values_mut()
            .find_map(|child| child.find_mut(id))
    }

    /// Removes the descendant with `id` from whichever node holds it.
    pub fn remove_descendant(&mut self, id: &str) -> Option<SohlLogic> {
        if let Some(removed) = self.core.logics.delete(id) {
            return Some(removed);
        }
        self.core
            .logics
            .values_mut()
            .find_map(|child| child.remove_descendant(id))
    }

    /// Drops every expired effect in this subtree and returns them.
    pub fn remove_expired_effects(&mut self, clock: &dyn WorldClock) -> Vec<SohlEffect> {
        let mut removed: Vec<SohlEffect> = self
            .core
            .effects
            .remove_where(|_, effect| effect.is_expired(clock))
            .into_iter()
            .map(|(_, effect)| effect)
            .collect();
        for child in self.core.logics.values_mut() {
            removed.extend(child.remove_expired_effects(clock));
        }
        removed
    }

    // ===== recompute pipeline =====

    /// Replaces this subtree's virtual children with freshly derived ones.
    pub fn create_virtual_logics(
        &mut self,
        doc: &DocumentContext<'_>,
        ctx: &mut BuildContext<'_>,
    ) -> Result<(), LogicError> {
        self.core.logics.remove_where(|_, logic| logic.core.is_virtual);
        self.rules.create_virtual_logics(&mut self.core, doc, ctx)?;
        for child in self.core.logics.values_mut() {
            child.create_virtual_logics(doc, ctx)?;
        }
        self.core.phase = LogicPhase::Uninitialized;
        Ok(())
    }

    /// Starts a cycle: clears and redefines this subtree's modifiers.
    pub fn prepare_base_data(&mut self) -> Result<(), LogicError> {
        self.core.modifiers.clear();
        self.rules.prepare_base_data(&mut self.core)?;
        for child in self.core.logics.values_mut() {
            child.prepare_base_data()?;
        }
        self.core.phase = LogicPhase::BaseReady;
        Ok(())
    }

    /// Applies active effects. Runs after `prepare_base_data` and leaves the
    /// phase unchanged.
    pub fn process_effects(
        &mut self,
        effects: &SohlMap<String, SohlEffect>,
    ) -> Result<(), LogicError> {
        self.core
            .require_phase(LogicPhase::BaseReady, "process_effects")?;
        self.rules.process_effects(&mut self.core, effects)?;
        for child in self.core.logics.values_mut() {
            child.process_effects(effects)?;
        }
        Ok(())
    }

    pub fn process_actions(
        &mut self,
        actions: &SohlMap<String, SohlAction>,
    ) -> Result<(), LogicError> {
        self.core
            .require_phase(LogicPhase::BaseReady, "process_actions")?;
        self.rules.process_actions(&mut self.core, actions)?;
        for child in self.core.logics.values_mut() {
            child.process_actions(actions)?;
        }
        self.core.phase = LogicPhase::ActionsApplied;
        Ok(())
    }

    /// Applies sibling contributions. Children see each other as siblings.
    pub fn process_siblings(&mut self, siblings: &mut Siblings<'_, '_>) -> Result<(), LogicError> {
        self.core
            .require_phase(LogicPhase::ActionsApplied, "process_siblings")?;
        self.rules.process_siblings(&mut self.core, siblings)?;
        let mut children: Vec<&mut SohlLogic> = self.core.logics.values_mut().collect();
        with_siblings(&mut children, |child, others| child.process_siblings(others))?;
        self.core.phase = LogicPhase::SiblingsApplied;
        Ok(())
    }

    /// Finishes the cycle. Children finish before their parent, so a parent
    /// can aggregate final child values.
    pub fn post_process(&mut self) -> Result<(), LogicError> {
        self.core
            .require_phase(LogicPhase::SiblingsApplied, "post_process")?;
        for child in self.core.logics.values_mut() {
            child.post_process()?;
        }
        self.rules.post_process(&mut self.core)?;
        self.core.phase = LogicPhase::Finalized;
        Ok(())
    }

    /// Stable read of modifier `name`. Fails until the cycle is finalized.
    pub fn modifier(&self, name: &str) -> Result<&ValueModifier, LogicError> {
        self.core.require_phase(LogicPhase::Finalized, "modifier")?;
        self.core
            .modifiers
            .get(name)
            .ok_or_else(|| LogicError::UnknownModifier {
                logic: self.core.id.clone(),
                name: name.to_string(),
            })
    }

    /// Stable effective value of modifier `name`.
    pub fn effective(&self, name: &str) -> Result<f64, LogicError> {
        self.modifier(name).map(|modifier| modifier.effective())
    }
}

impl Clone for SohlLogic {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            rules: self.rules.clone_box(),
        }
    }
}

impl Deref for SohlLogic {
    type Target = LogicCore;

    fn deref(&self) -> &LogicCore {
        &self.core
    }
}

impl DerefMut for SohlLogic {
    fn deref_mut(&mut self) -> &mut LogicCore {
        &mut self.core
    }
}

impl SohlBase for SohlLogic {
    const METADATA: ClassMetadata = ClassMetadata::new("SohlLogic");

    fn tag(&self) -> &ClassTag {
        &self.core.tag
    }

    fn parent(&self) -> Option<&ParentRef> {
        Some(&self.core.parent)
    }

    fn to_json(&self) -> Value {
        let mut object: Map<String, Value> = self.rules.to_data();
        self.core.tag.write_into(&mut object);
        object.insert("id".into(), Value::String(self.core.id.clone()));
        object.insert("type".into(), Value::String(self.core.logic_type.clone()));
        object.insert("name".into(), Value::String(self.core.name.clone()));
        object.insert(
            "description".into(),
            Value::String(self.core.description.clone()),
        );
        object.insert("img".into(), Value::String(self.core.img.clone()));
        object.insert(
            "nestedLogicObjs".into(),
            Value::Array(
                self.core
                    .logics
                    .values()
                    .filter(|logic| !logic.core.is_virtual)
                    .map(|logic| logic.to_json())
                    .collect(),
            ),
        );
        object.insert(
            "nestedEffectObjs".into(),
            Value::Array(self.core.effects.values().map(|e| e.to_json()).collect()),
        );
        object.insert(
            "nestedActionObjs".into(),
            Value::Array(self.core.actions.values().map(|a| a.to_json()).collect()),
        );
        Value::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::base::{ClassRegistry, DocumentRef};
    use crate::time::FixedClock;
    use crate::utils::IdRegistry;

    struct Fixture {
        registry: ClassRegistry,
        ids: IdRegistry,
        clock: FixedClock,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                registry: ClassRegistry::with_defaults(),
                ids: IdRegistry::default(),
                clock: FixedClock::new(100),
            }
        }

        fn ctx(&mut self) -> BuildContext<'_> {
            BuildContext::new(&self.registry, &mut self.ids, &self.clock)
        }

        fn build(&mut self, data: Value) -> SohlLogic {
            self.ctx()
                .logic_from_data(&data, Some(DocumentRef::actor("A1").into()))
                .unwrap()
        }
    }

    fn tree() -> Value {
        json!({
            "class": "SohlLogic",
            "id": "root",
            "name": "Hero",
            "type": "being",
            "level": 4,
            "nestedLogicObjs": [
                {"class": "SohlLogic", "id": "arm", "name": "Arm", "type": "bodypart",
                 "nestedLogicObjs": [
                    {"class": "SohlLogic", "id": "hand", "name": "Hand", "type": "bodypart"}
                 ]}
            ],
            "nestedEffectObjs": [
                {"class": "SohlEffect", "id": "fx", "name": "Stun", "duration": 10}
            ],
            "nestedActionObjs": [
                {"class": "SohlIntrinsicAction", "id": "act", "name": "Punch", "functionName": "punch"}
            ]
        })
    }

    #[test]
    fn requires_name_type_and_parent() {
        let mut fx = Fixture::new();
        let err = fx
            .ctx()
            .logic_from_data(
                &json!({"class": "SohlLogic", "name": "x"}),
                Some(ParentRef::logic("p")),
            )
            .unwrap_err();
        assert_eq!(err, LogicError::MissingNameOrType.into());

        let err = fx
            .ctx()
            .logic_from_data(&json!({"class": "SohlLogic", "name": "x", "type": "t"}), None)
            .unwrap_err();
        assert_eq!(err, LogicError::MissingParent.into());
    }

    #[test]
    fn nested_children_point_at_owner() {
        let mut fx = Fixture::new();
        let root = fx.build(tree());
        let arm = root.logics().get("arm").unwrap();
        assert_eq!(arm.parent(), Some(&ParentRef::logic("root")));
        assert_eq!(
            root.effects().get("fx").unwrap().parent(),
            Some(&ParentRef::logic("root"))
        );
        assert_eq!(root.find("hand").map(|l| l.name()), Some("Hand"));
        assert!(fx.ids.contains("hand"));
    }

    #[test]
    fn json_round_trip_keeps_extra_fields() {
        let mut fx = Fixture::new();
        let root = fx.build(tree());
        let json = root.to_json();
        assert_eq!(json["level"], 4);
        assert_eq!(json["nestedActionObjs"][0]["functionName"], "punch");

        let rebuilt = fx.build(json.clone());
        assert_eq!(rebuilt.to_json(), json);
    }

    #[test]
    fn add_children_is_idempotent() {
        let mut fx = Fixture::new();
        let mut root = fx.build(tree());
        let arm = root.logics().get("arm").cloned().unwrap();
        assert!(!root.add_logic(arm.clone()));
        assert!(!root.add_logic(arm));
        assert_eq!(root.logics().len(), 1);
    }

    #[test]
    fn pipeline_enforces_phase_order() {
        let mut fx = Fixture::new();
        let mut root = fx.build(tree());
        let actions = SohlMap::new();

        let err = root.process_actions(&actions).unwrap_err();
        assert!(matches!(
            err,
            LogicError::PhaseViolation {
                expected: LogicPhase::BaseReady,
                actual: LogicPhase::Uninitialized,
                ..
            }
        ));

        root.prepare_base_data().unwrap();
        assert!(root.post_process().is_err());
        root.process_effects(&SohlMap::new()).unwrap();
        root.process_actions(&actions).unwrap();
        with_siblings(&mut [&mut root], |node, siblings| {
            assert!(siblings.is_empty());
            node.process_siblings(siblings)
        })
        .unwrap();
        root.post_process().unwrap();

        assert_eq!(root.phase(), LogicPhase::Finalized);
        assert_eq!(
            root.find("hand").map(|l| l.phase()),
            Some(LogicPhase::Finalized)
        );
    }

    #[test]
    fn stable_reads_wait_for_finalize() {
        let mut fx = Fixture::new();
        let mut root = fx.build(tree());
        root.prepare_base_data().unwrap();
        root.define_modifier("score", 12.0).unwrap();

        assert!(matches!(
            root.modifier("score"),
            Err(LogicError::PhaseViolation { .. })
        ));
        assert_eq!(root.peek_modifier("score").map(|m| m.effective()), Some(12.0));

        root.process_actions(&SohlMap::new()).unwrap();
        with_siblings(&mut [&mut root], |node, siblings| node.process_siblings(siblings))
            .unwrap();
        root.post_process().unwrap();
        assert_eq!(root.effective("score").unwrap(), 12.0);
        assert!(matches!(
            root.modifier("missing"),
            Err(LogicError::UnknownModifier { .. })
        ));
    }

    #[test]
    fn create_under_logic_registers_in_memory() {
        let mut fx = Fixture::new();
        let mut root = fx.build(tree());
        let outcome = SohlLogic::create(
            &json!({"name": "Leg", "type": "bodypart"}),
            CreateTarget::Logic(&mut root),
            &mut fx.ctx(),
        )
        .unwrap();
        let CreateOutcome::Registered { id } = outcome else {
            panic!("expected in-memory registration");
        };
        let leg = root.logics().get(&id).unwrap();
        assert_eq!(leg.class_name(), "SohlLogic");
        assert_eq!(leg.parent(), Some(&ParentRef::logic("root")));
    }

    #[test]
    fn create_for_document_requests_persistence() {
        let mut fx = Fixture::new();
        let outcome = SohlLogic::create(
            &json!({"id": "new", "name": "Sword", "type": "weapon"}),
            CreateTarget::Document(DocumentRef::item("I9")),
            &mut fx.ctx(),
        )
        .unwrap();
        let CreateOutcome::Persist(request) = outcome else {
            panic!("expected a persistence request");
        };
        assert_eq!(request.document, DocumentRef::item("I9"));
        assert_eq!(request.patch["logicObj"]["id"], "new");
        assert_eq!(request.patch["logicObj"]["class"], "SohlLogic");
        assert_eq!(request.logic.delete_target(), DeleteTarget::Document(DocumentRef::item("I9")));
    }

    #[test]
    fn create_rejects_existing_child_id() {
        let mut fx = Fixture::new();
        let mut root = fx.build(tree());
        let err = SohlLogic::create(
            &json!({"id": "arm", "name": "Other", "type": "bodypart"}),
            CreateTarget::Logic(&mut root),
            &mut fx.ctx(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            LogicError::Build(RegistryError::duplicate_id("root", "arm"))
        );
        assert_eq!(root.logics().len(), 1);
        assert_eq!(root.logics().get("arm").unwrap().name(), "Arm");
    }

    #[test]
    fn with_patch_leaves_original_untouched() {
        let mut fx = Fixture::new();
        let mut root = fx.build(tree());
        root.prepare_base_data().unwrap();

        let patched = root
            .with_patch(&json!({"name": "Renamed", "level": 5}), &mut fx.ctx())
            .unwrap();
        assert_eq!(patched.name(), "Renamed");
        assert_eq!(patched.to_json()["level"], 5);
        assert_eq!(patched.phase(), LogicPhase::Uninitialized);
        assert_eq!(root.name(), "Hero");
        assert_eq!(root.phase(), LogicPhase::BaseReady);

        root.update(&json!({"description": "tall"}), &mut fx.ctx())
            .unwrap();
        assert_eq!(root.description(), "tall");
        assert_eq!(root.id(), "root");
    }

    #[test]
    fn delete_removes_from_owner() {
        let mut fx = Fixture::new();
        let mut root = fx.build(tree());
        let target = root.find("hand").unwrap().delete_target();
        assert_eq!(
            target,
            DeleteTarget::Logic {
                parent: "arm".into(),
                id: "hand".into()
            }
        );
        let removed = root.remove_descendant("hand").unwrap();
        assert_eq!(removed.id(), "hand");
        assert!(root.find("hand").is_none());
        assert!(root.remove_descendant("hand").is_none());
    }

    #[test]
    fn expired_effects_are_swept() {
        let mut fx = Fixture::new();
        let mut root = fx.build(tree());
        assert!(root.remove_expired_effects(&FixedClock::new(105)).is_empty());
        let removed = root.remove_expired_effects(&FixedClock::new(110));
        assert_eq!(removed.len(), 1);
        assert!(root.effects().is_empty());
    }

    #[derive(Clone, Debug)]
    struct Familiar;

    impl LogicRules for Familiar {
        fn clone_box(&self) -> Box<dyn LogicRules> {
            Box::new(self.clone())
        }

        fn create_virtual_logics(
            &mut self,
            core: &mut LogicCore,
            doc: &DocumentContext<'_>,
            ctx: &mut BuildContext<'_>,
        ) -> Result<(), LogicError> {
            let familiar = ctx.logic_from_data(
                &json!({"class": "SohlLogic", "name": doc.name, "type": "familiar"}),
                Some(ParentRef::logic(core.id())),
            )?;
            core.add_virtual_logic(familiar);
            Ok(())
        }
    }

    fn familiar_factory(_: &Map<String, Value>) -> Result<Box<dyn LogicRules>, LogicError> {
        Ok(Box::new(Familiar))
    }

    #[test]
    fn virtual_children_are_rebuilt_and_never_persisted() {
        let mut fx = Fixture::new();
        fx.registry.register_logic("Summoner", familiar_factory);
        let mut root = fx.build(json!({"class": "Summoner", "name": "Mage", "type": "being"}));

        let document = DocumentRef::actor("A1");
        let system = json!({});
        let doc = DocumentContext {
            document: &document,
            name: "Owl",
            system: &system,
        };
        root.create_virtual_logics(&doc, &mut fx.ctx()).unwrap();
        root.create_virtual_logics(&doc, &mut fx.ctx()).unwrap();

        assert_eq!(root.logics().len(), 1);
        assert!(root.logics().values().every(|l| l.is_virtual()));
        assert_eq!(root.to_json()["nestedLogicObjs"], json!([]));
        assert_eq!(root.to_json()["class"], "Summoner");
    }
}
