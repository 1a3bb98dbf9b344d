use std::ops::Deref;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{EventError, SohlEvent};
use crate::base::{BuildContext, ClassMetadata, ClassTag, ParentRef, RegistryError, SohlBase};
use crate::logic::SohlLogic;

/// Who an action applies to.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActionScope {
    /// The owning logic node itself.
    #[default]
    #[serde(rename = "self")]
    #[strum(serialize = "self")]
    Owner,
    Item,
    Actor,
    Other,
}

/// Concrete action class to build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionClass {
    Intrinsic,
    Script,
}

impl ActionClass {
    pub const fn metadata(self) -> ClassMetadata {
        match self {
            Self::Intrinsic => SohlAction::INTRINSIC,
            Self::Script => SohlAction::SCRIPT,
        }
    }
}

/// What invoking the action runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionKind {
    /// A named capability registered with the host.
    Intrinsic { function_name: String },
    /// An embedded script body. `use_async` tells the host to await it.
    Script { script: String, use_async: bool },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActionData {
    #[serde(default)]
    scope: ActionScope,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    context_icon_class: String,
    #[serde(default)]
    context_condition: String,
    #[serde(default)]
    context_group: String,
    #[serde(default)]
    function_name: Option<String>,
    #[serde(default)]
    script: Option<String>,
    #[serde(default)]
    use_async: Option<bool>,
}

/// Invokable operation exposed on a logic node's context menu.
#[derive(Clone, Debug, PartialEq)]
pub struct SohlAction {
    event: SohlEvent,
    scope: ActionScope,
    notes: String,
    description: String,
    context_icon_class: String,
    context_condition: String,
    context_group: String,
    kind: ActionKind,
}

impl SohlAction {
    pub const INTRINSIC: ClassMetadata = ClassMetadata::new("SohlIntrinsicAction");
    pub const SCRIPT: ClassMetadata = ClassMetadata::new("SohlScriptAction");

    pub fn from_data(
        data: &Value,
        parent: Option<ParentRef>,
        class: ActionClass,
        ctx: &mut BuildContext<'_>,
    ) -> Result<Self, EventError> {
        if parent.is_none() {
            return Err(EventError::MissingParent);
        }
        let decoded =
            ActionData::deserialize(data).map_err(|e| EventError::Decode(e.to_string()))?;

        let kind = match class {
            ActionClass::Intrinsic => ActionKind::Intrinsic {
                function_name: decoded
                    .function_name
                    .filter(|f| !f.is_empty())
                    .ok_or(EventError::MissingFunctionName)?,
            },
            ActionClass::Script => ActionKind::Script {
                script: decoded
                    .script
                    .filter(|s| !s.is_empty())
                    .ok_or(EventError::MissingScript)?,
                use_async: decoded.use_async.unwrap_or(true),
            },
        };

        let event = SohlEvent::decode(data, parent, &class.metadata(), ctx)?;
        Ok(Self {
            event,
            scope: decoded.scope,
            notes: decoded.notes,
            description: decoded.description,
            context_icon_class: decoded.context_icon_class,
            context_condition: decoded.context_condition,
            context_group: decoded.context_group,
            kind,
        })
    }

    /// Builds an action under `parent` and adds it to the parent's actions.
    ///
    /// Returns the new action's id. If the parent already holds an action
    /// with that id, the parent is left unchanged and
    /// [`RegistryError::DuplicateId`] is returned.
    pub fn create(
        data: &Value,
        parent: &mut SohlLogic,
        class: ActionClass,
        ctx: &mut BuildContext<'_>,
    ) -> Result<String, RegistryError> {
        let mut data = data.clone();
        class.metadata().stamp(&mut data);
        let action = ctx.action_from_data(&data, Some(ParentRef::logic(parent.id())))?;
        let id = action.id().to_string();
        if !parent.add_action(action) {
            return Err(RegistryError::duplicate_id(parent.id(), id));
        }
        Ok(id)
    }

    pub fn event(&self) -> &SohlEvent {
        &self.event
    }

    pub fn class(&self) -> ActionClass {
        match self.kind {
            ActionKind::Intrinsic { .. } => ActionClass::Intrinsic,
            ActionKind::Script { .. } => ActionClass::Script,
        }
    }

    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    pub fn scope(&self) -> ActionScope {
        self.scope
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn context_icon_class(&self) -> &str {
        &self.context_icon_class
    }

    pub fn context_condition(&self) -> &str {
        &self.context_condition
    }

    pub fn context_group(&self) -> &str {
        &self.context_group
    }
}

impl Deref for SohlAction {
    type Target = SohlEvent;

    fn deref(&self) -> &SohlEvent {
        &self.event
    }
}

impl SohlBase for SohlAction {
    const METADATA: ClassMetadata = ClassMetadata::new("SohlAction");

    fn tag(&self) -> &ClassTag {
        self.event.tag()
    }

    fn parent(&self) -> Option<&ParentRef> {
        Some(self.event.parent())
    }

    fn to_json(&self) -> Value {
        let mut object = Map::new();
        self.event.write_json(&mut object);
        object.insert("scope".into(), Value::String(self.scope.to_string()));
        object.insert("notes".into(), Value::String(self.notes.clone()));
        object.insert(
            "description".into(),
            Value::String(self.description.clone()),
        );
        object.insert(
            "contextIconClass".into(),
            Value::String(self.context_icon_class.clone()),
        );
        object.insert(
            "contextCondition".into(),
            Value::String(self.context_condition.clone()),
        );
        object.insert(
            "contextGroup".into(),
            Value::String(self.context_group.clone()),
        );
        match &self.kind {
            ActionKind::Intrinsic { function_name } => {
                object.insert(
                    "functionName".into(),
                    Value::String(function_name.clone()),
                );
            }
            ActionKind::Script { script, use_async } => {
                object.insert("script".into(), Value::String(script.clone()));
                object.insert("useAsync".into(), Value::Bool(*use_async));
            }
        }
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
                clock: FixedClock::new(1_000),
            }
        }

        fn ctx(&mut self) -> BuildContext<'_> {
            BuildContext::new(&self.registry, &mut self.ids, &self.clock)
        }

        fn owner(&mut self) -> SohlLogic {
            self.ctx()
                .logic_from_data(
                    &json!({"class": "SohlLogic", "id": "L", "name": "Hero", "type": "being"}),
                    Some(DocumentRef::actor("A1").into()),
                )
                .unwrap()
        }
    }

    #[test]
    fn intrinsic_requires_function_name() {
        let mut fx = Fixture::new();
        let err = SohlAction::from_data(
            &json!({"name": "Attack"}),
            Some(ParentRef::logic("L")),
            ActionClass::Intrinsic,
            &mut fx.ctx(),
        )
        .unwrap_err();
        assert_eq!(err, EventError::MissingFunctionName);
    }

    #[test]
    fn script_requires_script_and_defaults_async() {
        let mut fx = Fixture::new();
        assert_eq!(
            SohlAction::from_data(
                &json!({"script": ""}),
                Some(ParentRef::logic("L")),
                ActionClass::Script,
                &mut fx.ctx(),
            )
            .unwrap_err(),
            EventError::MissingScript
        );

        let action = SohlAction::from_data(
            &json!({"script": "return 1;"}),
            Some(ParentRef::logic("L")),
            ActionClass::Script,
            &mut fx.ctx(),
        )
        .unwrap();
        assert_eq!(
            action.kind(),
            &ActionKind::Script {
                script: "return 1;".into(),
                use_async: true
            }
        );
        assert_eq!(action.class_name(), "SohlScriptAction");
    }

    #[test]
    fn script_honors_explicit_sync() {
        let mut fx = Fixture::new();
        let action = SohlAction::from_data(
            &json!({"script": "x", "useAsync": false}),
            Some(ParentRef::logic("L")),
            ActionClass::Script,
            &mut fx.ctx(),
        )
        .unwrap();
        assert!(matches!(
            action.kind(),
            ActionKind::Script {
                use_async: false,
                ..
            }
        ));
    }

    #[test]
    fn action_fields_default_and_round_trip() {
        let mut fx = Fixture::new();
        let data = json!({
            "class": "SohlIntrinsicAction",
            "name": "Strike",
            "functionName": "strike",
            "contextGroup": "primary",
        });
        let action = fx
            .ctx()
            .action_from_data(&data, Some(ParentRef::logic("L")))
            .unwrap();
        assert_eq!(action.scope(), ActionScope::Owner);
        assert_eq!(action.notes(), "");
        assert_eq!(action.context_group(), "primary");

        let json = action.to_json();
        assert_eq!(json["scope"], "self");
        assert_eq!(json["functionName"], "strike");

        let rebuilt = fx
            .ctx()
            .action_from_data(&json, Some(ParentRef::logic("L")))
            .unwrap();
        assert_eq!(rebuilt.to_json(), json);
    }

    #[test]
    fn create_stamps_class_and_registers_on_parent() {
        let mut fx = Fixture::new();
        let mut owner = fx.owner();
        let id = SohlAction::create(
            &json!({"id": "kick", "name": "Kick", "functionName": "kick"}),
            &mut owner,
            ActionClass::Intrinsic,
            &mut fx.ctx(),
        )
        .unwrap();
        assert_eq!(id, "kick");

        let action = owner.actions().get("kick").unwrap();
        assert_eq!(action.class_name(), "SohlIntrinsicAction");
        assert_eq!(action.parent(), Some(&ParentRef::logic("L")));
        assert_eq!(action.to_json()["schemaVersion"], "0.6.0");
    }

    #[test]
    fn create_rejects_existing_action_id() {
        let mut fx = Fixture::new();
        let mut owner = fx.owner();
        SohlAction::create(
            &json!({"id": "kick", "name": "Kick", "functionName": "kick"}),
            &mut owner,
            ActionClass::Intrinsic,
            &mut fx.ctx(),
        )
        .unwrap();

        let err = SohlAction::create(
            &json!({"id": "kick", "name": "Stomp", "script": "stomp()"}),
            &mut owner,
            ActionClass::Script,
            &mut fx.ctx(),
        )
        .unwrap_err();
        assert_eq!(err, RegistryError::duplicate_id("L", "kick"));
        assert_eq!(owner.actions().len(), 1);
        assert_eq!(owner.actions().get("kick").unwrap().name(), "Kick");
    }
}
