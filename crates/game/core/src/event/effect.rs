use std::ops::Deref;

use serde_json::{Map, Value};

use super::{EventError, SohlEvent};
use crate::base::{BuildContext, ClassMetadata, ClassTag, ParentRef, RegistryError, SohlBase};
use crate::logic::SohlLogic;

/// Timed modification (a status effect) attached to a logic node.
#[derive(Clone, Debug, PartialEq)]
pub struct SohlEffect {
    event: SohlEvent,
}

impl SohlEffect {
    pub fn from_data(
        data: &Value,
        parent: Option<ParentRef>,
        ctx: &mut BuildContext<'_>,
    ) -> Result<Self, EventError> {
        let event = SohlEvent::decode(data, parent, &Self::METADATA, ctx)?;
        Ok(Self { event })
    }

    /// Builds an effect under `parent` and adds it to the parent's effects.
    ///
    /// An id the parent already holds is rejected with
    /// [`RegistryError::DuplicateId`].
    pub fn create(
        data: &Value,
        parent: &mut SohlLogic,
        ctx: &mut BuildContext<'_>,
    ) -> Result<String, RegistryError> {
        let mut data = data.clone();
        Self::METADATA.stamp(&mut data);
        let effect = ctx.effect_from_data(&data, Some(ParentRef::logic(parent.id())))?;
        let id = effect.id().to_string();
        if !parent.add_effect(effect) {
            return Err(RegistryError::duplicate_id(parent.id(), id));
        }
        Ok(id)
    }

    pub fn event(&self) -> &SohlEvent {
        &self.event
    }
}

impl Deref for SohlEffect {
    type Target = SohlEvent;

    fn deref(&self) -> &SohlEvent {
        &self.event
    }
}

impl SohlBase for SohlEffect {
    const METADATA: ClassMetadata = ClassMetadata::new("SohlEffect");

    fn tag(&self) -> &ClassTag {
        self.event.tag()
    }

    fn parent(&self) -> Option<&ParentRef> {
        Some(self.event.parent())
    }

    fn to_json(&self) -> Value {
        let mut object = Map::new();
        self.event.write_json(&mut object);
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

    #[test]
    fn round_trips_through_registry() {
        let registry = ClassRegistry::with_defaults();
        let mut ids = IdRegistry::default();
        let clock = FixedClock::new(50);
        let mut ctx = BuildContext::new(&registry, &mut ids, &clock);

        let effect = ctx
            .effect_from_data(
                &json!({"class": "SohlEffect", "name": "Bleeding", "duration": 30}),
                Some(ParentRef::logic("L")),
            )
            .unwrap();
        assert_eq!(effect.expire().value(), 80);

        let json = effect.to_json();
        let rebuilt = ctx
            .effect_from_data(&json, Some(ParentRef::logic("L")))
            .unwrap();
        assert_eq!(rebuilt.to_json(), json);
        assert_eq!(rebuilt, effect);
    }

    #[test]
    fn wrong_family_is_rejected() {
        let registry = ClassRegistry::with_defaults();
        let mut ids = IdRegistry::default();
        let clock = FixedClock::default();
        let mut ctx = BuildContext::new(&registry, &mut ids, &clock);
        let err = ctx
            .effect_from_data(
                &json!({"class": "SohlScriptAction", "script": "x"}),
                Some(ParentRef::logic("L")),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::KindMismatch { .. }));
    }

    #[test]
    fn create_registers_on_parent_and_rejects_duplicates() {
        let registry = ClassRegistry::with_defaults();
        let mut ids = IdRegistry::default();
        let clock = FixedClock::new(20);
        let mut ctx = BuildContext::new(&registry, &mut ids, &clock);
        let mut owner = ctx
            .logic_from_data(
                &json!({"class": "SohlLogic", "id": "L", "name": "Hero", "type": "being"}),
                Some(DocumentRef::actor("A1").into()),
            )
            .unwrap();

        let id = SohlEffect::create(
            &json!({"id": "daze", "name": "Dazed", "duration": 5}),
            &mut owner,
            &mut ctx,
        )
        .unwrap();
        assert_eq!(id, "daze");
        assert!(owner.actions().is_empty());

        let effect = owner.effects().get("daze").unwrap();
        assert_eq!(effect.class_name(), "SohlEffect");
        assert_eq!(effect.parent(), Some(&ParentRef::logic("L")));
        assert_eq!(effect.expire().value(), 25);

        let err = SohlEffect::create(
            &json!({"id": "daze", "name": "Stunned"}),
            &mut owner,
            &mut ctx,
        )
        .unwrap_err();
        assert_eq!(err, RegistryError::duplicate_id("L", "daze"));
        assert_eq!(owner.effects().get("daze").unwrap().name(), "Dazed");
    }
}
