//! Time-scheduled objects attached to logic nodes.
//!
//! [`SohlEvent`] holds the scheduling fields shared by [`SohlAction`] and
//! [`SohlEffect`]. Activation and expiration points are derived once, at
//! construction, against the injected world clock.

mod action;
mod effect;
mod error;

pub use action::{ActionClass, ActionKind, ActionScope, SohlAction};
pub use effect::SohlEffect;
pub use error::EventError;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::base::{BuildContext, ClassMetadata, ClassTag, ParentRef};
use crate::config::SohlConfig;
use crate::time::{SohlTemporal, WorldClock, WorldTime, lenient_world_time};

/// When an event becomes active.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventActivation {
    /// At construction time.
    #[default]
    Immediate,
    /// `delay` seconds after construction.
    Delayed,
    /// At the persisted `activate` point.
    Scheduled,
}

/// How long an event lasts once active.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventTerm {
    #[default]
    Duration,
    /// Until the persisted `expire` point, or forever if none is set.
    Indefinite,
    Permanent,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventRepeat {
    #[default]
    None,
    Once,
    Repeated,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventData {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    when_activate: EventActivation,
    #[serde(default, deserialize_with = "lenient_world_time")]
    delay: WorldTime,
    #[serde(default)]
    activate: Option<SohlTemporal>,
    #[serde(default)]
    term: EventTerm,
    #[serde(default, deserialize_with = "lenient_world_time")]
    duration: WorldTime,
    #[serde(default)]
    expire: Option<SohlTemporal>,
    #[serde(default)]
    repeat: EventRepeat,
}

/// Scheduling core shared by actions and effects.
#[derive(Clone, Debug, PartialEq)]
pub struct SohlEvent {
    tag: ClassTag,
    parent: ParentRef,
    id: String,
    name: String,
    when_activate: EventActivation,
    delay: WorldTime,
    activate: SohlTemporal,
    term: EventTerm,
    duration: WorldTime,
    expire: SohlTemporal,
    repeat: EventRepeat,
}

impl SohlEvent {
    pub const DEFAULT_NAME: &'static str = "Unnamed Event";

    /// Builds the scheduling core from persisted data.
    ///
    /// Persisted `activate`/`expire` points are kept as-is so that a rebuilt
    /// event keeps its schedule; otherwise they are derived from the clock.
    pub(crate) fn decode(
        data: &Value,
        parent: Option<ParentRef>,
        metadata: &ClassMetadata,
        ctx: &mut BuildContext<'_>,
    ) -> Result<Self, EventError> {
        let parent = parent.ok_or(EventError::MissingParent)?;
        let decoded =
            EventData::deserialize(data).map_err(|e| EventError::Decode(e.to_string()))?;

        let name = decoded
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_NAME.to_string());
        let now = ctx.world_time();

        let activate = match (decoded.activate, decoded.when_activate) {
            (Some(point), _) => point,
            (None, EventActivation::Immediate) => SohlTemporal::from(now),
            (None, EventActivation::Delayed) => SohlTemporal::from(now.saturating_add(decoded.delay)),
            (None, EventActivation::Scheduled) => {
                return Err(EventError::MissingActivationTime { name });
            }
        };

        let expire = match (decoded.term, decoded.expire) {
            (EventTerm::Permanent, _) => SohlTemporal::from(SohlConfig::PERMANENT_EXPIRE),
            (_, Some(point)) => point,
            (EventTerm::Duration, None) => {
                SohlTemporal::from(activate.value().saturating_add(decoded.duration))
            }
            (EventTerm::Indefinite, None) => SohlTemporal::from(SohlConfig::PERMANENT_EXPIRE),
        };

        let id = ctx.claim_or_generate_id(decoded.id.as_deref());

        Ok(Self {
            tag: ClassTag::from_value(data, metadata),
            parent,
            id,
            name,
            when_activate: decoded.when_activate,
            delay: decoded.delay,
            activate,
            term: decoded.term,
            duration: decoded.duration,
            expire,
            repeat: decoded.repeat,
        })
    }

    pub fn tag(&self) -> &ClassTag {
        &self.tag
    }

    pub fn parent(&self) -> &ParentRef {
        &self.parent
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn when_activate(&self) -> EventActivation {
        self.when_activate
    }

    pub fn delay(&self) -> WorldTime {
        self.delay
    }

    pub fn activate(&self) -> SohlTemporal {
        self.activate
    }

    pub fn term(&self) -> EventTerm {
        self.term
    }

    pub fn duration(&self) -> WorldTime {
        self.duration
    }

    pub fn expire(&self) -> SohlTemporal {
        self.expire
    }

    pub fn repeat(&self) -> EventRepeat {
        self.repeat
    }

    /// Activated and not yet expired.
    pub fn is_active(&self, clock: &dyn WorldClock) -> bool {
        let now = clock.world_time();
        self.activate.value() <= now && now < self.expire.value()
    }

    /// The expiration point has been reached.
    pub fn is_expired(&self, clock: &dyn WorldClock) -> bool {
        clock.world_time() >= self.expire.value()
    }

    pub(crate) fn write_json(&self, object: &mut Map<String, Value>) {
        self.tag.write_into(object);
        object.insert("id".into(), Value::String(self.id.clone()));
        object.insert("name".into(), Value::String(self.name.clone()));
        object.insert(
            "whenActivate".into(),
            Value::String(self.when_activate.to_string()),
        );
        object.insert("delay".into(), Value::from(self.delay));
        object.insert("activate".into(), Value::from(self.activate.value()));
        object.insert("term".into(), Value::String(self.term.to_string()));
        object.insert("duration".into(), Value::from(self.duration));
        object.insert("expire".into(), Value::from(self.expire.value()));
        object.insert("repeat".into(), Value::String(self.repeat.to_string()));
    }
}
