use std::ops::{Deref, DerefMut};

use serde_json::Value;

use super::base::{BaseModifier, CustomFn};
use super::error::ModifierError;
use crate::base::{ClassMetadata, ClassTag, ParentRef, SohlBase};

/// The concrete, registered modifier type owned by logic nodes.
#[derive(Clone, Debug)]
pub struct ValueModifier(BaseModifier);

impl ValueModifier {
    pub fn new(parent: ParentRef) -> Self {
        Self(BaseModifier::with_metadata(&Self::METADATA, parent))
    }

    /// Starts from `base` with no deltas.
    pub fn with_base(parent: ParentRef, base: f64) -> Result<Self, ModifierError> {
        let mut modifier = Self::new(parent);
        modifier.set_base(Some(base))?;
        Ok(modifier)
    }

    pub fn from_data(data: &Value, parent: Option<ParentRef>) -> Result<Self, ModifierError> {
        Self::from_data_with(data, parent, None)
    }

    /// Like [`from_data`](Self::from_data), with a custom handler for
    /// persisted custom deltas.
    pub fn from_data_with(
        data: &Value,
        parent: Option<ParentRef>,
        custom: Option<CustomFn>,
    ) -> Result<Self, ModifierError> {
        BaseModifier::decode(data, parent, &Self::METADATA, custom).map(Self)
    }

    pub fn into_inner(self) -> BaseModifier {
        self.0
    }
}

impl Deref for ValueModifier {
    type Target = BaseModifier;

    fn deref(&self) -> &BaseModifier {
        &self.0
    }
}

impl DerefMut for ValueModifier {
    fn deref_mut(&mut self) -> &mut BaseModifier {
        &mut self.0
    }
}

impl SohlBase for ValueModifier {
    const METADATA: ClassMetadata = ClassMetadata::new("ValueModifier");

    fn tag(&self) -> &ClassTag {
        self.0.tag()
    }

    fn parent(&self) -> Option<&ParentRef> {
        self.0.parent()
    }

    fn to_json(&self) -> Value {
        self.0.to_json()
    }
}
