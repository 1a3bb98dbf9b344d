//! Base value plus ordered deltas, folded into an effective value.

use std::borrow::Cow;
use std::fmt::Write as _;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::delta::{DeltaInfo, DeltaValue, ValueDelta, ValueDeltaOperator};
use super::error::ModifierError;
use super::number_json;
use crate::base::{ClassMetadata, ClassTag, ParentRef, SohlBase};
use crate::config::SohlConfig;
use crate::i18n::MessageFormatter;

/// Handler that resolves custom deltas: `(running value, delta) -> new value`.
pub type CustomFn = fn(f64, &ValueDelta) -> f64;

/// Something that names a delta: a `(name, abbrev)` pair or a catalog entry.
pub trait DeltaKey {
    fn delta_name(&self) -> Cow<'_, str>;
    fn delta_abbrev(&self) -> Cow<'_, str>;
}

impl DeltaKey for (&str, &str) {
    fn delta_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.0)
    }

    fn delta_abbrev(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.1)
    }
}

impl DeltaKey for (String, String) {
    fn delta_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.0)
    }

    fn delta_abbrev(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.1)
    }
}

impl DeltaKey for DeltaInfo {
    fn delta_name(&self) -> Cow<'_, str> {
        Cow::Owned(DeltaInfo::delta_name(*self))
    }

    fn delta_abbrev(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.abbrev())
    }
}

/// Argument of [`BaseModifier::set_disabled`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Disable {
    Flag(bool),
    Reason(String),
}

impl From<bool> for Disable {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl From<&str> for Disable {
    fn from(reason: &str) -> Self {
        Self::Reason(reason.to_string())
    }
}

impl From<String> for Disable {
    fn from(reason: String) -> Self {
        Self::Reason(reason)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModifierData {
    #[serde(default)]
    disabled_reason: Option<String>,
    #[serde(default)]
    base_value: Option<f64>,
    #[serde(default)]
    deltas: Vec<ValueDelta>,
}

/// Base value, disabled state and ordered deltas.
///
/// The effective value and display abbreviation are recomputed after every
/// mutation, so reads are always current.
///
/// Invariants:
/// - at most one `Override` delta exists;
/// - abbreviations are unique;
/// - a custom delta only exists while a custom handler is configured.
#[derive(Clone, Debug)]
pub struct BaseModifier {
    tag: ClassTag,
    parent: ParentRef,
    disabled_reason: Option<String>,
    base_value: Option<f64>,
    custom_function: Option<CustomFn>,
    deltas: Vec<ValueDelta>,
    effective: f64,
    abbrev: String,
}

impl BaseModifier {
    pub fn new(parent: ParentRef) -> Self {
        Self::with_metadata(&Self::METADATA, parent)
    }

    pub(crate) fn with_metadata(metadata: &ClassMetadata, parent: ParentRef) -> Self {
        let mut modifier = Self {
            tag: metadata.tag(),
            parent,
            disabled_reason: None,
            base_value: None,
            custom_function: None,
            deltas: Vec::new(),
            effective: 0.0,
            abbrev: String::new(),
        };
        modifier.recompute();
        modifier
    }

    /// Rebuilds a modifier from its persisted form.
    pub(crate) fn decode(
        data: &Value,
        parent: Option<ParentRef>,
        metadata: &ClassMetadata,
        custom_function: Option<CustomFn>,
    ) -> Result<Self, ModifierError> {
        let parent = parent.ok_or(ModifierError::MissingParent)?;
        let decoded = ModifierData::deserialize(data)
            .map_err(|e| ModifierError::Decode(e.to_string()))?;

        if let Some(base) = decoded.base_value {
            check_finite(base)?;
        }
        if custom_function.is_none() {
            if let Some(custom) = decoded
                .deltas
                .iter()
                .find(|d| d.op() == ValueDeltaOperator::Custom)
            {
                return Err(ModifierError::NoCustomHandler {
                    abbrev: custom.abbrev().to_string(),
                });
            }
        }

        let mut modifier = Self {
            tag: ClassTag::from_value(data, metadata),
            parent,
            disabled_reason: decoded.disabled_reason.filter(|r| !r.is_empty()),
            base_value: decoded.base_value,
            custom_function,
            deltas: decoded.deltas,
            effective: 0.0,
            abbrev: String::new(),
        };
        modifier.recompute();
        Ok(modifier)
    }

    // ===== derived readers =====

    pub fn effective(&self) -> f64 {
        self.effective
    }

    /// `effective - base`.
    pub fn modifier(&self) -> f64 {
        self.effective - self.base()
    }

    /// Stepped bonus index: `base / 10`, truncated toward zero.
    pub fn index(&self) -> i64 {
        (self.base() / 10.0).trunc() as i64
    }

    /// Display abbreviation, e.g. `"AB +3, XY \u{00d7}2"`.
    pub fn abbrev(&self) -> &str {
        &self.abbrev
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn deltas(&self) -> &[ValueDelta] {
        &self.deltas
    }

    // ===== base value =====

    pub fn base(&self) -> f64 {
        self.base_value.unwrap_or(0.0)
    }

    pub fn has_base(&self) -> bool {
        self.base_value.is_some()
    }

    pub fn set_base(&mut self, value: Option<f64>) -> Result<&mut Self, ModifierError> {
        if let Some(v) = value {
            check_finite(v)?;
        }
        self.base_value = value;
        self.recompute();
        Ok(self)
    }

    // ===== disabled state =====

    /// Disabled reason, or `""` when enabled.
    pub fn disabled(&self) -> &str {
        self.disabled_reason.as_deref().unwrap_or("")
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled_reason.is_some()
    }

    /// `true` or a non-empty reason disables; `false` or `""` re-enables.
    ///
    /// Disabling does not change the effective value, only how the modifier
    /// renders.
    pub fn set_disabled(&mut self, state: impl Into<Disable>) -> &mut Self {
        self.disabled_reason = match state.into() {
            Disable::Flag(true) => Some(SohlConfig::DISABLED_REASON.to_string()),
            Disable::Flag(false) => None,
            Disable::Reason(reason) if reason.is_empty() => None,
            Disable::Reason(reason) => Some(reason),
        };
        self.recompute();
        self
    }

    // ===== custom handler =====

    pub fn custom_function(&self) -> Option<CustomFn> {
        self.custom_function
    }

    /// Installs or removes the custom handler.
    ///
    /// Removing it while custom deltas exist fails with `NoCustomHandler`.
    pub fn set_custom_function(&mut self, f: Option<CustomFn>) -> Result<&mut Self, ModifierError> {
        if f.is_none() {
            if let Some(custom) = self
                .deltas
                .iter()
                .find(|d| d.op() == ValueDeltaOperator::Custom)
            {
                return Err(ModifierError::NoCustomHandler {
                    abbrev: custom.abbrev().to_string(),
                });
            }
        }
        self.custom_function = f;
        self.recompute();
        Ok(self)
    }

    // ===== mutations =====

    pub fn add(&mut self, key: impl DeltaKey, value: f64) -> Result<&mut Self, ModifierError> {
        check_finite(value)?;
        self.oper(&key, DeltaValue::Number(value), ValueDeltaOperator::Add)
    }

    pub fn multiply(&mut self, key: impl DeltaKey, value: f64) -> Result<&mut Self, ModifierError> {
        check_finite(value)?;
        self.oper(&key, DeltaValue::Number(value), ValueDeltaOperator::Multiply)
    }

    /// Overrides the value. A flag value instead records a custom delta,
    /// which requires a custom handler.
    pub fn set(
        &mut self,
        key: impl DeltaKey,
        value: impl Into<DeltaValue>,
    ) -> Result<&mut Self, ModifierError> {
        match value.into() {
            DeltaValue::Number(n) => {
                check_finite(n)?;
                self.oper(&key, DeltaValue::Number(n), ValueDeltaOperator::Override)
            }
            flag @ DeltaValue::Flag(_) => self.oper(&key, flag, ValueDeltaOperator::Custom),
        }
    }

    /// Caps the value at `value` (`Upgrade`).
    pub fn floor(&mut self, key: impl DeltaKey, value: f64) -> Result<&mut Self, ModifierError> {
        check_finite(value)?;
        self.oper(&key, DeltaValue::Number(value), ValueDeltaOperator::Upgrade)
    }

    /// Keeps the value at or above `value` (`Downgrade`).
    pub fn ceiling(&mut self, key: impl DeltaKey, value: f64) -> Result<&mut Self, ModifierError> {
        check_finite(value)?;
        self.oper(&key, DeltaValue::Number(value), ValueDeltaOperator::Downgrade)
    }

    fn oper(
        &mut self,
        key: &dyn DeltaKey,
        value: DeltaValue,
        op: ValueDeltaOperator,
    ) -> Result<&mut Self, ModifierError> {
        let name = key.delta_name();
        let abbrev = key.delta_abbrev();
        if !name.starts_with(SohlConfig::NAMESPACE_PREFIX) {
            return Err(ModifierError::InvalidModifierName {
                name: name.into_owned(),
            });
        }
        if op == ValueDeltaOperator::Custom && self.custom_function.is_none() {
            return Err(ModifierError::NoCustomHandler {
                abbrev: abbrev.into_owned(),
            });
        }
        let delta = ValueDelta::new(name.into_owned(), abbrev.into_owned(), op, value)?;

        let existing_override = self
            .deltas
            .iter()
            .find(|d| d.op() == ValueDeltaOperator::Override)
            .map(ValueDelta::number);
        match existing_override {
            // A zero override locks the modifier; a non-zero one yields only
            // to a newer override.
            Some(current) => {
                if op == ValueDeltaOperator::Override && current != 0.0 {
                    self.deltas = vec![delta];
                }
            }
            None => {
                self.deltas.retain(|d| d.abbrev() != delta.abbrev());
                self.deltas.push(delta);
            }
        }
        self.recompute();
        Ok(self)
    }

    // ===== lookup by abbreviation =====

    pub fn get(&self, abbrev: &str) -> Option<&ValueDelta> {
        if abbrev.is_empty() {
            return None;
        }
        self.deltas.iter().find(|d| d.abbrev() == abbrev)
    }

    pub fn has(&self, abbrev: &str) -> bool {
        self.get(abbrev).is_some()
    }

    /// Removes the delta with `abbrev`. Returns whether one was removed.
    pub fn delete(&mut self, abbrev: &str) -> bool {
        if abbrev.is_empty() {
            return false;
        }
        let before = self.deltas.len();
        self.deltas.retain(|d| d.abbrev() != abbrev);
        let removed = self.deltas.len() != before;
        if removed {
            self.recompute();
        }
        removed
    }

    // ===== rendering =====

    /// HTML fragment listing every delta, or `""` while disabled.
    pub fn chat_html(&self, formatter: &dyn MessageFormatter) -> String {
        if self.is_disabled() {
            return String::new();
        }
        let mut html = String::from("<div class=\"adjustment\">");
        let _ = write!(
            html,
            "<div class=\"flexrow\"><span class=\"label adj-name\">{}</span><span class=\"label adj-value\">{}</span></div>",
            formatter.format("SOHL.BaseModifier.Adjustment"),
            formatter.format("SOHL.BaseModifier.Value"),
        );
        for delta in &self.deltas {
            let _ = write!(
                html,
                "<div class=\"flexrow\"><span class=\"adj-name\">{}</span><span class=\"adj-value\">{}</span></div>",
                formatter.format(delta.name()),
                chat_value(delta),
            );
        }
        html.push_str("</div>");
        html
    }

    // ===== recompute =====

    fn recompute(&mut self) {
        let custom = self.custom_function;
        self.effective = self
            .deltas
            .iter()
            .fold(self.base(), |running, delta| match delta.op() {
                ValueDeltaOperator::Custom => match custom {
                    Some(handler) => handler(running, delta),
                    None => running,
                },
                _ => delta.apply(running).unwrap_or(running),
            });
        self.abbrev = self.calc_abbrev();
    }

    fn calc_abbrev(&self) -> String {
        if self.is_disabled() {
            return DeltaInfo::Disabled.abbrev().to_string();
        }
        let parts: Vec<String> = self
            .deltas
            .iter()
            .filter_map(|d| {
                let n = d.number();
                let abbrev = d.abbrev();
                match d.op() {
                    ValueDeltaOperator::Add if n > 0.0 => Some(format!("{abbrev} +{n}")),
                    ValueDeltaOperator::Add => Some(format!("{abbrev} {n}")),
                    ValueDeltaOperator::Override => Some(format!("{abbrev} ={n}")),
                    ValueDeltaOperator::Custom => {
                        (d.value() == DeltaValue::Flag(true)).then(|| abbrev.to_string())
                    }
                    op => Some(format!("{abbrev} {}{n}", op.symbol())),
                }
            })
            .collect();
        parts.join(", ")
    }

    pub(crate) fn write_json(&self, object: &mut Map<String, Value>) {
        self.tag.write_into(object);
        object.insert(
            "disabledReason".into(),
            Value::String(self.disabled().to_string()),
        );
        if let Some(base) = self.base_value {
            object.insert("baseValue".into(), number_json(base));
        }
        object.insert(
            "deltas".into(),
            Value::Array(
                self.deltas
                    .iter()
                    .map(|d| serde_json::to_value(d).unwrap_or(Value::Null))
                    .collect(),
            ),
        );
    }
}

fn check_finite(value: f64) -> Result<(), ModifierError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ModifierError::NonNumericValue {
            value: value.to_string(),
        })
    }
}

fn chat_value(delta: &ValueDelta) -> String {
    match delta.op() {
        ValueDeltaOperator::Add if delta.number() >= 0.0 => format!("+{}", delta.number()),
        ValueDeltaOperator::Add => delta.number().to_string(),
        op => format!("{}{}", op.symbol(), delta.value()),
    }
}

impl SohlBase for BaseModifier {
    const METADATA: ClassMetadata = ClassMetadata::new("BaseModifier");

    fn tag(&self) -> &ClassTag {
        &self.tag
    }

    fn parent(&self) -> Option<&ParentRef> {
        Some(&self.parent)
    }

    fn to_json(&self) -> Value {
        let mut object = Map::new();
        self.write_json(&mut object);
        Value::Object(object)
    }
}
