//! A single named adjustment to a numeric value.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use super::error::DeltaError;
use crate::config::SohlConfig;

/// Operator applied by a [`ValueDelta`].
///
/// Persisted as its numeric code.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[serde(try_from = "u8", into = "u8")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueDeltaOperator {
    /// Resolved by the owning modifier's custom handler.
    Custom = 0,
    Multiply = 1,
    Add = 2,
    /// Clamp from below: the value cannot fall under the delta.
    Downgrade = 3,
    /// Clamp from above: the value cannot exceed the delta.
    Upgrade = 4,
    /// Replace the running value.
    Override = 5,
}

impl ValueDeltaOperator {
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Symbol used when rendering a delta of this kind.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Custom => "\u{2605}",
            Self::Multiply => "\u{00d7}",
            Self::Add => "+",
            Self::Downgrade => "\u{2264}",
            Self::Upgrade => "\u{2265}",
            Self::Override => "=",
        }
    }
}

impl TryFrom<u8> for ValueDeltaOperator {
    type Error = DeltaError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Custom),
            1 => Ok(Self::Multiply),
            2 => Ok(Self::Add),
            3 => Ok(Self::Downgrade),
            4 => Ok(Self::Upgrade),
            5 => Ok(Self::Override),
            other => Err(DeltaError::UnknownOperator(other)),
        }
    }
}

impl From<ValueDeltaOperator> for u8 {
    fn from(op: ValueDeltaOperator) -> Self {
        op.code()
    }
}

/// Payload of a delta: a number for arithmetic operators, a flag for custom ones.
///
/// Flags persist as the strings `"true"` / `"false"`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DeltaValue {
    Number(f64),
    Flag(bool),
}

impl DeltaValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            Self::Number(_) => None,
        }
    }
}

impl From<f64> for DeltaValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for DeltaValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for DeltaValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl fmt::Display for DeltaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Flag(b) => write!(f, "{b}"),
        }
    }
}

impl Serialize for DeltaValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => {
                serializer.serialize_i64(*n as i64)
            }
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Flag(true) => serializer.serialize_str("true"),
            Self::Flag(false) => serializer.serialize_str("false"),
        }
    }
}

impl<'de> Deserialize<'de> for DeltaValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
            Bool(bool),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self::Number(n)),
            Raw::Bool(b) => Ok(Self::Flag(b)),
            Raw::Text(text) => match text.to_ascii_lowercase().as_str() {
                "true" => Ok(Self::Flag(true)),
                "false" => Ok(Self::Flag(false)),
                _ => Err(de::Error::custom(format!(
                    "delta value must be a number or \"true\"/\"false\", got {text:?}"
                ))),
            },
        }
    }
}

/// Persisted shape of a [`ValueDelta`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueDeltaData {
    pub name: String,
    pub abbrev: String,
    pub op: ValueDeltaOperator,
    pub value: DeltaValue,
}

/// Immutable named adjustment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ValueDeltaData", into = "ValueDeltaData")]
pub struct ValueDelta {
    name: String,
    abbrev: String,
    op: ValueDeltaOperator,
    value: DeltaValue,
}

impl ValueDelta {
    /// Builds a delta after checking its shape.
    ///
    /// The name must be namespaced, the abbreviation non-empty, and the value
    /// kind must match the operator (flag for custom, finite number otherwise).
    pub fn new(
        name: impl Into<String>,
        abbrev: impl Into<String>,
        op: ValueDeltaOperator,
        value: impl Into<DeltaValue>,
    ) -> Result<Self, DeltaError> {
        let name = name.into();
        let abbrev = abbrev.into();
        let value = value.into();

        if abbrev.is_empty() {
            return Err(DeltaError::EmptyAbbrev { name });
        }
        if !name.starts_with(SohlConfig::NAMESPACE_PREFIX) {
            return Err(DeltaError::InvalidName { name });
        }
        match (op, value) {
            (ValueDeltaOperator::Custom, DeltaValue::Flag(_)) => {}
            (ValueDeltaOperator::Custom, DeltaValue::Number(_)) => {
                return Err(DeltaError::CustomRequiresFlag { abbrev });
            }
            (_, DeltaValue::Flag(_)) => {
                return Err(DeltaError::NonNumericValue { abbrev });
            }
            (_, DeltaValue::Number(n)) if !n.is_finite() => {
                return Err(DeltaError::NonNumericValue { abbrev });
            }
            _ => {}
        }

        Ok(Self {
            name,
            abbrev,
            op,
            value,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn abbrev(&self) -> &str {
        &self.abbrev
    }

    pub fn op(&self) -> ValueDeltaOperator {
        self.op
    }

    pub fn value(&self) -> DeltaValue {
        self.value
    }

    /// Numeric payload; custom deltas report `0`.
    pub fn number(&self) -> f64 {
        self.value.as_number().unwrap_or(0.0)
    }

    /// Applies this delta to a running value.
    ///
    /// Custom deltas cannot be applied on their own; they need the owning
    /// modifier's handler and are rejected here as an unknown operator.
    pub fn apply(&self, base: f64) -> Result<f64, DeltaError> {
        let value = self.number();
        match self.op {
            ValueDeltaOperator::Add => Ok(base + value),
            ValueDeltaOperator::Multiply => Ok(base * value),
            ValueDeltaOperator::Override => Ok(value),
            ValueDeltaOperator::Upgrade => Ok(base.min(value)),
            ValueDeltaOperator::Downgrade => Ok(base.max(value)),
            ValueDeltaOperator::Custom => Err(DeltaError::UnknownOperator(self.op.code())),
        }
    }

    pub fn to_data(&self) -> ValueDeltaData {
        ValueDeltaData::from(self.clone())
    }

    pub fn from_data(data: ValueDeltaData) -> Result<Self, DeltaError> {
        Self::try_from(data)
    }
}

impl TryFrom<ValueDeltaData> for ValueDelta {
    type Error = DeltaError;

    fn try_from(data: ValueDeltaData) -> Result<Self, Self::Error> {
        Self::new(data.name, data.abbrev, data.op, data.value)
    }
}

impl From<ValueDelta> for ValueDeltaData {
    fn from(delta: ValueDelta) -> Self {
        Self {
            name: delta.name,
            abbrev: delta.abbrev,
            op: delta.op,
            value: delta.value,
        }
    }
}

/// Short codes of the adjustments shipped with the ruleset.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
pub enum DeltaInfo {
    #[strum(serialize = "Dsbl")]
    Disabled,
    #[strum(serialize = "Dur")]
    Durability,
    #[strum(serialize = "FateBns")]
    FateBonus,
    #[strum(serialize = "ItmWt")]
    ItemWeight,
    #[strum(serialize = "Magic")]
    Magic,
    #[strum(serialize = "MagicMod")]
    MagicMod,
    #[strum(serialize = "MaxVal")]
    MaxValue,
    #[strum(serialize = "MinVal")]
    MinValue,
    #[strum(serialize = "MlAtrBst")]
    MasteryAttrBoost,
    #[strum(serialize = "MLDsbl")]
    MasteryDisabled,
    #[strum(serialize = "NoFateAvail")]
    NoFate,
    #[strum(serialize = "NotAttrNoML")]
    NotAttrNoMastery,
    #[strum(serialize = "OffHnd")]
    OffHand,
    #[strum(serialize = "Outn")]
    Outnumbered,
    #[strum(serialize = "SitMod")]
    Player,
    #[strum(serialize = "SSMod")]
    SunsignMod,
}

impl DeltaInfo {
    const NAME_PREFIX: &'static str = "SOHL.DELTAINFO.";

    /// Short display code, e.g. `"OffHnd"`.
    pub fn abbrev(self) -> &'static str {
        self.into()
    }

    /// Namespaced delta name, e.g. `"SOHL.DELTAINFO.OffHnd"`.
    pub fn delta_name(self) -> String {
        format!("{}{}", Self::NAME_PREFIX, self.abbrev())
    }
}
