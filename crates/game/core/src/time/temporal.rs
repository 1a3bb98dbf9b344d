use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::{WorldClock, WorldTime};
use crate::i18n::MessageFormatter;

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_MINUTE: i64 = 60;

/// A point in world time.
///
/// Persists as a bare number. Ordering follows the numeric value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SohlTemporal(WorldTime);

impl SohlTemporal {
    pub const fn from(value: WorldTime) -> Self {
        Self(value)
    }

    /// The clock's current world time.
    pub fn now(clock: &dyn WorldClock) -> Self {
        Self(clock.world_time())
    }

    pub const fn value(&self) -> WorldTime {
        self.0
    }

    pub fn set_value(&mut self, value: WorldTime) {
        self.0 = value;
    }

    pub fn advance_time(&mut self, amount: WorldTime) {
        self.0 = self.0.saturating_add(amount);
    }

    /// Signed distance from `other` to `self`: positive if `self` is later.
    pub fn compare(&self, other: &SohlTemporal) -> WorldTime {
        self.0.saturating_sub(other.0)
    }

    pub fn is_past(&self, clock: &dyn WorldClock) -> bool {
        self.0 < clock.world_time()
    }

    pub fn is_future(&self, clock: &dyn WorldClock) -> bool {
        self.0 > clock.world_time()
    }

    /// Breakdown of `|now - self|` into days, hours, minutes and seconds.
    ///
    /// The direction follows the sign of `now - self`.
    pub fn current_duration(&self, clock: &dyn WorldClock) -> DurationValue {
        let diff = clock.world_time().saturating_sub(self.0);
        let direction = match diff.cmp(&0) {
            Ordering::Greater => TemporalDirection::Future,
            Ordering::Less => TemporalDirection::Past,
            Ordering::Equal => TemporalDirection::Now,
        };
        DurationValue::from_seconds(diff.unsigned_abs(), direction)
    }

    /// English rendering of [`current_duration`](Self::current_duration).
    ///
    /// Headless fallback; display text for players goes through
    /// [`localized_duration`](Self::localized_duration).
    pub fn format_duration(&self, clock: &dyn WorldClock) -> String {
        self.current_duration(clock).to_string()
    }

    /// [`current_duration`](Self::current_duration) rendered by the host's
    /// formatter.
    pub fn localized_duration(
        &self,
        clock: &dyn WorldClock,
        formatter: &dyn MessageFormatter,
    ) -> String {
        formatter.format_duration(&self.current_duration(clock))
    }
}

impl<'de> Deserialize<'de> for SohlTemporal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Self(n),
            Raw::Float(f) => Self(f.trunc() as i64),
        })
    }
}

/// Reads a world-time scalar that may have been persisted as a fraction.
pub(crate) fn lenient_world_time<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<WorldTime, D::Error> {
    SohlTemporal::deserialize(deserializer).map(|t| t.value())
}

impl From<WorldTime> for SohlTemporal {
    fn from(value: WorldTime) -> Self {
        Self(value)
    }
}

/// Which side of "now" a duration points to.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TemporalDirection {
    Past,
    Future,
    Now,
}

/// Duration split into calendar-free units, each truncated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DurationValue {
    pub direction: TemporalDirection,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl DurationValue {
    pub fn from_seconds(total: u64, direction: TemporalDirection) -> Self {
        let days = total / SECONDS_PER_DAY as u64;
        let rest = total % SECONDS_PER_DAY as u64;
        let hours = rest / SECONDS_PER_HOUR as u64;
        let rest = rest % SECONDS_PER_HOUR as u64;
        let minutes = rest / SECONDS_PER_MINUTE as u64;
        let seconds = rest % SECONDS_PER_MINUTE as u64;
        Self {
            direction,
            days,
            hours,
            minutes,
            seconds,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.days * SECONDS_PER_DAY as u64
            + self.hours * SECONDS_PER_HOUR as u64
            + self.minutes * SECONDS_PER_MINUTE as u64
            + self.seconds
    }
}

/// English fallback: `in 1d 2h`, `3m ago`, or `Now`. Hosts localize through
/// [`MessageFormatter::format_duration`].
impl fmt::Display for DurationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            (self.days, "d"),
            (self.hours, "h"),
            (self.minutes, "m"),
            (self.seconds, "s"),
        ]
        .into_iter()
        .filter(|(amount, _)| *amount > 0)
        .map(|(amount, unit)| format!("{amount}{unit}"))
        .collect();
        let joined = parts.join(" ");

        match self.direction {
            TemporalDirection::Now => f.write_str("Now"),
            _ if joined.is_empty() => f.write_str("Now"),
            TemporalDirection::Past => write!(f, "{joined} ago"),
            TemporalDirection::Future => write!(f, "in {joined}"),
        }
    }
}
