//! World-time points, clocks and duration breakdowns.

mod clock;
mod temporal;

pub use clock::{FixedClock, WorldClock, WorldTime};
pub use temporal::{DurationValue, SohlTemporal, TemporalDirection};
pub(crate) use temporal::lenient_world_time;
