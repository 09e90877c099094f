//! Deterministic evaluation rules. Pure functions: observations and
//! thresholds in, severities and messages out. No I/O.

pub mod age;
pub mod delta;

pub use age::{age_seconds, classify_age, describe_age};
pub use delta::DeltaReading;
