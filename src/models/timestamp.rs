use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

/// A point in time as printed by the export, keeping the zone abbreviation
/// it was written with so output can echo it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timestamp {
    pub instant: DateTime<FixedOffset>,
    pub zone: String,
}

impl Timestamp {
    pub fn new(instant: DateTime<FixedOffset>, zone: impl Into<String>) -> Self {
        Self { instant, zone: zone.into() }
    }

    /// Current wall-clock time in UTC
    pub fn now() -> Self {
        Self::new(Utc::now().fixed_offset(), "UTC")
    }

    /// True when `self` is strictly earlier than `other`, comparing instants
    /// regardless of the offsets they were written in.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.instant < other.instant
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.instant.format("%Y-%m-%d %H:%M:%S %z"), self.zone)
    }
}
