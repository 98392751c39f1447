//! Time source for row timestamps.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::{BenchError, BenchResult};

pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

/// Wall-clock time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Always returns the same instant; for reproducible output.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// ISO-8601 UTC timestamp with whole seconds, e.g. `2024-05-01T12:00:00Z`.
pub fn iso8601_seconds(instant: OffsetDateTime) -> BenchResult<String> {
    instant
        .to_offset(time::UtcOffset::UTC)
        .replace_nanosecond(0)
        .map_err(|e| BenchError::Message(e.to_string()))?
        .format(&Rfc3339)
        .map_err(|e| BenchError::Message(format!("failed to format timestamp: {e}")))
}
