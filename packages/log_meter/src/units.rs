//! Rendering of durations, byte sizes and rates for human-readable messages.

use std::fmt::{self, Display};
use std::time::Duration;

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SECOND: u64 = 1_000_000_000;
const NANOS_PER_MINUTE: u64 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u64 = 60 * NANOS_PER_MINUTE;

const BYTES_PER_KB: u64 = 1_000;
const BYTES_PER_MB: u64 = 1_000_000;
const BYTES_PER_GB: u64 = 1_000_000_000;

/// Converts a duration to whole nanoseconds, saturating at `u64::MAX`.
pub(crate) fn duration_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Converts nanoseconds to fractional seconds.
#[expect(
    clippy::cast_precision_loss,
    reason = "sub-nanosecond precision loss is irrelevant for rates"
)]
pub(crate) fn nanos_as_secs_f64(nanos: u64) -> f64 {
    nanos as f64 / NANOS_PER_SECOND as f64
}

/// Displays nanoseconds with the largest fitting unit, e.g. `700.0ms`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Nanos(pub(crate) u64);

impl Display for Nanos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.0;

        if nanos < NANOS_PER_MICRO {
            write!(f, "{nanos}ns")
        } else if nanos < NANOS_PER_MILLI {
            write_scaled(f, nanos, NANOS_PER_MICRO, "us")
        } else if nanos < NANOS_PER_SECOND {
            write_scaled(f, nanos, NANOS_PER_MILLI, "ms")
        } else if nanos < NANOS_PER_MINUTE {
            write_scaled(f, nanos, NANOS_PER_SECOND, "s")
        } else if nanos < NANOS_PER_HOUR {
            write_scaled(f, nanos, NANOS_PER_MINUTE, "min")
        } else {
            write_scaled(f, nanos, NANOS_PER_HOUR, "h")
        }
    }
}

/// Displays a byte count with the largest fitting decimal unit, e.g. `1.5MB`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Bytes(pub(crate) u64);

impl Display for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0;

        if bytes < BYTES_PER_KB {
            write!(f, "{bytes}B")
        } else if bytes < BYTES_PER_MB {
            write_scaled(f, bytes, BYTES_PER_KB, "kB")
        } else if bytes < BYTES_PER_GB {
            write_scaled(f, bytes, BYTES_PER_MB, "MB")
        } else {
            write_scaled(f, bytes, BYTES_PER_GB, "GB")
        }
    }
}

/// Displays an events-per-second rate, e.g. `28.6/s`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Rate(pub(crate) f64);

impl Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}/s", self.0)
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "one decimal place is all that is displayed"
)]
fn write_scaled(f: &mut fmt::Formatter<'_>, value: u64, unit: u64, suffix: &str) -> fmt::Result {
    write!(f, "{:.1}{suffix}", value as f64 / unit as f64)
}
