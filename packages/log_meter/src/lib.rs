#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Instrument units of work with structured log events.
//!
//! A [`Meter`] wraps one unit of work (an operation) and emits a pair of log events at every
//! transition of its lifecycle: a human-readable message event and a machine-readable data
//! event. The data event carries a compact single-line encoding of a [`MeterData`] snapshot
//! that can be parsed back with [`MeterData::decode()`] or [`MeterData::parse_line()`].
//!
//! The core functionality includes:
//! - [`Session`] - Owns configuration, logger and position counters and creates meters
//! - [`Meter`] - Tracks one operation from creation to its outcome
//! - [`MeterData`] - Snapshot of a meter, with an encoder and a decoder
//! - [`MeterAnalysis`] - Derived views (execution time, rate, slowness) over a snapshot
//! - [`MeterConfig`] - Settings loaded from `slf4jtoys.meter.*` properties
//! - [`MeterLogger`] - The logging seam, implemented by [`TracingLogger`] and [`RecordingLogger`]
//!
//! # Lifecycle
//!
//! ```
//! use log_meter::{MeterAnalysis, Session};
//!
//! let session = Session::new();
//!
//! let mut meter = session.operation_meter("billing", "charge_card");
//! meter.ctx("customer", 42).start();
//!
//! // Perform the operation.
//!
//! meter.ok();
//! assert!(meter.is_ok());
//! ```
//!
//! Exactly one of [`ok()`][Meter::ok], [`reject()`][Meter::reject] or [`fail()`][Meter::fail]
//! is expected per meter. A meter that is dropped without an outcome is recorded as failed,
//! which makes a meter usable as a scope guard:
//!
//! ```
//! use log_meter::{MeterAnalysis, Session};
//!
//! let session = Session::new();
//!
//! let mut meter = session.meter("inventory");
//! meter.start();
//!
//! if meter.is_started() {
//!     // An early return here would record the meter as failed when it is dropped.
//!     meter.ok_path("cache_hit");
//! }
//! ```
//!
//! # Wrapping closures
//!
//! The executor methods start the meter, run the closure and record the outcome from its result:
//!
//! ```
//! use std::num::ParseIntError;
//!
//! use log_meter::{MeterAnalysis, Session};
//!
//! let session = Session::new();
//!
//! let mut meter = session.meter("parser");
//! let value: Result<u32, ParseIntError> = meter.call(|_| "42".parse::<u32>());
//!
//! assert_eq!(value, Ok(42));
//! assert!(meter.is_ok());
//! ```
//!
//! # Misuse policy
//!
//! Instrumentation never crashes the instrumented code. Calling lifecycle methods out of order,
//! resolving a meter twice or passing a zero increment is reported as an ERROR event with a
//! dedicated [`Marker`] and the caller location, after which the call proceeds on a best-effort
//! basis.
//!
//! # Threading
//!
//! A [`Meter`] is bound to the thread that created it. The [`Session`] that creates meters is
//! thread-safe and can be shared freely; position counters are maintained atomically across
//! threads.

mod call;
mod codec;
mod config;
mod context;
mod current;
mod error;
mod logger;
mod markers;
mod message;
mod meter;
mod meter_data;
mod outcome;
mod pal;
mod positions;
mod session;
mod system_status;
mod units;
mod validator;

pub use config::*;
pub use context::*;
pub use current::current_meter_id;
pub use error::*;
pub use logger::*;
pub use markers::*;
pub use meter::*;
pub use meter_data::*;
pub use outcome::*;
pub use session::*;
pub use system_status::*;

/// Sentinel outcome path recorded when a meter goes out of scope without an outcome.
pub const SCOPE_EXIT_PATH: &str = "try-with-resources";

/// Sentinel outcome path recorded when the closure given to an executor method panics.
pub const PANIC_PATH: &str = "panic";

/// Context key substituted for an empty context name.
pub const NULL_KEY: &str = "NULL_VALUE";

/// Context value substituted for an absent context value.
pub const NULL_VALUE: &str = "<null>";

pub(crate) const ERR_POISONED_LOCK: &str =
    "encountered poisoned lock - recorded meter state can no longer be trusted";
