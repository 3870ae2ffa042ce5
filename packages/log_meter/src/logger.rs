use std::fmt::Debug;
use std::panic::Location;
use std::sync::{Arc, Mutex};

use tracing::Level;

use crate::{ERR_POISONED_LOCK, Marker};

/// The `tracing` target of every event emitted by [`TracingLogger`].
pub const TRACING_TARGET: &str = "log_meter";

/// One event emitted by a meter, as handed to a [`MeterLogger`].
#[derive(Debug)]
pub struct LogRecord<'a> {
    level: Level,
    marker: Marker,
    category: &'a str,
    message: &'a str,
    caller: Option<&'static Location<'static>>,
}

impl<'a> LogRecord<'a> {
    pub(crate) fn new(
        level: Level,
        marker: Marker,
        category: &'a str,
        message: &'a str,
        caller: Option<&'static Location<'static>>,
    ) -> Self {
        Self {
            level,
            marker,
            category,
            message,
            caller,
        }
    }

    /// Severity of the event.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Classification of the event.
    #[must_use]
    pub fn marker(&self) -> Marker {
        self.marker
    }

    /// Category of the meter that emitted the event.
    #[must_use]
    pub fn category(&self) -> &'a str {
        self.category
    }

    /// The formatted event text: a readable message, an encoded data payload or a diagnostic.
    #[must_use]
    pub fn message(&self) -> &'a str {
        self.message
    }

    /// Source location of the API call that caused a diagnostic event.
    ///
    /// Only diagnostic events (see [`Marker::is_diagnostic()`]) carry a caller location.
    #[must_use]
    pub fn caller(&self) -> Option<&'static Location<'static>> {
        self.caller
    }
}

/// Destination of the events emitted by meters.
///
/// A [`Session`][crate::Session] logs through [`TracingLogger`] unless a different logger is
/// supplied via [`SessionBuilder::logger()`][crate::SessionBuilder::logger].
pub trait MeterLogger: Debug + Send + Sync + 'static {
    /// Whether events of `level` for `category` would be recorded.
    ///
    /// Meters skip formatting of events that would be discarded.
    fn is_enabled(&self, level: Level, category: &str) -> bool {
        _ = (level, category);
        true
    }

    /// Records one event.
    fn log(&self, record: &LogRecord<'_>);
}

/// Emits meter events as `tracing` events on the [`TRACING_TARGET`] target.
///
/// Every event carries the `category`, `marker` and (for diagnostics) `caller` fields, with the
/// event text as the message.
#[derive(Clone, Copy, Debug, Default)]
#[non_exhaustive]
pub struct TracingLogger;

impl TracingLogger {
    /// Creates a logger that forwards to the `tracing` dispatcher of the current thread.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

// `tracing` requires the level of an event to be a constant.
macro_rules! emit_at {
    ($level:expr, $record:expr) => {
        tracing::event!(
            target: TRACING_TARGET,
            $level,
            category = $record.category(),
            marker = $record.marker().as_str(),
            caller = $record.caller().map(tracing::field::display),
            "{}",
            $record.message()
        )
    };
}

impl MeterLogger for TracingLogger {
    fn is_enabled(&self, level: Level, _category: &str) -> bool {
        match level {
            Level::ERROR => tracing::enabled!(target: TRACING_TARGET, Level::ERROR),
            Level::WARN => tracing::enabled!(target: TRACING_TARGET, Level::WARN),
            Level::INFO => tracing::enabled!(target: TRACING_TARGET, Level::INFO),
            Level::DEBUG => tracing::enabled!(target: TRACING_TARGET, Level::DEBUG),
            _ => tracing::enabled!(target: TRACING_TARGET, Level::TRACE),
        }
    }

    fn log(&self, record: &LogRecord<'_>) {
        match record.level() {
            Level::ERROR => emit_at!(Level::ERROR, record),
            Level::WARN => emit_at!(Level::WARN, record),
            Level::INFO => emit_at!(Level::INFO, record),
            Level::DEBUG => emit_at!(Level::DEBUG, record),
            _ => emit_at!(Level::TRACE, record),
        }
    }
}

/// An event captured by a [`RecordingLogger`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordedEvent {
    level: Level,
    marker: Marker,
    category: String,
    message: String,
    caller: Option<&'static Location<'static>>,
}

impl RecordedEvent {
    /// Severity of the event.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Classification of the event.
    #[must_use]
    pub fn marker(&self) -> Marker {
        self.marker
    }

    /// Category of the meter that emitted the event.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The event text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Source location of the API call that caused a diagnostic event.
    #[must_use]
    pub fn caller(&self) -> Option<&'static Location<'static>> {
        self.caller
    }
}

/// Keeps every event in memory, for inspection by tests.
///
/// Clones share the same buffer, so a test can keep one clone while a session logs into another.
///
/// # Examples
///
/// ```
/// use log_meter::{Marker, RecordingLogger, Session};
///
/// let logger = RecordingLogger::new();
/// let session = Session::builder().logger(logger.clone()).build();
///
/// let mut meter = session.meter("test");
/// meter.start();
/// meter.ok();
///
/// assert_eq!(logger.count(Marker::MsgOk), 1);
/// assert_eq!(logger.count(Marker::DataOk), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RecordingLogger {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingLogger {
    /// Creates a logger with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of every event recorded so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().expect(ERR_POISONED_LOCK).clone()
    }

    /// The recorded events that carry `marker`, oldest first.
    #[must_use]
    pub fn with_marker(&self, marker: Marker) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .expect(ERR_POISONED_LOCK)
            .iter()
            .filter(|event| event.marker == marker)
            .cloned()
            .collect()
    }

    /// How many recorded events carry `marker`.
    #[must_use]
    pub fn count(&self, marker: Marker) -> usize {
        self.events
            .lock()
            .expect(ERR_POISONED_LOCK)
            .iter()
            .filter(|event| event.marker == marker)
            .count()
    }

    /// Discards every recorded event.
    pub fn clear(&self) {
        self.events.lock().expect(ERR_POISONED_LOCK).clear();
    }
}

impl MeterLogger for RecordingLogger {
    fn log(&self, record: &LogRecord<'_>) {
        let event = RecordedEvent {
            level: record.level(),
            marker: record.marker(),
            category: record.category().to_string(),
            message: record.message().to_string(),
            caller: record.caller(),
        };

        self.events.lock().expect(ERR_POISONED_LOCK).push(event);
    }
}

/// Shared handle to the logger of a session.
pub(crate) type LoggerHandle = Arc<dyn MeterLogger>;
