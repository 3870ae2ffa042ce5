use crate::units::nanos_as_secs_f64;
use crate::{Context, Outcome, SystemStatus};

/// A flattened snapshot of the attributes of a [`Meter`][crate::Meter].
///
/// A snapshot is taken for every data event a meter emits and can be reconstructed from the
/// text of such an event with [`MeterData::decode()`] or [`MeterData::parse_line()`].
///
/// All timestamps are nanoseconds on a monotonic process clock. Zero means "not recorded".
///
/// # Examples
///
/// ```
/// use log_meter::{MeterAnalysis, MeterData, Outcome};
///
/// let mut data = MeterData::default();
/// data.category = "billing".to_string();
/// data.operation = Some("charge_card".to_string());
/// data.position = 7;
/// data.start_time = 1_000;
/// data.stop_time = 5_000;
/// data.outcome = Outcome::Ok { path: None };
///
/// assert_eq!(data.full_id(), "billing/charge_card#7");
/// assert_eq!(data.execution_time(), 4_000);
/// assert!(data.is_ok());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct MeterData {
    /// Identifies the [`Session`][crate::Session] that created the meter.
    pub session_uuid: Option<String>,

    /// The category of the meter, usually the name of the instrumented component.
    pub category: String,

    /// The name of the instrumented operation, if any.
    pub operation: Option<String>,

    /// Full ID of the meter that was active when this one was created.
    pub parent: Option<String>,

    /// Sequence number unique per category and operation, starting at 1.
    pub position: u64,

    /// Free-text description of the operation.
    pub description: Option<String>,

    /// When the meter was created.
    pub create_time: u64,

    /// When the meter was started.
    pub start_time: u64,

    /// When the meter was resolved.
    pub stop_time: u64,

    /// When the most recent event of the meter was emitted.
    pub last_current_time: u64,

    /// Execution time above which a successful meter is considered slow, in nanoseconds.
    pub time_limit: u64,

    /// Iterations completed so far.
    pub current_iteration: u64,

    /// Iterations the operation is expected to complete.
    pub expected_iterations: u64,

    /// How the meter was resolved.
    pub outcome: Outcome,

    /// Caller-attached diagnostic pairs.
    pub context: Context,

    /// Process and system metrics at the time of the snapshot.
    pub status: SystemStatus,
}

impl MeterData {
    /// Restores every field to its default value.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Derived views over the attributes of a meter.
///
/// Implemented by both the live [`Meter`][crate::Meter] and the [`MeterData`] snapshot, so that
/// the same questions can be asked of a running operation and of a parsed log line.
pub trait MeterAnalysis {
    /// The snapshot to analyze.
    fn data(&self) -> &MeterData;

    /// Whether the meter has been started.
    fn is_started(&self) -> bool {
        self.data().start_time != 0
    }

    /// Whether the meter has been resolved.
    fn is_stopped(&self) -> bool {
        self.data().stop_time != 0
    }

    /// Whether the meter completed successfully.
    fn is_ok(&self) -> bool {
        self.data().outcome.is_ok()
    }

    /// Whether the meter was rejected.
    fn is_reject(&self) -> bool {
        self.data().outcome.is_reject()
    }

    /// Whether the meter failed.
    fn is_fail(&self) -> bool {
        self.data().outcome.is_fail()
    }

    /// The path of whichever outcome is set.
    fn path(&self) -> Option<&str> {
        self.data().outcome.path()
    }

    /// Identifier in the form `category[/operation]#position`.
    fn full_id(&self) -> String {
        let data = self.data();

        match &data.operation {
            Some(operation) => format!("{}/{operation}#{}", data.category, data.position),
            None => format!("{}#{}", data.category, data.position),
        }
    }

    /// Nanoseconds between start and stop, or between start and the latest event while the
    /// meter is still running. Zero if the meter was never started.
    fn execution_time(&self) -> u64 {
        let data = self.data();

        if data.start_time == 0 {
            0
        } else if data.stop_time == 0 {
            data.last_current_time.saturating_sub(data.start_time)
        } else {
            data.stop_time.saturating_sub(data.start_time)
        }
    }

    /// Nanoseconds between creation and start, or between creation and the latest event while
    /// the meter has not been started yet.
    fn waiting_time(&self) -> u64 {
        let data = self.data();

        if data.start_time == 0 {
            data.last_current_time.saturating_sub(data.create_time)
        } else {
            data.start_time.saturating_sub(data.create_time)
        }
    }

    /// Completed iterations per second of execution time.
    fn iterations_per_second(&self) -> f64 {
        let iterations = self.data().current_iteration;
        let execution_time = self.execution_time();

        if iterations == 0 || execution_time == 0 {
            return 0.0;
        }

        #[expect(
            clippy::cast_precision_loss,
            reason = "iteration counts beyond 2^52 are unrealistic"
        )]
        let iterations = iterations as f64;

        iterations / nanos_as_secs_f64(execution_time)
    }

    /// Whether the execution time exceeded the time limit. Always `false` without a limit.
    fn is_slow(&self) -> bool {
        let time_limit = self.data().time_limit;
        time_limit > 0 && self.execution_time() > time_limit
    }
}

impl MeterAnalysis for MeterData {
    fn data(&self) -> &MeterData {
        self
    }
}
