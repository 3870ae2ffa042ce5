use std::any;
use std::error::Error as StdError;
use std::fmt::Display;
use std::marker::PhantomData;
use std::thread;
use std::time::Duration;

use tracing::Level;

use crate::message::{ReadableMessage, Status};
use crate::pal::Platform;
use crate::units::duration_nanos;
use crate::{
    Context, LogRecord, Marker, MeterAnalysis, MeterData, NULL_KEY, NULL_VALUE, Outcome,
    SCOPE_EXIT_PATH, Session, current, validator,
};

/// Tracks one execution of an operation and logs its lifecycle.
///
/// A meter is created by a [`Session`], started with [`start()`][Self::start] and resolved with
/// exactly one of [`ok()`][Self::ok], [`reject()`][Self::reject] or [`fail()`][Self::fail].
/// Every transition emits a message event with a readable summary and a data event with the
/// encoded [`MeterData`] snapshot.
///
/// Methods return `&mut Self` so that calls can be chained. Misuse, such as resolving a meter
/// twice, is logged as an ERROR event with the location of the offending call and otherwise
/// tolerated.
///
/// A meter that is dropped without an outcome is recorded as failed with the path
/// [`SCOPE_EXIT_PATH`].
///
/// # Thread safety
///
/// A meter belongs to the thread that created it and cannot be sent to another thread.
///
/// # Examples
///
/// ```
/// use log_meter::{MeterAnalysis, Session};
///
/// let session = Session::new();
///
/// let mut meter = session.operation_meter("import", "customers");
/// meter
///     .description("nightly customer import")
///     .expected_iterations(3)
///     .start();
///
/// for _customer in ["alice", "bob", "carol"] {
///     // Import the customer.
///     meter.inc().progress();
/// }
///
/// meter.ctx("source", "crm").ok();
///
/// assert_eq!(meter.data().current_iteration, 3);
/// assert_eq!(meter.data().context.get("source"), Some("crm"));
/// ```
#[derive(derive_more::Debug)]
pub struct Meter {
    #[debug(ignore)]
    session: Session,

    data: MeterData,

    // Path used by `ok()`, set in advance with `set_path()`.
    ok_path: Option<String>,

    last_progress_time: u64,

    // Whether the meter is registered as active on the current thread.
    active: bool,

    #[debug(ignore)]
    _single_threaded: PhantomData<*const ()>,
}

impl Meter {
    pub(crate) fn new(
        session: Session,
        category: String,
        operation: Option<String>,
        parent: Option<String>,
        context: Option<Context>,
    ) -> Self {
        let position = session.next_position(&category, operation.as_deref());
        let now = session.platform().now_nanos();

        let mut data = MeterData::default();
        data.session_uuid = Some(session.uuid().to_string());
        data.category = category;
        data.operation = operation;
        data.parent = parent.or_else(current::current_meter_id);
        data.position = position;
        data.create_time = now;
        data.last_current_time = now;
        data.context = context.unwrap_or_default();

        Self {
            session,
            data,
            ok_path: None,
            last_progress_time: 0,
            active: false,
            _single_threaded: PhantomData,
        }
    }

    /// Sets a free-text description of the operation.
    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.data.description = Some(description.into());
        self
    }

    /// Sets the execution time above which a successful outcome is reported as slow.
    ///
    /// A zero limit is reported as illegal and ignored.
    #[track_caller]
    pub fn limit(&mut self, limit: Duration) -> &mut Self {
        let nanos = duration_nanos(limit);

        if validator::check_positive(self.session.logger(), &self.data, "time limit", nanos) {
            self.data.time_limit = nanos;
        }

        self
    }

    /// Sets the time limit in milliseconds. See [`limit()`][Self::limit].
    #[track_caller]
    pub fn limit_millis(&mut self, millis: u64) -> &mut Self {
        self.limit(Duration::from_millis(millis))
    }

    /// Sets the number of iterations the operation is expected to complete.
    ///
    /// Zero is reported as illegal and ignored.
    #[track_caller]
    pub fn expected_iterations(&mut self, iterations: u64) -> &mut Self {
        if validator::check_positive(
            self.session.logger(),
            &self.data,
            "expected iterations",
            iterations,
        ) {
            self.data.expected_iterations = iterations;
        }

        self
    }

    /// Starts the operation.
    ///
    /// Starting a meter again is reported as inconsistent and restarts the clock.
    #[track_caller]
    pub fn start(&mut self) -> &mut Self {
        validator::check_start(self.session.logger(), &self.data);

        let now = self.now();
        self.data.start_time = now;
        self.data.last_current_time = now;
        self.last_progress_time = now;

        self.activate();
        self.emit(Status::Started);
        self
    }

    /// Counts one completed iteration.
    #[track_caller]
    pub fn inc(&mut self) -> &mut Self {
        self.inc_by(1)
    }

    /// Counts `iterations` completed iterations. Zero is reported as illegal and ignored.
    #[track_caller]
    pub fn inc_by(&mut self, iterations: u64) -> &mut Self {
        let logger = self.session.logger();

        if validator::check_increment_by(logger, &self.data, iterations) {
            validator::check_increment(logger, &self.data);
            self.data.current_iteration = self.data.current_iteration.saturating_add(iterations);
        }

        self
    }

    /// Sets the number of completed iterations.
    ///
    /// A value that does not exceed the current count is reported as illegal and ignored.
    #[track_caller]
    pub fn inc_to(&mut self, iteration: u64) -> &mut Self {
        let logger = self.session.logger();

        if validator::check_increment_to(logger, &self.data, iteration) {
            validator::check_increment(logger, &self.data);
            self.data.current_iteration = iteration;
        }

        self
    }

    /// Reports progress of a long-running operation.
    ///
    /// At most one progress event is emitted per
    /// [`progress_period`][crate::MeterConfig::progress_period], measured from the start or the
    /// previous progress event. Calls in between are ignored. Reporting progress before the
    /// meter is started is reported as inconsistent.
    #[track_caller]
    pub fn progress(&mut self) -> &mut Self {
        if !validator::check_progress(self.session.logger(), &self.data) || self.is_stopped() {
            return self;
        }

        let now = self.now();
        let period = duration_nanos(self.session.config().progress_period());

        if period == 0 || now.saturating_sub(self.last_progress_time) >= period {
            self.last_progress_time = now;
            self.data.last_current_time = now;
            self.emit(Status::Progress);
        }

        self
    }

    /// Attaches `name=value` to the context, replacing any previous value of `name`.
    ///
    /// An empty name is replaced with [`NULL_KEY`].
    pub fn ctx(&mut self, name: &str, value: impl Display) -> &mut Self {
        self.data
            .context
            .insert(context_key(name), value.to_string());
        self
    }

    /// Attaches `name` to the context without a value.
    pub fn ctx_flag(&mut self, name: &str) -> &mut Self {
        self.data.context.insert(context_key(name), String::new());
        self
    }

    /// Attaches `name` with an optional value; `None` is recorded as [`NULL_VALUE`].
    pub fn ctx_opt(&mut self, name: &str, value: Option<impl Display>) -> &mut Self {
        match value {
            Some(value) => self.ctx(name, value),
            None => self.ctx(name, NULL_VALUE),
        }
    }

    /// Attaches the flag `name` if `condition` holds.
    pub fn ctx_if(&mut self, condition: bool, name: &str) -> &mut Self {
        if condition {
            self.ctx_flag(name);
        }

        self
    }

    /// Attaches the flag `true_name` if `condition` holds and `false_name` otherwise.
    pub fn ctx_if_else(&mut self, condition: bool, true_name: &str, false_name: &str) -> &mut Self {
        self.ctx_flag(if condition { true_name } else { false_name })
    }

    /// Removes `name` from the context.
    pub fn unctx(&mut self, name: &str) -> &mut Self {
        self.data.context.remove(context_key(name));
        self
    }

    /// Creates a meter for a step of this operation.
    ///
    /// The step is named `operation/name` after this meter's operation, counts its positions
    /// separately, records this meter as its parent and starts with a copy of this meter's
    /// context. An empty name is reported as illegal.
    ///
    /// # Examples
    ///
    /// ```
    /// use log_meter::{MeterAnalysis, Session};
    ///
    /// let session = Session::new();
    ///
    /// let mut order = session.operation_meter("shop", "order");
    /// order.ctx("order_id", 17).start();
    ///
    /// let mut payment = order.sub("payment");
    /// payment.start().ok();
    ///
    /// assert_eq!(payment.full_id(), "shop/order/payment#1");
    /// assert_eq!(payment.data().parent.as_deref(), Some("shop/order#1"));
    /// assert_eq!(payment.data().context.get("order_id"), Some("17"));
    ///
    /// order.ok();
    /// ```
    #[must_use]
    #[track_caller]
    pub fn sub(&self, name: &str) -> Self {
        validator::check_sub_name(self.session.logger(), &self.data, name);

        let operation = match &self.data.operation {
            Some(operation) => format!("{operation}/{name}"),
            None => name.to_string(),
        };

        Self::new(
            self.session.clone(),
            self.data.category.clone(),
            Some(operation),
            Some(self.full_id()),
            Some(self.data.context.clone()),
        )
    }

    /// Sets the path that [`ok()`][Self::ok] records, without resolving the meter.
    pub fn set_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.ok_path = Some(path.into());
        self
    }

    /// Records successful completion, with the path set by [`set_path()`][Self::set_path] if any.
    ///
    /// The outcome is reported as slow if the execution time exceeded the time limit.
    #[track_caller]
    pub fn ok(&mut self) -> &mut Self {
        let path = self.ok_path.clone();
        self.resolve(Outcome::Ok { path }, Marker::InconsistentOk)
    }

    /// Records successful completion through `path`.
    #[track_caller]
    pub fn ok_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.resolve(
            Outcome::Ok {
                path: Some(path.into()),
            },
            Marker::InconsistentOk,
        )
    }

    /// Records that the operation ended through the expected, non-successful path `path`.
    #[track_caller]
    pub fn reject(&mut self, path: impl Into<String>) -> &mut Self {
        self.resolve(Outcome::Reject { path: path.into() }, Marker::InconsistentReject)
    }

    /// Records failure caused by `error`: the path is the module-qualified type name of the
    /// error, such as `std::io::error::Error`, and the message its display text.
    #[track_caller]
    pub fn fail<E: StdError + ?Sized>(&mut self, error: &E) -> &mut Self {
        self.resolve(
            Outcome::Fail {
                path: error_type_name::<E>().to_string(),
                message: Some(error.to_string()),
            },
            Marker::InconsistentFail,
        )
    }

    /// Records failure with an explicit path and message.
    #[track_caller]
    pub fn fail_path(&mut self, path: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.resolve(
            Outcome::Fail {
                path: path.into(),
                message: Some(message.into()),
            },
            Marker::InconsistentFail,
        )
    }

    /// Sets the outcome, reporting `inconsistency` if the meter is not running.
    #[track_caller]
    fn resolve(&mut self, outcome: Outcome, inconsistency: Marker) -> &mut Self {
        validator::check_resolve(self.session.logger(), &self.data, inconsistency);

        let now = self.now();
        self.data.stop_time = now;
        self.data.last_current_time = now;
        self.data.outcome = outcome;

        self.deactivate();

        let status = match &self.data.outcome {
            Outcome::Ok { .. } if self.data.is_slow() => Status::Slow,
            Outcome::Ok { .. } => Status::Ok,
            Outcome::Reject { .. } => Status::Reject,
            Outcome::Fail { .. } | Outcome::Unset => Status::Fail,
        };

        self.emit(status);
        self
    }

    fn now(&self) -> u64 {
        self.session.platform().now_nanos()
    }

    fn activate(&mut self) {
        if !self.active && !self.data.outcome.is_resolved() {
            current::push(self.full_id());
            self.active = true;
        }
    }

    fn deactivate(&mut self) {
        if self.active {
            current::remove(&self.full_id());
            self.active = false;
        }
    }

    /// Logs the message and data events of a transition, skipping what the logger would discard.
    fn emit(&mut self, status: Status) {
        let session = &self.session;
        let logger = session.logger();
        let config = session.config();

        let message_level = status.message_level();
        let emit_message =
            config.print_status() && logger.is_enabled(message_level, &self.data.category);
        let emit_data = logger.is_enabled(Level::TRACE, &self.data.category);

        if !emit_message && !emit_data {
            return;
        }

        if emit_data || config.needs_status_for_messages() {
            self.data.status = session.platform().system_status();
        }

        if emit_message {
            let readable = ReadableMessage {
                status,
                data: &self.data,
                config,
            };
            let message = format!(
                "{}{readable}{}",
                config.message_prefix(),
                config.message_suffix()
            );

            logger.log(&LogRecord::new(
                message_level,
                status.message_marker(),
                &self.data.category,
                &message,
                None,
            ));
        }

        if emit_data {
            match self.data.encode() {
                Ok(payload) => {
                    let message =
                        format!("{}{payload}{}", config.data_prefix(), config.data_suffix());

                    logger.log(&LogRecord::new(
                        Level::TRACE,
                        status.data_marker(),
                        &self.data.category,
                        &message,
                        None,
                    ));
                }
                Err(error) => {
                    let problem = format!("cannot encode meter data: {error}");
                    validator::report_bug(logger, &self.data, &problem);
                }
            }
        }
    }
}

impl MeterAnalysis for Meter {
    fn data(&self) -> &MeterData {
        &self.data
    }
}

impl Drop for Meter {
    fn drop(&mut self) {
        if !self.data.outcome.is_resolved() {
            let message = thread::panicking().then(|| "panicking".to_string());

            self.resolve(
                Outcome::Fail {
                    path: SCOPE_EXIT_PATH.to_string(),
                    message,
                },
                Marker::InconsistentFail,
            );
        }

        self.deactivate();
    }
}

fn context_key(name: &str) -> &str {
    if name.is_empty() { NULL_KEY } else { name }
}

/// The module-qualified type name of `T`, without generic arguments or auto traits.
///
/// Keeping the module path tells apart the many error types that are all named `Error`.
pub(crate) fn error_type_name<T: ?Sized>() -> &'static str {
    let full = any::type_name::<T>();
    let full = full.strip_prefix("dyn ").unwrap_or(full);

    full.split(['<', ' ']).next().unwrap_or(full)
}
