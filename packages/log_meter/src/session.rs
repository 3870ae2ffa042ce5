use std::any;
use std::sync::Arc;

use crate::logger::LoggerHandle;
use crate::pal::PlatformFacade;
use crate::positions::PositionRegistry;
use crate::{Meter, MeterConfig, MeterLogger, TracingLogger};

/// Creates meters and owns everything they share: configuration, logger, clock and the
/// position counters of every (category, operation) pair.
///
/// Clones of a session share the same state and can be sent to other threads. Each meter keeps
/// its session alive.
///
/// # Examples
///
/// ```
/// use log_meter::{MeterAnalysis, Session};
///
/// let session = Session::new();
///
/// let mut first = session.operation_meter("reports", "render");
/// let mut second = session.operation_meter("reports", "render");
///
/// assert_eq!(first.full_id(), "reports/render#1");
/// assert_eq!(second.full_id(), "reports/render#2");
///
/// first.start().ok();
/// second.start().ok();
/// ```
#[derive(Clone, Debug)]
pub struct Session {
    core: Arc<SessionCore>,
}

#[derive(Debug)]
struct SessionCore {
    uuid: String,
    config: MeterConfig,
    logger: LoggerHandle,
    platform: PlatformFacade,
    positions: PositionRegistry,
}

impl Session {
    /// Creates a session that reads its configuration from the environment and logs through
    /// [`TracingLogger`].
    #[expect(
        clippy::new_without_default,
        reason = "a session reads the environment, which is not a default value"
    )]
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a session with a custom configuration or logger.
    #[must_use]
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Creates a meter for an operation without a name of its own, identified by `category`.
    #[must_use]
    pub fn meter(&self, category: impl Into<String>) -> Meter {
        Meter::new(self.clone(), category.into(), None, None, None)
    }

    /// Creates a meter for the operation `operation` of `category`.
    #[must_use]
    pub fn operation_meter(
        &self,
        category: impl Into<String>,
        operation: impl Into<String>,
    ) -> Meter {
        Meter::new(
            self.clone(),
            category.into(),
            Some(operation.into()),
            None,
            None,
        )
    }

    /// Creates a meter whose category is the type name of `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use log_meter::{MeterAnalysis, Session};
    ///
    /// struct InvoiceRepository;
    ///
    /// let session = Session::new();
    /// let meter = session.meter_for::<InvoiceRepository>();
    ///
    /// assert!(meter.data().category.ends_with("InvoiceRepository"));
    /// ```
    #[must_use]
    pub fn meter_for<T: ?Sized>(&self) -> Meter {
        self.meter(any::type_name::<T>())
    }

    /// Identifies this session in the data events of its meters.
    #[must_use]
    pub fn uuid(&self) -> &str {
        &self.core.uuid
    }

    /// The configuration shared by the meters of this session.
    #[must_use]
    pub fn config(&self) -> &MeterConfig {
        &self.core.config
    }

    pub(crate) fn logger(&self) -> &dyn MeterLogger {
        self.core.logger.as_ref()
    }

    pub(crate) fn platform(&self) -> &PlatformFacade {
        &self.core.platform
    }

    pub(crate) fn next_position(&self, category: &str, operation: Option<&str>) -> u64 {
        self.core.positions.next(category, operation)
    }
}

/// Configures a [`Session`] before it is created.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use log_meter::{MeterConfig, RecordingLogger, Session};
///
/// let logger = RecordingLogger::new();
///
/// let session = Session::builder()
///     .config(MeterConfig::default().with_progress_period(Duration::ZERO))
///     .logger(logger.clone())
///     .build();
///
/// assert_eq!(session.config().progress_period(), Duration::ZERO);
/// ```
#[derive(Debug)]
pub struct SessionBuilder {
    config: Option<MeterConfig>,
    logger: Option<LoggerHandle>,
    platform: PlatformFacade,
}

impl SessionBuilder {
    fn new() -> Self {
        Self {
            config: None,
            logger: None,
            platform: PlatformFacade::real(),
        }
    }

    /// Uses `config` instead of reading the configuration from the environment.
    #[must_use]
    pub fn config(mut self, config: MeterConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sends meter events to `logger` instead of [`TracingLogger`].
    #[must_use]
    pub fn logger(mut self, logger: impl MeterLogger) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    #[cfg(test)]
    pub(crate) fn platform(mut self, platform: PlatformFacade) -> Self {
        self.platform = platform;
        self
    }

    /// Creates the session.
    #[must_use]
    pub fn build(self) -> Session {
        let config = self.config.unwrap_or_else(MeterConfig::from_env);
        let logger = self
            .logger
            .unwrap_or_else(|| Arc::new(TracingLogger::new()));

        Session {
            core: Arc::new(SessionCore {
                uuid: uuid::Uuid::new_v4().to_string(),
                config,
                logger,
                platform: self.platform,
                positions: PositionRegistry::new(),
            }),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;
    use std::thread;
    use std::time::Duration;

    use static_assertions::assert_impl_all;

    use super::*;
    use crate::pal::{FakePlatform, MockPlatform, Platform};
    use crate::{Marker, MeterAnalysis, RecordingLogger};

    assert_impl_all!(Session: Send, Sync, Clone, Debug);
    assert_impl_all!(SessionBuilder: Send, Debug);

    #[derive(Debug)]
    struct InfoOnly(RecordingLogger);

    impl MeterLogger for InfoOnly {
        fn is_enabled(&self, level: tracing::Level, _category: &str) -> bool {
            level <= tracing::Level::INFO
        }

        fn log(&self, record: &crate::LogRecord<'_>) {
            self.0.log(record);
        }
    }

    #[test]
    fn positions_are_per_operation() {
        let session = Session::builder().logger(RecordingLogger::new()).build();

        let a1 = session.operation_meter("cat", "a");
        let a2 = session.operation_meter("cat", "a");
        let b1 = session.operation_meter("cat", "b");
        let plain = session.meter("cat");

        assert_eq!(a1.data().position, 1);
        assert_eq!(a2.data().position, 2);
        assert_eq!(b1.data().position, 1);
        assert_eq!(plain.data().position, 1);
    }

    #[test]
    fn clones_share_positions() {
        let session = Session::builder().logger(RecordingLogger::new()).build();
        let clone = session.clone();

        let position = thread::spawn(move || clone.meter("cat").data().position)
            .join()
            .unwrap();

        assert_eq!(position, 1);
        assert_eq!(session.meter("cat").data().position, 2);
        assert_eq!(session.uuid(), session.clone().uuid());
    }

    #[test]
    fn sessions_are_independent() {
        let first = Session::builder().logger(RecordingLogger::new()).build();
        let second = Session::builder().logger(RecordingLogger::new()).build();

        assert_ne!(first.uuid(), second.uuid());
        assert_eq!(first.meter("cat").data().position, 1);
        assert_eq!(second.meter("cat").data().position, 1);
    }

    #[test]
    fn meters_carry_session_identity() {
        let platform = FakePlatform::new();
        platform.set_now_millis(42);

        let session = Session::builder()
            .logger(RecordingLogger::new())
            .platform(PlatformFacade::fake(platform))
            .build();

        let meter = session.meter_for::<FakePlatform>();

        assert_eq!(meter.data().session_uuid.as_deref(), Some(session.uuid()));
        assert_eq!(meter.data().create_time, 42_000_000);
        assert!(meter.data().category.ends_with("FakePlatform"));
    }

    #[test]
    fn explicit_config_is_used() {
        let config = MeterConfig::default().with_progress_period(Duration::from_secs(9));
        let session = Session::builder()
            .config(config.clone())
            .logger(RecordingLogger::new())
            .build();

        assert_eq!(session.config(), &config);
    }

    #[test]
    fn status_is_not_sampled_when_nothing_needs_it() {
        let mut mock = MockPlatform::new();
        mock.expect_now_nanos().returning(|| 10);
        mock.expect_system_status().times(0);

        // Neither the message (no status printing) nor the data event (TRACE disabled) need it.
        let logger = RecordingLogger::new();

        let session = Session::builder()
            .config(MeterConfig::default())
            .logger(InfoOnly(logger.clone()))
            .platform(PlatformFacade::from_mock(mock))
            .build();

        let mut meter = session.meter("cat");
        meter.start().ok();

        assert_eq!(logger.count(Marker::MsgOk), 1);
        assert_eq!(logger.count(Marker::DataOk), 0);
        assert_eq!(session.platform().now_nanos(), 10);
    }
}
