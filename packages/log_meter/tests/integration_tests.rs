//! Integration tests for `log_meter` against the real platform.
//!
//! These tests drive meters through the public API only and inspect the events they emit,
//! including parsing the data events back into snapshots.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Duration;

use log_meter::{
    Marker, MeterAnalysis, MeterConfig, MeterData, PANIC_PATH, RecordingLogger, SCOPE_EXIT_PATH,
    Session, current_meter_id,
};

fn session_with(config: MeterConfig) -> (Session, RecordingLogger) {
    let logger = RecordingLogger::new();
    let session = Session::builder().config(config).logger(logger.clone()).build();

    (session, logger)
}

fn session() -> (Session, RecordingLogger) {
    session_with(MeterConfig::default())
}

fn last_data(logger: &RecordingLogger, marker: Marker) -> MeterData {
    let events = logger.with_marker(marker);
    let event = events.last().expect("no data event with the requested marker");

    MeterData::parse_line(event.message()).unwrap()
}

#[test]
fn lifecycle_emits_event_pairs() {
    let (session, logger) = session();

    let mut meter = session.operation_meter("billing", "charge");
    meter.description("charge a card").ctx("customer", 42).start();
    meter.inc().ok();

    let markers: Vec<Marker> = logger.events().iter().map(|event| event.marker()).collect();
    assert_eq!(
        markers,
        [
            Marker::MsgStart,
            Marker::DataStart,
            Marker::MsgOk,
            Marker::DataOk
        ]
    );

    let data = last_data(&logger, Marker::DataOk);
    assert_eq!(data.category, "billing");
    assert_eq!(data.operation.as_deref(), Some("charge"));
    assert_eq!(data.description.as_deref(), Some("charge a card"));
    assert_eq!(data.context.get("customer"), Some("42"));
    assert_eq!(data.current_iteration, 1);
    assert_eq!(data.session_uuid.as_deref(), Some(session.uuid()));
    assert!(data.is_ok());
    assert!(data.start_time >= data.create_time);
    assert!(data.stop_time >= data.start_time);
}

#[test]
fn decoded_snapshot_matches_meter() {
    let (session, logger) = session();

    let mut meter = session.operation_meter("reports", "render");
    meter.expected_iterations(10).start().inc_by(4).reject("empty_input");

    let data = last_data(&logger, Marker::DataReject);
    assert_eq!(&data, meter.data());
    assert_eq!(data.path(), Some("empty_input"));
    assert_eq!(data.full_id(), "reports/render#1");
}

#[test]
fn slow_meter_is_reported_as_warning() {
    let (session, logger) = session();

    let mut meter = session.meter("storage");
    meter.limit(Duration::from_millis(1)).start();
    thread::sleep(Duration::from_millis(20));
    meter.ok();

    assert!(meter.is_slow());

    let events = logger.with_marker(Marker::MsgSlowOk);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].level(), tracing::Level::WARN);
    assert!(events[0].message().starts_with("SLOW: storage; "));
    assert!(events[0].message().contains("(limit 1.0ms)"));

    assert!(last_data(&logger, Marker::DataSlowOk).is_slow());
    assert_eq!(logger.count(Marker::MsgOk), 0);
}

#[test]
fn dropped_meter_fails_with_scope_exit_path() {
    let (session, logger) = session();

    {
        let mut meter = session.meter("cache");
        meter.start();
    }

    let data = last_data(&logger, Marker::DataFail);
    assert!(data.is_fail());
    assert_eq!(data.path(), Some(SCOPE_EXIT_PATH));
    assert_eq!(logger.count(Marker::MsgFail), 1);
}

#[test]
fn sub_meters_link_to_their_parent() {
    let (session, logger) = session();

    let mut order = session.operation_meter("shop", "order");
    order.ctx("order_id", 7).start();

    {
        let mut payment = order.sub("payment");
        payment.run(|payment| {
            payment.ctx("provider", "acme");
        });
    }

    order.ok();

    // The step resolves before the order does.
    let events = logger.with_marker(Marker::DataOk);
    assert_eq!(events.len(), 2);
    let payment = MeterData::parse_line(events[0].message()).unwrap();

    assert_eq!(payment.operation.as_deref(), Some("order/payment"));
    assert_eq!(payment.parent.as_deref(), Some("shop/order#1"));
    assert_eq!(payment.context.get("order_id"), Some("7"));
    assert_eq!(payment.context.get("provider"), Some("acme"));
    assert_eq!(order.data().context.get("provider"), None);
}

#[test]
fn running_meter_is_current_parent() {
    let (session, _logger) = session();

    assert_eq!(current_meter_id(), None);

    let mut outer = session.operation_meter("jobs", "nightly");
    outer.start();
    assert_eq!(current_meter_id().as_deref(), Some("jobs/nightly#1"));

    let mut inner = session.operation_meter("db", "vacuum");
    assert_eq!(inner.data().parent.as_deref(), Some("jobs/nightly#1"));

    inner.start().ok();
    outer.ok();

    assert_eq!(current_meter_id(), None);
}

#[test]
fn executors_record_outcomes() {
    let (session, logger) = session();

    let mut parsed = session.meter("parser");
    assert_eq!(parsed.call(|_| "12".parse::<u8>()), Ok(12));
    assert!(parsed.is_ok());

    let mut failed = session.meter("parser");
    assert!(failed.call(|_| "x".parse::<u8>()).is_err());
    assert_eq!(failed.path(), Some("core::num::error::ParseIntError"));

    let mut rejected = session.meter("storage");
    let result: Result<(), io::Error> = rejected.call_or_reject(
        |_| Err(io::Error::from(io::ErrorKind::NotFound)),
        |error| error.kind() == io::ErrorKind::NotFound,
    );
    assert!(result.is_err());
    assert_eq!(rejected.path(), Some("std::io::error::Error"));

    let mut wrapped = session.meter("parser");
    let error = wrapped.safe_call(|_| "-1".parse::<u8>()).unwrap_err();
    assert!(matches!(error, log_meter::Error::Failed(_)));

    assert_eq!(logger.count(Marker::MsgOk), 1);
    assert_eq!(logger.count(Marker::MsgFail), 2);
    assert_eq!(logger.count(Marker::MsgReject), 1);
}

#[test]
fn errors_named_error_stay_distinguishable() {
    let (session, _logger) = session();

    let mut io_meter = session.meter("storage");
    assert!(io_meter.call(|_| Err::<(), _>(io::Error::other("disk"))).is_err());

    let mut fmt_meter = session.meter("render");
    assert!(fmt_meter.call(|_| Err::<(), _>(std::fmt::Error)).is_err());

    let mut json_meter = session.meter("parser");
    assert!(json_meter.call(|_| serde_json::from_str::<u32>("x")).is_err());

    let paths = [io_meter.path(), fmt_meter.path(), json_meter.path()];
    assert_eq!(
        paths,
        [
            Some("std::io::error::Error"),
            Some("core::fmt::Error"),
            Some("serde_json::error::Error"),
        ]
    );
}

#[test]
fn panicking_closure_fails_meter() {
    let (session, logger) = session();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut meter = session.meter("worker");
        meter.run(|_| panic!("out of cheese"));
    }));
    assert!(result.is_err());

    let data = last_data(&logger, Marker::DataFail);
    assert_eq!(data.path(), Some(PANIC_PATH));
    assert_eq!(data.outcome.fail_message(), Some("out of cheese"));
    assert_eq!(logger.count(Marker::InconsistentFail), 0);
}

#[test]
fn misuse_is_logged_not_raised() {
    let (session, logger) = session();

    let mut meter = session.meter("misuse");
    meter.ok();
    meter.ok();
    meter.inc_by(0);

    assert_eq!(logger.count(Marker::InconsistentOk), 2);
    assert_eq!(logger.count(Marker::Illegal), 1);

    for event in logger.events().iter().filter(|event| event.marker().is_diagnostic()) {
        assert_eq!(event.level(), tracing::Level::ERROR);
        assert!(event.caller().unwrap().file().ends_with("integration_tests.rs"));
    }
}

#[test]
fn progress_is_throttled() {
    let (session, logger) = session_with(
        MeterConfig::default().with_progress_period(Duration::from_secs(3600)),
    );

    let mut meter = session.meter("import");
    meter.start();

    for _ in 0..100 {
        meter.inc().progress();
    }

    meter.ok();

    // The first report waits for a full period after start.
    assert_eq!(logger.count(Marker::MsgProgress), 0);
    assert_eq!(last_data(&logger, Marker::DataOk).current_iteration, 100);
}

#[test]
fn unthrottled_progress_reports_every_change() {
    let (session, logger) = session_with(MeterConfig::default().with_progress_period(Duration::ZERO));

    let mut meter = session.meter("import");
    meter.expected_iterations(3).start();

    for _ in 0..3 {
        meter.inc().progress();
    }

    meter.ok();

    assert_eq!(logger.count(Marker::MsgProgress), 3);
    assert_eq!(last_data(&logger, Marker::DataProgress).current_iteration, 3);
}

#[test]
fn affixes_wrap_events() {
    let config = MeterConfig::default()
        .with_message_affixes("<<", ">>")
        .with_data_affixes("M", ";");
    let (session, logger) = session_with(config);

    session.meter("cat").start().ok();

    let message = &logger.with_marker(Marker::MsgOk)[0];
    assert!(message.message().starts_with("<<OK: cat"));
    assert!(message.message().ends_with(">>"));

    let data = &logger.with_marker(Marker::DataOk)[0];
    assert!(data.message().starts_with("M{"));
    assert!(data.message().ends_with("};"));
    assert!(MeterData::parse_line(data.message()).unwrap().is_ok());
}

#[test]
fn disabled_status_messages_keep_data_events() {
    let (session, logger) = session_with(MeterConfig::default().with_print_status(false));

    session.meter("quiet").start().ok();

    assert_eq!(logger.count(Marker::MsgStart), 0);
    assert_eq!(logger.count(Marker::MsgOk), 0);
    assert_eq!(logger.count(Marker::DataStart), 1);
    assert_eq!(logger.count(Marker::DataOk), 1);
}

#[test]
fn data_events_carry_system_status() {
    let (session, logger) = session();

    session.meter("status").start().ok();

    let data = last_data(&logger, Marker::DataOk);
    assert!(!data.status.is_empty());
}
