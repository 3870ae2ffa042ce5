//! Precondition checks for meter operations.
//!
//! Every check inspects the state of a meter and, when the precondition does not hold, logs an
//! ERROR event carrying the marker of the violation, the full ID of the meter and the source
//! location of the offending call. The checks return whether the precondition held; the meter
//! decides whether to proceed. Nothing here panics.

use std::panic::Location;

use tracing::Level;

use crate::{LogRecord, Marker, MeterAnalysis, MeterData, MeterLogger};

#[track_caller]
fn report(logger: &dyn MeterLogger, data: &MeterData, marker: Marker, problem: &str) {
    let message = format!("{problem}: {}", data.full_id());

    logger.log(&LogRecord::new(
        Level::ERROR,
        marker,
        &data.category,
        &message,
        Some(Location::caller()),
    ));
}

#[track_caller]
pub(crate) fn check_start(logger: &dyn MeterLogger, data: &MeterData) -> bool {
    if data.is_started() {
        report(
            logger,
            data,
            Marker::InconsistentStart,
            "meter started more than once",
        );
        return false;
    }

    true
}

/// Checks that the meter is running before it is resolved with the outcome that `marker`
/// stands for.
#[track_caller]
pub(crate) fn check_resolve(logger: &dyn MeterLogger, data: &MeterData, marker: Marker) -> bool {
    if data.is_stopped() {
        report(logger, data, marker, "meter resolved more than once");
        return false;
    }

    if !data.is_started() {
        report(logger, data, marker, "meter resolved without being started");
        return false;
    }

    true
}

#[track_caller]
pub(crate) fn check_increment(logger: &dyn MeterLogger, data: &MeterData) -> bool {
    if !data.is_started() {
        report(
            logger,
            data,
            Marker::InconsistentIncrement,
            "meter incremented without being started",
        );
        return false;
    }

    true
}

#[track_caller]
pub(crate) fn check_increment_by(logger: &dyn MeterLogger, data: &MeterData, n: u64) -> bool {
    if n == 0 {
        report(logger, data, Marker::Illegal, "increment must be positive");
        return false;
    }

    true
}

#[track_caller]
pub(crate) fn check_increment_to(logger: &dyn MeterLogger, data: &MeterData, n: u64) -> bool {
    if n <= data.current_iteration {
        let problem = format!(
            "iteration {n} does not exceed current iteration {}",
            data.current_iteration
        );
        report(logger, data, Marker::Illegal, &problem);
        return false;
    }

    true
}

#[track_caller]
pub(crate) fn check_progress(logger: &dyn MeterLogger, data: &MeterData) -> bool {
    if !data.is_started() {
        report(
            logger,
            data,
            Marker::InconsistentProgress,
            "progress reported without being started",
        );
        return false;
    }

    true
}

/// Checks that a limit-like argument named `what` is not zero.
#[track_caller]
pub(crate) fn check_positive(
    logger: &dyn MeterLogger,
    data: &MeterData,
    what: &str,
    value: u64,
) -> bool {
    if value == 0 {
        let problem = format!("{what} must be positive");
        report(logger, data, Marker::Illegal, &problem);
        return false;
    }

    true
}

#[track_caller]
pub(crate) fn check_sub_name(logger: &dyn MeterLogger, data: &MeterData, name: &str) -> bool {
    if name.is_empty() {
        report(
            logger,
            data,
            Marker::Illegal,
            "sub-meter name must not be empty",
        );
        return false;
    }

    true
}

/// Reports a defect in this crate.
#[track_caller]
pub(crate) fn report_bug(logger: &dyn MeterLogger, data: &MeterData, problem: &str) {
    report(logger, data, Marker::Bug, problem);
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::RecordingLogger;

    fn data() -> MeterData {
        let mut data = MeterData::default();
        data.category = "cat".to_string();
        data.operation = Some("op".to_string());
        data.position = 1;
        data
    }

    #[test]
    fn start_twice_is_inconsistent() {
        let logger = RecordingLogger::new();
        let mut data = data();

        assert!(check_start(&logger, &data));
        assert!(logger.events().is_empty());

        data.start_time = 10;
        let (valid, line) = (check_start(&logger, &data), line!());
        assert!(!valid);

        let events = logger.with_marker(Marker::InconsistentStart);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level(), Level::ERROR);
        assert!(events[0].message().ends_with("cat/op#1"));

        let caller = events[0].caller().unwrap();
        assert!(caller.file().ends_with("validator.rs"));
        assert_eq!(caller.line(), line);
    }

    #[test]
    fn resolve_requires_running_meter() {
        let logger = RecordingLogger::new();
        let mut data = data();

        assert!(!check_resolve(&logger, &data, Marker::InconsistentOk));
        assert_eq!(logger.count(Marker::InconsistentOk), 1);

        data.start_time = 10;
        assert!(check_resolve(&logger, &data, Marker::InconsistentOk));

        data.stop_time = 20;
        assert!(!check_resolve(&logger, &data, Marker::InconsistentFail));
        assert_eq!(logger.count(Marker::InconsistentFail), 1);
        assert_eq!(logger.count(Marker::InconsistentOk), 1);
    }

    #[test]
    fn increments() {
        let logger = RecordingLogger::new();
        let mut data = data();

        assert!(!check_increment(&logger, &data));
        assert_eq!(logger.count(Marker::InconsistentIncrement), 1);

        data.start_time = 10;
        data.current_iteration = 5;
        assert!(check_increment(&logger, &data));
        assert!(check_increment_by(&logger, &data, 1));
        assert!(!check_increment_by(&logger, &data, 0));
        assert!(check_increment_to(&logger, &data, 6));
        assert!(!check_increment_to(&logger, &data, 5));
        assert!(!check_increment_to(&logger, &data, 4));

        assert_eq!(logger.count(Marker::Illegal), 3);
    }

    #[test]
    fn progress_requires_start() {
        let logger = RecordingLogger::new();
        let mut data = data();

        assert!(!check_progress(&logger, &data));
        data.start_time = 1;
        assert!(check_progress(&logger, &data));

        assert_eq!(logger.count(Marker::InconsistentProgress), 1);
    }

    #[test]
    fn arguments() {
        let logger = RecordingLogger::new();
        let data = data();

        assert!(check_positive(&logger, &data, "time limit", 1));
        assert!(!check_positive(&logger, &data, "time limit", 0));
        assert!(check_sub_name(&logger, &data, "step"));
        assert!(!check_sub_name(&logger, &data, ""));

        let events = logger.with_marker(Marker::Illegal);
        assert_eq!(events.len(), 2);
        assert!(events[0].message().starts_with("time limit must be positive"));
    }

    #[test]
    fn bug_is_reported() {
        let logger = RecordingLogger::new();

        report_bug(&logger, &data(), "encoding failed");

        let events = logger.with_marker(Marker::Bug);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message(), "encoding failed: cat/op#1");
    }
}
