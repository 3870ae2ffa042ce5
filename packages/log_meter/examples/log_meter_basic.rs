//! Basic example of instrumenting operations with `log_meter`.
//!
//! This example shows how the main types work together:
//! - `Session`: Creates meters and routes their events to `tracing`
//! - `Meter`: Tracks one operation from start to outcome
//! - `MeterData`: The snapshot carried by every data event
//!
//! Data events are emitted at TRACE level, so the subscriber below enables everything.
//!
//! Run with: `cargo run --example log_meter_basic`.

use std::num::ParseIntError;
use std::thread;
use std::time::Duration;

use log_meter::{MeterAnalysis, MeterConfig, Session};
use tracing::Level;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_target(false)
        .init();

    let session = Session::builder()
        .config(MeterConfig::default().with_progress_period(Duration::from_millis(20)))
        .build();

    // Explicit lifecycle with iterations and progress.
    {
        let mut import = session.operation_meter("example", "import");
        import
            .description("import a batch of records")
            .expected_iterations(5)
            .start();

        for record in 0..5 {
            thread::sleep(Duration::from_millis(10));
            import.ctx("last_record", record).inc().progress();
        }

        import.ok();
    }

    // A step of a larger operation, resolved through an executor.
    {
        let mut request = session.operation_meter("example", "request");
        request.ctx("user", "alice").start();

        let mut parse = request.sub("parse");
        let port: Result<u16, ParseIntError> = parse.call(|_| "8080".parse());
        println!("parsed port: {port:?}");

        request.ok_path("cached");
    }

    // Failures and slow operations stand out at higher levels.
    {
        let mut slow = session.meter("example");
        slow.limit_millis(1).start();
        thread::sleep(Duration::from_millis(5));
        slow.ok();
        println!("slow: {}", slow.is_slow());

        let mut failing = session.meter("example");
        let result = failing.call(|_| "eighty".parse::<u16>());
        println!("failed with path {:?}: {result:?}", failing.path());
    }

    // A meter dropped without an outcome is recorded as failed.
    {
        let mut forgotten = session.meter("example");
        forgotten.start();
    }
}
