//! Executor methods that wrap a closure in the lifecycle of a meter.

use std::any::Any;
use std::convert::Infallible;
use std::error::Error as StdError;
use std::panic::{self, AssertUnwindSafe};

use crate::meter::error_type_name;
use crate::{Error, Meter, MeterAnalysis, PANIC_PATH};

impl Meter {
    /// Runs `f` as the operation of this meter.
    ///
    /// The meter is started if it has not been started yet and resolved as successful when `f`
    /// returns, unless `f` resolved it itself. If `f` panics, the meter is failed with the path
    /// [`PANIC_PATH`] and the panic continues.
    #[track_caller]
    pub fn run(&mut self, f: impl FnOnce(&mut Self)) {
        let Ok(()) = self.execute(
            |meter| {
                f(meter);
                Ok::<(), Infallible>(())
            },
            |_| false,
        );
    }

    /// Runs `f` as the operation of this meter and returns its result.
    ///
    /// The meter is started if it has not been started yet. Unless `f` resolved the meter
    /// itself, an `Ok` result resolves it as successful and an `Err` result fails it with the
    /// module-qualified type name and display text of the error. The error is returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns the error returned by `f`.
    ///
    /// # Examples
    ///
    /// ```
    /// use log_meter::{MeterAnalysis, Session};
    ///
    /// let session = Session::new();
    ///
    /// let mut meter = session.operation_meter("config", "parse_port");
    /// let port = meter.call(|meter| {
    ///     meter.ctx("raw", "80a");
    ///     "80a".parse::<u16>()
    /// });
    ///
    /// assert!(port.is_err());
    /// assert!(meter.is_fail());
    /// assert_eq!(meter.path(), Some("core::num::error::ParseIntError"));
    /// ```
    #[track_caller]
    pub fn call<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E>
    where
        E: StdError,
    {
        self.execute(f, |_| false)
    }

    /// Like [`call()`][Self::call], with the error of `f` wrapped into [`Error::Failed`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Failed`] with the error returned by `f` as its source.
    #[track_caller]
    pub fn safe_call<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> crate::Result<T>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.call(f).map_err(|error| Error::Failed(Box::new(error)))
    }

    /// Like [`call()`][Self::call], except that errors for which `is_rejection` returns `true`
    /// reject the meter with the module-qualified type name of the error as the path instead of
    /// failing it.
    ///
    /// # Errors
    ///
    /// Returns the error returned by `f`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io;
    ///
    /// use log_meter::{MeterAnalysis, Session};
    ///
    /// let session = Session::new();
    ///
    /// let mut meter = session.operation_meter("storage", "open");
    /// let result: Result<(), io::Error> = meter.call_or_reject(
    ///     |_| Err(io::Error::from(io::ErrorKind::NotFound)),
    ///     |error| error.kind() == io::ErrorKind::NotFound,
    /// );
    ///
    /// assert!(result.is_err());
    /// assert!(meter.is_reject());
    /// assert_eq!(meter.path(), Some("std::io::error::Error"));
    /// ```
    #[track_caller]
    pub fn call_or_reject<T, E>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, E>,
        is_rejection: impl FnOnce(&E) -> bool,
    ) -> Result<T, E>
    where
        E: StdError,
    {
        self.execute(f, is_rejection)
    }

    #[track_caller]
    fn execute<T, E>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, E>,
        is_rejection: impl FnOnce(&E) -> bool,
    ) -> Result<T, E>
    where
        E: StdError,
    {
        if !self.is_started() {
            self.start();
        }

        match panic::catch_unwind(AssertUnwindSafe(|| f(self))) {
            Ok(Ok(value)) => {
                if !self.data().outcome.is_resolved() {
                    self.ok();
                }

                Ok(value)
            }
            Ok(Err(error)) => {
                if !self.data().outcome.is_resolved() {
                    if is_rejection(&error) {
                        self.reject(error_type_name::<E>());
                    } else {
                        self.fail(&error);
                    }
                }

                Err(error)
            }
            Err(payload) => {
                if !self.data().outcome.is_resolved() {
                    self.fail_path(PANIC_PATH, panic_message(&*payload));
                }

                panic::resume_unwind(payload)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic payload is not a string".to_string()
    }
}
