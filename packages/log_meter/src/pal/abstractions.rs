use std::fmt::Debug;

use crate::SystemStatus;

/// Provides the clock and the system metrics that meters record.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Nanoseconds elapsed on a monotonic clock since an arbitrary process-wide origin.
    ///
    /// Never returns zero, which meters use to mean "not recorded".
    fn now_nanos(&self) -> u64;

    /// Samples process and system metrics.
    fn system_status(&self) -> SystemStatus;
}
