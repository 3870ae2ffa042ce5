use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::pal::Platform;
use crate::units::duration_nanos;
use crate::{ERR_POISONED_LOCK, SystemStatus};

#[derive(Debug)]
struct FakePlatformState {
    now: u64,
    status: SystemStatus,
}

/// Platform with a manually controlled clock and fixed system status.
///
/// Clones share the same state, so a test can keep one clone to move time forward while a
/// session uses another.
#[derive(Clone, Debug)]
pub(crate) struct FakePlatform {
    state: Arc<Mutex<FakePlatformState>>,
}

impl FakePlatform {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakePlatformState {
                now: 1,
                status: SystemStatus::default(),
            })),
        }
    }

    pub(crate) fn set_now(&self, nanos: u64) {
        self.state.lock().expect(ERR_POISONED_LOCK).now = nanos;
    }

    pub(crate) fn set_now_millis(&self, millis: u64) {
        self.set_now(millis.saturating_mul(1_000_000));
    }

    pub(crate) fn advance(&self, duration: Duration) {
        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);
        state.now = state.now.saturating_add(duration_nanos(duration));
    }

    pub(crate) fn set_status(&self, status: SystemStatus) {
        self.state.lock().expect(ERR_POISONED_LOCK).status = status;
    }
}

impl Platform for FakePlatform {
    fn now_nanos(&self) -> u64 {
        self.state.lock().expect(ERR_POISONED_LOCK).now.max(1)
    }

    fn system_status(&self) -> SystemStatus {
        self.state.lock().expect(ERR_POISONED_LOCK).status
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn shared_state_between_clones() {
        let platform1 = FakePlatform::new();
        let platform2 = platform1.clone();

        platform1.set_now(500);
        assert_eq!(platform2.now_nanos(), 500);

        platform2.advance(Duration::from_nanos(700));
        assert_eq!(platform1.now_nanos(), 1200);
    }

    #[test]
    fn zero_time_is_never_reported() {
        let platform = FakePlatform::new();
        platform.set_now(0);

        assert_eq!(platform.now_nanos(), 1);
    }

    #[test]
    fn returns_configured_status() {
        let platform = FakePlatform::new();
        let mut status = SystemStatus::default();
        status.system_load = 1.5;
        platform.set_status(status);

        assert_eq!(platform.system_status(), status);
    }
}
