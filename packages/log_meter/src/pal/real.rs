use std::sync::{LazyLock, Mutex};
use std::time::Instant;

use cpu_time::{ProcessTime, ThreadTime};
use sysinfo::{Pid, System};

use crate::pal::Platform;
use crate::units::duration_nanos;
use crate::{ERR_POISONED_LOCK, SystemStatus};

pub(crate) static REAL_PLATFORM: LazyLock<RealPlatform> = LazyLock::new(RealPlatform::new);

/// Reads the monotonic clock of the operating system and samples metrics via `sysinfo`
/// and `cpu-time`.
#[derive(Debug)]
pub(crate) struct RealPlatform {
    origin: Instant,
    pid: Option<Pid>,

    // sysinfo refreshes in place, so the sampler needs exclusive access.
    system: Mutex<System>,
}

impl RealPlatform {
    fn new() -> Self {
        Self {
            origin: Instant::now(),
            pid: sysinfo::get_current_pid().ok(),
            system: Mutex::new(System::new()),
        }
    }
}

impl Platform for RealPlatform {
    fn now_nanos(&self) -> u64 {
        duration_nanos(self.origin.elapsed()).max(1)
    }

    #[cfg_attr(test, mutants::skip)] // Real system metrics cannot be asserted on exactly.
    fn system_status(&self) -> SystemStatus {
        let mut status = SystemStatus::default();

        {
            let mut system = self.system.lock().expect(ERR_POISONED_LOCK);

            system.refresh_memory();
            status.system_memory = [
                system.used_memory(),
                system.available_memory(),
                system.total_memory(),
            ];

            if let Some(pid) = self.pid {
                system.refresh_process(pid);

                if let Some(process) = system.process(pid) {
                    status.process_memory = [process.memory(), process.virtual_memory()];
                }
            }
        }

        status.cpu_time = [
            ProcessTime::try_now().map_or(0, |t| duration_nanos(t.as_duration())),
            ThreadTime::try_now().map_or(0, |t| duration_nanos(t.as_duration())),
        ];
        status.system_load = System::load_average().one;

        status
    }
}
