/// A sample of process and system metrics taken when a meter event is emitted.
///
/// All values are zero when the metric could not be sampled on the current platform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct SystemStatus {
    /// System memory in bytes: `[used, available, total]`.
    pub system_memory: [u64; 3],

    /// Memory of the current process in bytes: `[resident, virtual]`.
    pub process_memory: [u64; 2],

    /// Processor time consumed in nanoseconds: `[process, current thread]`.
    pub cpu_time: [u64; 2],

    /// One-minute system load average.
    pub system_load: f64,
}

impl SystemStatus {
    /// Whether no metric carries a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.system_memory == [0; 3]
            && self.process_memory == [0; 2]
            && self.cpu_time == [0; 2]
            && self.system_load == 0.0
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        assert!(SystemStatus::default().is_empty());
    }

    #[test]
    fn any_value_makes_it_non_empty() {
        let mut status = SystemStatus::default();
        status.process_memory[0] = 1024;
        assert!(!status.is_empty());

        let mut status = SystemStatus::default();
        status.system_load = 0.25;
        assert!(!status.is_empty());
    }
}
