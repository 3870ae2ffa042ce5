use foldhash::fast::RandomState;

/// Hands out position numbers, counting independently for every (category, operation) pair.
///
/// Meters for the same operation may be created on different threads, so each counter is
/// incremented while its map entry is locked.
#[derive(Debug, Default)]
pub(crate) struct PositionRegistry {
    counters: scc::HashMap<String, u64, RandomState>,
}

impl PositionRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The next position for the pair, starting at 1.
    pub(crate) fn next(&self, category: &str, operation: Option<&str>) -> u64 {
        let key = match operation {
            Some(operation) => format!("{category}/{operation}"),
            None => category.to_string(),
        };

        let mut entry = self.counters.entry(key).or_insert(0);
        let counter = entry.get_mut();
        *counter = counter.saturating_add(1);
        *counter
    }
}
