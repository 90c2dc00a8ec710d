#![forbid(unsafe_code)]

pub const DEFAULT_ACTIVE_LIMIT: usize = 3;

/// The capacity rule for the active partition. The ceiling applies to open
/// (incomplete) active tasks only: a completed task still parked in the active
/// partition does not consume a slot, and activating an already-completed task
/// is always admitted. The count is taken inside the same store transaction as
/// the write it guards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CapacityGuard {
    limit: usize,
}

impl Default for CapacityGuard {
    fn default() -> Self {
        Self {
            limit: DEFAULT_ACTIVE_LIMIT,
        }
    }
}

impl CapacityGuard {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// True iff one more open task fits in the active partition.
    pub fn admits(&self, open_active_count: usize) -> bool {
        open_active_count < self.limit
    }

    /// The top-off signal: the owner has room for more active work. Not an
    /// invariant, purely advisory.
    pub fn needs_top_off(&self, open_active_count: usize) -> bool {
        open_active_count < self.limit
    }
}
