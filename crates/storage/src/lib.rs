#![forbid(unsafe_code)]

mod error;
mod memory;
mod sqlite;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use td_core::ids::{OwnerId, TaskId};
use td_core::model::{Partition, Task};

/// The logical persistence contract. Each logical operation runs as one
/// closure over a [`TaskTx`]; the adapter owns begin/commit/rollback, so a
/// closure that returns an error leaves no partial write. The engine is
/// written against this trait only and never learns which adapter is active.
pub trait TaskStore {
    fn with_tx<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn TaskTx) -> Result<T, E>;
}

/// Row-level operations available inside one transaction. Scans return tasks
/// ordered by `sort_key` ascending within the owner × partition.
pub trait TaskTx {
    fn get(&mut self, owner: &OwnerId, task: &TaskId) -> Result<Option<Task>, StoreError>;

    fn insert(&mut self, task: &Task) -> Result<(), StoreError>;

    /// Rewrites every mutable column of an existing row. `NotFound` if the
    /// row does not exist under that owner.
    fn update(&mut self, task: &Task) -> Result<(), StoreError>;

    /// Returns whether a row was deleted.
    fn delete(&mut self, owner: &OwnerId, task: &TaskId) -> Result<bool, StoreError>;

    /// Owner cascade: removes every task belonging to the owner, returning
    /// the count removed.
    fn delete_owner(&mut self, owner: &OwnerId) -> Result<usize, StoreError>;

    fn scan_partition(
        &mut self,
        owner: &OwnerId,
        partition: Partition,
    ) -> Result<Vec<Task>, StoreError>;

    /// Count of the owner's active, incomplete tasks — the capacity rule's
    /// input.
    fn count_open_active(&mut self, owner: &OwnerId) -> Result<usize, StoreError>;

    /// Count of the owner's active, completed tasks whose `completed_at_ms`
    /// falls in the half-open `[start_ms, end_ms)` window.
    fn count_completed_in_window(
        &mut self,
        owner: &OwnerId,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<usize, StoreError>;

    /// Bulk sort-key rewrite used when a partition is renumbered.
    fn rewrite_sort_keys(
        &mut self,
        owner: &OwnerId,
        keys: &[(TaskId, f64)],
    ) -> Result<(), StoreError>;
}
