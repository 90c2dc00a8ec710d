#![forbid(unsafe_code)]

use crate::{StoreError, TaskStore, TaskTx};
use std::collections::BTreeMap;
use td_core::ids::{OwnerId, TaskId};
use td_core::model::{Partition, Task};

/// Map-backed adapter with the same transactional semantics as the SQLite
/// one: the closure runs against a staged copy, which replaces the live map
/// only on success. Used as the dev/test backend; the engine cannot tell the
/// adapters apart.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    rows: BTreeMap<(OwnerId, TaskId), Task>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl TaskStore for MemoryStore {
    fn with_tx<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn TaskTx) -> Result<T, E>,
    {
        let mut staged = self.rows.clone();
        let out = f(&mut MemoryTx { rows: &mut staged })?;
        self.rows = staged;
        Ok(out)
    }
}

struct MemoryTx<'m> {
    rows: &'m mut BTreeMap<(OwnerId, TaskId), Task>,
}

impl TaskTx for MemoryTx<'_> {
    fn get(&mut self, owner: &OwnerId, task: &TaskId) -> Result<Option<Task>, StoreError> {
        Ok(self.rows.get(&(owner.clone(), task.clone())).cloned())
    }

    fn insert(&mut self, task: &Task) -> Result<(), StoreError> {
        let key = (task.owner_id.clone(), task.id.clone());
        if self.rows.contains_key(&key) {
            return Err(StoreError::AlreadyExists);
        }
        self.rows.insert(key, task.clone());
        Ok(())
    }

    fn update(&mut self, task: &Task) -> Result<(), StoreError> {
        let key = (task.owner_id.clone(), task.id.clone());
        match self.rows.get_mut(&key) {
            Some(slot) => {
                *slot = task.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn delete(&mut self, owner: &OwnerId, task: &TaskId) -> Result<bool, StoreError> {
        Ok(self.rows.remove(&(owner.clone(), task.clone())).is_some())
    }

    fn delete_owner(&mut self, owner: &OwnerId) -> Result<usize, StoreError> {
        let before = self.rows.len();
        self.rows.retain(|(row_owner, _), _| row_owner != owner);
        Ok(before - self.rows.len())
    }

    fn scan_partition(
        &mut self,
        owner: &OwnerId,
        partition: Partition,
    ) -> Result<Vec<Task>, StoreError> {
        let mut out: Vec<Task> = self
            .rows
            .values()
            .filter(|task| &task.owner_id == owner && task.partition() == partition)
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            a.sort_key
                .total_cmp(&b.sort_key)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(out)
    }

    fn count_open_active(&mut self, owner: &OwnerId) -> Result<usize, StoreError> {
        Ok(self
            .rows
            .values()
            .filter(|task| &task.owner_id == owner && task.is_open_active())
            .count())
    }

    fn count_completed_in_window(
        &mut self,
        owner: &OwnerId,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<usize, StoreError> {
        Ok(self
            .rows
            .values()
            .filter(|task| {
                &task.owner_id == owner
                    && task.active
                    && task.completed
                    && task
                        .completed_at_ms
                        .is_some_and(|at| at >= start_ms && at < end_ms)
            })
            .count())
    }

    fn rewrite_sort_keys(
        &mut self,
        owner: &OwnerId,
        keys: &[(TaskId, f64)],
    ) -> Result<(), StoreError> {
        for (task, key) in keys {
            match self.rows.get_mut(&(owner.clone(), task.clone())) {
                Some(slot) => slot.sort_key = *key,
                None => return Err(StoreError::NotFound),
            }
        }
        Ok(())
    }
}
