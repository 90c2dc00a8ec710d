#![forbid(unsafe_code)]

use crate::board::{TaskBoard, TaskView};
use crate::error::EngineError;
use crate::requests::*;
use crate::{AnyStore, EngineConfig};
use td_core::capacity::CapacityGuard;
use td_core::ids::{OwnerId, TaskId};
use td_core::model::{self, Partition, Task};
use td_core::order::{self, Placement};
use td_core::week::WeekClock;
use td_storage::{TaskStore, TaskTx};
use uuid::Uuid;

/// The engine facade. One instance per process; all state lives behind the
/// store, so operations for different owners are independent and a request
/// that fails mid-transaction leaves nothing behind.
pub struct Tasks<S: TaskStore> {
    store: S,
    clock: WeekClock,
    guard: CapacityGuard,
}

impl Tasks<AnyStore> {
    /// Opens the backend named by the startup configuration.
    pub fn open(config: &EngineConfig) -> Result<Self, EngineError> {
        Ok(Self::new(AnyStore::open(config)?))
    }
}

impl<S: TaskStore> Tasks<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: WeekClock::default(),
            guard: CapacityGuard::default(),
        }
    }

    pub fn with_clock(store: S, clock: WeekClock, guard: CapacityGuard) -> Self {
        Self {
            store,
            clock,
            guard,
        }
    }

    fn tx<T>(
        &mut self,
        f: impl FnOnce(&mut dyn TaskTx) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        self.store.with_tx(f)
    }

    pub fn create_task(&mut self, request: CreateTaskRequest) -> Result<Task, EngineError> {
        let owner = parse_owner(&request.owner_id)?;
        let title = model::normalize_title(&request.title)?;
        let id = TaskId::try_new(Uuid::new_v4().to_string())
            .map_err(|_| EngineError::Validation("generated task id is invalid"))?;
        let partition = if request.want_active {
            Partition::Active
        } else {
            Partition::Master
        };
        let guard = self.guard;

        let task = self.tx(|tx| {
            if request.want_active {
                let open = tx.count_open_active(&owner)?;
                if !guard.admits(open) {
                    return Err(EngineError::CapacityExceeded {
                        limit: guard.limit(),
                    });
                }
            }
            let peers = tx.scan_partition(&owner, partition)?;
            let sort_key = placed_key(tx, &owner, &peers, peers.len())?;
            let task = Task {
                id,
                owner_id: owner.clone(),
                title,
                completed: false,
                completed_at_ms: None,
                active: request.want_active,
                activated_at_ms: request.want_active.then_some(request.now_ms),
                sort_key,
                created_at_ms: request.now_ms,
            };
            tx.insert(&task)?;
            Ok(task)
        })?;

        tracing::debug!(
            owner = task.owner_id.as_str(),
            task = task.id.as_str(),
            partition = task.partition().as_str(),
            "task created"
        );
        Ok(task)
    }

    pub fn set_completed(&mut self, request: SetCompletedRequest) -> Result<Task, EngineError> {
        let owner = parse_owner(&request.owner_id)?;
        let id = parse_task(&request.task_id)?;

        let task = self.tx(|tx| {
            let mut task = tx.get(&owner, &id)?.ok_or(EngineError::NotFound)?;
            task.set_completed(request.completed, request.now_ms);
            tx.update(&task)?;
            Ok(task)
        })?;

        tracing::debug!(
            owner = task.owner_id.as_str(),
            task = task.id.as_str(),
            completed = task.completed,
            "completion toggled"
        );
        Ok(task)
    }

    pub fn rename(&mut self, request: RenameRequest) -> Result<Task, EngineError> {
        let owner = parse_owner(&request.owner_id)?;
        let id = parse_task(&request.task_id)?;
        let title = model::normalize_title(&request.title)?;

        self.tx(|tx| {
            let mut task = tx.get(&owner, &id)?.ok_or(EngineError::NotFound)?;
            task.title = title;
            tx.update(&task)?;
            Ok(task)
        })
    }

    /// Moves a task across partitions without choosing a position: activation
    /// and deactivation both append at the destination tail. Setting the
    /// current state again is a no-op. Activating an incomplete task is gated
    /// by the capacity rule; deactivation is always permitted.
    pub fn set_active(&mut self, request: SetActiveRequest) -> Result<Task, EngineError> {
        let owner = parse_owner(&request.owner_id)?;
        let id = parse_task(&request.task_id)?;
        let guard = self.guard;

        let task = self.tx(|tx| {
            let mut task = tx.get(&owner, &id)?.ok_or(EngineError::NotFound)?;
            if task.active == request.active {
                return Ok(task);
            }
            if request.active && !task.completed {
                let open = tx.count_open_active(&owner)?;
                if !guard.admits(open) {
                    return Err(EngineError::CapacityExceeded {
                        limit: guard.limit(),
                    });
                }
            }
            let dest = if request.active {
                Partition::Active
            } else {
                Partition::Master
            };
            let peers = tx.scan_partition(&owner, dest)?;
            task.sort_key = placed_key(tx, &owner, &peers, peers.len())?;
            task.set_active(request.active, request.now_ms);
            tx.update(&task)?;
            Ok(task)
        })?;

        tracing::debug!(
            owner = task.owner_id.as_str(),
            task = task.id.as_str(),
            partition = task.partition().as_str(),
            "partition changed"
        );
        Ok(task)
    }

    /// Drag-and-drop. The destination sequence (moved task excluded) is read
    /// inside the transaction, the key is placed against its neighbors, and a
    /// converged partition is renumbered before placement. A cross-partition
    /// move into the active set passes the capacity rule first; a rejection
    /// aborts the whole reorder, key and partition untouched. Dropping a task
    /// onto its current position changes nothing.
    pub fn reorder(&mut self, request: ReorderRequest) -> Result<Task, EngineError> {
        let owner = parse_owner(&request.owner_id)?;
        let id = parse_task(&request.task_id)?;
        let guard = self.guard;

        let task = self.tx(|tx| {
            let mut task = tx.get(&owner, &id)?.ok_or(EngineError::NotFound)?;
            if task.partition() != request.source {
                return Err(EngineError::Validation(
                    "source partition does not match the task",
                ));
            }

            let mut peers = tx.scan_partition(&owner, request.dest)?;
            peers.retain(|peer| peer.id != task.id);
            let index = request.index.min(peers.len());

            if request.dest == task.partition() {
                let current = peers
                    .iter()
                    .filter(|peer| peer.sort_key < task.sort_key)
                    .count();
                if index == current {
                    return Ok(task);
                }
            } else if request.dest.is_active() && !task.completed {
                let open = tx.count_open_active(&owner)?;
                if !guard.admits(open) {
                    return Err(EngineError::CapacityExceeded {
                        limit: guard.limit(),
                    });
                }
            }

            task.sort_key = placed_key(tx, &owner, &peers, index)?;
            task.set_active(request.dest.is_active(), request.now_ms);
            tx.update(&task)?;
            Ok(task)
        })?;

        tracing::debug!(
            owner = task.owner_id.as_str(),
            task = task.id.as_str(),
            partition = task.partition().as_str(),
            index = request.index,
            "task reordered"
        );
        Ok(task)
    }

    pub fn list_tasks(&mut self, request: ListTasksRequest) -> Result<TaskBoard, EngineError> {
        let owner = parse_owner(&request.owner_id)?;
        let guard = self.guard;
        let (start_ms, end_ms) = self.clock.window_ms(request.now_ms);

        self.tx(|tx| {
            let active = tx.scan_partition(&owner, Partition::Active)?;
            let master = tx.scan_partition(&owner, Partition::Master)?;
            let completed_this_week = tx.count_completed_in_window(&owner, start_ms, end_ms)?;

            let active_open: Vec<TaskView> = active
                .iter()
                .filter(|task| !task.completed)
                .map(TaskView::from)
                .collect();
            let needs_top_off = guard.needs_top_off(active_open.len());

            Ok(TaskBoard {
                active_open,
                master: master.iter().map(TaskView::from).collect(),
                completed_this_week,
                needs_top_off,
            })
        })
    }

    /// The weekly analytics count on its own: active-partition tasks whose
    /// completion instant falls in the current week window around `now_ms`.
    pub fn completed_this_week(
        &mut self,
        owner_id: &str,
        now_ms: i64,
    ) -> Result<usize, EngineError> {
        let owner = parse_owner(owner_id)?;
        let (start_ms, end_ms) = self.clock.window_ms(now_ms);
        self.tx(|tx| Ok(tx.count_completed_in_window(&owner, start_ms, end_ms)?))
    }

    pub fn delete_task(&mut self, request: DeleteTaskRequest) -> Result<(), EngineError> {
        let owner = parse_owner(&request.owner_id)?;
        let id = parse_task(&request.task_id)?;

        self.tx(|tx| {
            if !tx.delete(&owner, &id)? {
                return Err(EngineError::NotFound);
            }
            Ok(())
        })?;

        tracing::debug!(owner = owner.as_str(), task = id.as_str(), "task deleted");
        Ok(())
    }

    /// Owner cascade: removes every task the owner has, both partitions.
    pub fn delete_owner(&mut self, request: DeleteOwnerRequest) -> Result<usize, EngineError> {
        let owner = parse_owner(&request.owner_id)?;
        let removed = self.tx(|tx| Ok(tx.delete_owner(&owner)?))?;
        tracing::debug!(owner = owner.as_str(), removed, "owner tasks deleted");
        Ok(removed)
    }
}

/// Places a task at `index` within the peer sequence, renumbering the
/// partition to integer keys first when midpoint precision has run out. Runs
/// inside the caller's transaction, so the rewrite and the placement commit
/// or roll back together.
fn placed_key(
    tx: &mut dyn TaskTx,
    owner: &OwnerId,
    peers: &[Task],
    index: usize,
) -> Result<f64, EngineError> {
    let keys: Vec<f64> = peers.iter().map(|task| task.sort_key).collect();
    match order::place(&keys, index) {
        Placement::Key(key) => Ok(key),
        Placement::NeedsRenumber => {
            let rewrites: Vec<(TaskId, f64)> = peers
                .iter()
                .zip(order::integer_keys(peers.len()))
                .map(|(task, key)| (task.id.clone(), key))
                .collect();
            tx.rewrite_sort_keys(owner, &rewrites)?;
            tracing::debug!(
                owner = owner.as_str(),
                len = peers.len(),
                "partition renumbered"
            );
            Ok(order::key_after_renumber(peers.len(), index))
        }
    }
}

fn parse_owner(value: &str) -> Result<OwnerId, EngineError> {
    OwnerId::try_new(value).map_err(|_| EngineError::Validation("invalid owner id"))
}

fn parse_task(value: &str) -> Result<TaskId, EngineError> {
    TaskId::try_new(value).map_err(|_| EngineError::Validation("invalid task id"))
}
