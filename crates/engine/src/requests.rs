#![forbid(unsafe_code)]

use td_core::model::Partition;

#[derive(Clone, Debug, PartialEq)]
pub struct CreateTaskRequest {
    pub owner_id: String,
    pub title: String,
    pub want_active: bool,
    pub now_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetCompletedRequest {
    pub owner_id: String,
    pub task_id: String,
    pub completed: bool,
    pub now_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenameRequest {
    pub owner_id: String,
    pub task_id: String,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetActiveRequest {
    pub owner_id: String,
    pub task_id: String,
    pub active: bool,
    pub now_ms: i64,
}

/// Drag-and-drop: move a task to `index` within `dest`, possibly crossing
/// partitions. `index` counts positions in the destination sequence with the
/// moved task excluded; past-the-end indexes mean the tail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReorderRequest {
    pub owner_id: String,
    pub task_id: String,
    pub source: Partition,
    pub dest: Partition,
    pub index: usize,
    pub now_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListTasksRequest {
    pub owner_id: String,
    pub now_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteTaskRequest {
    pub owner_id: String,
    pub task_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteOwnerRequest {
    pub owner_id: String,
}
