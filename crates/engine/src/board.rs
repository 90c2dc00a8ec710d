#![forbid(unsafe_code)]

use serde::Serialize;
use td_core::model::Task;

/// Wire shape of one task row for whatever presentation layer sits on top.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskView {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub completed: bool,
    pub completed_at_ms: Option<i64>,
    pub active: bool,
    pub activated_at_ms: Option<i64>,
    pub sort_key: f64,
    pub created_at_ms: i64,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.as_str().to_string(),
            owner_id: task.owner_id.as_str().to_string(),
            title: task.title.clone(),
            completed: task.completed,
            completed_at_ms: task.completed_at_ms,
            active: task.active,
            activated_at_ms: task.activated_at_ms,
            sort_key: task.sort_key,
            created_at_ms: task.created_at_ms,
        }
    }
}

/// One owner's board: open tasks of the active partition, the whole master
/// backlog, the recomputed weekly completion count and the top-off signal.
/// `completed_this_week` is derived on every read, never stored.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskBoard {
    pub active_open: Vec<TaskView>,
    pub master: Vec<TaskView>,
    pub completed_this_week: usize,
    pub needs_top_off: bool,
}
