#![forbid(unsafe_code)]

use crate::ids::{OwnerId, TaskId};

pub const MAX_TITLE_CHARS: usize = 200;

/// Which of the two per-owner sequences a task lives in. Active is the bounded
/// working set; Master is the unbounded backlog. Each partition orders its
/// tasks by `sort_key` independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Partition {
    Active,
    Master,
}

impl Partition {
    pub fn as_str(self) -> &'static str {
        match self {
            Partition::Active => "active",
            Partition::Master => "master",
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, Partition::Active)
    }
}

/// One todo row. Timestamps are unix milliseconds; `completed_at_ms` and
/// `activated_at_ms` are non-null exactly while the matching flag is set.
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub owner_id: OwnerId,
    pub title: String,
    pub completed: bool,
    pub completed_at_ms: Option<i64>,
    pub active: bool,
    pub activated_at_ms: Option<i64>,
    pub sort_key: f64,
    pub created_at_ms: i64,
}

impl Task {
    pub fn partition(&self) -> Partition {
        if self.active {
            Partition::Active
        } else {
            Partition::Master
        }
    }

    pub fn is_open_active(&self) -> bool {
        self.active && !self.completed
    }

    /// Flips the completion bit, stamping or clearing `completed_at_ms` only on
    /// an actual transition. Setting the current value again is a no-op and
    /// keeps the original timestamp.
    pub fn set_completed(&mut self, completed: bool, now_ms: i64) {
        if self.completed == completed {
            return;
        }
        self.completed = completed;
        self.completed_at_ms = completed.then_some(now_ms);
    }

    /// Flips the partition bit, stamping or clearing `activated_at_ms` only on
    /// an actual transition.
    pub fn set_active(&mut self, active: bool, now_ms: i64) {
        if self.active == active {
            return;
        }
        self.active = active;
        self.activated_at_ms = active.then_some(now_ms);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TitleError {
    Empty,
    TooLong { chars: usize },
}

/// Trims the raw title and enforces the non-empty / length rules. The trimmed
/// form is what gets stored.
pub fn normalize_title(raw: &str) -> Result<String, TitleError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TitleError::Empty);
    }
    let chars = trimmed.chars().count();
    if chars > MAX_TITLE_CHARS {
        return Err(TitleError::TooLong { chars });
    }
    Ok(trimmed.to_string())
}
