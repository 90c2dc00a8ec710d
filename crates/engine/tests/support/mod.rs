#![forbid(unsafe_code)]
#![allow(dead_code)]

use chrono::TimeZone;
use chrono_tz::America::New_York;
use td_core::model::Task;
use td_engine::{CreateTaskRequest, ListTasksRequest, TaskBoard, Tasks};
use td_storage::MemoryStore;

/// A fixed "now" for tests that do not care about the week window:
/// 2025-01-16 12:00 America/New_York (a Thursday, mid-window).
pub const NOW_MS: i64 = 1_737_046_800_000;

pub fn engine() -> Tasks<MemoryStore> {
    Tasks::new(MemoryStore::new())
}

/// Unix milliseconds of a civil America/New_York wall time.
pub fn ny_ms(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> i64 {
    New_York
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap()
        .timestamp_millis()
}

pub fn create(
    tasks: &mut Tasks<MemoryStore>,
    owner: &str,
    title: &str,
    want_active: bool,
) -> Task {
    tasks
        .create_task(CreateTaskRequest {
            owner_id: owner.to_string(),
            title: title.to_string(),
            want_active,
            now_ms: NOW_MS,
        })
        .expect("create_task")
}

pub fn board(tasks: &mut Tasks<MemoryStore>, owner: &str) -> TaskBoard {
    board_at(tasks, owner, NOW_MS)
}

pub fn board_at(tasks: &mut Tasks<MemoryStore>, owner: &str, now_ms: i64) -> TaskBoard {
    tasks
        .list_tasks(ListTasksRequest {
            owner_id: owner.to_string(),
            now_ms,
        })
        .expect("list_tasks")
}
