#![forbid(unsafe_code)]

mod support;

use support::*;
use td_core::model::Partition;
use td_engine::{
    CreateTaskRequest, DeleteTaskRequest, EngineError, ReorderRequest, SetActiveRequest,
    SetCompletedRequest,
};

const OWNER: &str = "alice";

#[test]
fn fourth_active_creation_is_rejected_wholesale() {
    let mut tasks = engine();
    for n in 0..3 {
        create(&mut tasks, OWNER, &format!("active {n}"), true);
    }

    let err = tasks
        .create_task(CreateTaskRequest {
            owner_id: OWNER.to_string(),
            title: "one too many".to_string(),
            want_active: true,
            now_ms: NOW_MS,
        })
        .unwrap_err();
    assert!(matches!(err, EngineError::CapacityExceeded { limit: 3 }));

    // nothing was written: no eviction, no clamped-to-master task
    let b = board(&mut tasks, OWNER);
    assert_eq!(b.active_open.len(), 3);
    assert!(b.master.is_empty());
}

#[test]
fn activation_at_capacity_is_rejected() {
    let mut tasks = engine();
    for n in 0..3 {
        create(&mut tasks, OWNER, &format!("active {n}"), true);
    }
    let backlog = create(&mut tasks, OWNER, "backlog", false);

    let err = tasks
        .set_active(SetActiveRequest {
            owner_id: OWNER.to_string(),
            task_id: backlog.id.as_str().to_string(),
            active: true,
            now_ms: NOW_MS,
        })
        .unwrap_err();
    assert!(matches!(err, EngineError::CapacityExceeded { .. }));

    let b = board(&mut tasks, OWNER);
    assert_eq!(b.master.len(), 1);
    assert_eq!(b.master[0].id, backlog.id.as_str());
    assert_eq!(b.master[0].sort_key, backlog.sort_key);
}

#[test]
fn rejected_reorder_into_active_changes_nothing() {
    let mut tasks = engine();
    for n in 0..3 {
        create(&mut tasks, OWNER, &format!("active {n}"), true);
    }
    let backlog = create(&mut tasks, OWNER, "backlog", false);

    let err = tasks
        .reorder(ReorderRequest {
            owner_id: OWNER.to_string(),
            task_id: backlog.id.as_str().to_string(),
            source: Partition::Master,
            dest: Partition::Active,
            index: 0,
            now_ms: NOW_MS,
        })
        .unwrap_err();
    assert!(matches!(err, EngineError::CapacityExceeded { .. }));

    // partition and sort key both untouched
    let b = board(&mut tasks, OWNER);
    assert_eq!(b.active_open.len(), 3);
    assert_eq!(b.master.len(), 1);
    assert_eq!(b.master[0].sort_key, backlog.sort_key);
    assert!(!b.master[0].active);
}

#[test]
fn completed_task_does_not_hold_a_slot() {
    // The chosen ceiling counts open (incomplete) active tasks only.
    let mut tasks = engine();
    let first = create(&mut tasks, OWNER, "active 0", true);
    create(&mut tasks, OWNER, "active 1", true);
    create(&mut tasks, OWNER, "active 2", true);

    tasks
        .set_completed(SetCompletedRequest {
            owner_id: OWNER.to_string(),
            task_id: first.id.as_str().to_string(),
            completed: true,
            now_ms: NOW_MS,
        })
        .unwrap();

    // the completed task is still in the active partition, yet a new
    // activation fits
    let replacement = create(&mut tasks, OWNER, "replacement", true);
    assert!(replacement.active);
    let b = board(&mut tasks, OWNER);
    assert_eq!(b.active_open.len(), 3);
}

#[test]
fn activating_a_completed_task_is_always_admitted() {
    let mut tasks = engine();
    for n in 0..3 {
        create(&mut tasks, OWNER, &format!("active {n}"), true);
    }
    let done = create(&mut tasks, OWNER, "already done", false);
    tasks
        .set_completed(SetCompletedRequest {
            owner_id: OWNER.to_string(),
            task_id: done.id.as_str().to_string(),
            completed: true,
            now_ms: NOW_MS,
        })
        .unwrap();

    // does not add to the open count, so no capacity check applies
    let moved = tasks
        .set_active(SetActiveRequest {
            owner_id: OWNER.to_string(),
            task_id: done.id.as_str().to_string(),
            active: true,
            now_ms: NOW_MS,
        })
        .unwrap();
    assert!(moved.active);
    assert_eq!(board(&mut tasks, OWNER).active_open.len(), 3);
}

#[test]
fn deactivation_and_deletion_free_slots() {
    let mut tasks = engine();
    let first = create(&mut tasks, OWNER, "active 0", true);
    let second = create(&mut tasks, OWNER, "active 1", true);
    create(&mut tasks, OWNER, "active 2", true);

    tasks
        .set_active(SetActiveRequest {
            owner_id: OWNER.to_string(),
            task_id: first.id.as_str().to_string(),
            active: false,
            now_ms: NOW_MS,
        })
        .unwrap();
    create(&mut tasks, OWNER, "filled by deactivation", true);

    tasks
        .delete_task(DeleteTaskRequest {
            owner_id: OWNER.to_string(),
            task_id: second.id.as_str().to_string(),
        })
        .unwrap();
    create(&mut tasks, OWNER, "filled by deletion", true);

    let b = board(&mut tasks, OWNER);
    assert_eq!(b.active_open.len(), 3);
    assert_eq!(b.master.len(), 1);
}

#[test]
fn owners_have_independent_ceilings() {
    let mut tasks = engine();
    for n in 0..3 {
        create(&mut tasks, "alice", &format!("a{n}"), true);
    }
    // bob's partition is unaffected by alice being full
    let t = create(&mut tasks, "bob", "b0", true);
    assert!(t.active);
}
