use super::*;
use wfcore::ids::{DomainId, WorkflowId};
use wfcore::ExecutionInfo;

fn fresh_info() -> ExecutionInfo {
    let mut info = ExecutionInfo::new_void(DomainId::new(), WorkflowId::new("wf-1"), RunId::new());
    info.next_event_id = 1;
    info.task_list = TaskListId::new("default");
    info
}

#[test]
fn first_decision_scheduled_without_backoff() {
    let mut builder = HistoryBuilder::new();
    let mut info = fresh_info();
    let event = add_first_decision_task_scheduled(&mut builder, &mut info, 1, 0, TaskListId::new("default"), 10, 0)
        .unwrap()
        .expect("scheduled immediately");
    assert_eq!(event.event_id, 1);
    assert_eq!(info.decision.schedule_id, 1);
    assert!(!info.has_in_flight_decision());
}

#[test]
fn first_decision_with_backoff_is_deferred() {
    let mut builder = HistoryBuilder::new();
    let mut info = fresh_info();
    let event =
        add_first_decision_task_scheduled(&mut builder, &mut info, 1, 0, TaskListId::new("default"), 10, 30).unwrap();
    assert!(event.is_none());
    assert!(!info.has_pending_decision());
}

#[test]
fn scheduling_twice_without_completion_fails() {
    let mut builder = HistoryBuilder::new();
    let mut info = fresh_info();
    add_decision_task_scheduled_event(&mut builder, &mut info, 1, 0, TaskListId::new("default"), 10, 0, false, None)
        .unwrap();
    let err = add_decision_task_scheduled_event(
        &mut builder,
        &mut info,
        1,
        0,
        TaskListId::new("default"),
        10,
        0,
        false,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, MutableStateError::InvalidHistoryAction { .. }));
}

#[test]
fn start_then_complete_clears_decision() {
    let mut builder = HistoryBuilder::new();
    let mut info = fresh_info();
    let scheduled = add_decision_task_scheduled_event(
        &mut builder,
        &mut info,
        1,
        0,
        TaskListId::new("default"),
        10,
        0,
        false,
        None,
    )
    .unwrap();
    let started = add_decision_task_started_event(
        &mut builder,
        &mut info,
        1,
        0,
        scheduled.event_id,
        RequestId::new("req-1"),
        None,
    )
    .unwrap();
    assert!(info.has_in_flight_decision());

    add_decision_task_completed_event(
        &mut builder,
        &mut info,
        1,
        0,
        scheduled.event_id,
        started.event_id,
        None,
        None,
    )
    .unwrap();
    assert!(!info.has_pending_decision());
    assert!(!info.has_in_flight_decision());
}

#[test]
fn completed_event_mismatch_is_rejected() {
    let mut builder = HistoryBuilder::new();
    let mut info = fresh_info();
    add_decision_task_scheduled_event(&mut builder, &mut info, 1, 0, TaskListId::new("default"), 10, 0, false, None)
        .unwrap();
    let err = add_decision_task_completed_event(&mut builder, &mut info, 1, 0, 999, 1000, None, None).unwrap_err();
    assert!(matches!(err, MutableStateError::InvalidHistoryAction { .. }));
}

#[test]
fn fail_decision_reports_incremented_attempt() {
    let mut info = fresh_info();
    info.decision.attempt = 2;
    let result = fail_decision(&mut info, true);
    assert_eq!(result.next_attempt, 3);
    assert!(!info.has_pending_decision());
}

#[test]
fn transient_events_are_not_appended_to_history() {
    let info = fresh_info();
    let (scheduled, started) = create_transient_decision_events(&info, 0, RequestId::new("req-1"), None);
    assert_eq!(scheduled.event_id, sentinel::TRANSIENT_EVENT_ID);
    assert_eq!(started.event_id, sentinel::TRANSIENT_EVENT_ID);
}
