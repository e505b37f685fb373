use wfcore::event::EventType;
use wfcore::ids::{DomainId, RequestId, RunId, SignalName, TaskListId, WorkflowId, WorkflowTypeName};
use wfcore::{ExecutionInfo, WorkflowState};

use super::MutableState;

fn new_execution() -> MutableState {
    let info = ExecutionInfo::new_void(DomainId::new(), WorkflowId::new("wf-1"), RunId::new());
    MutableState::new_void(info)
}

/// A signal that arrives while a decision is in flight gets buffered behind
/// the sentinel ID until the decision completes and the flush algorithm
/// assigns it a real slot.
#[test]
fn signal_while_decision_in_flight_is_buffered_then_flushed_in_order() {
    let mut state = new_execution();

    let start_event = state
        .add_workflow_execution_started(
            1,
            0,
            wfcore::event::WorkflowStartedAttrs {
                workflow_type: WorkflowTypeName::new("demo"),
                task_list: TaskListId::new("tl-1"),
                input: Vec::new(),
                execution_start_to_close_timeout_secs: 3600,
                task_start_to_close_timeout_secs: 10,
                first_decision_task_backoff_secs: 0,
                parent_workflow_id: None,
                parent_run_id: None,
                continued_execution_run_id: None,
                first_run_id: state.execution_info.run_id,
                attempt: 0,
                cron_schedule: None,
            },
        )
        .unwrap();
    assert_eq!(start_event.event_id, 1);
    assert_eq!(state.execution_info.state, WorkflowState::Created);

    let scheduled = state.add_first_decision_task_scheduled(1, 0, &start_event).unwrap().unwrap();
    assert_eq!(scheduled.event_id, 2);

    let started = state
        .add_decision_task_started_event(1, 0, scheduled.event_id, RequestId::new("req-1"), None)
        .unwrap();
    assert_eq!(started.event_id, 3);
    assert!(state.execution_info.has_in_flight_decision());

    let signaled = state
        .add_workflow_signaled(1, 0, SignalName::new("approve"), b"payload".to_vec(), None)
        .unwrap();
    assert_eq!(signaled.event_id, wfcore::sentinel::BUFFERED_EVENT_ID);

    let completed = state
        .add_decision_task_completed_event(1, 0, scheduled.event_id, started.event_id, None, None, 20, false)
        .unwrap();
    assert_eq!(completed.event_id, 4);
    assert!(!state.execution_info.has_pending_decision());

    let mut next_task_id = 100i64;
    state.flush_buffered_events(|| {
        let id = next_task_id;
        next_task_id += 1;
        id
    });

    let history = state.history_builder().history();
    assert_eq!(history.len(), 5);
    assert_eq!(history[0].event_id, 1);
    assert!(matches!(history[0].event_type, EventType::WorkflowExecutionStarted(_)));
    assert_eq!(history[1].event_id, 2);
    assert!(matches!(history[1].event_type, EventType::DecisionTaskScheduled(_)));
    assert_eq!(history[2].event_id, 3);
    assert!(matches!(history[2].event_type, EventType::DecisionTaskStarted(_)));
    assert_eq!(history[3].event_id, 4);
    assert!(matches!(history[3].event_type, EventType::DecisionTaskCompleted(_)));
    assert_eq!(history[4].event_id, 5);
    assert!(matches!(history[4].event_type, EventType::WorkflowExecutionSignaled(_)));

    assert_eq!(state.execution_info.next_event_id, 6);
}

/// Attempting any `Add<X>` after the workflow has closed returns
/// `WorkflowFinished` rather than silently mutating a terminal execution.
#[test]
fn add_after_close_is_rejected() {
    let mut state = new_execution();
    state
        .add_workflow_execution_started(
            1,
            0,
            wfcore::event::WorkflowStartedAttrs {
                workflow_type: WorkflowTypeName::new("demo"),
                task_list: TaskListId::new("tl-1"),
                input: Vec::new(),
                execution_start_to_close_timeout_secs: 3600,
                task_start_to_close_timeout_secs: 10,
                first_decision_task_backoff_secs: 0,
                parent_workflow_id: None,
                parent_run_id: None,
                continued_execution_run_id: None,
                first_run_id: state.execution_info.run_id,
                attempt: 0,
                cron_schedule: None,
            },
        )
        .unwrap();
    state
        .add_workflow_closed(
            wfcore::CloseStatus::Completed,
            1,
            0,
            wfcore::event::WorkflowClosedAttrs {
                result_or_details: Vec::new(),
                reason: None,
                decision_task_completed_event_id: 0,
            },
        )
        .unwrap();

    let err = state.add_workflow_signaled(1, 0, SignalName::new("late"), Vec::new(), None).unwrap_err();
    assert!(matches!(err, crate::error::MutableStateError::WorkflowFinished { .. }));
}

/// Completing a decision with a binary checksum records an auto-reset
/// point, rotates the list at `maxResetPoints`, and mirrors it into search
/// attributes (spec.md §4.1 "Auto-reset points", §8 scenario 6).
#[test]
fn decision_completed_with_binary_checksum_records_reset_point() {
    let mut state = new_execution();
    let start_event = state
        .add_workflow_execution_started(
            1,
            0,
            wfcore::event::WorkflowStartedAttrs {
                workflow_type: WorkflowTypeName::new("demo"),
                task_list: TaskListId::new("tl-1"),
                input: Vec::new(),
                execution_start_to_close_timeout_secs: 3600,
                task_start_to_close_timeout_secs: 10,
                first_decision_task_backoff_secs: 0,
                parent_workflow_id: None,
                parent_run_id: None,
                continued_execution_run_id: None,
                first_run_id: state.execution_info.run_id,
                attempt: 0,
                cron_schedule: None,
            },
        )
        .unwrap();
    let scheduled = state.add_first_decision_task_scheduled(1, 0, &start_event).unwrap().unwrap();
    let started = state
        .add_decision_task_started_event(1, 0, scheduled.event_id, RequestId::new("req-1"), None)
        .unwrap();

    state.execution_info.auto_reset_points = vec![
        reset_point("b1"),
        reset_point("b2"),
        reset_point("b3"),
    ];

    state
        .add_decision_task_completed_event(
            1,
            0,
            scheduled.event_id,
            started.event_id,
            None,
            Some("b4".to_string()),
            3,
            true,
        )
        .unwrap();

    let checksums: Vec<_> =
        state.execution_info.auto_reset_points.iter().map(|p| p.binary_checksum.clone()).collect();
    assert_eq!(checksums, vec!["b2", "b3", "b4"]);

    let encoded = state
        .execution_info
        .search_attributes
        .get(crate::reset_points::BINARY_CHECKSUMS_SEARCH_ATTRIBUTE_KEY)
        .unwrap();
    let decoded: Vec<String> = serde_json::from_slice(encoded).unwrap();
    assert_eq!(decoded, vec!["b2", "b3", "b4"]);

    assert!(state
        .deltas
        .transfer_tasks
        .iter()
        .any(|t| matches!(t, wfcore::TransferTask::UpsertSearchAttributes)));
}

fn reset_point(checksum: &str) -> wfcore::execution_info::ResetPoint {
    wfcore::execution_info::ResetPoint {
        binary_checksum: checksum.to_string(),
        run_id: RunId::new(),
        first_decision_completed_id: 4,
        created_at_ns: 0,
        expiring_at_ns: None,
        resettable: true,
    }
}
