use wfcore::event::{ContinuedAsNewInitiator, WorkflowClosedAttrs, WorkflowStartedAttrs};
use wfcore::ids::{DomainId, RequestId, RunId, SignalName, TaskListId, WorkflowId, WorkflowTypeName};
use wfcore::{CloseStatus, ExecutionInfo, WorkflowState};

use super::MutableState;
use crate::error::MutableStateError;

fn new_execution() -> MutableState {
    let info = ExecutionInfo::new_void(DomainId::new(), WorkflowId::new("wf-1"), RunId::new());
    MutableState::new_void(info)
}

fn started_attrs(state: &MutableState) -> WorkflowStartedAttrs {
    WorkflowStartedAttrs {
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
    }
}

#[test]
fn starting_a_workflow_twice_is_rejected() {
    let mut state = new_execution();
    state.add_workflow_execution_started(1, 0, started_attrs(&state)).unwrap();
    let err = state.add_workflow_execution_started(1, 0, started_attrs(&state)).unwrap_err();
    assert!(matches!(err, MutableStateError::InvalidHistoryAction { .. }));
}

#[test]
fn closing_a_workflow_sets_state_and_close_status() {
    let mut state = new_execution();
    state.add_workflow_execution_started(1, 0, started_attrs(&state)).unwrap();
    state
        .add_workflow_closed(
            CloseStatus::Failed,
            1,
            0,
            WorkflowClosedAttrs { result_or_details: Vec::new(), reason: Some("boom".to_string()), decision_task_completed_event_id: 0 },
        )
        .unwrap();

    assert_eq!(state.execution_info.state, WorkflowState::Completed);
    assert_eq!(state.execution_info.close_status, CloseStatus::Failed);
}

#[test]
fn signaling_a_workflow_increments_signal_count() {
    let mut state = new_execution();
    state.add_workflow_execution_started(1, 0, started_attrs(&state)).unwrap();
    assert_eq!(state.execution_info.signal_count, 0);
    state.add_workflow_signaled(1, 0, SignalName::new("go"), Vec::new(), None).unwrap();
    assert_eq!(state.execution_info.signal_count, 1);
}

#[test]
fn cancel_requested_marks_the_execution_and_keeps_the_request_id() {
    let mut state = new_execution();
    state.add_workflow_execution_started(1, 0, started_attrs(&state)).unwrap();
    state.add_workflow_cancel_requested(1, 0, Some("user asked".to_string()), RequestId::new("req-1")).unwrap();
    assert!(state.execution_info.cancel_requested);
    assert_eq!(state.execution_info.cancel_request_id, Some(RequestId::new("req-1")));
}

#[test]
fn search_attributes_upserted_merges_into_execution_info() {
    let mut state = new_execution();
    state.add_workflow_execution_started(1, 0, started_attrs(&state)).unwrap();
    let mut attrs = std::collections::BTreeMap::new();
    attrs.insert("priority".to_string(), b"high".to_vec());
    state.add_search_attributes_upserted(1, 0, attrs, 1).unwrap();
    assert_eq!(state.execution_info.search_attributes.get("priority"), Some(&b"high".to_vec()));
}

#[test]
fn continue_as_new_closes_current_run_and_seeds_the_next() {
    let mut state = new_execution();
    state.add_workflow_execution_started(1, 0, started_attrs(&state)).unwrap();
    let new_run_id = RunId::new();

    let outcome = state
        .add_continue_as_new(
            1,
            0,
            new_run_id,
            ContinuedAsNewInitiator::Decider,
            WorkflowTypeName::new("demo"),
            TaskListId::new("tl-1"),
            Vec::new(),
            3600,
            10,
            0,
            1,
        )
        .unwrap();

    assert_eq!(state.execution_info.state, WorkflowState::Completed);
    assert_eq!(state.execution_info.close_status, CloseStatus::ContinuedAsNew);
    assert_eq!(outcome.new_state.execution_info.run_id, new_run_id);
    assert_eq!(outcome.new_state.execution_info.state, WorkflowState::Created);
}
