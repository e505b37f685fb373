use wfcore::ids::{DomainId, RequestId, RunId, SignalName, WorkflowId};
use wfcore::ExecutionInfo;

use super::MutableState;

fn new_execution() -> MutableState {
    let info = ExecutionInfo::new_void(DomainId::new(), WorkflowId::new("wf-1"), RunId::new());
    MutableState::new_void(info)
}

#[test]
fn request_cancel_initiated_inserts_pending_and_queues_a_transfer_task() {
    let mut state = new_execution();
    let event = state
        .add_request_cancel_external_workflow_execution_initiated_event(
            1,
            0,
            1,
            WorkflowId::new("target"),
            None,
            "demo-domain".to_string(),
            Vec::new(),
            RequestId::new("req-1"),
        )
        .unwrap();
    assert!(state.request_cancels.get(event.event_id).is_some());
    assert_eq!(state.deltas.transfer_tasks.len(), 1);
}

#[test]
fn request_cancel_succeeded_removes_the_pending_entry() {
    let mut state = new_execution();
    let initiated = state
        .add_request_cancel_external_workflow_execution_initiated_event(
            1,
            0,
            1,
            WorkflowId::new("target"),
            None,
            "demo-domain".to_string(),
            Vec::new(),
            RequestId::new("req-1"),
        )
        .unwrap();

    state
        .add_external_workflow_execution_cancel_requested_event(
            1,
            0,
            initiated.event_id,
            WorkflowId::new("target"),
            RunId::new(),
        )
        .unwrap();

    assert!(state.request_cancels.get(initiated.event_id).is_none());
}

#[test]
fn request_cancel_failed_removes_the_pending_entry() {
    let mut state = new_execution();
    let initiated = state
        .add_request_cancel_external_workflow_execution_initiated_event(
            1,
            0,
            1,
            WorkflowId::new("target"),
            None,
            "demo-domain".to_string(),
            Vec::new(),
            RequestId::new("req-1"),
        )
        .unwrap();

    state
        .add_request_cancel_external_workflow_execution_failed_event(
            1,
            0,
            initiated.event_id,
            WorkflowId::new("target"),
            None,
            "not found".to_string(),
        )
        .unwrap();

    assert!(state.request_cancels.get(initiated.event_id).is_none());
}

#[test]
fn signal_external_initiated_inserts_pending_and_queues_a_transfer_task() {
    let mut state = new_execution();
    let event = state
        .add_signal_external_workflow_execution_initiated_event(
            1,
            0,
            1,
            WorkflowId::new("target"),
            None,
            "demo-domain".to_string(),
            SignalName::new("go"),
            Vec::new(),
            Vec::new(),
            RequestId::new("req-1"),
        )
        .unwrap();
    assert!(state.signals.get(event.event_id).is_some());
    assert_eq!(state.deltas.transfer_tasks.len(), 1);
}

#[test]
fn signal_external_succeeded_removes_the_pending_entry() {
    let mut state = new_execution();
    let initiated = state
        .add_signal_external_workflow_execution_initiated_event(
            1,
            0,
            1,
            WorkflowId::new("target"),
            None,
            "demo-domain".to_string(),
            SignalName::new("go"),
            Vec::new(),
            Vec::new(),
            RequestId::new("req-1"),
        )
        .unwrap();

    state
        .add_external_workflow_execution_signaled_event(1, 0, initiated.event_id, WorkflowId::new("target"), RunId::new())
        .unwrap();

    assert!(state.signals.get(initiated.event_id).is_none());
}

#[test]
fn recording_signal_requested_dedups_by_request_id() {
    let mut state = new_execution();
    assert!(state.record_signal_requested(RequestId::new("req-1")));
    assert!(!state.record_signal_requested(RequestId::new("req-1")));
}
