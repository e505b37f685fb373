use super::*;

fn fresh() -> ExecutionInfo {
    ExecutionInfo::new_void(DomainId::new(), WorkflowId::new("wf-1"), RunId::new())
}

#[test]
fn void_execution_is_not_mutable() {
    let e = fresh();
    assert_eq!(e.state, WorkflowState::Void);
    assert!(!e.is_mutable());
}

#[test]
fn created_and_running_are_mutable() {
    let mut e = fresh();
    e.state = WorkflowState::Created;
    assert!(e.is_mutable());
    e.state = WorkflowState::Running;
    assert!(e.is_mutable());
    e.state = WorkflowState::Completed;
    assert!(!e.is_mutable());
}

#[test]
fn next_event_id_starts_at_one_and_increments() {
    let mut e = fresh();
    assert_eq!(e.next_event_id, crate::sentinel::FIRST_EVENT_ID);
    assert_eq!(e.take_next_event_id(), 1);
    assert_eq!(e.take_next_event_id(), 2);
    assert_eq!(e.next_event_id, 3);
}

#[test]
fn current_workflow_guaranteed_only_for_created_and_running() {
    let mut e = fresh();
    for (state, guaranteed) in [
        (WorkflowState::Void, false),
        (WorkflowState::Created, true),
        (WorkflowState::Running, true),
        (WorkflowState::Completed, false),
        (WorkflowState::Zombie, false),
        (WorkflowState::Corrupted, false),
    ] {
        e.state = state;
        assert_eq!(e.is_current_workflow_guaranteed(), guaranteed, "state {:?}", state);
    }
}

#[test]
fn in_flight_decision_tracks_started_id() {
    let mut e = fresh();
    assert!(!e.has_pending_decision());
    assert!(!e.has_in_flight_decision());
    e.decision.schedule_id = 2;
    assert!(e.has_pending_decision());
    assert!(!e.has_in_flight_decision());
    e.decision.started_id = 3;
    assert!(e.has_in_flight_decision());
}
