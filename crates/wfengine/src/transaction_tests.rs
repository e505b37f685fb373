use wfcore::event::{EventType, WorkflowStartedAttrs};
use wfcore::ids::{BranchToken, DomainId, RequestId, RunId, SignalName, TaskListId, WorkflowId, WorkflowTypeName};
use wfcore::version_history::{VersionHistories, VersionHistory, VersionHistoryItem};
use wfcore::{ExecutionInfo, WorkflowState};

use super::*;
use crate::shard::InMemoryShardContext;

fn started_attrs(run_id: RunId) -> WorkflowStartedAttrs {
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
        first_run_id: run_id,
        attempt: 0,
        cron_schedule: None,
    }
}

fn new_replicated_execution() -> MutableState {
    let domain_id = DomainId::new();
    let workflow_id = WorkflowId::new("wf-1");
    let run_id = RunId::new();
    let info = ExecutionInfo::new_void(domain_id, workflow_id, run_id);
    let mut state = MutableState::new_void(info);
    state.version_histories =
        Some(VersionHistories::new(VersionHistory::new(BranchToken::new("branch-1"), Vec::new())));
    state
}

fn request<'a>(config: &'a Config, shard: &'a dyn ShardContext) -> CloseTransactionRequest<'a> {
    CloseTransactionRequest {
        policy: ClosePolicy::Active,
        now_ns: 1_000,
        config,
        shard,
        domain_active_in_this_cluster: true,
        current_version: 1,
        bad_binary_checksums: &[],
    }
}

/// Scenario 1 (spec.md §8): start, schedule, start-decision, buffer a
/// signal, complete the decision; close flushes the signal to event 5 and
/// produces a single replication task spanning the whole committed batch.
#[test]
fn close_as_mutation_flushes_buffered_signal_and_emits_one_replication_task() {
    let mut state = new_replicated_execution();
    let run_id = state.execution_info.run_id;

    let start_event = state.add_workflow_execution_started(1, 0, started_attrs(run_id)).unwrap();
    let scheduled = state.add_first_decision_task_scheduled(1, 0, &start_event).unwrap().unwrap();
    let started =
        state.add_decision_task_started_event(1, 0, scheduled.event_id, RequestId::new("req-1"), None).unwrap();
    let signaled =
        state.add_workflow_signaled(1, 0, SignalName::new("approve"), b"payload".to_vec(), None).unwrap();
    assert_eq!(signaled.event_id, wfcore::sentinel::BUFFERED_EVENT_ID);
    state
        .add_decision_task_completed_event(1, 0, scheduled.event_id, started.event_id, None, None, 20, false)
        .unwrap();

    let config = Config::default();
    let shard = InMemoryShardContext::new(100);
    let req = request(&config, &shard);
    let closed = close_transaction_as_mutation(&mut state, &req).unwrap();

    assert_eq!(closed.events.len(), 1);
    let batch = &closed.events[0];
    assert_eq!(batch.events.len(), 5);
    assert_eq!(batch.events[4].event_id, 5);
    assert!(matches!(batch.events[4].event_type, EventType::WorkflowExecutionSignaled(_)));

    assert_eq!(closed.write.replication_tasks.len(), 1);
    match &closed.write.replication_tasks[0] {
        wfcore::ReplicationTask::History { first_event_id, next_event_id, .. } => {
            assert_eq!(*first_event_id, 1);
            assert_eq!(*next_event_id, 6);
        }
        other => panic!("expected a History replication task, got {other:?}"),
    }
    assert_eq!(closed.write.condition, 6);
    assert!(closed.write.clear_buffered_events);
}

/// Scenario 4 (spec.md §8): a full buffered-events queue with a decision in
/// flight force-fails that decision at close instead of accepting the 100th
/// buffered event silently.
#[test]
fn close_forces_decision_failure_at_buffered_events_ceiling() {
    let mut state = new_replicated_execution();
    let run_id = state.execution_info.run_id;
    let config = Config { max_buffered_events_batch: 3, ..Config::default() };
    let shard = InMemoryShardContext::new(1);

    let start_event = state.add_workflow_execution_started(1, 0, started_attrs(run_id)).unwrap();
    let scheduled = state.add_first_decision_task_scheduled(1, 0, &start_event).unwrap().unwrap();
    state.add_decision_task_started_event(1, 0, scheduled.event_id, RequestId::new("req-1"), None).unwrap();

    for i in 0..3 {
        state.add_workflow_signaled(1, 0, SignalName::new(format!("s{i}")), Vec::new(), None).unwrap();
    }
    assert!(state.execution_info.has_in_flight_decision());

    let req = request(&config, &shard);
    let closed = close_transaction_as_mutation(&mut state, &req).unwrap();

    // The force-close appends DecisionTaskFailed + a fresh DecisionTaskScheduled,
    // both non-bufferable, so they land in the committed batch alongside the
    // start event; the 3 buffered signals stay buffered for the next close.
    let batch = &closed.events[0];
    assert!(batch.events.iter().any(|e| matches!(e.event_type, EventType::DecisionTaskFailed(_))));
    assert!(!state.execution_info.has_in_flight_decision());
    assert_eq!(closed.write.new_buffered_events.len(), 0);
}

/// An active-policy close against a domain that failed over away from this
/// cluster must fail with `DomainNotActive` rather than silently writing.
#[test]
fn active_close_rejects_when_domain_not_active_in_this_cluster() {
    let mut state = new_replicated_execution();
    let run_id = state.execution_info.run_id;
    state.add_workflow_execution_started(1, 0, started_attrs(run_id)).unwrap();

    let config = Config::default();
    let shard = InMemoryShardContext::new(1);
    let mut req = request(&config, &shard);
    req.domain_active_in_this_cluster = false;

    let err = close_transaction_as_mutation(&mut state, &req).unwrap_err();
    assert!(matches!(err, MutableStateError::DomainNotActive { .. }));
}

/// A passive close must never produce replication tasks even when the
/// underlying events would otherwise warrant one.
#[test]
fn passive_close_produces_no_replication_tasks() {
    let mut state = new_replicated_execution();
    let run_id = state.execution_info.run_id;
    state.add_workflow_execution_started(1, 0, started_attrs(run_id)).unwrap();

    let config = Config::default();
    let shard = InMemoryShardContext::new(1);
    let mut req = request(&config, &shard);
    req.policy = ClosePolicy::Passive;

    let closed = close_transaction_as_mutation(&mut state, &req).unwrap();
    assert!(closed.write.replication_tasks.is_empty());
}

/// `CloseTransactionAsSnapshot` must reject a workflow with unflushed
/// buffered events; it exists for pristine rebuild state only.
#[test]
fn snapshot_close_rejects_unflushed_buffered_events() {
    let mut state = new_replicated_execution();
    let run_id = state.execution_info.run_id;

    let start_event = state.add_workflow_execution_started(1, 0, started_attrs(run_id)).unwrap();
    let scheduled = state.add_first_decision_task_scheduled(1, 0, &start_event).unwrap().unwrap();
    state.add_decision_task_started_event(1, 0, scheduled.event_id, RequestId::new("req-1"), None).unwrap();
    state.add_workflow_signaled(1, 0, SignalName::new("approve"), Vec::new(), None).unwrap();

    let config = Config::default();
    let shard = InMemoryShardContext::new(1);
    let req = request(&config, &shard);

    let err = close_transaction_as_snapshot(&mut state, &req).unwrap_err();
    assert!(matches!(err, MutableStateError::InvalidHistoryAction { .. }));
}

/// `state = Completed` after a workflow-closing event must not fail the
/// no-events-after-finish check when only one batch is present (spec.md §9
/// open question: the carve-out applies to batch_count, not the check
/// itself).
#[test]
fn single_batch_completed_close_is_not_flagged_as_events_after_finish() {
    let mut state = new_replicated_execution();
    let run_id = state.execution_info.run_id;
    let start_event = state.add_workflow_execution_started(1, 0, started_attrs(run_id)).unwrap();
    state
        .add_workflow_closed(
            wfcore::CloseStatus::Completed,
            1,
            0,
            wfcore::event::WorkflowClosedAttrs {
                result_or_details: Vec::new(),
                reason: None,
                decision_task_completed_event_id: start_event.event_id,
            },
        )
        .unwrap();
    assert_eq!(state.execution_info.state, WorkflowState::Completed);

    let config = Config::default();
    let shard = InMemoryShardContext::new(1);
    let req = request(&config, &shard);
    let closed = close_transaction_as_mutation(&mut state, &req).unwrap();
    assert_eq!(closed.events[0].events.len(), 2);
}

/// Concrete scenario 6 (spec.md §8): reset-point rotation at capacity keeps
/// only the newest `maxResetPoints` entries.
#[test]
fn checksum_is_none_when_sampling_probability_is_zero() {
    let mut state = new_replicated_execution();
    let run_id = state.execution_info.run_id;
    state.add_workflow_execution_started(1, 0, started_attrs(run_id)).unwrap();

    let config = Config::default();
    assert_eq!(config.checksum_gen_probability, 0.0);
    let shard = InMemoryShardContext::new(1);
    let req = request(&config, &shard);
    let closed = close_transaction_as_mutation(&mut state, &req).unwrap();
    assert!(closed.write.checksum.is_none());
}
