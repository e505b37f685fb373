use super::*;
use wfcore::execution_info::WorkflowState;
use wfcore::ids::{BranchToken, TaskListId, WorkflowTypeName};
use wfcore::version_history::{VersionHistories, VersionHistory, VersionHistoryItem};
use wfcore::ExecutionInfo;

fn key() -> ExecutionKey {
    (DomainId::new(), WorkflowId::new("wf-1"), RunId::new())
}

fn execution_info(key: &ExecutionKey) -> ExecutionInfo {
    let mut info = ExecutionInfo::new_void(key.0, key.1.clone(), key.2);
    info.state = WorkflowState::Created;
    info.workflow_type_name = WorkflowTypeName::new("order");
    info.task_list = TaskListId::new("default");
    info.next_event_id = 2;
    info
}

fn version_histories() -> VersionHistories {
    VersionHistories::new(VersionHistory::new(BranchToken::new("b1"), vec![VersionHistoryItem::new(1, 1)]))
}

fn snapshot(key: &ExecutionKey) -> WorkflowSnapshot {
    WorkflowSnapshot {
        execution_info: execution_info(key),
        activity_infos: vec![],
        timer_infos: vec![],
        child_execution_infos: vec![],
        request_cancel_infos: vec![],
        signal_infos: vec![],
        signal_requested_ids: vec![],
        version_histories: version_histories(),
        transfer_tasks: vec![],
        timer_tasks: vec![],
        replication_tasks: vec![],
        condition: 1,
        checksum: None,
    }
}

#[test]
fn create_then_load_round_trips() {
    let store = InMemoryWorkflowStore::new();
    let key = key();
    store.create(&key, snapshot(&key), vec![]).unwrap();

    let loaded = store.load(&key).unwrap().expect("present");
    assert_eq!(loaded.execution_info.next_event_id, 2);
}

#[test]
fn create_twice_fails() {
    let store = InMemoryWorkflowStore::new();
    let key = key();
    store.create(&key, snapshot(&key), vec![]).unwrap();
    assert_eq!(store.create(&key, snapshot(&key), vec![]), Err(StoreError::AlreadyExists));
}

#[test]
fn update_without_create_fails_not_found() {
    let store = InMemoryWorkflowStore::new();
    let key = key();
    let mutation = WorkflowMutation {
        execution_info: execution_info(&key),
        activity_deltas: Default::default(),
        timer_deltas: Default::default(),
        child_execution_deltas: Default::default(),
        request_cancel_deltas: Default::default(),
        signal_deltas: Default::default(),
        signal_requested_id_deltas: Default::default(),
        new_buffered_events: vec![],
        clear_buffered_events: false,
        version_histories: version_histories(),
        transfer_tasks: vec![],
        timer_tasks: vec![],
        replication_tasks: vec![],
        condition: 2,
        checksum: None,
    };
    assert_eq!(store.update(&key, mutation, vec![]), Err(StoreError::NotFound));
}

#[test]
fn update_with_stale_condition_is_rejected() {
    let store = InMemoryWorkflowStore::new();
    let key = key();
    store.create(&key, snapshot(&key), vec![]).unwrap();

    let mut mutated_info = execution_info(&key);
    mutated_info.next_event_id = 3;
    let mutation = WorkflowMutation {
        execution_info: mutated_info,
        activity_deltas: Default::default(),
        timer_deltas: Default::default(),
        child_execution_deltas: Default::default(),
        request_cancel_deltas: Default::default(),
        signal_deltas: Default::default(),
        signal_requested_id_deltas: Default::default(),
        new_buffered_events: vec![],
        clear_buffered_events: false,
        version_histories: version_histories(),
        transfer_tasks: vec![],
        timer_tasks: vec![],
        replication_tasks: vec![],
        condition: 99, // stale: store's nextEventID is 2
        checksum: None,
    };
    assert_eq!(
        store.update(&key, mutation, vec![]),
        Err(StoreError::ConcurrencyConflict { expected: 99, actual: 2 })
    );
}

#[test]
fn update_with_correct_condition_commits() {
    let store = InMemoryWorkflowStore::new();
    let key = key();
    store.create(&key, snapshot(&key), vec![]).unwrap();

    let mut mutated_info = execution_info(&key);
    mutated_info.next_event_id = 5;
    let mutation = WorkflowMutation {
        execution_info: mutated_info,
        activity_deltas: Default::default(),
        timer_deltas: Default::default(),
        child_execution_deltas: Default::default(),
        request_cancel_deltas: Default::default(),
        signal_deltas: Default::default(),
        signal_requested_id_deltas: Default::default(),
        new_buffered_events: vec![],
        clear_buffered_events: false,
        version_histories: version_histories(),
        transfer_tasks: vec![],
        timer_tasks: vec![],
        replication_tasks: vec![],
        condition: 2,
        checksum: None,
    };
    store.update(&key, mutation, vec![]).unwrap();

    assert_eq!(store.next_event_id_in_db(&key).unwrap(), 5);
}
