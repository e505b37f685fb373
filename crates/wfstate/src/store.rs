//! The persistence trait and an in-memory implementation used by tests and
//! by the engine crate (spec.md §5 "Shared resources": "The persistence
//! store enforces optimistic concurrency via a `Condition = nextEventIDInDB`
//! check").
//!
//! Grounded on the `WorkflowEventStore` trait shape from
//! `examples/other_examples/7ca8b029_everruns-everruns__crates-durable-src-persistence-store.rs.rs`
//! (event-sourced store trait, `ConcurrencyConflict{expected, actual}`
//! variant), expressed in the corpus's `thiserror` idiom.

use std::collections::HashMap;

use parking_lot::Mutex;
use thiserror::Error;

use wfcore::event::EventId;
use wfcore::ids::{DomainId, RunId, WorkflowId};

use crate::contract::{WorkflowEvents, WorkflowMutableState, WorkflowMutation, WorkflowSnapshot};

/// Uniquely identifies one workflow execution for storage purposes.
pub type ExecutionKey = (DomainId, WorkflowId, RunId);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("workflow execution not found")]
    NotFound,

    #[error("workflow execution already exists")]
    AlreadyExists,

    /// The optimistic-concurrency check failed: another writer committed
    /// between this caller's load and its close (spec.md §5).
    #[error("concurrency conflict: expected nextEventID {expected}, store has {actual}")]
    ConcurrencyConflict { expected: EventId, actual: EventId },
}

/// What the mutable-state core reads and writes (spec.md §6 "Persistence
/// contract"). A real implementation backs this with a durable store and
/// a separate history-branch append API; the in-memory implementation
/// below exists for tests and for exercising the engine without a
/// database.
pub trait WorkflowStore: Send + Sync {
    fn load(&self, key: &ExecutionKey) -> Result<Option<WorkflowMutableState>, StoreError>;

    /// Initial creation or full rebuild (spec.md §6 "WorkflowSnapshot").
    fn create(
        &self,
        key: &ExecutionKey,
        snapshot: WorkflowSnapshot,
        events: Vec<WorkflowEvents>,
    ) -> Result<(), StoreError>;

    /// Apply a delta-based mutation, enforcing `mutation.condition ==
    /// current nextEventID` before committing (spec.md §5).
    fn update(
        &self,
        key: &ExecutionKey,
        mutation: WorkflowMutation,
        events: Vec<WorkflowEvents>,
    ) -> Result<(), StoreError>;

    /// The store's current `nextEventID` for this execution, used by
    /// callers to build the `Condition` for their next `update`.
    fn next_event_id_in_db(&self, key: &ExecutionKey) -> Result<EventId, StoreError>;
}

struct Entry {
    state: WorkflowMutableState,
    branches: HashMap<String, Vec<wfcore::HistoryEvent>>,
}

/// A single-process, in-memory `WorkflowStore`. Every execution's branches
/// are appended to, never rewritten; `update` replaces the materialized
/// state wholesale after applying the mutation's deltas (the deltas
/// themselves are folded in by `wfengine::transaction` before calling this
/// trait — this store only enforces the condition and persists the result).
#[derive(Default)]
pub struct InMemoryWorkflowStore {
    executions: Mutex<HashMap<ExecutionKey, Entry>>,
}

impl InMemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorkflowStore for InMemoryWorkflowStore {
    fn load(&self, key: &ExecutionKey) -> Result<Option<WorkflowMutableState>, StoreError> {
        Ok(self.executions.lock().get(key).map(|e| e.state.clone()))
    }

    fn create(
        &self,
        key: &ExecutionKey,
        snapshot: WorkflowSnapshot,
        events: Vec<WorkflowEvents>,
    ) -> Result<(), StoreError> {
        let mut executions = self.executions.lock();
        if executions.contains_key(key) {
            return Err(StoreError::AlreadyExists);
        }

        let state = WorkflowMutableState {
            execution_info: snapshot.execution_info,
            activity_infos: snapshot.activity_infos,
            timer_infos: snapshot.timer_infos,
            child_execution_infos: snapshot.child_execution_infos,
            request_cancel_infos: snapshot.request_cancel_infos,
            signal_infos: snapshot.signal_infos,
            signal_requested_ids: snapshot.signal_requested_ids,
            buffered_events: Vec::new(),
            version_histories: snapshot.version_histories,
            checksum: snapshot.checksum,
        };

        let mut branches: HashMap<String, Vec<wfcore::HistoryEvent>> = HashMap::new();
        for batch in events {
            branches.entry(batch.branch_token.to_string()).or_default().extend(batch.events);
        }

        executions.insert(key.clone(), Entry { state, branches });
        Ok(())
    }

    fn update(
        &self,
        key: &ExecutionKey,
        mutation: WorkflowMutation,
        events: Vec<WorkflowEvents>,
    ) -> Result<(), StoreError> {
        let mut executions = self.executions.lock();
        let entry = executions.get_mut(key).ok_or(StoreError::NotFound)?;

        let actual = entry.state.execution_info.next_event_id;
        if mutation.condition != actual {
            return Err(StoreError::ConcurrencyConflict { expected: mutation.condition, actual });
        }

        for batch in events {
            entry.branches.entry(batch.branch_token.to_string()).or_default().extend(batch.events);
        }

        apply_entity_deltas(&mut entry.state.activity_infos, mutation.activity_deltas, |a| a.schedule_id);
        apply_entity_deltas(&mut entry.state.timer_infos, mutation.timer_deltas, |t| t.timer_id.clone());
        apply_entity_deltas(&mut entry.state.child_execution_infos, mutation.child_execution_deltas, |c| {
            c.initiated_id
        });
        apply_entity_deltas(&mut entry.state.request_cancel_infos, mutation.request_cancel_deltas, |r| {
            r.initiated_id
        });
        apply_entity_deltas(&mut entry.state.signal_infos, mutation.signal_deltas, |s| s.initiated_id);

        for id in mutation.signal_requested_id_deltas.deletes {
            entry.state.signal_requested_ids.retain(|existing| existing != &id);
        }
        for id in mutation.signal_requested_id_deltas.upserts {
            if !entry.state.signal_requested_ids.contains(&id) {
                entry.state.signal_requested_ids.push(id);
            }
        }

        if mutation.clear_buffered_events {
            entry.state.buffered_events.clear();
        }
        entry.state.buffered_events.extend(mutation.new_buffered_events);

        entry.state.execution_info = mutation.execution_info;
        entry.state.version_histories = mutation.version_histories;
        entry.state.checksum = mutation.checksum;

        Ok(())
    }

    fn next_event_id_in_db(&self, key: &ExecutionKey) -> Result<EventId, StoreError> {
        self.executions
            .lock()
            .get(key)
            .map(|e| e.state.execution_info.next_event_id)
            .ok_or(StoreError::NotFound)
    }
}

/// Fold an `upserts`/`deletes` delta into a materialized `Vec`, keyed by
/// `key_of`. Used by the in-memory store to turn `WorkflowMutation` deltas
/// back into the flat lists `WorkflowMutableState` stores.
fn apply_entity_deltas<K: PartialEq, V: Clone>(
    target: &mut Vec<V>,
    delta: crate::contract::EntityDelta<K, V>,
    key_of: impl Fn(&V) -> K,
) {
    for key in &delta.deletes {
        target.retain(|v| key_of(v) != *key);
    }
    for upsert in delta.upserts {
        let key = key_of(&upsert);
        if let Some(existing) = target.iter_mut().find(|v| key_of(v) == key) {
            *existing = upsert;
        } else {
            target.push(upsert);
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
