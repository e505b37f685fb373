//! Persistence contract (spec.md §6 "External Interfaces"): the shapes the
//! mutable-state core reads on load and writes on close. These are plain
//! data — the store trait in [`crate::store`] is what actually persists
//! them.

use serde::{Deserialize, Serialize};

use wfcore::event::EventId;
use wfcore::ids::{BranchToken, DomainId, RequestId, RunId, TimerId, WorkflowId};
use wfcore::{
    ActivityInfo, ChildExecutionInfo, ExecutionInfo, HistoryEvent, ReplicationTask, RequestCancelInfo,
    SignalInfo, TimerInfo, TimerTask, TransferTask, VersionHistories,
};

use crate::checksum::Checksum;

/// `{executionInfo, activityInfos, timerInfos, childExecutionInfos,
/// requestCancelInfos, signalInfos, signalRequestedIDs, bufferedEvents,
/// versionHistories, checksum}` (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowMutableState {
    pub execution_info: ExecutionInfo,
    pub activity_infos: Vec<ActivityInfo>,
    pub timer_infos: Vec<TimerInfo>,
    pub child_execution_infos: Vec<ChildExecutionInfo>,
    pub request_cancel_infos: Vec<RequestCancelInfo>,
    pub signal_infos: Vec<SignalInfo>,
    pub signal_requested_ids: Vec<RequestId>,
    pub buffered_events: Vec<HistoryEvent>,
    pub version_histories: VersionHistories,
    pub checksum: Option<Checksum>,
}

/// Upsert/delete delta for one pending-entity kind, keyed by `K`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityDelta<K, V> {
    pub upserts: Vec<V>,
    pub deletes: Vec<K>,
}

impl<K, V> EntityDelta<K, V> {
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletes.is_empty()
    }
}

/// The mutation-write shape: `WorkflowMutableState`'s fields reduced to
/// deltas, plus the transactional task lists and the optimistic
/// concurrency `Condition` (spec.md §6 "WorkflowMutation").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowMutation {
    pub execution_info: ExecutionInfo,

    pub activity_deltas: EntityDelta<EventId, ActivityInfo>,
    pub timer_deltas: EntityDelta<TimerId, TimerInfo>,
    pub child_execution_deltas: EntityDelta<EventId, ChildExecutionInfo>,
    pub request_cancel_deltas: EntityDelta<EventId, RequestCancelInfo>,
    pub signal_deltas: EntityDelta<EventId, SignalInfo>,
    pub signal_requested_id_deltas: EntityDelta<RequestId, RequestId>,

    pub new_buffered_events: Vec<HistoryEvent>,
    pub clear_buffered_events: bool,

    pub version_histories: VersionHistories,

    pub transfer_tasks: Vec<TransferTask>,
    pub timer_tasks: Vec<TimerTask>,
    pub replication_tasks: Vec<ReplicationTask>,

    /// Optimistic concurrency key: the write only succeeds if the store's
    /// current `nextEventID` still equals this value (spec.md §5 "Shared
    /// resources").
    pub condition: EventId,

    pub checksum: Option<Checksum>,
}

/// The snapshot-write shape: fully materialized pending collections, no
/// deltas, used for rebuild and initial creation (spec.md §6
/// "WorkflowSnapshot").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSnapshot {
    pub execution_info: ExecutionInfo,
    pub activity_infos: Vec<ActivityInfo>,
    pub timer_infos: Vec<TimerInfo>,
    pub child_execution_infos: Vec<ChildExecutionInfo>,
    pub request_cancel_infos: Vec<RequestCancelInfo>,
    pub signal_infos: Vec<SignalInfo>,
    pub signal_requested_ids: Vec<RequestId>,

    pub version_histories: VersionHistories,

    pub transfer_tasks: Vec<TransferTask>,
    pub timer_tasks: Vec<TimerTask>,
    pub replication_tasks: Vec<ReplicationTask>,

    pub condition: EventId,
    pub checksum: Option<Checksum>,
}

/// A batch of events persisted via a separate history-branch append
/// (spec.md §6 "WorkflowEvents batch"). History is stored in batches keyed
/// by their first event's ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowEvents {
    pub domain_id: DomainId,
    pub workflow_id: WorkflowId,
    pub run_id: RunId,
    pub branch_token: BranchToken,
    pub events: Vec<HistoryEvent>,
}

impl WorkflowEvents {
    pub fn first_event_id(&self) -> Option<EventId> {
        self.events.first().map(|e| e.event_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_delta_is_empty_when_both_sides_are_empty() {
        let delta: EntityDelta<EventId, ActivityInfo> = EntityDelta::default();
        assert!(delta.is_empty());
    }

    #[test]
    fn workflow_events_first_event_id() {
        let events = WorkflowEvents {
            domain_id: DomainId::new(),
            workflow_id: WorkflowId::new("wf-1"),
            run_id: RunId::new(),
            branch_token: BranchToken::new("b1"),
            events: vec![],
        };
        assert_eq!(events.first_event_id(), None);
    }
}
