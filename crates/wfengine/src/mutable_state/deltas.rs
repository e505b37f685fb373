//! Transactional delta sets (spec.md §3 "Transactional delta sets"):
//! upsert/delete sets per pending-entity kind, plus the generated
//! side-effect tasks. Cleared on every successful transaction close.

use std::collections::BTreeMap;

use wfcore::event::EventId;
use wfcore::ids::{RequestId, TimerId};
use wfcore::{
    ActivityInfo, ChildExecutionInfo, ReplicationTask, RequestCancelInfo, SignalInfo, TimerInfo, TimerTask,
    TransferTask,
};
use wfstate::contract::EntityDelta;

/// Last-write-wins change set for one pending-entity kind, keyed by `K`.
/// `None` records a delete, `Some(v)` an upsert; a key touched more than
/// once in a transaction only ever shows up once in the final delta.
#[derive(Debug, Default)]
pub(crate) struct EntityChangeSet<K, V> {
    changes: BTreeMap<K, Option<V>>,
}

impl<K: Ord + Clone, V> EntityChangeSet<K, V> {
    pub(crate) fn upsert(&mut self, key: K, value: V) {
        self.changes.insert(key, Some(value));
    }

    pub(crate) fn delete(&mut self, key: K) {
        self.changes.insert(key, None);
    }

    pub(crate) fn into_delta(self) -> EntityDelta<K, V> {
        let mut upserts = Vec::new();
        let mut deletes = Vec::new();
        for (key, value) in self.changes {
            match value {
                Some(v) => upserts.push(v),
                None => deletes.push(key),
            }
        }
        EntityDelta { upserts, deletes }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[derive(Debug, Default)]
pub(crate) struct TransactionDeltas {
    pub(crate) activities: EntityChangeSet<EventId, ActivityInfo>,
    pub(crate) timers: EntityChangeSet<TimerId, TimerInfo>,
    pub(crate) children: EntityChangeSet<EventId, ChildExecutionInfo>,
    pub(crate) request_cancels: EntityChangeSet<EventId, RequestCancelInfo>,
    pub(crate) signals: EntityChangeSet<EventId, SignalInfo>,
    pub(crate) signal_requested_ids: EntityChangeSet<RequestId, RequestId>,

    /// Schedule IDs needing a sync-activity replication task at close
    /// (spec.md §8 invariant 7: `syncActivityTasks ⊆ keys(pendingActivityInfos)`).
    pub(crate) sync_activity_schedule_ids: Vec<EventId>,

    pub(crate) clear_buffered_events: bool,

    pub(crate) transfer_tasks: Vec<TransferTask>,
    pub(crate) timer_tasks: Vec<TimerTask>,
    pub(crate) replication_tasks: Vec<ReplicationTask>,
}

impl TransactionDeltas {
    pub(crate) fn is_empty(&self) -> bool {
        self.activities.is_empty()
            && self.timers.is_empty()
            && self.children.is_empty()
            && self.request_cancels.is_empty()
            && self.signals.is_empty()
            && self.signal_requested_ids.is_empty()
            && self.sync_activity_schedule_ids.is_empty()
            && !self.clear_buffered_events
            && self.transfer_tasks.is_empty()
            && self.timer_tasks.is_empty()
            && self.replication_tasks.is_empty()
    }
}
