//! Mutable State Core: owns everything in spec.md §3's data model for a
//! single workflow execution, exposes the `Add<X>`/`Replicate<X>` pairs of
//! spec.md §4.1, and drives transaction close (`crate::transaction`).
//!
//! Split into one submodule per entity kind, mirroring
//! `oj_core::event::mod.rs`'s submodule-per-entity-kind layout:
//! [`workflow`] (lifecycle events), [`decision`] (thin wrappers over
//! [`crate::decision_task_manager`] that add the universal Add-path
//! precondition), [`activity`], [`timer`], [`child`] (child workflow
//! executions), [`external`] (request-cancel/signal to another workflow).

mod activity;
mod child;
mod decision;
mod deltas;
mod external;
mod timer;
mod workflow;

use std::collections::HashSet;

use wfcore::activity::PendingActivities;
use wfcore::child_execution::PendingChildExecutions;
use wfcore::event::EventType;
use wfcore::request_cancel::PendingRequestCancels;
use wfcore::signal::{PendingSignals, SignalRequestedIds};
use wfcore::timer::PendingTimers;
use wfcore::{ExecutionInfo, HistoryEvent, VersionHistories, Version, WorkflowState};
use wfstate::{Checksum, WorkflowMutableState};

use crate::history_builder::HistoryBuilder;
use deltas::TransactionDeltas;

pub use child::InitiateChildWorkflow;
pub use workflow::ContinueAsNewOutcome;

/// The one-per-execution in-memory aggregate (spec.md §2 "Mutable State
/// Core", §3). Exclusively owned by whoever holds the workflow-context
/// lock for its lifetime (spec.md §5 "Scheduling model").
pub struct MutableState {
    pub execution_info: ExecutionInfo,
    pub activities: PendingActivities,
    pub timers: PendingTimers,
    pub children: PendingChildExecutions,
    pub request_cancels: PendingRequestCancels,
    pub signals: PendingSignals,
    pub signal_requested_ids: SignalRequestedIds,

    /// `None` for a workflow that does not participate in replication
    /// (spec.md §7 `MissingVersionHistories`: "a replication-only path
    /// reached on a non-replicated workflow; fatal").
    pub version_histories: Option<VersionHistories>,

    /// The `state` this execution had in the persisted store at load time,
    /// distinct from `execution_info.state` which may have been mutated
    /// this transaction (spec.md §4.1 `IsCurrentWorkflowGuaranteed`).
    state_in_db: WorkflowState,

    /// Buffered events that were already persisted (from a prior
    /// transaction) and are still waiting for a flush (spec.md §3
    /// "Buffered Events Queue").
    persisted_buffered_events: Vec<HistoryEvent>,

    checksum: Option<Checksum>,

    history_builder: HistoryBuilder,
    pub(crate) deltas: TransactionDeltas,

    /// Dedup keys for externally-reapplied events (spec.md §3
    /// "Applied-Events Set"). In-memory only — spec.md §9 notes the source
    /// system leaves this "TODO: persist to db"; at-most-once reapplication
    /// here likewise holds only while this object stays resident.
    applied_events: HashSet<String>,
}

impl MutableState {
    /// A freshly initialized execution (spec.md §3 "Lifecycles" — state Void).
    pub fn new_void(execution_info: ExecutionInfo) -> Self {
        let state_in_db = execution_info.state;
        Self {
            execution_info,
            activities: PendingActivities::default(),
            timers: PendingTimers::default(),
            children: PendingChildExecutions::default(),
            request_cancels: PendingRequestCancels::default(),
            signals: PendingSignals::default(),
            signal_requested_ids: SignalRequestedIds::default(),
            version_histories: None,
            state_in_db,
            persisted_buffered_events: Vec::new(),
            checksum: None,
            history_builder: HistoryBuilder::new(),
            deltas: TransactionDeltas::default(),
            applied_events: HashSet::new(),
        }
    }

    /// Hydrate from a persisted snapshot (spec.md §3 "Lifecycles").
    pub fn from_persisted(persisted: WorkflowMutableState) -> Self {
        let mut activities = PendingActivities::default();
        for info in persisted.activity_infos {
            activities.insert(info);
        }
        let mut timers = PendingTimers::default();
        for info in persisted.timer_infos {
            timers.insert(info);
        }
        let mut children = PendingChildExecutions::default();
        for info in persisted.child_execution_infos {
            children.insert(info);
        }
        let mut request_cancels = PendingRequestCancels::default();
        for info in persisted.request_cancel_infos {
            request_cancels.insert(info);
        }
        let mut signals = PendingSignals::default();
        for info in persisted.signal_infos {
            signals.insert(info);
        }
        let mut signal_requested_ids = SignalRequestedIds::default();
        for id in persisted.signal_requested_ids {
            signal_requested_ids.insert(id);
        }

        let state_in_db = persisted.execution_info.state;
        Self {
            execution_info: persisted.execution_info,
            activities,
            timers,
            children,
            request_cancels,
            signals,
            signal_requested_ids,
            version_histories: Some(persisted.version_histories),
            state_in_db,
            persisted_buffered_events: persisted.buffered_events,
            checksum: persisted.checksum,
            history_builder: HistoryBuilder::new(),
            deltas: TransactionDeltas::default(),
            applied_events: HashSet::new(),
        }
    }

    pub(crate) fn history_builder(&self) -> &HistoryBuilder {
        &self.history_builder
    }

    pub(crate) fn history_builder_mut(&mut self) -> &mut HistoryBuilder {
        &mut self.history_builder
    }

    pub(crate) fn take_persisted_buffered_events(&mut self) -> Vec<HistoryEvent> {
        std::mem::take(&mut self.persisted_buffered_events)
    }

    pub fn checksum(&self) -> Option<&Checksum> {
        self.checksum.as_ref()
    }

    pub(crate) fn set_checksum(&mut self, checksum: Option<Checksum>) {
        self.checksum = checksum;
    }

    /// `IsCurrentWorkflowGuaranteed` (spec.md §4.1): true iff
    /// `stateInDB ∈ {Created, Running}` — the only cases we *know* without a
    /// persistence round-trip that this is the current run. `Void` and
    /// every other persisted state return `false`.
    pub fn is_current_workflow_guaranteed(&self) -> bool {
        matches!(self.state_in_db, WorkflowState::Created | WorkflowState::Running)
    }

    /// `IsResourceDuplicated(k)`: has this dedup key already been applied?
    /// Recording happens via [`Self::mark_event_applied`].
    pub fn is_event_applied(&self, dedup_key: &str) -> bool {
        self.applied_events.contains(dedup_key)
    }

    pub fn mark_event_applied(&mut self, dedup_key: impl Into<String>) {
        self.applied_events.insert(dedup_key.into());
    }

    /// Central event-creation dispatch (spec.md §4.1 `CreateNewHistoryEvent`):
    /// bufferable events created while a decision is in flight get the
    /// sentinel ID; everything else is assigned a real ID immediately.
    fn create_new_history_event(&mut self, event_type: EventType, version: Version, now_ns: i64) -> HistoryEvent {
        let event_id = if event_type.is_bufferable() && self.execution_info.has_in_flight_decision() {
            wfcore::sentinel::BUFFERED_EVENT_ID
        } else {
            self.execution_info.take_next_event_id()
        };
        let event = HistoryEvent::new(event_id, version, now_ns, event_type);
        self.history_builder.append(event.clone());
        event
    }

    /// `state ∈ {Created, Running}` (spec.md §4.1 "Add-path preconditions
    /// (universal)"). Every `Add<X>` must check this before doing anything
    /// else.
    pub(crate) fn check_mutable(&self, action: &'static str) -> crate::error::Result<()> {
        if !self.execution_info.is_mutable() {
            return Err(crate::error::MutableStateError::WorkflowFinished { action });
        }
        Ok(())
    }

    /// Run the flush algorithm (spec.md §4.1 "Flush algorithm") over the
    /// current transaction's batch, merging in whatever buffered events were
    /// already persisted from a prior transaction. Only valid to call once
    /// per transaction close, and only when no decision is in flight.
    pub(crate) fn flush_buffered_events(&mut self, next_task_id: impl FnMut() -> i64) {
        let persisted_buffered = self.take_persisted_buffered_events();
        crate::buffered_events::flush_buffered_events(
            &mut self.history_builder,
            persisted_buffered,
            &mut self.execution_info,
            &mut self.activities,
            &mut self.children,
            next_task_id,
        );
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
