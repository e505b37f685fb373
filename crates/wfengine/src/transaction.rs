//! Transaction close: `CloseTransactionAsMutation`/`CloseTransactionAsSnapshot`
//! (spec.md §4.3).
//!
//! Both entry points share one prepare phase (policy check, buffered-events
//! ceiling, bad-binary auto-reset, flush, activity/timer task collapse) and
//! one assembly phase (event sequence, no-events-after-finish validation,
//! replication tasks, bookkeeping, checksum). They differ only in whether
//! pending collections are reduced to deltas or returned whole.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use wfcore::event::{DecisionTaskFailedCause, EventType};
use wfcore::{
    sentinel, ActivityInfo, ChildExecutionInfo, ExecutionInfo, HistoryEvent, RequestCancelInfo, ReplicationTask,
    SignalInfo, TimerInfo, TransferTask, Version, VersionHistoryItem, WorkflowState,
};
use wfstate::contract::{WorkflowEvents, WorkflowMutableState, WorkflowMutation, WorkflowSnapshot};
use wfstate::{checksum, Checksum};

use crate::config::Config;
use crate::error::{InvalidHistoryActionKind, MutableStateError, Result};
use crate::mutable_state::MutableState;
use crate::shard::ShardContext;

const ACTION: &str = "CloseTransaction";

fn bad(reason: impl Into<String>) -> MutableStateError {
    MutableStateError::invalid_history_action(ACTION, reason, InvalidHistoryActionKind::InternalServerError)
}

/// Which side of a cross-region failover this transaction is closing on
/// (spec.md §4.3 step 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosePolicy {
    Active,
    Passive,
}

/// Everything the close path needs that the mutable state itself does not
/// own (spec.md §1: shard lifecycle, the domain/failover oracle, and
/// dynamic configuration are all out of scope for the core and modeled
/// here as parameters, the same way [`ShardContext`] stands in for shard
/// ownership).
pub struct CloseTransactionRequest<'a> {
    pub policy: ClosePolicy,
    pub now_ns: i64,
    pub config: &'a Config,
    pub shard: &'a dyn ShardContext,
    /// Whether this cluster is the active cluster for the domain's current
    /// failover version (spec.md §4.3 step 1).
    pub domain_active_in_this_cluster: bool,
    pub current_version: Version,
    /// Bad-binary checksums the domain entry currently declares (spec.md
    /// §4.3 step 3).
    pub bad_binary_checksums: &'a [String],
}

/// The result of a successful close: the write to persist plus the event
/// batches to append to the history-branch store. `transient_events` is
/// never persisted — it exists only to answer an in-flight decider's poll
/// (spec.md §4.2, §9 "Transient decision events").
pub struct ClosedTransaction<T> {
    pub write: T,
    pub events: Vec<WorkflowEvents>,
    pub transient_events: Vec<HistoryEvent>,
}

pub fn close_transaction_as_mutation(
    state: &mut MutableState,
    req: &CloseTransactionRequest,
) -> Result<ClosedTransaction<WorkflowMutation>> {
    let prepared = prepare(state, req)?;

    let mutation = WorkflowMutation {
        execution_info: state.execution_info.clone(),
        activity_deltas: std::mem::take(&mut state.deltas.activities).into_delta(),
        timer_deltas: std::mem::take(&mut state.deltas.timers).into_delta(),
        child_execution_deltas: std::mem::take(&mut state.deltas.children).into_delta(),
        request_cancel_deltas: std::mem::take(&mut state.deltas.request_cancels).into_delta(),
        signal_deltas: std::mem::take(&mut state.deltas.signals).into_delta(),
        signal_requested_id_deltas: std::mem::take(&mut state.deltas.signal_requested_ids).into_delta(),
        new_buffered_events: prepared.new_buffered_events,
        clear_buffered_events: prepared.clear_buffered_events,
        version_histories: state
            .version_histories
            .clone()
            .ok_or_else(|| MutableStateError::MissingVersionHistories { action: ACTION })?,
        transfer_tasks: prepared.transfer_tasks,
        timer_tasks: prepared.timer_tasks,
        replication_tasks: prepared.replication_tasks,
        condition: prepared.condition,
        checksum: prepared.checksum,
    };

    finish(state);
    Ok(ClosedTransaction { write: mutation, events: prepared.events, transient_events: prepared.transient_events })
}

pub fn close_transaction_as_snapshot(
    state: &mut MutableState,
    req: &CloseTransactionRequest,
) -> Result<ClosedTransaction<WorkflowSnapshot>> {
    let prepared = prepare(state, req)?;

    if !prepared.transient_events.is_empty() {
        return Err(bad("snapshot requested with transient decision events still pending"));
    }
    if state.history_builder().has_pending_buffered_events() {
        return Err(bad("snapshot requested with unflushed buffered events"));
    }

    let snapshot = WorkflowSnapshot {
        execution_info: state.execution_info.clone(),
        activity_infos: state.activities.values().cloned().collect(),
        timer_infos: state.timers.values().cloned().collect(),
        child_execution_infos: state.children.values().cloned().collect(),
        request_cancel_infos: state.request_cancels.values().cloned().collect(),
        signal_infos: state.signals.values().cloned().collect(),
        signal_requested_ids: state.signal_requested_ids.iter().cloned().collect(),
        version_histories: state
            .version_histories
            .clone()
            .ok_or_else(|| MutableStateError::MissingVersionHistories { action: ACTION })?,
        transfer_tasks: prepared.transfer_tasks,
        timer_tasks: prepared.timer_tasks,
        replication_tasks: prepared.replication_tasks,
        condition: prepared.condition,
        checksum: prepared.checksum,
    };

    state.deltas = Default::default();
    finish(state);
    Ok(ClosedTransaction { write: snapshot, events: prepared.events, transient_events: prepared.transient_events })
}

struct Prepared {
    events: Vec<WorkflowEvents>,
    transient_events: Vec<HistoryEvent>,
    new_buffered_events: Vec<HistoryEvent>,
    clear_buffered_events: bool,
    transfer_tasks: Vec<TransferTask>,
    timer_tasks: Vec<wfcore::TimerTask>,
    replication_tasks: Vec<ReplicationTask>,
    condition: wfcore::EventId,
    checksum: Option<Checksum>,
}

#[allow(clippy::expect_used)]
fn prepare(state: &mut MutableState, req: &CloseTransactionRequest) -> Result<Prepared> {
    // Step 1: policy check.
    if matches!(req.policy, ClosePolicy::Active) && state.version_histories.is_some() && !req.domain_active_in_this_cluster
    {
        return Err(MutableStateError::DomainNotActive { domain_id: state.execution_info.domain_id.to_string() });
    }

    // Step 2: buffered-events ceiling.
    let buffered_count = state.history_builder().pending_buffered_events().count();
    if buffered_count >= req.config.max_buffered_events_batch && state.execution_info.has_in_flight_decision() {
        force_close_decision(state, req, DecisionTaskFailedCause::ForceCloseDecision)?;
    }

    // Step 3: bad-binary auto-reset task.
    if state.children.is_empty() {
        if let Some(point) = state
            .execution_info
            .auto_reset_points
            .iter()
            .find(|p| req.bad_binary_checksums.iter().any(|bad| bad == &p.binary_checksum))
        {
            state
                .deltas
                .transfer_tasks
                .push(TransferTask::ResetWorkflow { reset_point_event_id: point.first_decision_completed_id });
        }
    }

    // Step 4: flush. Buffer resolution only makes sense when no decision is
    // in flight; task-ID stamping piggybacks on the same pass since every
    // committed event (buffered or not) needs one before it can be
    // replicated or referenced by a transfer/timer task.
    let flushed = if !state.execution_info.has_in_flight_decision() {
        state.flush_buffered_events(|| req.shard.next_task_id());
        true
    } else {
        for event in state.history_builder_mut().history_mut().iter_mut() {
            if event.event_id != sentinel::BUFFERED_EVENT_ID {
                event.task_id = req.shard.next_task_id();
            }
        }
        false
    };

    // Step 5: collapse pending activities/user timers to at most one task
    // each, covering the earliest deadline (spec.md §4.3 step 5).
    if let Some(task) = state.collapsed_activity_timer_task() {
        state.deltas.timer_tasks.push(task);
    }
    if let Some(task) = state.collapsed_user_timer_task() {
        state.deltas.timer_tasks.push(task);
    }

    let committed: Vec<HistoryEvent> = state.history_builder().committed_events().cloned().collect();
    let transient_events: Vec<HistoryEvent> = state.history_builder().transient_history().to_vec();

    // No-events-after-finish, with the one-batch carve-out spec.md §9 calls
    // out explicitly: a transient-decision batch sharing this transaction
    // with a committed finish is not a violation, so the check only runs
    // when both batches are present.
    let batch_count = usize::from(!transient_events.is_empty()) + usize::from(!committed.is_empty());
    if batch_count > 1 && state.execution_info.state == WorkflowState::Completed {
        let last = committed.last().expect("committed non-empty: batch_count > 1 with empty transient");
        if !last.event_type.is_workflow_closing() {
            return Err(MutableStateError::EventsAfterWorkflowFinish { action: ACTION });
        }
    }

    let (new_buffered_events, clear_buffered_events) = if flushed {
        (Vec::new(), true)
    } else {
        (state.history_builder().pending_buffered_events().cloned().collect(), false)
    };

    let mut events = Vec::new();
    if !committed.is_empty() {
        events.push(WorkflowEvents {
            domain_id: state.execution_info.domain_id,
            workflow_id: state.execution_info.workflow_id.clone(),
            run_id: state.execution_info.run_id,
            branch_token: state.execution_info.branch_token.clone(),
            events: committed.clone(),
        });
    }

    // Replication tasks: one HistoryReplicationTask per non-empty committed
    // batch, plus whatever sync-activity tasks were queued during this
    // transaction (spec.md §4.3 "Replication tasks").
    let mut replication_tasks = std::mem::take(&mut state.deltas.replication_tasks);
    if matches!(req.policy, ClosePolicy::Active) && state.version_histories.is_some() {
        if let (Some(first), Some(last)) = (committed.first(), committed.last()) {
            replication_tasks.push(ReplicationTask::History {
                first_event_id: first.event_id,
                next_event_id: last.event_id + 1,
                version: req.current_version,
                branch_token: state.execution_info.branch_token.clone(),
            });
        }
    } else if !replication_tasks.is_empty() {
        return Err(bad("passive transaction produced replication tasks"));
    }

    // Bookkeeping.
    if let Some(last) = committed.last() {
        state.execution_info.last_first_event_id =
            committed.first().expect("non-empty: has a last event").event_id;
        state.execution_info.last_event_task_id = last.task_id;
        if let Some(histories) = state.version_histories.as_mut() {
            histories
                .current_version_history_mut()
                .add_or_update_item(VersionHistoryItem::new(last.event_id, req.current_version))
                .map_err(|e| bad(e.to_string()))?;
        }
    }
    state.execution_info.last_updated_timestamp_ns = req.now_ns;

    let checksum = compute_checksum(state, req);

    let condition = state.execution_info.next_event_id;

    Ok(Prepared {
        events,
        transient_events,
        new_buffered_events,
        clear_buffered_events,
        transfer_tasks: std::mem::take(&mut state.deltas.transfer_tasks),
        timer_tasks: std::mem::take(&mut state.deltas.timer_tasks),
        replication_tasks,
        condition,
        checksum,
    })
}

/// `FailDecision(ForceCloseDecision)` followed by scheduling a fresh
/// decision task (spec.md §4.3 step 2, concrete scenario 4).
fn force_close_decision(state: &mut MutableState, req: &CloseTransactionRequest, cause: DecisionTaskFailedCause) -> Result<()> {
    let schedule_id = state.execution_info.decision.schedule_id;
    let started_id = state.execution_info.decision.started_id;
    let task_list = state.execution_info.task_list.clone();
    let timeout_secs = state.execution_info.decision_timeout_secs;

    state.add_decision_task_failed_event(req.current_version, req.now_ns, schedule_id, started_id, cause, None, None, None)?;
    let next_attempt = state.execution_info.decision.attempt;
    state.add_decision_task_scheduled_event(
        req.current_version,
        req.now_ns,
        task_list,
        timeout_secs,
        next_attempt,
        false,
        None,
    )?;
    Ok(())
}

#[derive(Serialize)]
struct ChecksumInput<'a> {
    execution_info: &'a ExecutionInfo,
    activities: Vec<&'a ActivityInfo>,
    timers: Vec<&'a TimerInfo>,
    children: Vec<&'a ChildExecutionInfo>,
    request_cancels: Vec<&'a RequestCancelInfo>,
    signals: Vec<&'a SignalInfo>,
}

fn compute_checksum(state: &MutableState, req: &CloseTransactionRequest) -> Option<Checksum> {
    if !should_sample(req.config.checksum_gen_probability, state.execution_info.next_event_id as u64) {
        return None;
    }
    // `HashMap` iteration order is nondeterministic across processes; sort
    // each entity list by its primary key before hashing so the checksum is
    // reproducible (spec.md §9 "Checksum is advisory": "field order and map
    // iteration order are deterministic").
    let mut activities: Vec<&ActivityInfo> = state.activities.values().collect();
    activities.sort_by_key(|a| a.schedule_id);
    let mut timers: Vec<&TimerInfo> = state.timers.values().collect();
    timers.sort_by(|a, b| a.timer_id.cmp(&b.timer_id));
    let mut children: Vec<&ChildExecutionInfo> = state.children.values().collect();
    children.sort_by_key(|c| c.initiated_id);
    let mut request_cancels: Vec<&RequestCancelInfo> = state.request_cancels.values().collect();
    request_cancels.sort_by_key(|r| r.initiated_id);
    let mut signals: Vec<&SignalInfo> = state.signals.values().collect();
    signals.sort_by_key(|s| s.initiated_id);

    let input = ChecksumInput {
        execution_info: &state.execution_info,
        activities,
        timers,
        children,
        request_cancels,
        signals,
    };
    checksum::compute(&input, req.now_ns).ok()
}

/// Deterministic stand-in for a sampling RNG: `probability` is a rate, not a
/// guarantee, so a hash of `seed` serves just as well and keeps this
/// function pure (spec.md §9 "Checksum is advisory").
fn should_sample(probability: f64, seed: u64) -> bool {
    if probability <= 0.0 {
        return false;
    }
    if probability >= 1.0 {
        return true;
    }
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    let bucket = (hasher.finish() % 1_000_000) as f64 / 1_000_000.0;
    bucket < probability
}

/// Verify a previously persisted checksum at load time, honoring
/// `mutableStateChecksumVerifyProbability` and `..InvalidateBefore`. Returns
/// `None` when verification was skipped (not sampled, no checksum present,
/// or the checksum predates the invalidation epoch) — spec.md §9: mismatches
/// are logged and metered, never fatal.
pub fn maybe_verify_checksum(
    config: &Config,
    persisted: Option<&Checksum>,
    state: &WorkflowMutableState,
    seed: u64,
) -> Option<bool> {
    let checksum = persisted?;
    if checksum::is_invalidated(checksum, config.checksum_invalidate_before_ns) {
        return None;
    }
    if !should_sample(config.checksum_verify_probability, seed) {
        return None;
    }
    let input = ChecksumInput {
        execution_info: &state.execution_info,
        activities: state.activity_infos.iter().collect(),
        timers: state.timer_infos.iter().collect(),
        children: state.child_execution_infos.iter().collect(),
        request_cancels: state.request_cancel_infos.iter().collect(),
        signals: state.signal_infos.iter().collect(),
    };
    checksum::verify(checksum, &input).ok()
}

fn finish(state: &mut MutableState) {
    state.history_builder_mut().take_history();
    state.history_builder_mut().clear_transient_history();
}

#[cfg(test)]
#[path = "transaction_tests.rs"]
mod tests;
