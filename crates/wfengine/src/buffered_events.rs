//! The flush algorithm (spec.md §4.1 "Flush algorithm", §9 "Buffered-events
//! reorder is a correctness fix, not a feature").
//!
//! Runs at transaction close when no decision is in flight. Merges
//! persisted and pending buffered events, hoists activity/child terminal
//! events to the end so "started" always precedes "completed" for a
//! decider, trims anything past the first workflow-closing event, assigns
//! real event IDs to whatever still carries [`wfcore::sentinel::BUFFERED_EVENT_ID`],
//! fixes up `startedEventID` back-references discovered along the way, and
//! finally stamps task IDs across both the transient and normal history in
//! two passes.

use std::collections::HashMap;

use wfcore::child_execution::PendingChildExecutions;
use wfcore::activity::PendingActivities;
use wfcore::event::{EventId, EventType};
use wfcore::{sentinel, ExecutionInfo, HistoryEvent};

use crate::history_builder::HistoryBuilder;

/// Merge persisted (already-buffered-in-a-prior-transaction) and pending
/// (buffered this transaction) events, hoisting activity/child terminal
/// events to the end while preserving arrival order within each group
/// (spec.md §4.1 step 2).
fn reorder_buffered(persisted: Vec<HistoryEvent>, pending: Vec<HistoryEvent>) -> Vec<HistoryEvent> {
    let mut all = persisted;
    all.extend(pending);
    let (mut kept, mut hoisted): (Vec<HistoryEvent>, Vec<HistoryEvent>) =
        all.into_iter().partition(|e| !e.event_type.is_hoisted_on_flush());
    kept.append(&mut hoisted);
    kept
}

/// Patch a terminal activity/child event's `startedEventID` reference if
/// the in-batch assignment pass discovered the real started ID for its
/// scheduling/initiating event (spec.md §4.1 step 5, scenario 2).
fn fixup_started_reference(event: &mut HistoryEvent, started_id_by_key: &HashMap<EventId, EventId>) {
    match &mut event.event_type {
        EventType::ActivityTaskCompleted(attrs) => {
            if let Some(&sid) = started_id_by_key.get(&attrs.scheduled_event_id) {
                attrs.started_event_id = sid;
            }
        }
        EventType::ActivityTaskFailed(attrs) => {
            if let Some(&sid) = started_id_by_key.get(&attrs.scheduled_event_id) {
                attrs.started_event_id = sid;
            }
        }
        EventType::ActivityTaskCanceled(attrs) => {
            if let Some(&sid) = started_id_by_key.get(&attrs.scheduled_event_id) {
                attrs.started_event_id = sid;
            }
        }
        EventType::ActivityTaskTimedOut(attrs) => {
            if let Some(&sid) = started_id_by_key.get(&attrs.scheduled_event_id) {
                attrs.started_event_id = sid;
            }
        }
        EventType::ChildWorkflowExecutionCompleted(attrs) => {
            if let Some(&sid) = started_id_by_key.get(&attrs.initiated_event_id) {
                attrs.started_event_id = sid;
            }
        }
        EventType::ChildWorkflowExecutionFailed(attrs) => {
            if let Some(&sid) = started_id_by_key.get(&attrs.initiated_event_id) {
                attrs.started_event_id = sid;
            }
        }
        EventType::ChildWorkflowExecutionCanceled(attrs) => {
            if let Some(&sid) = started_id_by_key.get(&attrs.initiated_event_id) {
                attrs.started_event_id = sid;
            }
        }
        EventType::ChildWorkflowExecutionTerminated(attrs) => {
            if let Some(&sid) = started_id_by_key.get(&attrs.initiated_event_id) {
                attrs.started_event_id = sid;
            }
        }
        EventType::ChildWorkflowExecutionTimedOut(attrs) => {
            if let Some(&sid) = started_id_by_key.get(&attrs.initiated_event_id) {
                attrs.started_event_id = sid;
            }
        }
        _ => {}
    }
}

/// Run the flush algorithm in place on `builder`'s current batch.
///
/// `persisted_buffered` is whatever buffered-events queue was loaded from
/// the persisted mutable state (empty for a workflow that never buffered
/// anything before this transaction). Idempotent when there is nothing
/// bufferable left to flush (spec.md §8 round-trip laws) since no event ID
/// in `result` still carries the sentinel, so the ID-assignment loop is a
/// no-op and `next_task_id` is simply never called beyond the last pass.
pub fn flush_buffered_events(
    builder: &mut HistoryBuilder,
    persisted_buffered: Vec<HistoryEvent>,
    execution_info: &mut ExecutionInfo,
    activities: &mut PendingActivities,
    children: &mut PendingChildExecutions,
    mut next_task_id: impl FnMut() -> i64,
) {
    let batch = builder.take_history();
    let (pending_buffered, mut result): (Vec<HistoryEvent>, Vec<HistoryEvent>) =
        batch.into_iter().partition(|e| e.event_id == sentinel::BUFFERED_EVENT_ID);

    result.append(&mut reorder_buffered(persisted_buffered, pending_buffered));

    if let Some(pos) = result.iter().position(|e| e.is_workflow_closing()) {
        result.truncate(pos + 1);
    }

    let mut started_id_by_key: HashMap<EventId, EventId> = HashMap::new();
    for event in result.iter_mut() {
        if event.event_id == sentinel::BUFFERED_EVENT_ID {
            event.event_id = execution_info.take_next_event_id();
        }
        match &event.event_type {
            EventType::ActivityTaskStarted(attrs) => {
                started_id_by_key.insert(attrs.scheduled_event_id, event.event_id);
                if let Some(info) = activities.get_mut(attrs.scheduled_event_id) {
                    info.started_id = event.event_id;
                }
            }
            EventType::ChildWorkflowExecutionStarted(attrs) => {
                started_id_by_key.insert(attrs.initiated_event_id, event.event_id);
                if let Some(info) = children.get_mut(attrs.initiated_event_id) {
                    info.started_id = event.event_id;
                }
            }
            _ => {}
        }
    }

    for event in result.iter_mut() {
        fixup_started_reference(event, &started_id_by_key);
    }

    // Task IDs: transient history first, then normal history (spec.md §4.1 step 6).
    for event in builder.transient_history_mut().iter_mut() {
        event.task_id = next_task_id();
    }
    for event in result.iter_mut() {
        event.task_id = next_task_id();
    }
    if let Some(last) = result.last() {
        execution_info.last_event_task_id = last.task_id;
    }

    builder.set_history(result);
}

#[cfg(test)]
#[path = "buffered_events_tests.rs"]
mod tests;
