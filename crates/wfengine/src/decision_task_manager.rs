//! Decision Task Manager: the sub-state-machine for the single in-flight
//! decision task (spec.md §4.2).
//!
//! States live directly on [`wfcore::execution_info::DecisionFields`]:
//! `None` (`scheduleID == EmptyEventID`), `Scheduled` (`scheduleID` set,
//! `startedID == EmptyEventID`), `Started` (`startedID` set). Every `Add*`
//! function appends the event through the [`HistoryBuilder`] and then
//! applies the same mutation through its `replicate_*` counterpart, so the
//! passive side can reach the identical state from the persisted event
//! alone (spec.md §4.1 "Add<X>...Replicate<X>").

use wfcore::event::{
    DecisionTaskCompletedAttrs, DecisionTaskFailedAttrs, DecisionTaskFailedCause,
    DecisionTaskScheduledAttrs, DecisionTaskStartedAttrs, DecisionTaskTimedOutAttrs, EventId, EventType,
};
use wfcore::execution_info::DecisionFields;
use wfcore::ids::{RequestId, TaskListId};
use wfcore::{sentinel, ExecutionInfo, HistoryEvent, RunId, Version};

use crate::error::{InvalidHistoryActionKind, MutableStateError, Result};
use crate::history_builder::HistoryBuilder;

const ACTION: &str = "DecisionTaskManager";

fn mismatch(reason: impl Into<String>) -> MutableStateError {
    MutableStateError::invalid_history_action(ACTION, reason, InvalidHistoryActionKind::InternalServerError)
}

/// Returns the attempt number the next scheduled decision should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailDecisionResult {
    pub next_attempt: i32,
}

/// Reset decision fields to the `None` state.
pub fn clear_decision(info: &mut ExecutionInfo) {
    info.decision = DecisionFields::default();
}

pub fn update_decision(info: &mut ExecutionInfo, decision: DecisionFields) {
    info.decision = decision;
}

pub fn delete_decision(info: &mut ExecutionInfo) {
    clear_decision(info);
}

/// `FailDecision(incrementAttempt)` (spec.md §4.2): clears the in-flight
/// decision and reports the attempt count the caller should schedule next
/// with.
pub fn fail_decision(info: &mut ExecutionInfo, increment_attempt: bool) -> FailDecisionResult {
    let next_attempt = if increment_attempt { info.decision.attempt + 1 } else { info.decision.attempt };
    clear_decision(info);
    FailDecisionResult { next_attempt }
}

/// `AddFirstDecisionTaskScheduled(startEvent)`: called exactly once, right
/// after workflow started, unless the start event carries a backoff (in
/// which case a timer task schedules it later and this is a no-op).
pub fn add_first_decision_task_scheduled(
    builder: &mut HistoryBuilder,
    info: &mut ExecutionInfo,
    version: Version,
    now_ns: i64,
    task_list: TaskListId,
    start_to_close_timeout_secs: i32,
    first_decision_task_backoff_secs: i32,
) -> Result<Option<HistoryEvent>> {
    if first_decision_task_backoff_secs > 0 {
        return Ok(None);
    }
    let event = add_decision_task_scheduled_event(
        builder,
        info,
        version,
        now_ns,
        task_list,
        start_to_close_timeout_secs,
        0,
        false,
        None,
    )?;
    Ok(Some(event))
}

/// `AddDecisionTaskScheduledEvent{AsHeartbeat}`.
#[allow(clippy::too_many_arguments)]
pub fn add_decision_task_scheduled_event(
    builder: &mut HistoryBuilder,
    info: &mut ExecutionInfo,
    version: Version,
    now_ns: i64,
    task_list: TaskListId,
    start_to_close_timeout_secs: i32,
    attempt: i32,
    as_heartbeat: bool,
    originally_scheduled_ts: Option<i64>,
) -> Result<HistoryEvent> {
    if info.has_pending_decision() {
        return Err(mismatch("decision already scheduled"));
    }
    let event_id = info.take_next_event_id();
    let event = HistoryEvent::new(
        event_id,
        version,
        now_ns,
        EventType::DecisionTaskScheduled(DecisionTaskScheduledAttrs {
            task_list: task_list.clone(),
            start_to_close_timeout_secs,
            attempt,
        }),
    );
    builder.append(event.clone());
    replicate_decision_task_scheduled_event(info, &event, as_heartbeat, originally_scheduled_ts)?;
    Ok(event)
}

pub fn replicate_decision_task_scheduled_event(
    info: &mut ExecutionInfo,
    event: &HistoryEvent,
    _as_heartbeat: bool,
    originally_scheduled_ts: Option<i64>,
) -> Result<()> {
    let EventType::DecisionTaskScheduled(attrs) = &event.event_type else {
        return Err(mismatch("expected DecisionTaskScheduled event"));
    };
    info.decision = DecisionFields {
        version: event.version,
        schedule_id: event.event_id,
        started_id: sentinel::EMPTY_EVENT_ID,
        request_id: None,
        timeout_secs: attrs.start_to_close_timeout_secs,
        attempt: attrs.attempt,
        scheduled_timestamp_ns: event.timestamp_ns,
        started_timestamp_ns: 0,
        originally_scheduled_timestamp_ns: originally_scheduled_ts.unwrap_or(event.timestamp_ns),
        sticky_task_list: None,
        sticky_task_list_stale_after_ns: 0,
    };
    Ok(())
}

/// `AddDecisionTaskStartedEvent(scheduleID, requestID, pollRequest)`.
pub fn add_decision_task_started_event(
    builder: &mut HistoryBuilder,
    info: &mut ExecutionInfo,
    version: Version,
    now_ns: i64,
    schedule_id: EventId,
    request_id: RequestId,
    identity: Option<String>,
) -> Result<HistoryEvent> {
    if info.decision.schedule_id != schedule_id || info.has_in_flight_decision() {
        return Err(mismatch("no matching scheduled decision to start"));
    }
    let event_id = info.take_next_event_id();
    let event = HistoryEvent::new(
        event_id,
        version,
        now_ns,
        EventType::DecisionTaskStarted(DecisionTaskStartedAttrs {
            scheduled_event_id: schedule_id,
            request_id,
            identity,
        }),
    );
    builder.append(event.clone());
    replicate_decision_task_started_event(info, &event)?;
    Ok(event)
}

pub fn replicate_decision_task_started_event(info: &mut ExecutionInfo, event: &HistoryEvent) -> Result<()> {
    let EventType::DecisionTaskStarted(attrs) = &event.event_type else {
        return Err(mismatch("expected DecisionTaskStarted event"));
    };
    info.decision.started_id = event.event_id;
    info.decision.request_id = Some(attrs.request_id.clone());
    info.decision.started_timestamp_ns = event.timestamp_ns;
    Ok(())
}

/// `CreateTransientDecisionEvents(decisionInfo, identity)`: produces a
/// scheduled+started pair without appending them to committed history
/// (spec.md §9 "Transient decision events").
pub fn create_transient_decision_events(
    info: &ExecutionInfo,
    now_ns: i64,
    request_id: RequestId,
    identity: Option<String>,
) -> (HistoryEvent, HistoryEvent) {
    let scheduled = HistoryEvent::new(
        sentinel::TRANSIENT_EVENT_ID,
        info.decision.version,
        info.decision.scheduled_timestamp_ns,
        EventType::DecisionTaskScheduled(DecisionTaskScheduledAttrs {
            task_list: info.task_list.clone(),
            start_to_close_timeout_secs: info.decision.timeout_secs,
            attempt: info.decision.attempt,
        }),
    );
    let started = HistoryEvent::new(
        sentinel::TRANSIENT_EVENT_ID,
        info.decision.version,
        now_ns,
        EventType::DecisionTaskStarted(DecisionTaskStartedAttrs {
            scheduled_event_id: sentinel::TRANSIENT_EVENT_ID,
            request_id,
            identity,
        }),
    );
    (scheduled, started)
}

/// `AddDecisionTaskCompletedEvent`. Clears decision fields back to `None`;
/// auto-reset-point bookkeeping is the caller's responsibility (spec.md
/// §4.1 "Auto-reset points", implemented in `reset_points.rs`).
pub fn add_decision_task_completed_event(
    builder: &mut HistoryBuilder,
    info: &mut ExecutionInfo,
    version: Version,
    now_ns: i64,
    schedule_id: EventId,
    started_id: EventId,
    identity: Option<String>,
    binary_checksum: Option<String>,
) -> Result<HistoryEvent> {
    if info.decision.schedule_id != schedule_id || info.decision.started_id != started_id {
        return Err(MutableStateError::invalid_history_action(
            ACTION,
            "decision completed does not match in-flight schedule/started ids",
            InvalidHistoryActionKind::CallerError,
        ));
    }
    let event_id = info.take_next_event_id();
    let event = HistoryEvent::new(
        event_id,
        version,
        now_ns,
        EventType::DecisionTaskCompleted(DecisionTaskCompletedAttrs {
            scheduled_event_id: schedule_id,
            started_event_id: started_id,
            identity,
            binary_checksum,
        }),
    );
    builder.append(event.clone());
    clear_decision(info);
    Ok(event)
}

/// `AddDecisionTaskFailedEvent`.
#[allow(clippy::too_many_arguments)]
pub fn add_decision_task_failed_event(
    builder: &mut HistoryBuilder,
    info: &mut ExecutionInfo,
    version: Version,
    now_ns: i64,
    schedule_id: EventId,
    started_id: EventId,
    cause: DecisionTaskFailedCause,
    base_run_id: Option<RunId>,
    new_run_id: Option<RunId>,
    fork_event_version: Option<Version>,
) -> Result<HistoryEvent> {
    if info.decision.schedule_id != schedule_id {
        return Err(mismatch("decision failed does not match scheduled id"));
    }
    let event_id = info.take_next_event_id();
    let event = HistoryEvent::new(
        event_id,
        version,
        now_ns,
        EventType::DecisionTaskFailed(DecisionTaskFailedAttrs {
            scheduled_event_id: schedule_id,
            started_event_id: started_id,
            cause,
            base_run_id,
            new_run_id,
            fork_event_version,
        }),
    );
    builder.append(event.clone());
    clear_decision(info);
    Ok(event)
}

/// `AddDecisionTaskTimedOutEvent`.
pub fn add_decision_task_timed_out_event(
    builder: &mut HistoryBuilder,
    info: &mut ExecutionInfo,
    version: Version,
    now_ns: i64,
    schedule_id: EventId,
    started_id: EventId,
) -> Result<HistoryEvent> {
    if info.decision.schedule_id != schedule_id {
        return Err(mismatch("decision timed out does not match scheduled id"));
    }
    let event_id = info.take_next_event_id();
    let event = HistoryEvent::new(
        event_id,
        version,
        now_ns,
        EventType::DecisionTaskTimedOut(DecisionTaskTimedOutAttrs {
            scheduled_event_id: schedule_id,
            started_event_id: started_id,
        }),
    );
    builder.append(event.clone());
    clear_decision(info);
    Ok(event)
}

/// `AddDecisionTaskScheduleToStartTimeoutEvent`: the decision never started
/// before its schedule-to-start timer fired.
pub fn add_decision_task_schedule_to_start_timeout_event(
    builder: &mut HistoryBuilder,
    info: &mut ExecutionInfo,
    version: Version,
    now_ns: i64,
    schedule_id: EventId,
) -> Result<HistoryEvent> {
    if info.decision.schedule_id != schedule_id || info.has_in_flight_decision() {
        return Err(mismatch("schedule-to-start timeout does not match a still-unstarted decision"));
    }
    add_decision_task_timed_out_event(builder, info, version, now_ns, schedule_id, sentinel::EMPTY_EVENT_ID)
}

#[cfg(test)]
#[path = "decision_task_manager_tests.rs"]
mod tests;
