//! The history-event schema and buffering classification (spec.md §3, §4.1,
//! §6).
//!
//! `EventType` is the tagged union of every event kind the core knows how to
//! apply; `HistoryEvent` is the envelope (`eventID`, `version`, `timestamp`,
//! `taskID`) spec.md §6 calls the "minimum fields a replayer needs". History
//! is built up as a flat `Vec<HistoryEvent>` batch and appended to a branch
//! atomically — see `wfengine::history_builder`.

use serde::{Deserialize, Serialize};

use crate::ids::{ActivityId, RequestId, SignalName, TaskListId, TimerId, WorkflowId, WorkflowTypeName};
use crate::{RunId, Version};

/// Event identifier. Ordinary events hold a positive, monotonically
/// assigned value; buffered/transient events hold one of the sentinels in
/// [`crate::sentinel`] until flush.
pub type EventId = i64;

/// An initiator for a continue-as-new transition (spec.md §4.1 "Continue-as-new").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContinuedAsNewInitiator {
    Decider,
    RetryPolicy,
    CronSchedule,
}

/// Why a decision task failed (spec.md §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionTaskFailedCause {
    /// The in-flight decision was force-failed because the buffered-events
    /// ceiling was reached (spec.md §4.3 step 2).
    ForceCloseDecision,
    /// The in-flight decision was force-failed by a start-of-transaction
    /// failover (spec.md §4.3 "Start-of-transaction failover handling").
    FailoverCloseDecision,
    /// The decider itself reported a failure.
    WorkflowWorker,
    /// The decider's completion request was malformed.
    BadScheduleActivityAttributes,
    ResetWorkflow,
}

/// Reason a workflow closed by forced reset (spec.md §4.1 auto-reset points).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentClosePolicy {
    Terminate,
    Abandon,
    RequestCancel,
}

/// Attributes for `WorkflowExecutionStarted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStartedAttrs {
    pub workflow_type: WorkflowTypeName,
    pub task_list: TaskListId,
    pub input: Vec<u8>,
    pub execution_start_to_close_timeout_secs: i32,
    pub task_start_to_close_timeout_secs: i32,
    pub first_decision_task_backoff_secs: i32,
    pub parent_workflow_id: Option<WorkflowId>,
    pub parent_run_id: Option<RunId>,
    pub continued_execution_run_id: Option<RunId>,
    pub first_run_id: RunId,
    pub attempt: i32,
    pub cron_schedule: Option<String>,
}

/// Attributes shared by every workflow-closing event except continue-as-new
/// (spec.md's `WorkflowExecutionCompleted/Failed/TimedOut/Terminated/Canceled`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowClosedAttrs {
    pub result_or_details: Vec<u8>,
    pub reason: Option<String>,
    pub decision_task_completed_event_id: EventId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuedAsNewAttrs {
    pub new_execution_run_id: RunId,
    pub workflow_type: WorkflowTypeName,
    pub task_list: TaskListId,
    pub input: Vec<u8>,
    pub execution_start_to_close_timeout_secs: i32,
    pub task_start_to_close_timeout_secs: i32,
    pub backoff_start_interval_secs: i32,
    pub initiator: ContinuedAsNewInitiator,
    pub decision_task_completed_event_id: EventId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowCancelRequestedAttrs {
    pub cause: Option<String>,
    pub request_id: RequestId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSignaledAttrs {
    pub signal_name: SignalName,
    pub input: Vec<u8>,
    pub identity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchAttributesUpsertedAttrs {
    pub search_attributes: std::collections::BTreeMap<String, Vec<u8>>,
    pub decision_task_completed_event_id: EventId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecordedAttrs {
    pub marker_name: String,
    pub details: Vec<u8>,
    pub decision_task_completed_event_id: EventId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTaskScheduledAttrs {
    pub task_list: TaskListId,
    pub start_to_close_timeout_secs: i32,
    pub attempt: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTaskStartedAttrs {
    pub scheduled_event_id: EventId,
    pub request_id: RequestId,
    pub identity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTaskCompletedAttrs {
    pub scheduled_event_id: EventId,
    pub started_event_id: EventId,
    pub identity: Option<String>,
    pub binary_checksum: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTaskFailedAttrs {
    pub scheduled_event_id: EventId,
    pub started_event_id: EventId,
    pub cause: DecisionTaskFailedCause,
    pub base_run_id: Option<RunId>,
    pub new_run_id: Option<RunId>,
    pub fork_event_version: Option<Version>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTaskTimedOutAttrs {
    pub scheduled_event_id: EventId,
    pub started_event_id: EventId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTaskScheduledAttrs {
    pub activity_id: ActivityId,
    pub activity_type: String,
    pub task_list: TaskListId,
    pub input: Vec<u8>,
    pub schedule_to_close_timeout_secs: i32,
    pub schedule_to_start_timeout_secs: i32,
    pub start_to_close_timeout_secs: i32,
    pub heartbeat_timeout_secs: i32,
    pub decision_task_completed_event_id: EventId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTaskStartedAttrs {
    pub scheduled_event_id: EventId,
    pub identity: Option<String>,
    pub request_id: RequestId,
    pub attempt: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTaskCompletedAttrs {
    pub scheduled_event_id: EventId,
    pub started_event_id: EventId,
    pub result: Vec<u8>,
    pub identity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTaskFailedAttrs {
    pub scheduled_event_id: EventId,
    pub started_event_id: EventId,
    pub reason: String,
    pub details: Vec<u8>,
    pub identity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTaskTimedOutAttrs {
    pub scheduled_event_id: EventId,
    pub started_event_id: EventId,
    pub timeout_kind: ActivityTimeoutKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityTimeoutKind {
    ScheduleToStart,
    ScheduleToClose,
    StartToClose,
    Heartbeat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTaskCancelRequestedAttrs {
    pub scheduled_event_id: EventId,
    pub decision_task_completed_event_id: EventId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTaskCanceledAttrs {
    pub scheduled_event_id: EventId,
    pub started_event_id: EventId,
    pub details: Vec<u8>,
    pub latest_cancel_requested_event_id: Option<EventId>,
    pub identity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestCancelActivityTaskFailedAttrs {
    pub activity_id: ActivityId,
    pub cause: String,
    pub decision_task_completed_event_id: EventId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerStartedAttrs {
    pub timer_id: TimerId,
    pub start_to_fire_timeout_secs: i64,
    pub decision_task_completed_event_id: EventId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerFiredAttrs {
    pub timer_id: TimerId,
    pub started_event_id: EventId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerCanceledAttrs {
    pub timer_id: TimerId,
    pub started_event_id: EventId,
    pub identity: Option<String>,
    pub decision_task_completed_event_id: EventId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelTimerFailedAttrs {
    pub timer_id: TimerId,
    pub cause: String,
    pub decision_task_completed_event_id: EventId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildWorkflowExecutionInitiatedAttrs {
    pub workflow_id: WorkflowId,
    pub workflow_type: WorkflowTypeName,
    pub target_domain: String,
    pub input: Vec<u8>,
    pub parent_close_policy: ParentClosePolicy,
    pub decision_task_completed_event_id: EventId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildWorkflowExecutionStartedAttrs {
    pub initiated_event_id: EventId,
    pub workflow_id: WorkflowId,
    pub run_id: RunId,
    pub workflow_type: WorkflowTypeName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildWorkflowExecutionCompletedAttrs {
    pub initiated_event_id: EventId,
    pub started_event_id: EventId,
    pub workflow_id: WorkflowId,
    pub run_id: RunId,
    pub result: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildWorkflowExecutionFailedAttrs {
    pub initiated_event_id: EventId,
    pub started_event_id: EventId,
    pub workflow_id: WorkflowId,
    pub run_id: RunId,
    pub reason: String,
    pub details: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildWorkflowExecutionCanceledAttrs {
    pub initiated_event_id: EventId,
    pub started_event_id: EventId,
    pub workflow_id: WorkflowId,
    pub run_id: RunId,
    pub details: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildWorkflowExecutionTerminatedAttrs {
    pub initiated_event_id: EventId,
    pub started_event_id: EventId,
    pub workflow_id: WorkflowId,
    pub run_id: RunId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildWorkflowExecutionTimedOutAttrs {
    pub initiated_event_id: EventId,
    pub started_event_id: EventId,
    pub workflow_id: WorkflowId,
    pub run_id: RunId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartChildWorkflowExecutionFailedAttrs {
    pub initiated_event_id: EventId,
    pub workflow_id: WorkflowId,
    pub workflow_type: WorkflowTypeName,
    pub cause: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestCancelExternalWorkflowExecutionInitiatedAttrs {
    pub workflow_id: WorkflowId,
    pub run_id: Option<RunId>,
    pub domain: String,
    pub control: Vec<u8>,
    pub decision_task_completed_event_id: EventId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalWorkflowExecutionCancelRequestedAttrs {
    pub initiated_event_id: EventId,
    pub workflow_id: WorkflowId,
    pub run_id: RunId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestCancelExternalWorkflowExecutionFailedAttrs {
    pub initiated_event_id: EventId,
    pub workflow_id: WorkflowId,
    pub run_id: Option<RunId>,
    pub cause: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalExternalWorkflowExecutionInitiatedAttrs {
    pub workflow_id: WorkflowId,
    pub run_id: Option<RunId>,
    pub domain: String,
    pub signal_name: SignalName,
    pub input: Vec<u8>,
    pub control: Vec<u8>,
    pub decision_task_completed_event_id: EventId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalWorkflowExecutionSignaledAttrs {
    pub initiated_event_id: EventId,
    pub workflow_id: WorkflowId,
    pub run_id: RunId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalExternalWorkflowExecutionFailedAttrs {
    pub initiated_event_id: EventId,
    pub workflow_id: WorkflowId,
    pub run_id: Option<RunId>,
    pub cause: String,
}

/// The tagged union of every applicable event kind (spec.md §4.1 "Event coverage").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventType {
    WorkflowExecutionStarted(WorkflowStartedAttrs),
    WorkflowExecutionCompleted(WorkflowClosedAttrs),
    WorkflowExecutionFailed(WorkflowClosedAttrs),
    WorkflowExecutionTimedOut(WorkflowClosedAttrs),
    WorkflowExecutionTerminated(WorkflowClosedAttrs),
    WorkflowExecutionCanceled(WorkflowClosedAttrs),
    WorkflowExecutionContinuedAsNew(ContinuedAsNewAttrs),
    WorkflowExecutionCancelRequested(WorkflowCancelRequestedAttrs),
    WorkflowExecutionSignaled(WorkflowSignaledAttrs),
    UpsertWorkflowSearchAttributes(SearchAttributesUpsertedAttrs),
    MarkerRecorded(MarkerRecordedAttrs),

    DecisionTaskScheduled(DecisionTaskScheduledAttrs),
    DecisionTaskStarted(DecisionTaskStartedAttrs),
    DecisionTaskCompleted(DecisionTaskCompletedAttrs),
    DecisionTaskFailed(DecisionTaskFailedAttrs),
    DecisionTaskTimedOut(DecisionTaskTimedOutAttrs),

    ActivityTaskScheduled(ActivityTaskScheduledAttrs),
    ActivityTaskStarted(ActivityTaskStartedAttrs),
    ActivityTaskCompleted(ActivityTaskCompletedAttrs),
    ActivityTaskFailed(ActivityTaskFailedAttrs),
    ActivityTaskTimedOut(ActivityTaskTimedOutAttrs),
    ActivityTaskCancelRequested(ActivityTaskCancelRequestedAttrs),
    ActivityTaskCanceled(ActivityTaskCanceledAttrs),
    RequestCancelActivityTaskFailed(RequestCancelActivityTaskFailedAttrs),

    TimerStarted(TimerStartedAttrs),
    TimerFired(TimerFiredAttrs),
    TimerCanceled(TimerCanceledAttrs),
    CancelTimerFailed(CancelTimerFailedAttrs),

    StartChildWorkflowExecutionInitiated(ChildWorkflowExecutionInitiatedAttrs),
    ChildWorkflowExecutionStarted(ChildWorkflowExecutionStartedAttrs),
    ChildWorkflowExecutionCompleted(ChildWorkflowExecutionCompletedAttrs),
    ChildWorkflowExecutionFailed(ChildWorkflowExecutionFailedAttrs),
    ChildWorkflowExecutionCanceled(ChildWorkflowExecutionCanceledAttrs),
    ChildWorkflowExecutionTerminated(ChildWorkflowExecutionTerminatedAttrs),
    ChildWorkflowExecutionTimedOut(ChildWorkflowExecutionTimedOutAttrs),
    StartChildWorkflowExecutionFailed(StartChildWorkflowExecutionFailedAttrs),

    RequestCancelExternalWorkflowExecutionInitiated(RequestCancelExternalWorkflowExecutionInitiatedAttrs),
    ExternalWorkflowExecutionCancelRequested(ExternalWorkflowExecutionCancelRequestedAttrs),
    RequestCancelExternalWorkflowExecutionFailed(RequestCancelExternalWorkflowExecutionFailedAttrs),

    SignalExternalWorkflowExecutionInitiated(SignalExternalWorkflowExecutionInitiatedAttrs),
    ExternalWorkflowExecutionSignaled(ExternalWorkflowExecutionSignaledAttrs),
    SignalExternalWorkflowExecutionFailed(SignalExternalWorkflowExecutionFailedAttrs),
}

impl EventType {
    /// Events produced directly by decider output, or by workflow/decision
    /// lifecycle transitions, are assigned an ID immediately. Everything
    /// else is bufferable while a decision is in flight (spec.md §4.1
    /// "Event buffering rule").
    ///
    /// It is a programming error to construct one of the non-bufferable,
    /// decider-direct variants while a decision is in flight; callers
    /// enforce that at the `HistoryBuilder` boundary, not here.
    pub fn is_bufferable(&self) -> bool {
        !matches!(
            self,
            EventType::WorkflowExecutionStarted(_)
                | EventType::WorkflowExecutionCompleted(_)
                | EventType::WorkflowExecutionFailed(_)
                | EventType::WorkflowExecutionTimedOut(_)
                | EventType::WorkflowExecutionTerminated(_)
                | EventType::WorkflowExecutionCanceled(_)
                | EventType::WorkflowExecutionContinuedAsNew(_)
                | EventType::DecisionTaskScheduled(_)
                | EventType::DecisionTaskStarted(_)
                | EventType::DecisionTaskCompleted(_)
                | EventType::DecisionTaskFailed(_)
                | EventType::DecisionTaskTimedOut(_)
                | EventType::ActivityTaskScheduled(_)
                | EventType::ActivityTaskCancelRequested(_)
                | EventType::TimerStarted(_)
                | EventType::TimerCanceled(_)
                | EventType::CancelTimerFailed(_)
                | EventType::RequestCancelExternalWorkflowExecutionInitiated(_)
                | EventType::MarkerRecorded(_)
                | EventType::StartChildWorkflowExecutionInitiated(_)
                | EventType::SignalExternalWorkflowExecutionInitiated(_)
                | EventType::UpsertWorkflowSearchAttributes(_)
        )
    }

    /// True for the small set of events after which no further event may be
    /// appended in the same transaction (spec.md invariant list, item 4/6).
    pub fn is_workflow_closing(&self) -> bool {
        matches!(
            self,
            EventType::WorkflowExecutionCompleted(_)
                | EventType::WorkflowExecutionFailed(_)
                | EventType::WorkflowExecutionTimedOut(_)
                | EventType::WorkflowExecutionTerminated(_)
                | EventType::WorkflowExecutionCanceled(_)
                | EventType::WorkflowExecutionContinuedAsNew(_)
        )
    }

    /// True for the activity/child-workflow terminal event kinds the flush
    /// algorithm hoists to the end of the reordered batch (spec.md §4.1 step 2).
    pub fn is_hoisted_on_flush(&self) -> bool {
        matches!(
            self,
            EventType::ActivityTaskCompleted(_)
                | EventType::ActivityTaskFailed(_)
                | EventType::ActivityTaskCanceled(_)
                | EventType::ActivityTaskTimedOut(_)
                | EventType::ChildWorkflowExecutionCompleted(_)
                | EventType::ChildWorkflowExecutionFailed(_)
                | EventType::ChildWorkflowExecutionCanceled(_)
                | EventType::ChildWorkflowExecutionTerminated(_)
                | EventType::ChildWorkflowExecutionTimedOut(_)
        )
    }

    /// Short machine name, used in log fields and error message templates
    /// (spec.md §7 "stable message template that includes the triggering
    /// action tag").
    pub fn name(&self) -> &'static str {
        match self {
            EventType::WorkflowExecutionStarted(_) => "WorkflowExecutionStarted",
            EventType::WorkflowExecutionCompleted(_) => "WorkflowExecutionCompleted",
            EventType::WorkflowExecutionFailed(_) => "WorkflowExecutionFailed",
            EventType::WorkflowExecutionTimedOut(_) => "WorkflowExecutionTimedOut",
            EventType::WorkflowExecutionTerminated(_) => "WorkflowExecutionTerminated",
            EventType::WorkflowExecutionCanceled(_) => "WorkflowExecutionCanceled",
            EventType::WorkflowExecutionContinuedAsNew(_) => "WorkflowExecutionContinuedAsNew",
            EventType::WorkflowExecutionCancelRequested(_) => "WorkflowExecutionCancelRequested",
            EventType::WorkflowExecutionSignaled(_) => "WorkflowExecutionSignaled",
            EventType::UpsertWorkflowSearchAttributes(_) => "UpsertWorkflowSearchAttributes",
            EventType::MarkerRecorded(_) => "MarkerRecorded",
            EventType::DecisionTaskScheduled(_) => "DecisionTaskScheduled",
            EventType::DecisionTaskStarted(_) => "DecisionTaskStarted",
            EventType::DecisionTaskCompleted(_) => "DecisionTaskCompleted",
            EventType::DecisionTaskFailed(_) => "DecisionTaskFailed",
            EventType::DecisionTaskTimedOut(_) => "DecisionTaskTimedOut",
            EventType::ActivityTaskScheduled(_) => "ActivityTaskScheduled",
            EventType::ActivityTaskStarted(_) => "ActivityTaskStarted",
            EventType::ActivityTaskCompleted(_) => "ActivityTaskCompleted",
            EventType::ActivityTaskFailed(_) => "ActivityTaskFailed",
            EventType::ActivityTaskTimedOut(_) => "ActivityTaskTimedOut",
            EventType::ActivityTaskCancelRequested(_) => "ActivityTaskCancelRequested",
            EventType::ActivityTaskCanceled(_) => "ActivityTaskCanceled",
            EventType::RequestCancelActivityTaskFailed(_) => "RequestCancelActivityTaskFailed",
            EventType::TimerStarted(_) => "TimerStarted",
            EventType::TimerFired(_) => "TimerFired",
            EventType::TimerCanceled(_) => "TimerCanceled",
            EventType::CancelTimerFailed(_) => "CancelTimerFailed",
            EventType::StartChildWorkflowExecutionInitiated(_) => "StartChildWorkflowExecutionInitiated",
            EventType::ChildWorkflowExecutionStarted(_) => "ChildWorkflowExecutionStarted",
            EventType::ChildWorkflowExecutionCompleted(_) => "ChildWorkflowExecutionCompleted",
            EventType::ChildWorkflowExecutionFailed(_) => "ChildWorkflowExecutionFailed",
            EventType::ChildWorkflowExecutionCanceled(_) => "ChildWorkflowExecutionCanceled",
            EventType::ChildWorkflowExecutionTerminated(_) => "ChildWorkflowExecutionTerminated",
            EventType::ChildWorkflowExecutionTimedOut(_) => "ChildWorkflowExecutionTimedOut",
            EventType::StartChildWorkflowExecutionFailed(_) => "StartChildWorkflowExecutionFailed",
            EventType::RequestCancelExternalWorkflowExecutionInitiated(_) => {
                "RequestCancelExternalWorkflowExecutionInitiated"
            }
            EventType::ExternalWorkflowExecutionCancelRequested(_) => "ExternalWorkflowExecutionCancelRequested",
            EventType::RequestCancelExternalWorkflowExecutionFailed(_) => {
                "RequestCancelExternalWorkflowExecutionFailed"
            }
            EventType::SignalExternalWorkflowExecutionInitiated(_) => "SignalExternalWorkflowExecutionInitiated",
            EventType::ExternalWorkflowExecutionSignaled(_) => "ExternalWorkflowExecutionSignaled",
            EventType::SignalExternalWorkflowExecutionFailed(_) => "SignalExternalWorkflowExecutionFailed",
        }
    }
}

/// One entry in a workflow's history (spec.md §6 "Event schema").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub event_id: EventId,
    pub version: Version,
    /// Nanoseconds since the Unix epoch.
    pub timestamp_ns: i64,
    pub task_id: i64,
    pub event_type: EventType,
}

impl HistoryEvent {
    pub fn new(event_id: EventId, version: Version, timestamp_ns: i64, event_type: EventType) -> Self {
        Self { event_id, version, timestamp_ns, task_id: crate::sentinel::EMPTY_EVENT_TASK_ID, event_type }
    }

    pub fn is_bufferable(&self) -> bool {
        self.event_type.is_bufferable()
    }

    pub fn is_workflow_closing(&self) -> bool {
        self.event_type.is_workflow_closing()
    }
}

/// Alias kept for call sites that only care about "an event", not its
/// storage envelope specifically.
pub type Event = HistoryEvent;

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
