//! Execution Info: the one-per-workflow-execution mutable aggregate
//! (spec.md §3).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::event::EventId;
use crate::ids::{BranchToken, DomainId, RequestId, RunId, TaskListId, WorkflowId, WorkflowTypeName};
use crate::Version;

/// `executionInfo.state` (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowState {
    Void,
    Created,
    Running,
    Completed,
    Zombie,
    Corrupted,
}

crate::simple_display! {
    WorkflowState {
        Void => "Void",
        Created => "Created",
        Running => "Running",
        Completed => "Completed",
        Zombie => "Zombie",
        Corrupted => "Corrupted",
    }
}

/// `executionInfo.closeStatus` (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseStatus {
    None,
    Completed,
    Failed,
    Canceled,
    TimedOut,
    ContinuedAsNew,
    Terminated,
}

crate::simple_display! {
    CloseStatus {
        None => "None",
        Completed => "Completed",
        Failed => "Failed",
        Canceled => "Canceled",
        TimedOut => "TimedOut",
        ContinuedAsNew => "ContinuedAsNew",
        Terminated => "Terminated",
    }
}

/// A single binary-checksum auto-reset point (spec.md §4.1 "Auto-reset points").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetPoint {
    pub binary_checksum: String,
    pub run_id: RunId,
    pub first_decision_completed_id: EventId,
    pub created_at_ns: i64,
    pub expiring_at_ns: Option<i64>,
    pub resettable: bool,
}

/// Retry-policy fields carried on the execution (spec.md §3), consulted by
/// the activity retry computation and by continue-as-new's retry-initiated path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryState {
    pub attempt: i32,
    pub expiration_time_ns: Option<i64>,
    pub initial_interval_secs: i32,
    pub backoff_coefficient: f64,
    pub maximum_interval_secs: i32,
    pub maximum_attempts: i32,
    pub non_retriable_error_reasons: Vec<String>,
}

impl Default for RetryState {
    fn default() -> Self {
        Self {
            attempt: 0,
            expiration_time_ns: None,
            initial_interval_secs: 1,
            backoff_coefficient: 2.0,
            maximum_interval_secs: 100,
            maximum_attempts: 0,
            non_retriable_error_reasons: Vec::new(),
        }
    }
}

/// The decision-task fields embedded directly in execution info (spec.md §3:
/// "decision fields"). [`crate::decision` — owned by `wfengine`'s
/// `DecisionTaskManager`, which is the only code that mutates these through
/// its state-machine operations] reads and writes this struct; it is kept
/// here (not split out) because spec.md explicitly places these fields on
/// the execution aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionFields {
    pub version: Version,
    pub schedule_id: EventId,
    pub started_id: EventId,
    pub request_id: Option<RequestId>,
    pub timeout_secs: i32,
    pub attempt: i32,
    pub scheduled_timestamp_ns: i64,
    pub started_timestamp_ns: i64,
    pub originally_scheduled_timestamp_ns: i64,
    pub sticky_task_list: Option<TaskListId>,
    pub sticky_task_list_stale_after_ns: i64,
}

impl Default for DecisionFields {
    fn default() -> Self {
        Self {
            version: crate::sentinel::EMPTY_VERSION,
            schedule_id: crate::sentinel::EMPTY_EVENT_ID,
            started_id: crate::sentinel::EMPTY_EVENT_ID,
            request_id: None,
            timeout_secs: 0,
            attempt: 0,
            scheduled_timestamp_ns: 0,
            started_timestamp_ns: 0,
            originally_scheduled_timestamp_ns: 0,
            sticky_task_list: None,
            sticky_task_list_stale_after_ns: 0,
        }
    }
}

/// The one-per-execution mutable aggregate (spec.md §3 "Execution Info").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionInfo {
    pub domain_id: DomainId,
    pub workflow_id: WorkflowId,
    pub run_id: RunId,
    pub parent_domain_id: Option<DomainId>,
    pub parent_workflow_id: Option<WorkflowId>,
    pub parent_run_id: Option<RunId>,
    pub parent_initiated_event_id: Option<EventId>,

    pub workflow_type_name: WorkflowTypeName,
    pub task_list: TaskListId,

    pub workflow_timeout_secs: i32,
    pub decision_timeout_secs: i32,
    pub default_activity_timeout_secs: i32,

    pub state: WorkflowState,
    pub close_status: CloseStatus,

    pub decision: DecisionFields,

    /// Monotonic, starts at 1 (spec.md invariant).
    pub next_event_id: EventId,
    pub last_first_event_id: EventId,
    pub last_processed_event: EventId,
    pub last_event_task_id: i64,

    pub cancel_requested: bool,
    pub cancel_request_id: Option<RequestId>,

    pub signal_count: i64,

    pub retry: RetryState,
    pub cron_schedule: Option<String>,

    pub search_attributes: BTreeMap<String, Vec<u8>>,
    pub memo: BTreeMap<String, Vec<u8>>,

    pub auto_reset_points: Vec<ResetPoint>,

    pub completion_event_batch_id: Option<EventId>,
    pub branch_token: BranchToken,

    /// Wall-clock of the last successful transaction close (spec.md §4.3
    /// "Bookkeeping": "update lastUpdatedTimestamp").
    pub last_updated_timestamp_ns: i64,
}

impl ExecutionInfo {
    /// A freshly initialized execution (spec.md §3 "Lifecycles" — state Void).
    pub fn new_void(domain_id: DomainId, workflow_id: WorkflowId, run_id: RunId) -> Self {
        Self {
            domain_id,
            workflow_id,
            run_id,
            parent_domain_id: None,
            parent_workflow_id: None,
            parent_run_id: None,
            parent_initiated_event_id: None,
            workflow_type_name: WorkflowTypeName::default(),
            task_list: TaskListId::default(),
            workflow_timeout_secs: 0,
            decision_timeout_secs: 0,
            default_activity_timeout_secs: 0,
            state: WorkflowState::Void,
            close_status: CloseStatus::None,
            decision: DecisionFields::default(),
            next_event_id: crate::sentinel::FIRST_EVENT_ID,
            last_first_event_id: crate::sentinel::FIRST_EVENT_ID,
            last_processed_event: crate::sentinel::EMPTY_EVENT_ID,
            last_event_task_id: crate::sentinel::EMPTY_EVENT_TASK_ID,
            cancel_requested: false,
            cancel_request_id: None,
            signal_count: 0,
            retry: RetryState::default(),
            cron_schedule: None,
            search_attributes: BTreeMap::new(),
            memo: BTreeMap::new(),
            auto_reset_points: Vec::new(),
            completion_event_batch_id: None,
            branch_token: BranchToken::default(),
            last_updated_timestamp_ns: 0,
        }
    }

    /// `state ∈ {Created, Running}` (spec.md §4.1 Add-path precondition).
    pub fn is_mutable(&self) -> bool {
        matches!(self.state, WorkflowState::Created | WorkflowState::Running)
    }

    /// Has a pending or in-flight decision task.
    pub fn has_pending_decision(&self) -> bool {
        self.decision.schedule_id != crate::sentinel::EMPTY_EVENT_ID
    }

    /// `HasInFlightDecision ⇔ state = Started` (spec.md §4.2 invariant).
    pub fn has_in_flight_decision(&self) -> bool {
        self.decision.started_id != crate::sentinel::EMPTY_EVENT_ID
    }

    /// Allocate the next event ID and advance the counter.
    pub fn take_next_event_id(&mut self) -> EventId {
        let id = self.next_event_id;
        self.next_event_id += 1;
        id
    }

    /// `IsCurrentWorkflowGuaranteed` (spec.md §4.1): true iff we *know*,
    /// without a persistence round-trip, that this is the current run for
    /// its `(domainID, workflowID)`.
    pub fn is_current_workflow_guaranteed(&self) -> bool {
        matches!(self.state, WorkflowState::Created | WorkflowState::Running)
    }
}

#[cfg(test)]
#[path = "execution_info_tests.rs"]
mod tests;
