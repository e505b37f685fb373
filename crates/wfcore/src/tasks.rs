//! Side-effect task shapes the Task Generator derives from events and
//! closures (spec.md §2 "Task Generator... Interface-level here.").
//!
//! The core only needs to know the shape of these tasks well enough to
//! enqueue them as part of a transaction's mutation/snapshot; the queue
//! processors that actually execute them are out of scope (spec.md §1).

use serde::{Deserialize, Serialize};

use crate::event::EventId;
use crate::ids::{ActivityId, BranchToken, TimerId};
use crate::Version;

/// Tasks that drive forward activity/decision dispatch and workflow closure
/// (the "transfer" queue in the source system).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransferTask {
    ActivityTask { schedule_id: EventId, task_list: crate::ids::TaskListId },
    DecisionTask { schedule_id: EventId, task_list: crate::ids::TaskListId },
    CloseExecution,
    CancelExecution { target_workflow_id: crate::ids::WorkflowId, target_run_id: crate::ids::RunId, initiated_id: EventId },
    SignalExecution { target_workflow_id: crate::ids::WorkflowId, target_run_id: crate::ids::RunId, initiated_id: EventId },
    StartChildExecution { initiated_id: EventId },
    /// Generated when a domain's bad-binary checksum matches a reset point
    /// (spec.md §4.3 step 3).
    ResetWorkflow { reset_point_event_id: EventId },
    UpsertSearchAttributes,
}

/// Timer-queue tasks: activity/user-timer/decision-timeout/workflow-timeout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimerTask {
    /// Covers `scheduleToStart`/`scheduleToClose`/`startToClose`/`heartbeat`.
    ActivityTimeout { schedule_id: EventId, fire_time_ns: i64 },
    UserTimer { timer_id: TimerId, fire_time_ns: i64 },
    DecisionTimeout { schedule_id: EventId, fire_time_ns: i64 },
    WorkflowTimeout { fire_time_ns: i64 },
    /// Generated by `AddActivityRetry` (spec.md §4.1 "Activity retry").
    ActivityRetry { schedule_id: EventId, fire_time_ns: i64, attempt: i32 },
}

/// Replication-queue tasks (spec.md §4.3 "Replication tasks").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplicationTask {
    History {
        first_event_id: EventId,
        next_event_id: EventId,
        version: Version,
        branch_token: BranchToken,
    },
    /// Propagates in-progress activity state without emitting a history
    /// event (GLOSSARY "Sync-activity task").
    SyncActivity { activity_id: ActivityId, schedule_id: EventId, version: Version },
}
