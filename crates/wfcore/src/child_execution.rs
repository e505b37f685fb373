//! Pending child workflow executions, keyed by `initiatedEventID` (spec.md
//! §3 "Child Execution Info").

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::event::{EventId, ParentClosePolicy};
use crate::ids::{RunId, WorkflowId, WorkflowTypeName};
use crate::Version;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildExecutionInfo {
    pub version: Version,
    pub initiated_id: EventId,
    pub initiated_event_batch_id: EventId,
    /// `EmptyEventID` until a `ChildWorkflowExecutionStarted` event is
    /// applied (spec.md §3 invariant).
    pub started_id: EventId,
    pub started_workflow_id: Option<WorkflowId>,
    pub started_run_id: Option<RunId>,
    pub create_request_id: String,
    pub target_domain_name: String,
    pub workflow_type_name: WorkflowTypeName,
    pub parent_close_policy: ParentClosePolicy,
}

impl ChildExecutionInfo {
    pub fn is_started(&self) -> bool {
        self.started_id != crate::sentinel::EMPTY_EVENT_ID
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingChildExecutions {
    by_initiated_id: HashMap<EventId, ChildExecutionInfo>,
}

impl PendingChildExecutions {
    pub fn insert(&mut self, info: ChildExecutionInfo) {
        self.by_initiated_id.insert(info.initiated_id, info);
    }

    pub fn get(&self, initiated_id: EventId) -> Option<&ChildExecutionInfo> {
        self.by_initiated_id.get(&initiated_id)
    }

    pub fn get_mut(&mut self, initiated_id: EventId) -> Option<&mut ChildExecutionInfo> {
        self.by_initiated_id.get_mut(&initiated_id)
    }

    pub fn remove(&mut self, initiated_id: EventId) -> Option<ChildExecutionInfo> {
        self.by_initiated_id.remove(&initiated_id)
    }

    pub fn len(&self) -> usize {
        self.by_initiated_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_initiated_id.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &ChildExecutionInfo> {
        self.by_initiated_id.values()
    }
}

#[cfg(test)]
#[path = "child_execution_tests.rs"]
mod tests;
