//! Child-workflow-execution `Add<X>`/`Replicate<X>` pairs (spec.md §4.1
//! "Event coverage": "child workflow initiated / started / completed /
//! failed / canceled / terminated / timed-out / start failed").

use wfcore::child_execution::ChildExecutionInfo;
use wfcore::event::{
    ChildWorkflowExecutionCanceledAttrs, ChildWorkflowExecutionCompletedAttrs, ChildWorkflowExecutionFailedAttrs,
    ChildWorkflowExecutionInitiatedAttrs, ChildWorkflowExecutionStartedAttrs, ChildWorkflowExecutionTerminatedAttrs,
    ChildWorkflowExecutionTimedOutAttrs, EventId, EventType, ParentClosePolicy,
    StartChildWorkflowExecutionFailedAttrs,
};
use wfcore::ids::{RunId, WorkflowId, WorkflowTypeName};
use wfcore::{HistoryEvent, TransferTask, Version};

use crate::error::{InvalidHistoryActionKind, MutableStateError, Result};

use super::MutableState;

const ACTION: &str = "AddChildWorkflowExecutionEvent";
const ENTITY: &str = "ChildExecutionInfo";

fn missing(action: &'static str, initiated_id: EventId) -> MutableStateError {
    MutableStateError::MissingEntity { entity_kind: ENTITY, action, key: initiated_id.to_string() }
}

fn bad_event(reason: &'static str) -> MutableStateError {
    MutableStateError::invalid_history_action(ACTION, reason, InvalidHistoryActionKind::InternalServerError)
}

/// Parameters for `AddStartChildWorkflowExecutionInitiatedEvent`, grouped
/// the way `oj_core::job::JobSpec` groups a dispatch request's fields.
#[derive(Debug, Clone)]
pub struct InitiateChildWorkflow {
    pub workflow_id: WorkflowId,
    pub workflow_type: WorkflowTypeName,
    pub target_domain: String,
    pub input: Vec<u8>,
    pub parent_close_policy: ParentClosePolicy,
    pub decision_task_completed_event_id: EventId,
    pub create_request_id: String,
}

impl MutableState {
    pub fn add_start_child_workflow_execution_initiated_event(
        &mut self,
        version: Version,
        now_ns: i64,
        request: InitiateChildWorkflow,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::StartChildWorkflowExecutionInitiated(ChildWorkflowExecutionInitiatedAttrs {
                workflow_id: request.workflow_id.clone(),
                workflow_type: request.workflow_type.clone(),
                target_domain: request.target_domain.clone(),
                input: request.input.clone(),
                parent_close_policy: request.parent_close_policy,
                decision_task_completed_event_id: request.decision_task_completed_event_id,
            }),
            version,
            now_ns,
        );
        self.replicate_start_child_workflow_execution_initiated_event(&event, request.create_request_id, &request.workflow_type)?;
        self.deltas.transfer_tasks.push(TransferTask::StartChildExecution { initiated_id: event.event_id });
        Ok(event)
    }

    fn replicate_start_child_workflow_execution_initiated_event(
        &mut self,
        event: &HistoryEvent,
        create_request_id: String,
        workflow_type: &WorkflowTypeName,
    ) -> Result<()> {
        let EventType::StartChildWorkflowExecutionInitiated(attrs) = &event.event_type else {
            return Err(bad_event("expected StartChildWorkflowExecutionInitiated"));
        };
        let info = ChildExecutionInfo {
            version: event.version,
            initiated_id: event.event_id,
            initiated_event_batch_id: event.event_id,
            started_id: wfcore::sentinel::EMPTY_EVENT_ID,
            started_workflow_id: None,
            started_run_id: None,
            create_request_id,
            target_domain_name: attrs.target_domain.clone(),
            workflow_type_name: workflow_type.clone(),
            parent_close_policy: attrs.parent_close_policy,
        };
        self.children.insert(info.clone());
        self.deltas.children.upsert(event.event_id, info);
        Ok(())
    }

    pub fn add_child_workflow_execution_started_event(
        &mut self,
        version: Version,
        now_ns: i64,
        initiated_id: EventId,
        workflow_id: WorkflowId,
        run_id: RunId,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let child = self.children.get(initiated_id).ok_or_else(|| missing(ACTION, initiated_id))?;
        let workflow_type = child.workflow_type_name.clone();
        let event = self.create_new_history_event(
            EventType::ChildWorkflowExecutionStarted(ChildWorkflowExecutionStartedAttrs {
                initiated_event_id: initiated_id,
                workflow_id: workflow_id.clone(),
                run_id,
                workflow_type,
            }),
            version,
            now_ns,
        );
        self.replicate_child_workflow_execution_started_event(&event)?;
        Ok(event)
    }

    pub fn replicate_child_workflow_execution_started_event(&mut self, event: &HistoryEvent) -> Result<()> {
        let EventType::ChildWorkflowExecutionStarted(attrs) = &event.event_type else {
            return Err(bad_event("expected ChildWorkflowExecutionStarted"));
        };
        let info = self
            .children
            .get_mut(attrs.initiated_event_id)
            .ok_or_else(|| missing(ACTION, attrs.initiated_event_id))?;
        info.started_id = event.event_id;
        info.started_workflow_id = Some(attrs.workflow_id.clone());
        info.started_run_id = Some(attrs.run_id);
        self.deltas.children.upsert(attrs.initiated_event_id, info.clone());
        Ok(())
    }

    /// Shared implementation for completed/failed/canceled/terminated/
    /// timed-out: each removes the pending child on application (spec.md §3
    /// invariant: a terminal child event always has a matching
    /// `ChildExecutionInfo` that is removed once applied).
    fn complete_child(&mut self, initiated_id: EventId) -> Result<()> {
        self.children.remove(initiated_id).ok_or_else(|| missing(ACTION, initiated_id))?;
        self.deltas.children.delete(initiated_id);
        Ok(())
    }

    pub fn add_child_workflow_execution_completed_event(
        &mut self,
        version: Version,
        now_ns: i64,
        initiated_id: EventId,
        started_id: EventId,
        workflow_id: WorkflowId,
        run_id: RunId,
        result: Vec<u8>,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::ChildWorkflowExecutionCompleted(ChildWorkflowExecutionCompletedAttrs {
                initiated_event_id: initiated_id,
                started_event_id: started_id,
                workflow_id,
                run_id,
                result,
            }),
            version,
            now_ns,
        );
        self.replicate_child_workflow_execution_completed_event(&event)?;
        Ok(event)
    }

    pub fn replicate_child_workflow_execution_completed_event(&mut self, event: &HistoryEvent) -> Result<()> {
        let EventType::ChildWorkflowExecutionCompleted(attrs) = &event.event_type else {
            return Err(bad_event("expected ChildWorkflowExecutionCompleted"));
        };
        self.complete_child(attrs.initiated_event_id)
    }

    pub fn add_child_workflow_execution_failed_event(
        &mut self,
        version: Version,
        now_ns: i64,
        initiated_id: EventId,
        started_id: EventId,
        workflow_id: WorkflowId,
        run_id: RunId,
        reason: String,
        details: Vec<u8>,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::ChildWorkflowExecutionFailed(ChildWorkflowExecutionFailedAttrs {
                initiated_event_id: initiated_id,
                started_event_id: started_id,
                workflow_id,
                run_id,
                reason,
                details,
            }),
            version,
            now_ns,
        );
        self.replicate_child_workflow_execution_failed_event(&event)?;
        Ok(event)
    }

    pub fn replicate_child_workflow_execution_failed_event(&mut self, event: &HistoryEvent) -> Result<()> {
        let EventType::ChildWorkflowExecutionFailed(attrs) = &event.event_type else {
            return Err(bad_event("expected ChildWorkflowExecutionFailed"));
        };
        self.complete_child(attrs.initiated_event_id)
    }

    pub fn add_child_workflow_execution_canceled_event(
        &mut self,
        version: Version,
        now_ns: i64,
        initiated_id: EventId,
        started_id: EventId,
        workflow_id: WorkflowId,
        run_id: RunId,
        details: Vec<u8>,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::ChildWorkflowExecutionCanceled(ChildWorkflowExecutionCanceledAttrs {
                initiated_event_id: initiated_id,
                started_event_id: started_id,
                workflow_id,
                run_id,
                details,
            }),
            version,
            now_ns,
        );
        self.replicate_child_workflow_execution_canceled_event(&event)?;
        Ok(event)
    }

    pub fn replicate_child_workflow_execution_canceled_event(&mut self, event: &HistoryEvent) -> Result<()> {
        let EventType::ChildWorkflowExecutionCanceled(attrs) = &event.event_type else {
            return Err(bad_event("expected ChildWorkflowExecutionCanceled"));
        };
        self.complete_child(attrs.initiated_event_id)
    }

    pub fn add_child_workflow_execution_terminated_event(
        &mut self,
        version: Version,
        now_ns: i64,
        initiated_id: EventId,
        started_id: EventId,
        workflow_id: WorkflowId,
        run_id: RunId,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::ChildWorkflowExecutionTerminated(ChildWorkflowExecutionTerminatedAttrs {
                initiated_event_id: initiated_id,
                started_event_id: started_id,
                workflow_id,
                run_id,
            }),
            version,
            now_ns,
        );
        self.replicate_child_workflow_execution_terminated_event(&event)?;
        Ok(event)
    }

    pub fn replicate_child_workflow_execution_terminated_event(&mut self, event: &HistoryEvent) -> Result<()> {
        let EventType::ChildWorkflowExecutionTerminated(attrs) = &event.event_type else {
            return Err(bad_event("expected ChildWorkflowExecutionTerminated"));
        };
        self.complete_child(attrs.initiated_event_id)
    }

    pub fn add_child_workflow_execution_timed_out_event(
        &mut self,
        version: Version,
        now_ns: i64,
        initiated_id: EventId,
        started_id: EventId,
        workflow_id: WorkflowId,
        run_id: RunId,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::ChildWorkflowExecutionTimedOut(ChildWorkflowExecutionTimedOutAttrs {
                initiated_event_id: initiated_id,
                started_event_id: started_id,
                workflow_id,
                run_id,
            }),
            version,
            now_ns,
        );
        self.replicate_child_workflow_execution_timed_out_event(&event)?;
        Ok(event)
    }

    pub fn replicate_child_workflow_execution_timed_out_event(&mut self, event: &HistoryEvent) -> Result<()> {
        let EventType::ChildWorkflowExecutionTimedOut(attrs) = &event.event_type else {
            return Err(bad_event("expected ChildWorkflowExecutionTimedOut"));
        };
        self.complete_child(attrs.initiated_event_id)
    }

    /// `AddStartChildWorkflowExecutionFailedEvent`: the child never started
    /// (e.g. already-exists on the target domain). Removes the pending
    /// entry without ever having seen a started event.
    pub fn add_start_child_workflow_execution_failed_event(
        &mut self,
        version: Version,
        now_ns: i64,
        initiated_id: EventId,
        workflow_id: WorkflowId,
        workflow_type: WorkflowTypeName,
        cause: String,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::StartChildWorkflowExecutionFailed(StartChildWorkflowExecutionFailedAttrs {
                initiated_event_id: initiated_id,
                workflow_id,
                workflow_type,
                cause,
            }),
            version,
            now_ns,
        );
        self.replicate_start_child_workflow_execution_failed_event(&event)?;
        Ok(event)
    }

    pub fn replicate_start_child_workflow_execution_failed_event(&mut self, event: &HistoryEvent) -> Result<()> {
        let EventType::StartChildWorkflowExecutionFailed(attrs) = &event.event_type else {
            return Err(bad_event("expected StartChildWorkflowExecutionFailed"));
        };
        self.complete_child(attrs.initiated_event_id)
    }
}

#[cfg(test)]
#[path = "child_tests.rs"]
mod tests;
