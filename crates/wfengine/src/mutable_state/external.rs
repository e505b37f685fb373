//! External-workflow request-cancel/signal `Add<X>`/`Replicate<X>` pairs
//! (spec.md §4.1 "Event coverage": "request-cancel-external initiated /
//! succeeded / failed", "signal-external initiated / succeeded / failed").

use wfcore::event::{
    EventId, EventType, ExternalWorkflowExecutionCancelRequestedAttrs, ExternalWorkflowExecutionSignaledAttrs,
    RequestCancelExternalWorkflowExecutionFailedAttrs, RequestCancelExternalWorkflowExecutionInitiatedAttrs,
    SignalExternalWorkflowExecutionFailedAttrs, SignalExternalWorkflowExecutionInitiatedAttrs,
};
use wfcore::ids::{RequestId, RunId, SignalName, WorkflowId};
use wfcore::request_cancel::RequestCancelInfo;
use wfcore::signal::SignalInfo;
use wfcore::{HistoryEvent, TransferTask, Version};

use crate::error::{InvalidHistoryActionKind, MutableStateError, Result};

use super::MutableState;

const ACTION: &str = "AddExternalWorkflowEvent";

fn missing(entity_kind: &'static str, action: &'static str, initiated_id: EventId) -> MutableStateError {
    MutableStateError::MissingEntity { entity_kind, action, key: initiated_id.to_string() }
}

fn bad_event(reason: &'static str) -> MutableStateError {
    MutableStateError::invalid_history_action(ACTION, reason, InvalidHistoryActionKind::InternalServerError)
}

impl MutableState {
    pub fn add_request_cancel_external_workflow_execution_initiated_event(
        &mut self,
        version: Version,
        now_ns: i64,
        decision_task_completed_event_id: EventId,
        workflow_id: WorkflowId,
        run_id: Option<RunId>,
        domain: String,
        control: Vec<u8>,
        request_id: RequestId,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::RequestCancelExternalWorkflowExecutionInitiated(
                RequestCancelExternalWorkflowExecutionInitiatedAttrs {
                    workflow_id: workflow_id.clone(),
                    run_id,
                    domain: domain.clone(),
                    control: control.clone(),
                    decision_task_completed_event_id,
                },
            ),
            version,
            now_ns,
        );
        self.replicate_request_cancel_external_workflow_execution_initiated_event(&event, request_id)?;
        self.deltas.transfer_tasks.push(TransferTask::CancelExecution {
            target_workflow_id: workflow_id,
            target_run_id: run_id.unwrap_or_default(),
            initiated_id: event.event_id,
        });
        Ok(event)
    }

    fn replicate_request_cancel_external_workflow_execution_initiated_event(
        &mut self,
        event: &HistoryEvent,
        request_id: RequestId,
    ) -> Result<()> {
        if !matches!(event.event_type, EventType::RequestCancelExternalWorkflowExecutionInitiated(_)) {
            return Err(bad_event("expected RequestCancelExternalWorkflowExecutionInitiated"));
        }
        let info = RequestCancelInfo {
            version: event.version,
            initiated_id: event.event_id,
            initiated_event_batch_id: event.event_id,
            request_id,
        };
        self.request_cancels.insert(info.clone());
        self.deltas.request_cancels.upsert(event.event_id, info);
        Ok(())
    }

    fn remove_request_cancel(&mut self, initiated_id: EventId) -> Result<RequestCancelInfo> {
        let info = self
            .request_cancels
            .remove(initiated_id)
            .ok_or_else(|| missing("RequestCancelInfo", ACTION, initiated_id))?;
        self.deltas.request_cancels.delete(initiated_id);
        Ok(info)
    }

    pub fn add_external_workflow_execution_cancel_requested_event(
        &mut self,
        version: Version,
        now_ns: i64,
        initiated_id: EventId,
        workflow_id: WorkflowId,
        run_id: RunId,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::ExternalWorkflowExecutionCancelRequested(ExternalWorkflowExecutionCancelRequestedAttrs {
                initiated_event_id: initiated_id,
                workflow_id,
                run_id,
            }),
            version,
            now_ns,
        );
        self.replicate_external_workflow_execution_cancel_requested_event(&event)?;
        Ok(event)
    }

    pub fn replicate_external_workflow_execution_cancel_requested_event(&mut self, event: &HistoryEvent) -> Result<()> {
        let EventType::ExternalWorkflowExecutionCancelRequested(attrs) = &event.event_type else {
            return Err(bad_event("expected ExternalWorkflowExecutionCancelRequested"));
        };
        self.remove_request_cancel(attrs.initiated_event_id)?;
        Ok(())
    }

    pub fn add_request_cancel_external_workflow_execution_failed_event(
        &mut self,
        version: Version,
        now_ns: i64,
        initiated_id: EventId,
        workflow_id: WorkflowId,
        run_id: Option<RunId>,
        cause: String,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::RequestCancelExternalWorkflowExecutionFailed(
                RequestCancelExternalWorkflowExecutionFailedAttrs {
                    initiated_event_id: initiated_id,
                    workflow_id,
                    run_id,
                    cause,
                },
            ),
            version,
            now_ns,
        );
        self.replicate_request_cancel_external_workflow_execution_failed_event(&event)?;
        Ok(event)
    }

    pub fn replicate_request_cancel_external_workflow_execution_failed_event(
        &mut self,
        event: &HistoryEvent,
    ) -> Result<()> {
        let EventType::RequestCancelExternalWorkflowExecutionFailed(attrs) = &event.event_type else {
            return Err(bad_event("expected RequestCancelExternalWorkflowExecutionFailed"));
        };
        self.remove_request_cancel(attrs.initiated_event_id)?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_signal_external_workflow_execution_initiated_event(
        &mut self,
        version: Version,
        now_ns: i64,
        decision_task_completed_event_id: EventId,
        workflow_id: WorkflowId,
        run_id: Option<RunId>,
        domain: String,
        signal_name: SignalName,
        input: Vec<u8>,
        control: Vec<u8>,
        request_id: RequestId,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::SignalExternalWorkflowExecutionInitiated(SignalExternalWorkflowExecutionInitiatedAttrs {
                workflow_id: workflow_id.clone(),
                run_id,
                domain: domain.clone(),
                signal_name: signal_name.clone(),
                input: input.clone(),
                control: control.clone(),
                decision_task_completed_event_id,
            }),
            version,
            now_ns,
        );
        self.replicate_signal_external_workflow_execution_initiated_event(&event, request_id)?;
        self.deltas.transfer_tasks.push(TransferTask::SignalExecution {
            target_workflow_id: workflow_id,
            target_run_id: run_id.unwrap_or_default(),
            initiated_id: event.event_id,
        });
        Ok(event)
    }

    fn replicate_signal_external_workflow_execution_initiated_event(
        &mut self,
        event: &HistoryEvent,
        request_id: RequestId,
    ) -> Result<()> {
        let EventType::SignalExternalWorkflowExecutionInitiated(attrs) = &event.event_type else {
            return Err(bad_event("expected SignalExternalWorkflowExecutionInitiated"));
        };
        let info = SignalInfo {
            version: event.version,
            initiated_id: event.event_id,
            initiated_event_batch_id: event.event_id,
            request_id,
            signal_name: attrs.signal_name.clone(),
            input: attrs.input.clone(),
            control: attrs.control.clone(),
        };
        self.signals.insert(info.clone());
        self.deltas.signals.upsert(event.event_id, info);
        Ok(())
    }

    fn remove_signal(&mut self, initiated_id: EventId) -> Result<SignalInfo> {
        let info = self.signals.remove(initiated_id).ok_or_else(|| missing("SignalInfo", ACTION, initiated_id))?;
        self.deltas.signals.delete(initiated_id);
        Ok(info)
    }

    pub fn add_external_workflow_execution_signaled_event(
        &mut self,
        version: Version,
        now_ns: i64,
        initiated_id: EventId,
        workflow_id: WorkflowId,
        run_id: RunId,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::ExternalWorkflowExecutionSignaled(ExternalWorkflowExecutionSignaledAttrs {
                initiated_event_id: initiated_id,
                workflow_id,
                run_id,
            }),
            version,
            now_ns,
        );
        self.replicate_external_workflow_execution_signaled_event(&event)?;
        Ok(event)
    }

    pub fn replicate_external_workflow_execution_signaled_event(&mut self, event: &HistoryEvent) -> Result<()> {
        let EventType::ExternalWorkflowExecutionSignaled(attrs) = &event.event_type else {
            return Err(bad_event("expected ExternalWorkflowExecutionSignaled"));
        };
        self.remove_signal(attrs.initiated_event_id)?;
        Ok(())
    }

    pub fn add_signal_external_workflow_execution_failed_event(
        &mut self,
        version: Version,
        now_ns: i64,
        initiated_id: EventId,
        workflow_id: WorkflowId,
        run_id: Option<RunId>,
        cause: String,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::SignalExternalWorkflowExecutionFailed(SignalExternalWorkflowExecutionFailedAttrs {
                initiated_event_id: initiated_id,
                workflow_id,
                run_id,
                cause,
            }),
            version,
            now_ns,
        );
        self.replicate_signal_external_workflow_execution_failed_event(&event)?;
        Ok(event)
    }

    pub fn replicate_signal_external_workflow_execution_failed_event(&mut self, event: &HistoryEvent) -> Result<()> {
        let EventType::SignalExternalWorkflowExecutionFailed(attrs) = &event.event_type else {
            return Err(bad_event("expected SignalExternalWorkflowExecutionFailed"));
        };
        self.remove_signal(attrs.initiated_event_id)?;
        Ok(())
    }

    /// `RecordExternalSignalRequested` / dedup against
    /// [`wfcore::signal::SignalRequestedIds`]: true if newly recorded
    /// (spec.md §3 "Signal-Requested Set").
    pub fn record_signal_requested(&mut self, request_id: RequestId) -> bool {
        let newly_inserted = self.signal_requested_ids.insert(request_id.clone());
        if newly_inserted {
            self.deltas.signal_requested_ids.upsert(request_id.clone(), request_id);
        }
        newly_inserted
    }
}

#[cfg(test)]
#[path = "external_tests.rs"]
mod tests;
