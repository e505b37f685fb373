//! Workflow-lifecycle `Add<X>`/`Replicate<X>` pairs (spec.md §4.1 "Event
//! coverage": "workflow started / completed / failed / timed-out /
//! terminated / canceled / continued-as-new / cancel-requested / signaled /
//! search-attributes-upserted / marker-recorded").

use std::collections::BTreeMap;

use wfcore::event::{
    ContinuedAsNewAttrs, ContinuedAsNewInitiator, EventType, MarkerRecordedAttrs,
    SearchAttributesUpsertedAttrs, WorkflowCancelRequestedAttrs, WorkflowClosedAttrs, WorkflowSignaledAttrs,
    WorkflowStartedAttrs,
};
use wfcore::execution_info::RetryState;
use wfcore::ids::{RequestId, RunId, SignalName, TaskListId, WorkflowTypeName};
use wfcore::{CloseStatus, ExecutionInfo, HistoryEvent, Version, WorkflowState};

use crate::error::{InvalidHistoryActionKind, MutableStateError, Result};

use super::MutableState;

const ACTION: &str = "AddWorkflowExecutionEvent";

fn closing_event_type(close_status: CloseStatus, attrs: WorkflowClosedAttrs) -> EventType {
    match close_status {
        CloseStatus::Completed => EventType::WorkflowExecutionCompleted(attrs),
        CloseStatus::Failed => EventType::WorkflowExecutionFailed(attrs),
        CloseStatus::TimedOut => EventType::WorkflowExecutionTimedOut(attrs),
        CloseStatus::Terminated => EventType::WorkflowExecutionTerminated(attrs),
        CloseStatus::Canceled => EventType::WorkflowExecutionCanceled(attrs),
        CloseStatus::None | CloseStatus::ContinuedAsNew => {
            unreachable!("closing_event_type called with a non-closing status")
        }
    }
}

impl MutableState {
    /// `AddWorkflowExecutionStartedEvent`. Only valid on a freshly
    /// constructed (state `Void`) execution.
    #[allow(clippy::too_many_arguments)]
    pub fn add_workflow_execution_started(
        &mut self,
        version: Version,
        now_ns: i64,
        attrs: WorkflowStartedAttrs,
    ) -> Result<HistoryEvent> {
        if self.execution_info.state != WorkflowState::Void {
            return Err(MutableStateError::invalid_history_action(
                ACTION,
                "workflow started on an already-initialized execution",
                InvalidHistoryActionKind::InternalServerError,
            ));
        }
        let event = self.create_new_history_event(EventType::WorkflowExecutionStarted(attrs), version, now_ns);
        self.replicate_workflow_execution_started(&event)?;
        Ok(event)
    }

    pub fn replicate_workflow_execution_started(&mut self, event: &HistoryEvent) -> Result<()> {
        let EventType::WorkflowExecutionStarted(attrs) = &event.event_type else {
            return Err(bad_event("expected WorkflowExecutionStarted"));
        };
        self.execution_info.workflow_type_name = attrs.workflow_type.clone();
        self.execution_info.task_list = attrs.task_list.clone();
        self.execution_info.workflow_timeout_secs = attrs.execution_start_to_close_timeout_secs;
        self.execution_info.decision_timeout_secs = attrs.task_start_to_close_timeout_secs;
        self.execution_info.cron_schedule = attrs.cron_schedule.clone();
        self.execution_info.retry.attempt = attrs.attempt;
        self.execution_info.state = WorkflowState::Created;
        self.execution_info.close_status = CloseStatus::None;
        Ok(())
    }

    /// Shared implementation for the five `WorkflowExecutionCompleted/
    /// Failed/TimedOut/Terminated/Canceled` pairs (spec.md invariant:
    /// "After a closing event ... no further events are appended in that
    /// transaction" — enforced by the caller checking
    /// `execution_info.is_mutable()` before every subsequent `Add<X>`, not
    /// here).
    pub fn add_workflow_closed(
        &mut self,
        close_status: CloseStatus,
        version: Version,
        now_ns: i64,
        attrs: WorkflowClosedAttrs,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(closing_event_type(close_status, attrs), version, now_ns);
        self.replicate_workflow_closed(&event)?;
        Ok(event)
    }

    pub fn replicate_workflow_closed(&mut self, event: &HistoryEvent) -> Result<()> {
        let close_status = match &event.event_type {
            EventType::WorkflowExecutionCompleted(_) => CloseStatus::Completed,
            EventType::WorkflowExecutionFailed(_) => CloseStatus::Failed,
            EventType::WorkflowExecutionTimedOut(_) => CloseStatus::TimedOut,
            EventType::WorkflowExecutionTerminated(_) => CloseStatus::Terminated,
            EventType::WorkflowExecutionCanceled(_) => CloseStatus::Canceled,
            _ => return Err(bad_event("expected a workflow-closing event")),
        };
        self.execution_info.state = WorkflowState::Completed;
        self.execution_info.close_status = close_status;
        Ok(())
    }

    /// `AddWorkflowExecutionCancelRequestedEvent`. Not bufferable — always
    /// assigned a real event ID (see [`wfcore::event::EventType::is_bufferable`]).
    pub fn add_workflow_cancel_requested(
        &mut self,
        version: Version,
        now_ns: i64,
        cause: Option<String>,
        request_id: RequestId,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::WorkflowExecutionCancelRequested(WorkflowCancelRequestedAttrs {
                cause,
                request_id: request_id.clone(),
            }),
            version,
            now_ns,
        );
        self.replicate_workflow_cancel_requested(&event)?;
        Ok(event)
    }

    pub fn replicate_workflow_cancel_requested(&mut self, event: &HistoryEvent) -> Result<()> {
        let EventType::WorkflowExecutionCancelRequested(attrs) = &event.event_type else {
            return Err(bad_event("expected WorkflowExecutionCancelRequested"));
        };
        self.execution_info.cancel_requested = true;
        self.execution_info.cancel_request_id = Some(attrs.request_id.clone());
        Ok(())
    }

    /// `AddWorkflowExecutionSignaledEvent`. Bufferable (spec.md §8 concrete
    /// scenario 1).
    pub fn add_workflow_signaled(
        &mut self,
        version: Version,
        now_ns: i64,
        signal_name: SignalName,
        input: Vec<u8>,
        identity: Option<String>,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::WorkflowExecutionSignaled(WorkflowSignaledAttrs { signal_name, input, identity }),
            version,
            now_ns,
        );
        self.replicate_workflow_signaled(&event)?;
        Ok(event)
    }

    pub fn replicate_workflow_signaled(&mut self, event: &HistoryEvent) -> Result<()> {
        if !matches!(event.event_type, EventType::WorkflowExecutionSignaled(_)) {
            return Err(bad_event("expected WorkflowExecutionSignaled"));
        }
        self.execution_info.signal_count += 1;
        Ok(())
    }

    /// `AddUpsertWorkflowSearchAttributesEvent`.
    pub fn add_search_attributes_upserted(
        &mut self,
        version: Version,
        now_ns: i64,
        search_attributes: BTreeMap<String, Vec<u8>>,
        decision_task_completed_event_id: wfcore::event::EventId,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::UpsertWorkflowSearchAttributes(SearchAttributesUpsertedAttrs {
                search_attributes,
                decision_task_completed_event_id,
            }),
            version,
            now_ns,
        );
        self.replicate_search_attributes_upserted(&event)?;
        Ok(event)
    }

    pub fn replicate_search_attributes_upserted(&mut self, event: &HistoryEvent) -> Result<()> {
        let EventType::UpsertWorkflowSearchAttributes(attrs) = &event.event_type else {
            return Err(bad_event("expected UpsertWorkflowSearchAttributes"));
        };
        for (k, v) in &attrs.search_attributes {
            self.execution_info.search_attributes.insert(k.clone(), v.clone());
        }
        Ok(())
    }

    /// `AddMarkerRecordedEvent`.
    pub fn add_marker_recorded(
        &mut self,
        version: Version,
        now_ns: i64,
        marker_name: String,
        details: Vec<u8>,
        decision_task_completed_event_id: wfcore::event::EventId,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::MarkerRecorded(MarkerRecordedAttrs { marker_name, details, decision_task_completed_event_id }),
            version,
            now_ns,
        );
        // Markers carry no mutable-state side effect beyond the history entry.
        Ok(event)
    }

    pub fn replicate_marker_recorded(&mut self, event: &HistoryEvent) -> Result<()> {
        if !matches!(event.event_type, EventType::MarkerRecorded(_)) {
            return Err(bad_event("expected MarkerRecorded"));
        }
        Ok(())
    }

    /// `AddContinueAsNewEvent` (spec.md §4.1 "Continue-as-new"): emits the
    /// close event on the current run and constructs the fresh run's
    /// initial `MutableState`, seeding its attempt/expiration from
    /// `initiator`. Both halves of the returned pair are committed together
    /// by the caller (`TransactionManager`) — see spec.md §8 concrete
    /// scenario 3.
    #[allow(clippy::too_many_arguments)]
    pub fn add_continue_as_new(
        &mut self,
        version: Version,
        now_ns: i64,
        new_run_id: RunId,
        initiator: ContinuedAsNewInitiator,
        workflow_type: WorkflowTypeName,
        task_list: TaskListId,
        input: Vec<u8>,
        execution_start_to_close_timeout_secs: i32,
        task_start_to_close_timeout_secs: i32,
        backoff_start_interval_secs: i32,
        decision_task_completed_event_id: wfcore::event::EventId,
    ) -> Result<ContinueAsNewOutcome> {
        self.check_mutable(ACTION)?;

        let can_event = self.create_new_history_event(
            EventType::WorkflowExecutionContinuedAsNew(ContinuedAsNewAttrs {
                new_execution_run_id: new_run_id,
                workflow_type: workflow_type.clone(),
                task_list: task_list.clone(),
                input,
                execution_start_to_close_timeout_secs,
                task_start_to_close_timeout_secs,
                backoff_start_interval_secs,
                initiator,
                decision_task_completed_event_id,
            }),
            version,
            now_ns,
        );
        self.execution_info.state = WorkflowState::Completed;
        self.execution_info.close_status = CloseStatus::ContinuedAsNew;

        // firstRunID is carried forward unchanged across a continue-as-new chain.
        let first_run_id = self.execution_info.run_id;
        let (attempt, expiration_time_ns) = match initiator {
            ContinuedAsNewInitiator::RetryPolicy => {
                (self.execution_info.retry.attempt + 1, self.execution_info.retry.expiration_time_ns)
            }
            ContinuedAsNewInitiator::Decider | ContinuedAsNewInitiator::CronSchedule => (0, None),
        };

        let mut new_execution_info = ExecutionInfo::new_void(
            self.execution_info.domain_id,
            self.execution_info.workflow_id.clone(),
            new_run_id,
        );
        new_execution_info.parent_domain_id = self.execution_info.parent_domain_id;
        new_execution_info.parent_workflow_id = self.execution_info.parent_workflow_id.clone();
        new_execution_info.parent_run_id = self.execution_info.parent_run_id;
        new_execution_info.workflow_type_name = workflow_type;
        new_execution_info.task_list = task_list.clone();
        new_execution_info.workflow_timeout_secs = execution_start_to_close_timeout_secs;
        new_execution_info.decision_timeout_secs = task_start_to_close_timeout_secs;
        new_execution_info.state = WorkflowState::Created;
        new_execution_info.cron_schedule = self.execution_info.cron_schedule.clone();
        new_execution_info.retry =
            RetryState { attempt, expiration_time_ns, ..self.execution_info.retry.clone() };

        let mut new_state = MutableState::new_void(new_execution_info);

        let start_event = new_state.add_workflow_execution_started(
            version,
            now_ns,
            WorkflowStartedAttrs {
                workflow_type: new_state.execution_info.workflow_type_name.clone(),
                task_list,
                input: Vec::new(),
                execution_start_to_close_timeout_secs,
                task_start_to_close_timeout_secs,
                first_decision_task_backoff_secs: backoff_start_interval_secs,
                parent_workflow_id: new_state.execution_info.parent_workflow_id.clone(),
                parent_run_id: new_state.execution_info.parent_run_id,
                continued_execution_run_id: Some(self.execution_info.run_id),
                first_run_id,
                attempt,
                cron_schedule: new_state.execution_info.cron_schedule.clone(),
            },
        )?;

        new_state.add_first_decision_task_scheduled(version, now_ns, &start_event)?;

        Ok(ContinueAsNewOutcome { close_event: can_event, new_state })
    }
}

fn bad_event(reason: &'static str) -> MutableStateError {
    MutableStateError::invalid_history_action(ACTION, reason, InvalidHistoryActionKind::InternalServerError)
}

/// Returned by [`MutableState::add_continue_as_new`]: the close event
/// appended to the current run, and the freshly initialized next run,
/// ready for the caller to persist both together (spec.md §4.1
/// "Continue-as-new").
pub struct ContinueAsNewOutcome {
    pub close_event: HistoryEvent,
    pub new_state: MutableState,
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
