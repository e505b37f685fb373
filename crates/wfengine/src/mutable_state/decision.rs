//! Thin `MutableState` wrappers over [`crate::decision_task_manager`]: each
//! one adds the universal Add-path precondition
//! ([`MutableState::check_mutable`]) before delegating to the free
//! functions that actually own the decision sub-state-machine (spec.md
//! §4.2).

use wfcore::event::{DecisionTaskFailedCause, EventId};
use wfcore::ids::{RequestId, TaskListId};
use wfcore::{HistoryEvent, RunId, TransferTask, Version};

use crate::decision_task_manager::{self, FailDecisionResult};
use crate::error::Result;
use crate::reset_points::{self, BINARY_CHECKSUMS_SEARCH_ATTRIBUTE_KEY};

use super::MutableState;

const ACTION: &str = "AddDecisionTaskEvent";

fn bad_event(reason: impl Into<String>) -> crate::error::MutableStateError {
    crate::error::MutableStateError::invalid_history_action(
        ACTION,
        reason,
        crate::error::InvalidHistoryActionKind::InternalServerError,
    )
}

impl MutableState {
    pub fn add_first_decision_task_scheduled(
        &mut self,
        version: Version,
        now_ns: i64,
        start_event: &HistoryEvent,
    ) -> Result<Option<HistoryEvent>> {
        self.check_mutable(ACTION)?;
        let wfcore::event::EventType::WorkflowExecutionStarted(attrs) = &start_event.event_type else {
            return Err(crate::error::MutableStateError::invalid_history_action(
                ACTION,
                "expected WorkflowExecutionStarted event",
                crate::error::InvalidHistoryActionKind::InternalServerError,
            ));
        };
        let task_list = attrs.task_list.clone();
        let timeout_secs = attrs.task_start_to_close_timeout_secs;
        let backoff_secs = attrs.first_decision_task_backoff_secs;
        decision_task_manager::add_first_decision_task_scheduled(
            &mut self.history_builder,
            &mut self.execution_info,
            version,
            now_ns,
            task_list,
            timeout_secs,
            backoff_secs,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_decision_task_scheduled_event(
        &mut self,
        version: Version,
        now_ns: i64,
        task_list: TaskListId,
        start_to_close_timeout_secs: i32,
        attempt: i32,
        as_heartbeat: bool,
        originally_scheduled_ts: Option<i64>,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        decision_task_manager::add_decision_task_scheduled_event(
            &mut self.history_builder,
            &mut self.execution_info,
            version,
            now_ns,
            task_list,
            start_to_close_timeout_secs,
            attempt,
            as_heartbeat,
            originally_scheduled_ts,
        )
    }

    pub fn replicate_decision_task_scheduled_event(
        &mut self,
        event: &HistoryEvent,
        as_heartbeat: bool,
        originally_scheduled_ts: Option<i64>,
    ) -> Result<()> {
        decision_task_manager::replicate_decision_task_scheduled_event(
            &mut self.execution_info,
            event,
            as_heartbeat,
            originally_scheduled_ts,
        )
    }

    pub fn add_decision_task_started_event(
        &mut self,
        version: Version,
        now_ns: i64,
        schedule_id: EventId,
        request_id: RequestId,
        identity: Option<String>,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        decision_task_manager::add_decision_task_started_event(
            &mut self.history_builder,
            &mut self.execution_info,
            version,
            now_ns,
            schedule_id,
            request_id,
            identity,
        )
    }

    pub fn replicate_decision_task_started_event(&mut self, event: &HistoryEvent) -> Result<()> {
        decision_task_manager::replicate_decision_task_started_event(&mut self.execution_info, event)
    }

    /// Scheduled+started pair for the sticky-query/retry path, never
    /// committed to history (spec.md §9 "Transient decision events").
    pub fn create_transient_decision_events(
        &self,
        now_ns: i64,
        request_id: RequestId,
        identity: Option<String>,
    ) -> (HistoryEvent, HistoryEvent) {
        decision_task_manager::create_transient_decision_events(&self.execution_info, now_ns, request_id, identity)
    }

    /// `AddDecisionTaskCompletedEvent(scheduleID, startedID, request,
    /// maxResetPoints)` (spec.md §4.2). On the first completion of a given
    /// decider binary, also rotates the auto-reset-point list and mirrors
    /// it into search attributes (spec.md §4.1 "Auto-reset points").
    #[allow(clippy::too_many_arguments)]
    pub fn add_decision_task_completed_event(
        &mut self,
        version: Version,
        now_ns: i64,
        schedule_id: EventId,
        started_id: EventId,
        identity: Option<String>,
        binary_checksum: Option<String>,
        max_reset_points: usize,
        advanced_visibility_enabled: bool,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = decision_task_manager::add_decision_task_completed_event(
            &mut self.history_builder,
            &mut self.execution_info,
            version,
            now_ns,
            schedule_id,
            started_id,
            identity,
            binary_checksum.clone(),
        )?;

        if let Some(binary_checksum) = binary_checksum {
            let resettable =
                reset_points::is_resettable(!self.children.is_empty(), !self.request_cancels.is_empty(), !self.signals.is_empty());
            reset_points::add_reset_point(
                &mut self.execution_info.auto_reset_points,
                max_reset_points,
                binary_checksum,
                self.execution_info.run_id,
                event.event_id,
                now_ns,
                resettable,
            );

            let encoded = reset_points::encode_search_attribute(&self.execution_info.auto_reset_points)
                .map_err(|e| bad_event(format!("encoding auto-reset-points search attribute: {e}")))?;
            self.execution_info
                .search_attributes
                .insert(BINARY_CHECKSUMS_SEARCH_ATTRIBUTE_KEY.to_string(), encoded);

            if advanced_visibility_enabled {
                self.deltas.transfer_tasks.push(TransferTask::UpsertSearchAttributes);
            }
        }

        Ok(event)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_decision_task_failed_event(
        &mut self,
        version: Version,
        now_ns: i64,
        schedule_id: EventId,
        started_id: EventId,
        cause: DecisionTaskFailedCause,
        base_run_id: Option<RunId>,
        new_run_id: Option<RunId>,
        fork_event_version: Option<Version>,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        decision_task_manager::add_decision_task_failed_event(
            &mut self.history_builder,
            &mut self.execution_info,
            version,
            now_ns,
            schedule_id,
            started_id,
            cause,
            base_run_id,
            new_run_id,
            fork_event_version,
        )
    }

    pub fn add_decision_task_timed_out_event(
        &mut self,
        version: Version,
        now_ns: i64,
        schedule_id: EventId,
        started_id: EventId,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        decision_task_manager::add_decision_task_timed_out_event(
            &mut self.history_builder,
            &mut self.execution_info,
            version,
            now_ns,
            schedule_id,
            started_id,
        )
    }

    pub fn add_decision_task_schedule_to_start_timeout_event(
        &mut self,
        version: Version,
        now_ns: i64,
        schedule_id: EventId,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        decision_task_manager::add_decision_task_schedule_to_start_timeout_event(
            &mut self.history_builder,
            &mut self.execution_info,
            version,
            now_ns,
            schedule_id,
        )
    }

    /// `FailDecision(incrementAttempt)`, exposed for the activity/timer
    /// request-cancel-failure callers that force the in-flight decision to
    /// fail without appending a `DecisionTaskFailed` event themselves
    /// (spec.md §4.2).
    pub(crate) fn fail_decision(&mut self, increment_attempt: bool) -> FailDecisionResult {
        decision_task_manager::fail_decision(&mut self.execution_info, increment_attempt)
    }
}
