//! Activity-task `Add<X>`/`Replicate<X>` pairs (spec.md §4.1 "Event
//! coverage": "activity scheduled / started / completed / failed / timed
//! out / cancel requested / canceled / request-cancel failed"), plus the
//! retry path from [`crate::retry`].

use wfcore::activity::ActivityInfo;
use wfcore::event::{
    ActivityTaskCancelRequestedAttrs, ActivityTaskCanceledAttrs, ActivityTaskCompletedAttrs,
    ActivityTaskFailedAttrs, ActivityTaskScheduledAttrs, ActivityTaskStartedAttrs, ActivityTaskTimedOutAttrs,
    ActivityTimeoutKind, EventId, EventType, RequestCancelActivityTaskFailedAttrs,
};
use wfcore::ids::{ActivityId, DomainId, RequestId, TaskListId};
use wfcore::{HistoryEvent, ReplicationTask, TimerTask, TransferTask, Version};

use crate::error::{InvalidHistoryActionKind, MutableStateError, Result};
use crate::retry::{apply_retry, compute_retry, RetryDecision};

use super::MutableState;

const ACTION: &str = "AddActivityTaskEvent";
const ENTITY: &str = "ActivityInfo";

fn missing(action: &'static str, schedule_id: EventId) -> MutableStateError {
    MutableStateError::MissingEntity { entity_kind: ENTITY, action, key: schedule_id.to_string() }
}

fn bad_event(reason: &'static str) -> MutableStateError {
    MutableStateError::invalid_history_action(ACTION, reason, InvalidHistoryActionKind::InternalServerError)
}

/// Parameters for `AddActivityTaskScheduledEvent`.
#[derive(Debug, Clone)]
pub struct ScheduleActivity {
    pub activity_id: ActivityId,
    pub activity_type: String,
    pub task_list: TaskListId,
    pub input: Vec<u8>,
    pub schedule_to_close_timeout_secs: i32,
    pub schedule_to_start_timeout_secs: i32,
    pub start_to_close_timeout_secs: i32,
    pub heartbeat_timeout_secs: i32,
    pub decision_task_completed_event_id: EventId,
    pub target_domain_id: Option<DomainId>,
    pub retry: wfcore::execution_info::RetryState,
}

impl MutableState {
    #[allow(clippy::expect_used)]
    pub fn add_activity_task_scheduled_event(
        &mut self,
        version: Version,
        now_ns: i64,
        request: ScheduleActivity,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::ActivityTaskScheduled(ActivityTaskScheduledAttrs {
                activity_id: request.activity_id.clone(),
                activity_type: request.activity_type.clone(),
                task_list: request.task_list.clone(),
                input: request.input.clone(),
                schedule_to_close_timeout_secs: request.schedule_to_close_timeout_secs,
                schedule_to_start_timeout_secs: request.schedule_to_start_timeout_secs,
                start_to_close_timeout_secs: request.start_to_close_timeout_secs,
                heartbeat_timeout_secs: request.heartbeat_timeout_secs,
                decision_task_completed_event_id: request.decision_task_completed_event_id,
            }),
            version,
            now_ns,
        );
        self.replicate_activity_task_scheduled_event(&event, request.target_domain_id, request.retry)?;
        self.deltas.transfer_tasks.push(TransferTask::ActivityTask {
            schedule_id: event.event_id,
            task_list: self.activities.get(event.event_id).expect("just inserted").task_list.clone(),
        });
        Ok(event)
    }

    fn replicate_activity_task_scheduled_event(
        &mut self,
        event: &HistoryEvent,
        target_domain_id: Option<DomainId>,
        retry: wfcore::execution_info::RetryState,
    ) -> Result<()> {
        let EventType::ActivityTaskScheduled(attrs) = &event.event_type else {
            return Err(bad_event("expected ActivityTaskScheduled"));
        };
        let info = ActivityInfo {
            version: event.version,
            schedule_id: event.event_id,
            scheduled_event_batch_id: event.event_id,
            scheduled_time_ns: event.timestamp_ns,
            started_id: wfcore::sentinel::EMPTY_EVENT_ID,
            started_time_ns: 0,
            activity_id: attrs.activity_id.clone(),
            target_domain_id,
            timeouts: wfcore::activity::ActivityTimeouts {
                schedule_to_start_secs: attrs.schedule_to_start_timeout_secs,
                schedule_to_close_secs: attrs.schedule_to_close_timeout_secs,
                start_to_close_secs: attrs.start_to_close_timeout_secs,
                heartbeat_secs: attrs.heartbeat_timeout_secs,
            },
            cancel_requested: false,
            cancel_request_id: None,
            last_heartbeat_time_ns: 0,
            timer_task_status: 0,
            task_list: attrs.task_list.clone(),
            retry,
            last_failure_reason: None,
            last_failure_details: Vec::new(),
            last_worker_identity: None,
            attempt: 0,
            expiration_time_ns: None,
        };
        self.activities.insert(info.clone());
        self.deltas.activities.upsert(event.event_id, info);
        Ok(())
    }

    pub fn add_activity_task_started_event(
        &mut self,
        version: Version,
        now_ns: i64,
        schedule_id: EventId,
        request_id: RequestId,
        identity: Option<String>,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let attempt = self.activities.get(schedule_id).ok_or_else(|| missing(ACTION, schedule_id))?.attempt;
        let event = self.create_new_history_event(
            EventType::ActivityTaskStarted(ActivityTaskStartedAttrs {
                scheduled_event_id: schedule_id,
                identity,
                request_id,
                attempt,
            }),
            version,
            now_ns,
        );
        self.replicate_activity_task_started_event(&event)?;
        Ok(event)
    }

    pub fn replicate_activity_task_started_event(&mut self, event: &HistoryEvent) -> Result<()> {
        let EventType::ActivityTaskStarted(attrs) = &event.event_type else {
            return Err(bad_event("expected ActivityTaskStarted"));
        };
        let info =
            self.activities.get_mut(attrs.scheduled_event_id).ok_or_else(|| missing(ACTION, attrs.scheduled_event_id))?;
        info.started_id = event.event_id;
        info.started_time_ns = event.timestamp_ns;
        self.deltas.activities.upsert(attrs.scheduled_event_id, info.clone());
        Ok(())
    }

    fn remove_activity(&mut self, schedule_id: EventId) -> Result<ActivityInfo> {
        let info = self.activities.remove(schedule_id).ok_or_else(|| missing(ACTION, schedule_id))?;
        self.deltas.activities.delete(schedule_id);
        Ok(info)
    }

    pub fn add_activity_task_completed_event(
        &mut self,
        version: Version,
        now_ns: i64,
        schedule_id: EventId,
        started_id: EventId,
        result: Vec<u8>,
        identity: Option<String>,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::ActivityTaskCompleted(ActivityTaskCompletedAttrs {
                scheduled_event_id: schedule_id,
                started_event_id: started_id,
                result,
                identity,
            }),
            version,
            now_ns,
        );
        self.replicate_activity_task_completed_event(&event)?;
        Ok(event)
    }

    pub fn replicate_activity_task_completed_event(&mut self, event: &HistoryEvent) -> Result<()> {
        let EventType::ActivityTaskCompleted(attrs) = &event.event_type else {
            return Err(bad_event("expected ActivityTaskCompleted"));
        };
        self.remove_activity(attrs.scheduled_event_id)?;
        Ok(())
    }

    /// `AddActivityTaskFailedEvent`: consults [`crate::retry::compute_retry`]
    /// first; on [`RetryDecision::Retry`] no `ActivityTaskFailed` event is
    /// appended — the activity is mutated in place and a retry timer task is
    /// queued instead (spec.md §4.1 "Activity retry").
    pub fn add_activity_task_failed_event(
        &mut self,
        version: Version,
        now_ns: i64,
        schedule_id: EventId,
        started_id: EventId,
        reason: String,
        details: Vec<u8>,
        identity: Option<String>,
    ) -> Result<Option<HistoryEvent>> {
        self.check_mutable(ACTION)?;
        let info = self.activities.get(schedule_id).ok_or_else(|| missing(ACTION, schedule_id))?.clone();

        match compute_retry(&info, &reason, now_ns) {
            RetryDecision::Retry { scheduled_time_ns, next_attempt } => {
                let info = self.activities.get_mut(schedule_id).ok_or_else(|| missing(ACTION, schedule_id))?;
                apply_retry(info, next_attempt, scheduled_time_ns, &reason, &details);
                let updated = info.clone();
                self.deltas.activities.upsert(schedule_id, updated);
                self.deltas.timer_tasks.push(TimerTask::ActivityRetry {
                    schedule_id,
                    fire_time_ns: scheduled_time_ns,
                    attempt: next_attempt,
                });
                Ok(None)
            }
            RetryDecision::NoRetry => {
                let event = self.create_new_history_event(
                    EventType::ActivityTaskFailed(ActivityTaskFailedAttrs {
                        scheduled_event_id: schedule_id,
                        started_event_id: started_id,
                        reason,
                        details,
                        identity,
                    }),
                    version,
                    now_ns,
                );
                self.replicate_activity_task_failed_event(&event)?;
                Ok(Some(event))
            }
        }
    }

    pub fn replicate_activity_task_failed_event(&mut self, event: &HistoryEvent) -> Result<()> {
        let EventType::ActivityTaskFailed(attrs) = &event.event_type else {
            return Err(bad_event("expected ActivityTaskFailed"));
        };
        self.remove_activity(attrs.scheduled_event_id)?;
        Ok(())
    }

    pub fn add_activity_task_timed_out_event(
        &mut self,
        version: Version,
        now_ns: i64,
        schedule_id: EventId,
        started_id: EventId,
        timeout_kind: ActivityTimeoutKind,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::ActivityTaskTimedOut(ActivityTaskTimedOutAttrs {
                scheduled_event_id: schedule_id,
                started_event_id: started_id,
                timeout_kind,
            }),
            version,
            now_ns,
        );
        self.replicate_activity_task_timed_out_event(&event)?;
        Ok(event)
    }

    pub fn replicate_activity_task_timed_out_event(&mut self, event: &HistoryEvent) -> Result<()> {
        let EventType::ActivityTaskTimedOut(attrs) = &event.event_type else {
            return Err(bad_event("expected ActivityTaskTimedOut"));
        };
        self.remove_activity(attrs.scheduled_event_id)?;
        Ok(())
    }

    pub fn add_activity_task_cancel_requested_event(
        &mut self,
        version: Version,
        now_ns: i64,
        schedule_id: EventId,
        decision_task_completed_event_id: EventId,
        cancel_request_id: RequestId,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        self.activities.get(schedule_id).ok_or_else(|| missing(ACTION, schedule_id))?;
        let event = self.create_new_history_event(
            EventType::ActivityTaskCancelRequested(ActivityTaskCancelRequestedAttrs {
                scheduled_event_id: schedule_id,
                decision_task_completed_event_id,
            }),
            version,
            now_ns,
        );
        self.replicate_activity_task_cancel_requested_event(&event, cancel_request_id)?;
        Ok(event)
    }

    fn replicate_activity_task_cancel_requested_event(
        &mut self,
        event: &HistoryEvent,
        cancel_request_id: RequestId,
    ) -> Result<()> {
        let EventType::ActivityTaskCancelRequested(attrs) = &event.event_type else {
            return Err(bad_event("expected ActivityTaskCancelRequested"));
        };
        let info =
            self.activities.get_mut(attrs.scheduled_event_id).ok_or_else(|| missing(ACTION, attrs.scheduled_event_id))?;
        info.cancel_requested = true;
        info.cancel_request_id = Some(cancel_request_id);
        self.deltas.activities.upsert(attrs.scheduled_event_id, info.clone());
        Ok(())
    }

    pub fn add_activity_task_canceled_event(
        &mut self,
        version: Version,
        now_ns: i64,
        schedule_id: EventId,
        started_id: EventId,
        details: Vec<u8>,
        latest_cancel_requested_event_id: Option<EventId>,
        identity: Option<String>,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::ActivityTaskCanceled(ActivityTaskCanceledAttrs {
                scheduled_event_id: schedule_id,
                started_event_id: started_id,
                details,
                latest_cancel_requested_event_id,
                identity,
            }),
            version,
            now_ns,
        );
        self.replicate_activity_task_canceled_event(&event)?;
        Ok(event)
    }

    pub fn replicate_activity_task_canceled_event(&mut self, event: &HistoryEvent) -> Result<()> {
        let EventType::ActivityTaskCanceled(attrs) = &event.event_type else {
            return Err(bad_event("expected ActivityTaskCanceled"));
        };
        self.remove_activity(attrs.scheduled_event_id)?;
        Ok(())
    }

    /// `AddRequestCancelActivityTaskFailedEvent`: the decider asked to
    /// cancel an activity that is no longer pending.
    pub fn add_request_cancel_activity_task_failed_event(
        &mut self,
        version: Version,
        now_ns: i64,
        activity_id: ActivityId,
        cause: String,
        decision_task_completed_event_id: EventId,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::RequestCancelActivityTaskFailed(RequestCancelActivityTaskFailedAttrs {
                activity_id,
                cause,
                decision_task_completed_event_id,
            }),
            version,
            now_ns,
        );
        Ok(event)
    }

    pub fn replicate_request_cancel_activity_task_failed_event(&self, event: &HistoryEvent) -> Result<()> {
        if !matches!(event.event_type, EventType::RequestCancelActivityTaskFailed(_)) {
            return Err(bad_event("expected RequestCancelActivityTaskFailed"));
        }
        Ok(())
    }

    /// Queues the sync-activity replication task spec.md §8 invariant 7
    /// requires for every mutated pending activity, independent of the
    /// history-based replication tasks the event itself generates.
    pub fn queue_sync_activity_task(&mut self, activity_id: ActivityId, schedule_id: EventId, version: Version) {
        self.deltas.sync_activity_schedule_ids.push(schedule_id);
        self.deltas.replication_tasks.push(ReplicationTask::SyncActivity { activity_id, schedule_id, version });
    }

    /// Collapses the pending activities' timeouts down to a single
    /// activity-timer task at the earliest deadline, per spec.md §4.3 step 5.
    pub(crate) fn collapsed_activity_timer_task(&self) -> Option<TimerTask> {
        self.activities
            .earliest_timeout()
            .map(|(info, fire_time_ns)| TimerTask::ActivityTimeout { schedule_id: info.schedule_id, fire_time_ns })
    }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
