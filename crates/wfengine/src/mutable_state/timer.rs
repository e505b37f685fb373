//! User-timer `Add<X>`/`Replicate<X>` pairs (spec.md §4.1 "Event coverage":
//! "timer started / fired / canceled / cancel failed").

use wfcore::event::{CancelTimerFailedAttrs, EventId, EventType, TimerCanceledAttrs, TimerFiredAttrs, TimerStartedAttrs};
use wfcore::ids::TimerId;
use wfcore::timer::TimerInfo;
use wfcore::{HistoryEvent, TimerTask, Version};

use crate::error::{InvalidHistoryActionKind, MutableStateError, Result};

use super::MutableState;

const ACTION: &str = "AddTimerEvent";
const ENTITY: &str = "TimerInfo";

fn missing(action: &'static str, timer_id: &TimerId) -> MutableStateError {
    MutableStateError::MissingEntity { entity_kind: ENTITY, action, key: timer_id.to_string() }
}

fn bad_event(reason: &'static str) -> MutableStateError {
    MutableStateError::invalid_history_action(ACTION, reason, InvalidHistoryActionKind::InternalServerError)
}

impl MutableState {
    pub fn add_timer_started_event(
        &mut self,
        version: Version,
        now_ns: i64,
        timer_id: TimerId,
        start_to_fire_timeout_secs: i64,
        decision_task_completed_event_id: EventId,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        if self.timers.get(&timer_id).is_some() {
            return Err(MutableStateError::invalid_history_action(
                ACTION,
                "timer id already pending",
                InvalidHistoryActionKind::CallerError,
            ));
        }
        let event = self.create_new_history_event(
            EventType::TimerStarted(TimerStartedAttrs {
                timer_id: timer_id.clone(),
                start_to_fire_timeout_secs,
                decision_task_completed_event_id,
            }),
            version,
            now_ns,
        );
        self.replicate_timer_started_event(&event)?;
        Ok(event)
    }

    pub fn replicate_timer_started_event(&mut self, event: &HistoryEvent) -> Result<()> {
        let EventType::TimerStarted(attrs) = &event.event_type else {
            return Err(bad_event("expected TimerStarted"));
        };
        let info = TimerInfo {
            version: event.version,
            timer_id: attrs.timer_id.clone(),
            expiry_time_ns: event.timestamp_ns + attrs.start_to_fire_timeout_secs * 1_000_000_000,
            started_id: event.event_id,
            timer_task_status: 0,
        };
        self.timers.insert(info.clone());
        self.deltas.timers.upsert(attrs.timer_id.clone(), info);
        Ok(())
    }

    fn remove_timer(&mut self, timer_id: &TimerId) -> Result<TimerInfo> {
        let info = self.timers.remove(timer_id).ok_or_else(|| missing(ACTION, timer_id))?;
        self.deltas.timers.delete(timer_id.clone());
        Ok(info)
    }

    pub fn add_timer_fired_event(
        &mut self,
        version: Version,
        now_ns: i64,
        timer_id: TimerId,
        started_id: EventId,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::TimerFired(TimerFiredAttrs { timer_id: timer_id.clone(), started_event_id: started_id }),
            version,
            now_ns,
        );
        self.replicate_timer_fired_event(&event)?;
        Ok(event)
    }

    pub fn replicate_timer_fired_event(&mut self, event: &HistoryEvent) -> Result<()> {
        let EventType::TimerFired(attrs) = &event.event_type else {
            return Err(bad_event("expected TimerFired"));
        };
        self.remove_timer(&attrs.timer_id)?;
        Ok(())
    }

    pub fn add_timer_canceled_event(
        &mut self,
        version: Version,
        now_ns: i64,
        timer_id: TimerId,
        started_id: EventId,
        identity: Option<String>,
        decision_task_completed_event_id: EventId,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::TimerCanceled(TimerCanceledAttrs {
                timer_id: timer_id.clone(),
                started_event_id: started_id,
                identity,
                decision_task_completed_event_id,
            }),
            version,
            now_ns,
        );
        self.replicate_timer_canceled_event(&event)?;
        Ok(event)
    }

    pub fn replicate_timer_canceled_event(&mut self, event: &HistoryEvent) -> Result<()> {
        let EventType::TimerCanceled(attrs) = &event.event_type else {
            return Err(bad_event("expected TimerCanceled"));
        };
        self.remove_timer(&attrs.timer_id)?;
        Ok(())
    }

    /// `AddCancelTimerFailedEvent`: the decider asked to cancel a timer id
    /// that is no longer pending.
    pub fn add_cancel_timer_failed_event(
        &mut self,
        version: Version,
        now_ns: i64,
        timer_id: TimerId,
        cause: String,
        decision_task_completed_event_id: EventId,
    ) -> Result<HistoryEvent> {
        self.check_mutable(ACTION)?;
        let event = self.create_new_history_event(
            EventType::CancelTimerFailed(CancelTimerFailedAttrs { timer_id, cause, decision_task_completed_event_id }),
            version,
            now_ns,
        );
        Ok(event)
    }

    pub fn replicate_cancel_timer_failed_event(&self, event: &HistoryEvent) -> Result<()> {
        if !matches!(event.event_type, EventType::CancelTimerFailed(_)) {
            return Err(bad_event("expected CancelTimerFailed"));
        }
        Ok(())
    }

    /// Collapses the remaining pending timers down to a single user-timer
    /// task at the earliest expiry, per spec.md §4.3 step 5.
    pub(crate) fn collapsed_user_timer_task(&self) -> Option<TimerTask> {
        self.timers.earliest().map(|t| TimerTask::UserTimer { timer_id: t.timer_id.clone(), fire_time_ns: t.expiry_time_ns })
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
