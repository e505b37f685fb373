//! Pending activities: keyed by `scheduleID`, with a secondary index from
//! `activityID` (spec.md §3 "Activity Info", §9 "Pending collections as dual
//! indices").

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::event::EventId;
use crate::ids::{ActivityId, RequestId, TaskListId};
use crate::Version;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ActivityTimeouts {
    pub schedule_to_start_secs: i32,
    pub schedule_to_close_secs: i32,
    pub start_to_close_secs: i32,
    pub heartbeat_secs: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityInfo {
    pub version: Version,
    pub schedule_id: EventId,
    pub scheduled_event_batch_id: EventId,
    pub scheduled_time_ns: i64,
    /// `EmptyEventID` before start; `TransientEventID` when retry-enabled and
    /// not yet appended (spec.md §3).
    pub started_id: EventId,
    pub started_time_ns: i64,
    pub activity_id: ActivityId,
    pub target_domain_id: Option<crate::ids::DomainId>,
    pub timeouts: ActivityTimeouts,
    pub cancel_requested: bool,
    pub cancel_request_id: Option<RequestId>,
    pub last_heartbeat_time_ns: i64,
    pub timer_task_status: u8,
    pub task_list: TaskListId,
    pub retry: crate::execution_info::RetryState,
    pub last_failure_reason: Option<String>,
    pub last_failure_details: Vec<u8>,
    pub last_worker_identity: Option<String>,
    pub attempt: i32,
    pub expiration_time_ns: Option<i64>,
}

impl ActivityInfo {
    pub fn is_started(&self) -> bool {
        self.started_id != crate::sentinel::EMPTY_EVENT_ID
            && self.started_id != crate::sentinel::TRANSIENT_EVENT_ID
    }

    /// The earliest applicable timeout deadline for this activity —
    /// `scheduleToClose` always applies; `scheduleToStart` before it's
    /// started, `startToClose`/`heartbeat` after — or `None` if no
    /// configured timeout applies (spec.md §4.3 step 5 "at most one
    /// activity-timer task... covering the earliest deadlines").
    pub fn next_timeout_fire_time_ns(&self) -> Option<i64> {
        let mut candidates = Vec::with_capacity(3);
        if self.timeouts.schedule_to_close_secs > 0 {
            candidates.push(self.scheduled_time_ns + self.timeouts.schedule_to_close_secs as i64 * 1_000_000_000);
        }
        if self.is_started() {
            if self.timeouts.start_to_close_secs > 0 {
                candidates.push(self.started_time_ns + self.timeouts.start_to_close_secs as i64 * 1_000_000_000);
            }
            if self.timeouts.heartbeat_secs > 0 {
                let base = if self.last_heartbeat_time_ns > 0 { self.last_heartbeat_time_ns } else { self.started_time_ns };
                candidates.push(base + self.timeouts.heartbeat_secs as i64 * 1_000_000_000);
            }
        } else if self.timeouts.schedule_to_start_secs > 0 {
            candidates.push(self.scheduled_time_ns + self.timeouts.schedule_to_start_secs as i64 * 1_000_000_000);
        }
        candidates.into_iter().min()
    }
}

/// Dual-indexed collection: primary map by `scheduleID`, secondary map
/// `activityID -> scheduleID`. All mutation goes through these methods so
/// the two sides never drift (spec.md §9).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingActivities {
    by_schedule_id: HashMap<EventId, ActivityInfo>,
    schedule_id_by_activity_id: HashMap<ActivityId, EventId>,
}

impl PendingActivities {
    pub fn insert(&mut self, info: ActivityInfo) {
        self.schedule_id_by_activity_id.insert(info.activity_id.clone(), info.schedule_id);
        self.by_schedule_id.insert(info.schedule_id, info);
    }

    pub fn get(&self, schedule_id: EventId) -> Option<&ActivityInfo> {
        self.by_schedule_id.get(&schedule_id)
    }

    pub fn get_mut(&mut self, schedule_id: EventId) -> Option<&mut ActivityInfo> {
        self.by_schedule_id.get_mut(&schedule_id)
    }

    pub fn get_by_activity_id(&self, activity_id: &ActivityId) -> Option<&ActivityInfo> {
        let schedule_id = self.schedule_id_by_activity_id.get(activity_id)?;
        self.by_schedule_id.get(schedule_id)
    }

    /// Remove by `scheduleID`, guarding the secondary index against having
    /// already gone missing (spec.md §9: "log and continue rather than fail").
    pub fn remove(&mut self, schedule_id: EventId) -> Option<ActivityInfo> {
        let removed = self.by_schedule_id.remove(&schedule_id)?;
        if self.schedule_id_by_activity_id.remove(&removed.activity_id).is_none() {
            tracing::error!(
                schedule_id,
                activity_id = %removed.activity_id,
                "pending activity secondary index missing entry on removal"
            );
        }
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.by_schedule_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_schedule_id.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &ActivityInfo> {
        self.by_schedule_id.values()
    }

    pub fn schedule_ids(&self) -> impl Iterator<Item = &EventId> {
        self.by_schedule_id.keys()
    }

    /// spec.md §8 invariant 1: `pendingByActivityID[a.activityID].scheduleID
    /// == a.scheduleID` and vice-versa, for every pending activity.
    pub fn indices_are_consistent(&self) -> bool {
        self.by_schedule_id.len() == self.schedule_id_by_activity_id.len()
            && self.by_schedule_id.values().all(|info| {
                self.schedule_id_by_activity_id.get(&info.activity_id) == Some(&info.schedule_id)
            })
    }

    /// The pending activity with the nearest upcoming timeout deadline,
    /// used to collapse repeated updates to a single activity-timer task at
    /// close (spec.md §4.3 step 5).
    pub fn earliest_timeout(&self) -> Option<(&ActivityInfo, i64)> {
        self.by_schedule_id
            .values()
            .filter_map(|info| info.next_timeout_fire_time_ns().map(|fire_time_ns| (info, fire_time_ns)))
            .min_by_key(|(_, fire_time_ns)| *fire_time_ns)
    }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
