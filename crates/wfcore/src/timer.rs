//! Pending user timers: keyed by the caller-supplied `timerID`, with a
//! secondary index from `startedEventID` (spec.md §3 "Timer Info").

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::event::EventId;
use crate::ids::TimerId;
use crate::Version;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerInfo {
    pub version: Version,
    pub timer_id: TimerId,
    /// Absolute fire time, nanoseconds since epoch.
    pub expiry_time_ns: i64,
    pub started_id: EventId,
    pub timer_task_status: u8,
}

/// Dual-indexed collection: primary map by `timerID`, secondary map
/// `startedEventID -> timerID` (spec.md §8 invariant 2).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingTimers {
    by_timer_id: HashMap<TimerId, TimerInfo>,
    timer_id_by_started_event_id: HashMap<EventId, TimerId>,
}

impl PendingTimers {
    pub fn insert(&mut self, info: TimerInfo) {
        self.timer_id_by_started_event_id.insert(info.started_id, info.timer_id.clone());
        self.by_timer_id.insert(info.timer_id.clone(), info);
    }

    pub fn get(&self, timer_id: &TimerId) -> Option<&TimerInfo> {
        self.by_timer_id.get(timer_id)
    }

    pub fn get_mut(&mut self, timer_id: &TimerId) -> Option<&mut TimerInfo> {
        self.by_timer_id.get_mut(timer_id)
    }

    pub fn get_by_started_event_id(&self, started_id: EventId) -> Option<&TimerInfo> {
        let timer_id = self.timer_id_by_started_event_id.get(&started_id)?;
        self.by_timer_id.get(timer_id)
    }

    pub fn remove(&mut self, timer_id: &TimerId) -> Option<TimerInfo> {
        let removed = self.by_timer_id.remove(timer_id)?;
        if self.timer_id_by_started_event_id.remove(&removed.started_id).is_none() {
            tracing::error!(
                timer_id = %removed.timer_id,
                started_id = removed.started_id,
                "pending timer secondary index missing entry on removal"
            );
        }
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.by_timer_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_timer_id.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &TimerInfo> {
        self.by_timer_id.values()
    }

    /// spec.md §8 invariant 2: `pendingTimersByEventID[t.startedID] == t.timerID`.
    pub fn indices_are_consistent(&self) -> bool {
        self.by_timer_id.len() == self.timer_id_by_started_event_id.len()
            && self.by_timer_id.values().all(|info| {
                self.timer_id_by_started_event_id.get(&info.started_id) == Some(&info.timer_id)
            })
    }

    /// The timer with the earliest `expiry_time_ns`, used to collapse
    /// repeated updates to a single user-timer task at close (spec.md §4.3
    /// step 5).
    pub fn earliest(&self) -> Option<&TimerInfo> {
        self.by_timer_id.values().min_by_key(|t| t.expiry_time_ns)
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
