//! Pending external-workflow signals, keyed by `initiatedEventID`, plus the
//! signal-requested dedup set (spec.md §3 "Request-Cancel Info / Signal
//! Info", "Signal-Requested Set").

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::event::EventId;
use crate::ids::{RequestId, SignalName};
use crate::Version;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalInfo {
    pub version: Version,
    pub initiated_id: EventId,
    pub initiated_event_batch_id: EventId,
    pub request_id: RequestId,
    pub signal_name: SignalName,
    pub input: Vec<u8>,
    pub control: Vec<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingSignals {
    by_initiated_id: HashMap<EventId, SignalInfo>,
}

impl PendingSignals {
    pub fn insert(&mut self, info: SignalInfo) {
        self.by_initiated_id.insert(info.initiated_id, info);
    }

    pub fn get(&self, initiated_id: EventId) -> Option<&SignalInfo> {
        self.by_initiated_id.get(&initiated_id)
    }

    pub fn remove(&mut self, initiated_id: EventId) -> Option<SignalInfo> {
        self.by_initiated_id.remove(&initiated_id)
    }

    pub fn len(&self) -> usize {
        self.by_initiated_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_initiated_id.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &SignalInfo> {
        self.by_initiated_id.values()
    }
}

/// Set of externally-supplied request IDs used to deduplicate incoming
/// signals (spec.md §3 "Signal-Requested Set").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalRequestedIds(HashSet<RequestId>);

impl SignalRequestedIds {
    /// Returns `true` if the request ID was newly inserted (i.e. this signal
    /// has not been seen before).
    pub fn insert(&mut self, request_id: RequestId) -> bool {
        self.0.insert(request_id)
    }

    pub fn contains(&self, request_id: &RequestId) -> bool {
        self.0.contains(request_id)
    }

    pub fn remove(&mut self, request_id: &RequestId) -> bool {
        self.0.remove(request_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RequestId> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(initiated_id: EventId) -> SignalInfo {
        SignalInfo {
            version: 1,
            initiated_id,
            initiated_event_batch_id: initiated_id,
            request_id: RequestId::new("req-1"),
            signal_name: SignalName::new("approve"),
            input: Vec::new(),
            control: Vec::new(),
        }
    }

    #[test]
    fn insert_get_remove_round_trip() {
        let mut p = PendingSignals::default();
        p.insert(info(2));
        assert!(p.get(2).is_some());
        p.remove(2);
        assert!(p.is_empty());
    }

    #[test]
    fn signal_requested_ids_dedup() {
        let mut s = SignalRequestedIds::default();
        let id = RequestId::new("req-1");
        assert!(s.insert(id.clone()));
        assert!(!s.insert(id.clone()));
        assert!(s.contains(&id));
    }
}
