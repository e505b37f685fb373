//! Pending external-workflow request-cancels, keyed by `initiatedEventID`
//! (spec.md §3 "Request-Cancel Info").

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::event::EventId;
use crate::ids::RequestId;
use crate::Version;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestCancelInfo {
    pub version: Version,
    pub initiated_id: EventId,
    pub initiated_event_batch_id: EventId,
    pub request_id: RequestId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingRequestCancels {
    by_initiated_id: HashMap<EventId, RequestCancelInfo>,
}

impl PendingRequestCancels {
    pub fn insert(&mut self, info: RequestCancelInfo) {
        self.by_initiated_id.insert(info.initiated_id, info);
    }

    pub fn get(&self, initiated_id: EventId) -> Option<&RequestCancelInfo> {
        self.by_initiated_id.get(&initiated_id)
    }

    pub fn remove(&mut self, initiated_id: EventId) -> Option<RequestCancelInfo> {
        self.by_initiated_id.remove(&initiated_id)
    }

    pub fn len(&self) -> usize {
        self.by_initiated_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_initiated_id.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &RequestCancelInfo> {
        self.by_initiated_id.values()
    }
}
