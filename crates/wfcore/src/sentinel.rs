//! Sentinel values for event IDs, versions and task IDs (spec.md §6).
//!
//! Every comparison against one of these should name the constant rather
//! than inline the magic number, mirroring the rest of the corpus's use of
//! named statics over bare literals.

use crate::event::EventId;
use crate::Version;

/// No event has happened yet (e.g. a pending activity that hasn't started).
pub const EMPTY_EVENT_ID: EventId = 0;

/// The ID of the first event appended to any workflow execution's history.
pub const FIRST_EVENT_ID: EventId = 1;

/// Placeholder ID for an event created while a decision task is in flight.
/// Replaced with a real, monotonically assigned ID at flush time.
pub const BUFFERED_EVENT_ID: EventId = -123;

/// Placeholder ID for a decision scheduled/started pair produced during a
/// decider retry. Never durably appended; only ever synthesized into real
/// history if the retry succeeds.
pub const TRANSIENT_EVENT_ID: EventId = -124;

/// No failover version has been assigned.
pub const EMPTY_VERSION: Version = -1;

/// No task ID has been assigned to the last appended event yet.
pub const EMPTY_EVENT_TASK_ID: i64 = 0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_distinct() {
        assert_ne!(BUFFERED_EVENT_ID, TRANSIENT_EVENT_ID);
        assert_ne!(BUFFERED_EVENT_ID, EMPTY_EVENT_ID);
        assert_ne!(TRANSIENT_EVENT_ID, EMPTY_EVENT_ID);
    }

    #[test]
    fn buffered_and_transient_ids_are_negative() {
        assert!(BUFFERED_EVENT_ID < 0);
        assert!(TRANSIENT_EVENT_ID < 0);
    }
}
