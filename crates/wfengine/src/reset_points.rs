//! Auto-reset points / binary-checksum rotation (spec.md §4.1 "Auto-reset
//! points (binary checksum list)").
//!
//! Grounded on `oj_daemon::storage::snapshot.rs`'s `rotate_bak_path`/
//! `MAX_BAK_FILES` capacity-trimming pattern: append, then trim the oldest
//! entry once a fixed cap is exceeded.

use wfcore::event::EventId;
use wfcore::execution_info::ResetPoint;
use wfcore::ids::RunId;

/// Well-known search-attribute key the JSON-encoded recent-checksums list is
/// written under (spec.md §4.1).
pub const BINARY_CHECKSUMS_SEARCH_ATTRIBUTE_KEY: &str = "BinaryChecksums";

/// Append `binary_checksum` to `points`, trimming the oldest entry if the
/// list would exceed `max_points`. `resettable` should be `false` whenever
/// the workflow currently has pending child executions, request cancels, or
/// signal sends (spec.md §4.1).
pub fn add_reset_point(
    points: &mut Vec<ResetPoint>,
    max_points: usize,
    binary_checksum: String,
    run_id: RunId,
    first_decision_completed_id: EventId,
    created_at_ns: i64,
    resettable: bool,
) {
    // A binary that already has a reset point keeps its original entry
    // rather than accumulating duplicates.
    if points.iter().any(|p| p.binary_checksum == binary_checksum) {
        return;
    }

    points.push(ResetPoint {
        binary_checksum,
        run_id,
        first_decision_completed_id,
        created_at_ns,
        expiring_at_ns: None,
        resettable,
    });

    if max_points > 0 {
        while points.len() > max_points {
            points.remove(0);
        }
    }
}

/// `Resettable` is false if the workflow currently has any pending child
/// executions, request cancels, or signal sends (spec.md §4.1).
pub fn is_resettable(
    has_pending_children: bool,
    has_pending_request_cancels: bool,
    has_pending_signal_sends: bool,
) -> bool {
    !(has_pending_children || has_pending_request_cancels || has_pending_signal_sends)
}

/// JSON-encode the checksums in `points`, for the search-attribute write
/// described in spec.md §4.1.
pub fn encode_search_attribute(points: &[ResetPoint]) -> Result<Vec<u8>, serde_json::Error> {
    let checksums: Vec<&str> = points.iter().map(|p| p.binary_checksum.as_str()).collect();
    serde_json::to_vec(&checksums)
}
