//! Configuration surface (spec.md §6 "Configuration surface").
//!
//! Grounded on `oj_daemon::lifecycle::mod.rs::Config`/`Config::load()`: a
//! plain struct of knobs with a `Default` impl, not scattered magic
//! numbers or environment parsing inside business logic.

/// Controls whether search-attribute tasks are generated when upserting
/// attributes (spec.md §6 `advancedVisibilityWritingMode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvancedVisibilityWritingMode {
    Off,
    On,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Hard ceiling on the buffered-events queue; exceeding it force-fails
    /// the in-flight decision (spec.md §4.3 step 2, §8 boundary behavior).
    pub max_buffered_events_batch: usize,

    /// Cap on binary-checksum auto-reset-point history length (spec.md §4.1).
    pub max_auto_reset_points: usize,

    /// Duration after which the sticky task list is considered stale
    /// (spec.md §6 `stickyTTL`).
    pub sticky_ttl_secs: i64,

    pub advanced_visibility_writing_mode: AdvancedVisibilityWritingMode,

    /// Sampling rate (0.0-1.0) for checksum generation (spec.md §6
    /// `mutableStateChecksumGenProbability`).
    pub checksum_gen_probability: f64,

    /// Sampling rate (0.0-1.0) for checksum verification (spec.md §6
    /// `mutableStateChecksumVerifyProbability`).
    pub checksum_verify_probability: f64,

    /// Epoch (nanoseconds) before which existing checksums are discarded on
    /// load (spec.md §6 `mutableStateChecksumInvalidateBefore`).
    pub checksum_invalidate_before_ns: i64,

    /// Whether to emit replication tasks for events originating locally
    /// (spec.md §6 `replicationEventsFromCurrentCluster`).
    pub replication_events_from_current_cluster: bool,

    /// Permits in-process activity dispatch hint (spec.md §6
    /// `enableActivityLocalDispatchByDomain`).
    pub enable_activity_local_dispatch_by_domain: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_buffered_events_batch: 100,
            max_auto_reset_points: 20,
            sticky_ttl_secs: 300,
            advanced_visibility_writing_mode: AdvancedVisibilityWritingMode::Off,
            checksum_gen_probability: 0.0,
            checksum_verify_probability: 0.0,
            checksum_invalidate_before_ns: 0,
            replication_events_from_current_cluster: false,
            enable_activity_local_dispatch_by_domain: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_scenario_4_ceiling() {
        // spec.md §8 concrete scenario 4 uses maxBufferedEventsBatch = 100.
        assert_eq!(Config::default().max_buffered_events_batch, 100);
    }
}
