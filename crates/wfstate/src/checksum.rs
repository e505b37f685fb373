//! Probabilistic, advisory mutable-state checksum (spec.md §9 "Checksum is
//! advisory"; SPEC_FULL.md §C).
//!
//! Generation and verification are both sampled by configuration
//! (`wfengine::Config`) and never fail a transaction on mismatch — a
//! mismatch is logged and counted (spec.md §7 "Data inconsistency"). The
//! only thing this module guarantees is that equal input produces equal
//! output: canonicalize before hashing by serializing through
//! `serde_json::Value`, whose `Map` is a `BTreeMap` (sorted by key) unless
//! the `preserve_order` feature is enabled, which this workspace does not use.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const CURRENT_CHECKSUM_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ChecksumError {
    #[error("failed to canonicalize value for checksum: {0}")]
    Canonicalize(#[from] serde_json::Error),
}

/// A versioned, deterministic digest of a mutable state's canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksum {
    pub version: u32,
    pub value: String,
    pub generated_at_ns: i64,
}

/// Compute a checksum over any serializable snapshot of state.
///
/// `generated_at_ns` is passed in rather than read from a clock so this
/// function stays pure and unit-testable; callers supply the transaction's
/// `now`.
pub fn compute<T: Serialize>(value: &T, generated_at_ns: i64) -> Result<Checksum, ChecksumError> {
    let canonical = serde_json::to_value(value)?;
    let bytes = serde_json::to_vec(&canonical)?;
    let digest = Sha256::digest(&bytes);
    Ok(Checksum { version: CURRENT_CHECKSUM_VERSION, value: format!("{digest:x}"), generated_at_ns })
}

/// Verify a previously computed checksum against the current value.
/// Returns `false` on mismatch; callers log and increment a metric rather
/// than failing the transaction (spec.md §9).
pub fn verify<T: Serialize>(expected: &Checksum, value: &T) -> Result<bool, ChecksumError> {
    let canonical = serde_json::to_value(value)?;
    let bytes = serde_json::to_vec(&canonical)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{digest:x}") == expected.value)
}

/// Discard checksums generated before this epoch on load
/// (`mutableStateChecksumInvalidateBefore`, spec.md §6).
pub fn is_invalidated(checksum: &Checksum, invalidate_before_ns: i64) -> bool {
    checksum.generated_at_ns < invalidate_before_ns
}
