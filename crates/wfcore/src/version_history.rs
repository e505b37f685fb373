//! Version histories: per-branch append-only `(eventID, version)` logs used
//! to compare causal order of events across regions (spec.md §3, GLOSSARY).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::EventId;
use crate::ids::BranchToken;
use crate::Version;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionHistoryError {
    #[error("version history item ({event_id}, {version}) is not monotonic after the last item ({last_event_id}, {last_version})")]
    NotMonotonic { event_id: EventId, version: Version, last_event_id: EventId, last_version: Version },
    #[error("version history has no items")]
    Empty,
    #[error("no version history at branch index {0}")]
    NoSuchBranch(usize),
}

/// One `(eventID, version)` pair. Both fields are non-decreasing within a
/// single history (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionHistoryItem {
    pub event_id: EventId,
    pub version: Version,
}

impl VersionHistoryItem {
    pub const fn new(event_id: EventId, version: Version) -> Self {
        Self { event_id, version }
    }
}

/// A single branch: an append-only, ordered sequence of items plus the
/// branch token identifying its underlying history-store branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionHistory {
    pub branch_token: BranchToken,
    items: Vec<VersionHistoryItem>,
}

impl VersionHistory {
    pub fn new(branch_token: BranchToken, items: Vec<VersionHistoryItem>) -> Self {
        Self { branch_token, items }
    }

    pub fn items(&self) -> &[VersionHistoryItem] {
        &self.items
    }

    pub fn last_item(&self) -> Result<VersionHistoryItem, VersionHistoryError> {
        self.items.last().copied().ok_or(VersionHistoryError::Empty)
    }

    /// Append an item, enforcing monotonicity of both fields (spec.md §3
    /// invariant: "monotonically non-decreasing in both fields").
    #[allow(clippy::expect_used)]
    pub fn add_or_update_item(&mut self, item: VersionHistoryItem) -> Result<(), VersionHistoryError> {
        if let Some(last) = self.items.last().copied() {
            if item.event_id < last.event_id || item.version < last.version {
                return Err(VersionHistoryError::NotMonotonic {
                    event_id: item.event_id,
                    version: item.version,
                    last_event_id: last.event_id,
                    last_version: last.version,
                });
            }
            if item.event_id == last.event_id {
                // Same event re-versioned (e.g. failover mid-batch): replace in place.
                *self.items.last_mut().expect("checked non-empty above") = item;
                return Ok(());
            }
        }
        self.items.push(item);
        Ok(())
    }

    /// The version in effect at `event_id`, i.e. the version of the last
    /// item whose `event_id` is `<= event_id`.
    pub fn version_at(&self, event_id: EventId) -> Option<Version> {
        self.items.iter().rev().find(|i| i.event_id <= event_id).map(|i| i.version)
    }

    /// A new branch sharing this one's items up to and including `fork_event_id`.
    pub fn fork(&self, fork_event_id: EventId, new_branch_token: BranchToken) -> Self {
        let items = self.items.iter().copied().take_while(|i| i.event_id <= fork_event_id).collect();
        Self::new(new_branch_token, items)
    }
}

/// Ordering relationship between two version histories, used by the
/// Transaction Manager's "happens after" dispatch (spec.md §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOrdering {
    Equal,
    HappensBefore,
    HappensAfter,
    /// Neither history's last item dominates the other's (diverged branches).
    Concurrent,
}

/// The VersionHistories aggregate: one or more branches plus an index
/// naming the current branch (spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionHistories {
    current_branch_index: usize,
    histories: Vec<VersionHistory>,
}

impl VersionHistories {
    pub fn new(first: VersionHistory) -> Self {
        Self { current_branch_index: 0, histories: vec![first] }
    }

    pub fn current_branch_index(&self) -> usize {
        self.current_branch_index
    }

    pub fn current_version_history(&self) -> &VersionHistory {
        &self.histories[self.current_branch_index]
    }

    pub fn current_version_history_mut(&mut self) -> &mut VersionHistory {
        &mut self.histories[self.current_branch_index]
    }

    pub fn branches(&self) -> &[VersionHistory] {
        &self.histories
    }

    pub fn set_current_branch_index(&mut self, index: usize) -> Result<(), VersionHistoryError> {
        if index >= self.histories.len() {
            return Err(VersionHistoryError::NoSuchBranch(index));
        }
        self.current_branch_index = index;
        Ok(())
    }

    /// Fork the current branch at `fork_event_id`, append it, and make it
    /// current. Returns the new branch's index.
    pub fn fork_current_branch(&mut self, fork_event_id: EventId, new_branch_token: BranchToken) -> usize {
        let forked = self.current_version_history().fork(fork_event_id, new_branch_token);
        self.histories.push(forked);
        self.current_branch_index = self.histories.len() - 1;
        self.current_branch_index
    }

    /// Compare two aggregates by their current branches' last items — the
    /// vector-clock "happens after" check the Transaction Manager uses to
    /// decide which of two concurrently created runs wins (spec.md §4.4).
    pub fn compare(&self, other: &VersionHistories) -> Result<HistoryOrdering, VersionHistoryError> {
        let a = self.current_version_history().last_item()?;
        let b = other.current_version_history().last_item()?;
        Ok(if a.version == b.version && a.event_id == b.event_id {
            HistoryOrdering::Equal
        } else if a.version != b.version {
            if a.version > b.version {
                HistoryOrdering::HappensAfter
            } else {
                HistoryOrdering::HappensBefore
            }
        } else if a.event_id > b.event_id {
            HistoryOrdering::HappensAfter
        } else {
            HistoryOrdering::HappensBefore
        })
    }
}

#[cfg(test)]
#[path = "version_history_tests.rs"]
mod tests;
