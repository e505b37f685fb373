//! `MutableStateError`: the engine's single error enum (spec.md §7).
//!
//! Grounded on `oj_daemon::lifecycle::mod.rs::LifecycleError`'s shape — one
//! variant per failure source, `#[from]` conversions for lower-layer
//! errors, never a generic "anyhow"-style catch-all.

use thiserror::Error;

use wfcore::event::EventId;
use wfstate::StoreError;

/// Whether an `InvalidHistoryAction` is a bug in this process (non-retriable)
/// or bad input from the caller (retriable by the client) — spec.md §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidHistoryActionKind {
    InternalServerError,
    CallerError,
}

#[derive(Debug, Error)]
pub enum MutableStateError {
    /// Attempted mutation of a terminal workflow (spec.md §7).
    #[error("workflow is finished: attempted {action}")]
    WorkflowFinished { action: &'static str },

    /// A required pending entity was not found (spec.md §7).
    #[error("missing {entity_kind} entity for {action} (key: {key})")]
    MissingEntity { entity_kind: &'static str, action: &'static str, key: String },

    /// A stored event could not be found; re-wrapped with a specific cause
    /// so downstream task processors don't silently skip the work (spec.md §7).
    #[error("missing workflow start event for run {run_id}")]
    MissingWorkflowStartEvent { run_id: String },
    #[error("missing workflow completion event for run {run_id}")]
    MissingWorkflowCompletionEvent { run_id: String },
    #[error("missing activity scheduled event {schedule_id} for run {run_id}")]
    MissingActivityScheduledEvent { run_id: String, schedule_id: EventId },
    #[error("missing child workflow initiated event {initiated_id} for run {run_id}")]
    MissingChildWorkflowInitiatedEvent { run_id: String, initiated_id: EventId },

    /// Transactional invariant violated at close: the caller must reload
    /// (spec.md §7).
    #[error("events appended after workflow finish during {action}")]
    EventsAfterWorkflowFinish { action: &'static str },

    /// Event appended in the wrong mutable-state configuration (spec.md §7),
    /// split by who is at fault.
    #[error("invalid history action during {action}: {reason} ({kind:?})")]
    InvalidHistoryAction { action: &'static str, reason: String, kind: InvalidHistoryActionKind },

    /// A replication-only path reached on a non-replicated workflow; fatal
    /// (spec.md §7).
    #[error("missing version histories during {action}")]
    MissingVersionHistories { action: &'static str },

    /// Close-time policy check failed; the caller retries against the
    /// active region (spec.md §4.3 step 1, §7).
    #[error("domain {domain_id} is not active in this cluster")]
    DomainNotActive { domain_id: String },

    /// Replication request failed validation (spec.md §6 "Replication request").
    #[error("invalid replication request: {0}")]
    InvalidReplicationRequest(String),

    #[error("persistence error: {0}")]
    Store(#[from] StoreError),
}

impl MutableStateError {
    pub fn invalid_history_action(
        action: &'static str,
        reason: impl Into<String>,
        kind: InvalidHistoryActionKind,
    ) -> Self {
        Self::InvalidHistoryAction { action, reason: reason.into(), kind }
    }

    /// The stable message-template tag spec.md §7 says is "used by metrics
    /// and log-sampling" — the variant name itself, independent of its
    /// interpolated fields.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::WorkflowFinished { .. } => "WorkflowFinished",
            Self::MissingEntity { .. } => "MissingEntity",
            Self::MissingWorkflowStartEvent { .. } => "MissingWorkflowStartEvent",
            Self::MissingWorkflowCompletionEvent { .. } => "MissingWorkflowCompletionEvent",
            Self::MissingActivityScheduledEvent { .. } => "MissingActivityScheduledEvent",
            Self::MissingChildWorkflowInitiatedEvent { .. } => "MissingChildWorkflowInitiatedEvent",
            Self::EventsAfterWorkflowFinish { .. } => "EventsAfterWorkflowFinish",
            Self::InvalidHistoryAction { .. } => "InvalidHistoryAction",
            Self::MissingVersionHistories { .. } => "MissingVersionHistories",
            Self::DomainNotActive { .. } => "DomainNotActive",
            Self::InvalidReplicationRequest(_) => "InvalidReplicationRequest",
            Self::Store(_) => "Store",
        }
    }
}

pub type Result<T> = std::result::Result<T, MutableStateError>;
