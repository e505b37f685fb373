//! Data model for the per-workflow mutable-state engine.
//!
//! This crate owns the plain-data shapes — execution info, the five pending
//! entity collections, version histories, and the history-event schema — that
//! `wfengine` mutates and `wfstate` persists. Nothing in here talks to a
//! store or a clock; it is pure data plus the small invariant-preserving
//! methods that keep dual indices consistent.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

#[macro_use]
mod macros;

pub mod activity;
pub mod child_execution;
pub mod event;
pub mod execution_info;
pub mod ids;
pub mod request_cancel;
pub mod sentinel;
pub mod signal;
pub mod tasks;
pub mod timer;
pub mod version_history;

pub use activity::ActivityInfo;
pub use child_execution::ChildExecutionInfo;
pub use event::{Event, EventId, EventType, HistoryEvent, ParentClosePolicy};
pub use execution_info::{CloseStatus, ExecutionInfo, WorkflowState};
pub use ids::{
    ActivityId, BranchToken, DomainId, RequestId, RunId, SignalName, TaskListId, TimerId,
    WorkflowId, WorkflowTypeName,
};
pub use request_cancel::RequestCancelInfo;
pub use signal::SignalInfo;
pub use tasks::{ReplicationTask, TimerTask, TransferTask};
pub use timer::TimerInfo;
pub use version_history::{VersionHistories, VersionHistory, VersionHistoryItem};

/// Cross-region failover version embedded in every event (spec.md GLOSSARY).
pub type Version = i64;

/// Strictly monotonic, per-shard task identifier (spec.md §5).
pub type TaskId = i64;
