//! Persistence contract and storage for the mutable-state engine.
//!
//! This crate has no opinions about *when* to load, mutate, or close a
//! workflow execution — that policy lives in `wfengine`. It only defines
//! the shapes persistence reads and writes (`WorkflowMutableState`,
//! `WorkflowMutation`, `WorkflowSnapshot`, `WorkflowEvents`) and a store
//! trait plus in-memory implementation satisfying it.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod checksum;
pub mod contract;
pub mod store;

pub use checksum::Checksum;
pub use contract::{EntityDelta, WorkflowEvents, WorkflowMutableState, WorkflowMutation, WorkflowSnapshot};
pub use store::{ExecutionKey, InMemoryWorkflowStore, StoreError, WorkflowStore};
