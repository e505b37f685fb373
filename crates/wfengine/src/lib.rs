//! The per-workflow mutable-state engine (spec.md §1-§5).
//!
//! Owns [`mutable_state::MutableState`] — the in-memory aggregate for a
//! single workflow execution — plus the machinery around it: the
//! [`decision_task_manager`] sub-state-machine, the [`history_builder`]
//! and [`buffered_events`] flush/reorder rules, [`transaction`] close, and
//! [`transaction_manager`] dispatch between new- and existing-workflow
//! persistence paths (spec.md §4.4).
//!
//! Everything that talks to an actual store, clock, or shard controller is
//! modeled as a trait or a request parameter ([`shard::ShardContext`],
//! [`transaction::CloseTransactionRequest`]) — this crate is pure
//! in-memory state plus the rules for mutating it (spec.md §1 "Out of
//! scope").

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod buffered_events;
pub mod config;
pub mod decision_task_manager;
pub mod error;
pub mod history_builder;
pub mod mutable_state;
pub mod replication;
pub mod reset_points;
pub mod retry;
pub mod shard;
pub mod transaction;
pub mod transaction_manager;

pub use config::Config;
pub use error::{MutableStateError, Result};
pub use mutable_state::MutableState;
pub use shard::ShardContext;
pub use transaction::{ClosePolicy, CloseTransactionRequest, ClosedTransaction};
