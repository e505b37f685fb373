//! History Builder: the append-only buffer of events being constructed in
//! the current transaction (spec.md §2, §9 "Transient decision events").
//!
//! Keeps committed/pending-buffered events (`history`) strictly separate
//! from the transient decision scheduled/started pair (`transient_history`)
//! — spec.md is explicit that task-ID assignment, replication, and the
//! buffered-events rules differ between the two.

use wfcore::event::EventId;
use wfcore::HistoryEvent;

#[derive(Debug, Default)]
pub struct HistoryBuilder {
    /// Events appended this transaction: some already carry a real ID
    /// (non-bufferable, or decider-direct), others still carry
    /// `BufferedEventID` until flush.
    history: Vec<HistoryEvent>,
    /// The current decision's transient scheduled+started pair, if any
    /// (spec.md §4.2 `CreateTransientDecisionEvents`). Never persisted
    /// unless the decision completes, at which point the recorded pair is
    /// synthesized into `history` as real committed events.
    transient_history: Vec<HistoryEvent>,
}

impl HistoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, event: HistoryEvent) {
        self.history.push(event);
    }

    pub fn history(&self) -> &[HistoryEvent] {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut Vec<HistoryEvent> {
        &mut self.history
    }

    pub fn transient_history(&self) -> &[HistoryEvent] {
        &self.transient_history
    }

    pub fn transient_history_mut(&mut self) -> &mut Vec<HistoryEvent> {
        &mut self.transient_history
    }

    pub fn set_transient_decision_events(&mut self, scheduled: HistoryEvent, started: HistoryEvent) {
        self.transient_history = vec![scheduled, started];
    }

    pub fn clear_transient_history(&mut self) {
        self.transient_history.clear();
    }

    pub fn has_transient_decision(&self) -> bool {
        !self.transient_history.is_empty()
    }

    /// Move the transient pair into committed history (decision completed
    /// successfully) and clear the transient slot.
    pub fn commit_transient_decision(&mut self) {
        self.history.append(&mut self.transient_history);
    }

    pub fn pending_buffered_events(&self) -> impl Iterator<Item = &HistoryEvent> {
        self.history.iter().filter(|e| e.event_id == wfcore::sentinel::BUFFERED_EVENT_ID)
    }

    pub fn committed_events(&self) -> impl Iterator<Item = &HistoryEvent> {
        self.history.iter().filter(|e| e.event_id != wfcore::sentinel::BUFFERED_EVENT_ID)
    }

    pub fn has_pending_buffered_events(&self) -> bool {
        self.pending_buffered_events().next().is_some()
    }

    /// Replace the current batch with a new one (used by the flush
    /// algorithm to install the reordered, ID-assigned result) and return
    /// what was there before.
    pub fn take_history(&mut self) -> Vec<HistoryEvent> {
        std::mem::take(&mut self.history)
    }

    pub fn set_history(&mut self, history: Vec<HistoryEvent>) {
        self.history = history;
    }

    pub fn max_event_id(&self) -> Option<EventId> {
        self.history.iter().map(|e| e.event_id).filter(|id| *id > 0).max()
    }
}

#[cfg(test)]
#[path = "history_builder_tests.rs"]
mod tests;
