//! `wfcli validate`: check a persisted `WorkflowMutableState` against the
//! quantified invariants spec.md §8 requires to hold after every committed
//! transaction. Exits non-zero if any check fails, printing every
//! violation found rather than stopping at the first.

use std::path::Path;

use wfcore::execution_info::CloseStatus;
use wfcore::sentinel;
use wfcore::{ActivityInfo, TimerInfo, WorkflowState};
use wfstate::contract::WorkflowMutableState;

use crate::exit_error::ExitError;

pub fn run(path: &Path) -> Result<(), ExitError> {
    let bytes = std::fs::read(path)?;
    let state: WorkflowMutableState = serde_json::from_slice(&bytes)?;

    let violations = check(&state);
    if violations.is_empty() {
        println!("ok: all invariants hold");
        return Ok(());
    }

    for violation in &violations {
        println!("violation: {violation}");
    }
    Err(ExitError::new(1, format!("{} invariant violation(s)", violations.len())))
}

fn check(state: &WorkflowMutableState) -> Vec<String> {
    let mut violations = Vec::new();

    // Invariant 1: activityID <-> scheduleID dual index consistency.
    if !activity_indices_consistent(&state.activity_infos) {
        violations.push("activity activityID/scheduleID dual index is inconsistent".to_string());
    }

    // Invariant 2: timer startedID <-> timerID dual index consistency.
    if !timer_indices_consistent(&state.timer_infos) {
        violations.push("timer startedID/timerID dual index is inconsistent".to_string());
    }

    // Invariant 3: version history's last item eventId == nextEventID - 1.
    if let Ok(last) = state.version_histories.current_version_history().last_item() {
        let expected = state.execution_info.next_event_id - 1;
        if last.event_id != expected {
            violations.push(format!(
                "version history last item event_id {} does not equal next_event_id - 1 ({expected})",
                last.event_id
            ));
        }
    }

    // Invariant 4: state = Completed iff close_status != None.
    let is_completed = state.execution_info.state == WorkflowState::Completed;
    let has_close_status = state.execution_info.close_status != CloseStatus::None;
    if is_completed != has_close_status {
        violations.push(format!(
            "state/close_status mismatch: state={} close_status={:?}",
            state.execution_info.state, state.execution_info.close_status
        ));
    }

    // Invariant 5: no committed buffered event holds a sentinel ID.
    for event in &state.buffered_events {
        if event.event_id != sentinel::BUFFERED_EVENT_ID {
            violations.push(format!(
                "persisted buffered event {} does not hold the buffered-event sentinel",
                event.event_id
            ));
        }
    }

    violations
}

fn activity_indices_consistent(infos: &[ActivityInfo]) -> bool {
    let mut by_activity_id = std::collections::HashMap::new();
    for info in infos {
        if let Some(existing) = by_activity_id.insert(info.activity_id.clone(), info.schedule_id) {
            if existing != info.schedule_id {
                return false;
            }
        }
    }
    true
}

fn timer_indices_consistent(infos: &[TimerInfo]) -> bool {
    let mut by_started_id = std::collections::HashMap::new();
    for info in infos {
        if info.started_id == sentinel::EMPTY_EVENT_ID {
            continue;
        }
        if let Some(existing) = by_started_id.insert(info.started_id, info.timer_id.clone()) {
            if existing != info.timer_id {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use wfcore::ids::{BranchToken, DomainId, RunId, WorkflowId};
    use wfcore::version_history::{VersionHistories, VersionHistory, VersionHistoryItem};
    use wfcore::ExecutionInfo;

    use super::*;

    fn base_state() -> WorkflowMutableState {
        let info = ExecutionInfo::new_void(DomainId::new(), WorkflowId::new("wf-1"), RunId::new());
        WorkflowMutableState {
            execution_info: info,
            activity_infos: Vec::new(),
            timer_infos: Vec::new(),
            child_execution_infos: Vec::new(),
            request_cancel_infos: Vec::new(),
            signal_infos: Vec::new(),
            signal_requested_ids: Vec::new(),
            buffered_events: Vec::new(),
            version_histories: VersionHistories::new(VersionHistory::new(
                BranchToken::new("b"),
                vec![VersionHistoryItem::new(0, 0)],
            )),
            checksum: None,
        }
    }

    #[test]
    fn void_execution_with_consistent_version_history_has_no_violations() {
        let mut state = base_state();
        state.execution_info.next_event_id = 1;
        assert!(check(&state).is_empty());
    }

    #[test]
    fn mismatched_state_and_close_status_is_flagged() {
        let mut state = base_state();
        state.execution_info.state = WorkflowState::Completed;
        state.execution_info.close_status = CloseStatus::None;
        let violations = check(&state);
        assert!(violations.iter().any(|v| v.contains("state/close_status mismatch")));
    }

    #[test]
    fn version_history_event_id_mismatch_is_flagged() {
        let mut state = base_state();
        state.execution_info.next_event_id = 10;
        let violations = check(&state);
        assert!(violations.iter().any(|v| v.contains("version history last item")));
    }
}
