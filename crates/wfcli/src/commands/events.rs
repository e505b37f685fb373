//! `wfcli events`: print the history events in a persisted `WorkflowEvents`
//! batch, one line per event.

use std::path::Path;

use wfstate::contract::WorkflowEvents;

use crate::exit_error::ExitError;

pub fn run(path: &Path) -> Result<(), ExitError> {
    let bytes = std::fs::read(path)?;
    let batch: WorkflowEvents = serde_json::from_slice(&bytes)?;

    println!("branch: {}  run: {}  events: {}", batch.branch_token, batch.run_id, batch.events.len());
    for event in &batch.events {
        println!(
            "  [{:>6}] v{:<4} task={:<8} ts={:<15} {}",
            event.event_id,
            event.version,
            event.task_id,
            event.timestamp_ns,
            event.event_type.name(),
        );
    }
    Ok(())
}
