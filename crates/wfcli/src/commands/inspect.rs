//! `wfcli inspect`: print a summary of a persisted `WorkflowMutableState`.

use std::path::Path;

use wfstate::contract::WorkflowMutableState;

use crate::exit_error::ExitError;

pub fn run(path: &Path) -> Result<(), ExitError> {
    let bytes = std::fs::read(path)?;
    let state: WorkflowMutableState = serde_json::from_slice(&bytes)?;
    print_summary(&state);
    Ok(())
}

fn print_summary(state: &WorkflowMutableState) {
    let info = &state.execution_info;
    println!("workflow execution");
    println!("  domain_id:        {}", info.domain_id);
    println!("  workflow_id:      {}", info.workflow_id);
    println!("  run_id:           {}", info.run_id);
    println!("  workflow_type:    {}", info.workflow_type_name.as_str());
    println!("  state:            {}", info.state);
    println!("  close_status:     {:?}", info.close_status);
    println!("  next_event_id:    {}", info.next_event_id);
    println!("  last_first_event: {}", info.last_first_event_id);
    println!("  has_in_flight_decision: {}", info.has_in_flight_decision());
    println!();
    println!("pending collections");
    println!("  activities:        {}", state.activity_infos.len());
    println!("  timers:            {}", state.timer_infos.len());
    println!("  child_executions:  {}", state.child_execution_infos.len());
    println!("  request_cancels:   {}", state.request_cancel_infos.len());
    println!("  signals:           {}", state.signal_infos.len());
    println!("  signal_requested:  {}", state.signal_requested_ids.len());
    println!("  buffered_events:   {}", state.buffered_events.len());
    println!();
    match state.version_histories.current_version_history().last_item() {
        Ok(item) => println!("current branch last item: event_id={} version={}", item.event_id, item.version),
        Err(err) => println!("current branch has no items: {err}"),
    }
    println!("branches: {}", state.version_histories.branches().len());
    match &state.checksum {
        Some(checksum) => println!("checksum: version={} value={}", checksum.version, checksum.value),
        None => println!("checksum: none"),
    }
}
