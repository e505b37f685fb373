use super::*;

fn started() -> HistoryEvent {
    HistoryEvent::new(
        1,
        1,
        0,
        EventType::WorkflowExecutionStarted(WorkflowStartedAttrs {
            workflow_type: WorkflowTypeName::new("order"),
            task_list: TaskListId::new("default"),
            input: vec![],
            execution_start_to_close_timeout_secs: 3600,
            task_start_to_close_timeout_secs: 10,
            first_decision_task_backoff_secs: 0,
            parent_workflow_id: None,
            parent_run_id: None,
            continued_execution_run_id: None,
            first_run_id: crate::RunId::new(),
            attempt: 0,
            cron_schedule: None,
        }),
    )
}

fn signaled() -> HistoryEvent {
    HistoryEvent::new(
        crate::sentinel::BUFFERED_EVENT_ID,
        1,
        0,
        EventType::WorkflowExecutionSignaled(WorkflowSignaledAttrs {
            signal_name: SignalName::new("approve"),
            input: vec![],
            identity: None,
        }),
    )
}

#[test]
fn workflow_lifecycle_events_are_not_bufferable() {
    assert!(!started().is_bufferable());
}

#[test]
fn signal_events_are_bufferable() {
    assert!(signaled().is_bufferable());
}

#[test]
fn activity_scheduled_is_decider_direct_and_not_bufferable() {
    let e = HistoryEvent::new(
        2,
        1,
        0,
        EventType::ActivityTaskScheduled(ActivityTaskScheduledAttrs {
            activity_id: ActivityId::new("a1"),
            activity_type: "DoThing".into(),
            task_list: TaskListId::new("default"),
            input: vec![],
            schedule_to_close_timeout_secs: 60,
            schedule_to_start_timeout_secs: 60,
            start_to_close_timeout_secs: 60,
            heartbeat_timeout_secs: 0,
            decision_task_completed_event_id: 4,
        }),
    );
    assert!(!e.is_bufferable());
}

#[test]
fn activity_completed_is_bufferable_and_hoisted_on_flush() {
    let e = HistoryEvent::new(
        crate::sentinel::BUFFERED_EVENT_ID,
        1,
        0,
        EventType::ActivityTaskCompleted(ActivityTaskCompletedAttrs {
            scheduled_event_id: 2,
            started_event_id: 3,
            result: vec![],
            identity: None,
        }),
    );
    assert!(e.is_bufferable());
    assert!(e.event_type.is_hoisted_on_flush());
}

#[test]
fn closing_events_are_identified() {
    let e = HistoryEvent::new(
        5,
        1,
        0,
        EventType::WorkflowExecutionCompleted(WorkflowClosedAttrs {
            result_or_details: vec![],
            reason: None,
            decision_task_completed_event_id: 4,
        }),
    );
    assert!(e.is_workflow_closing());
    assert!(!started().is_workflow_closing());
}

#[test]
fn event_type_name_is_stable() {
    assert_eq!(started().event_type.name(), "WorkflowExecutionStarted");
}
