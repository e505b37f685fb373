use super::*;
use wfcore::activity::{ActivityInfo, ActivityTimeouts, PendingActivities};
use wfcore::child_execution::PendingChildExecutions;
use wfcore::event::*;
use wfcore::execution_info::RetryState;
use wfcore::ids::{DomainId, RunId, TaskListId, WorkflowId, WorkflowTypeName};
use wfcore::ExecutionInfo;

fn fresh_execution_info(next_event_id: EventId) -> ExecutionInfo {
    let mut info = ExecutionInfo::new_void(DomainId::new(), WorkflowId::new("wf-1"), RunId::new());
    info.next_event_id = next_event_id;
    info
}

fn event(id: EventId, event_type: EventType) -> HistoryEvent {
    HistoryEvent::new(id, 1, 0, event_type)
}

fn started_attrs() -> WorkflowStartedAttrs {
    WorkflowStartedAttrs {
        workflow_type: WorkflowTypeName::new("order"),
        task_list: TaskListId::new("default"),
        input: vec![],
        execution_start_to_close_timeout_secs: 3600,
        task_start_to_close_timeout_secs: 10,
        first_decision_task_backoff_secs: 0,
        parent_workflow_id: None,
        parent_run_id: None,
        continued_execution_run_id: None,
        first_run_id: RunId::new(),
        attempt: 0,
        cron_schedule: None,
    }
}

// spec.md §8 concrete scenario 1: signal buffered while a decision is in
// flight gets the next real ID on flush, after the already-assigned events.
#[test]
fn scenario_1_signal_buffered_during_in_flight_decision() {
    let mut builder = HistoryBuilder::new();
    builder.append(event(1, EventType::WorkflowExecutionStarted(started_attrs())));
    builder.append(event(
        2,
        EventType::DecisionTaskScheduled(DecisionTaskScheduledAttrs {
            task_list: TaskListId::new("default"),
            start_to_close_timeout_secs: 10,
            attempt: 1,
        }),
    ));
    builder.append(event(
        3,
        EventType::DecisionTaskStarted(DecisionTaskStartedAttrs {
            scheduled_event_id: 2,
            request_id: wfcore::ids::RequestId::new("req-1"),
            identity: None,
        }),
    ));
    builder.append(HistoryEvent::new(
        wfcore::sentinel::BUFFERED_EVENT_ID,
        1,
        0,
        EventType::WorkflowExecutionSignaled(WorkflowSignaledAttrs {
            signal_name: wfcore::ids::SignalName::new("approve"),
            input: vec![],
            identity: None,
        }),
    ));
    builder.append(event(
        4,
        EventType::DecisionTaskCompleted(DecisionTaskCompletedAttrs {
            scheduled_event_id: 2,
            started_event_id: 3,
            identity: None,
            binary_checksum: None,
        }),
    ));

    let mut execution_info = fresh_execution_info(5);
    let mut activities = PendingActivities::default();
    let mut children = PendingChildExecutions::default();
    let mut next_task_id = {
        let mut n = 1;
        move || {
            let id = n;
            n += 1;
            id
        }
    };

    flush_buffered_events(&mut builder, vec![], &mut execution_info, &mut activities, &mut children, &mut next_task_id);

    let ids: Vec<EventId> = builder.history().iter().map(|e| e.event_id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert!(matches!(builder.history()[4].event_type, EventType::WorkflowExecutionSignaled(_)));
    assert_eq!(execution_info.next_event_id, 6);
}

// spec.md §8 concrete scenario 2: a reversed activity started/completed
// pair in the buffered queue is reordered so started precedes completed,
// and the completed event's startedEventID back-reference is fixed up.
#[test]
fn scenario_2_out_of_order_activity_events_reordered() {
    let mut builder = HistoryBuilder::new();
    builder.append(HistoryEvent::new(
        wfcore::sentinel::BUFFERED_EVENT_ID,
        1,
        0,
        EventType::ActivityTaskCompleted(ActivityTaskCompletedAttrs {
            scheduled_event_id: 4,
            started_event_id: 0,
            result: vec![],
            identity: None,
        }),
    ));
    builder.append(HistoryEvent::new(
        wfcore::sentinel::BUFFERED_EVENT_ID,
        1,
        0,
        EventType::ActivityTaskStarted(ActivityTaskStartedAttrs {
            scheduled_event_id: 4,
            identity: None,
            request_id: wfcore::ids::RequestId::new("req-2"),
            attempt: 0,
        }),
    ));

    let mut execution_info = fresh_execution_info(5);
    let mut activities = PendingActivities::default();
    activities.insert(ActivityInfo {
        version: 1,
        schedule_id: 4,
        scheduled_event_batch_id: 4,
        scheduled_time_ns: 0,
        started_id: wfcore::sentinel::EMPTY_EVENT_ID,
        started_time_ns: 0,
        activity_id: wfcore::ids::ActivityId::new("a1"),
        target_domain_id: None,
        timeouts: ActivityTimeouts::default(),
        cancel_requested: false,
        cancel_request_id: None,
        last_heartbeat_time_ns: 0,
        timer_task_status: 0,
        task_list: TaskListId::new("default"),
        retry: RetryState::default(),
        last_failure_reason: None,
        last_failure_details: vec![],
        last_worker_identity: None,
        attempt: 0,
        expiration_time_ns: None,
    });
    let mut children = PendingChildExecutions::default();
    let mut next_task_id = {
        let mut n = 1;
        move || {
            let id = n;
            n += 1;
            id
        }
    };

    flush_buffered_events(&mut builder, vec![], &mut execution_info, &mut activities, &mut children, &mut next_task_id);

    let history = builder.history();
    assert_eq!(history.len(), 2);
    assert!(matches!(history[0].event_type, EventType::ActivityTaskStarted(_)));
    assert!(matches!(history[1].event_type, EventType::ActivityTaskCompleted(_)));
    assert_eq!(history[0].event_id, 5);
    assert_eq!(history[1].event_id, 6);
    match &history[1].event_type {
        EventType::ActivityTaskCompleted(attrs) => assert_eq!(attrs.started_event_id, 5),
        _ => panic!("expected ActivityTaskCompleted"),
    }
    assert_eq!(activities.get(4).unwrap().started_id, 5);
}

#[test]
fn flush_with_nothing_buffered_is_idempotent() {
    let mut builder = HistoryBuilder::new();
    builder.append(event(1, EventType::WorkflowExecutionStarted(started_attrs())));
    let mut execution_info = fresh_execution_info(2);
    let mut activities = PendingActivities::default();
    let mut children = PendingChildExecutions::default();

    flush_buffered_events(&mut builder, vec![], &mut execution_info, &mut activities, &mut children, || 1);
    let first = builder.history().to_vec();
    flush_buffered_events(&mut builder, vec![], &mut execution_info, &mut activities, &mut children, || 1);
    assert_eq!(builder.history(), first.as_slice());
}

#[test]
fn trims_events_after_first_closing_event() {
    let mut builder = HistoryBuilder::new();
    builder.append(event(1, EventType::WorkflowExecutionStarted(started_attrs())));
    builder.append(event(
        2,
        EventType::WorkflowExecutionCompleted(WorkflowClosedAttrs {
            result_or_details: vec![],
            reason: None,
            decision_task_completed_event_id: 1,
        }),
    ));
    builder.append(HistoryEvent::new(
        wfcore::sentinel::BUFFERED_EVENT_ID,
        1,
        0,
        EventType::WorkflowExecutionSignaled(WorkflowSignaledAttrs {
            signal_name: wfcore::ids::SignalName::new("late"),
            input: vec![],
            identity: None,
        }),
    ));

    let mut execution_info = fresh_execution_info(3);
    let mut activities = PendingActivities::default();
    let mut children = PendingChildExecutions::default();
    flush_buffered_events(&mut builder, vec![], &mut execution_info, &mut activities, &mut children, || 1);

    assert_eq!(builder.history().len(), 2);
    assert!(matches!(builder.history()[1].event_type, EventType::WorkflowExecutionCompleted(_)));
}
