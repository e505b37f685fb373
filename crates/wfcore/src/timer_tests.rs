use super::*;

fn info(timer_id: &str, started_id: EventId, expiry_time_ns: i64) -> TimerInfo {
    TimerInfo { version: 1, timer_id: TimerId::new(timer_id), expiry_time_ns, started_id, timer_task_status: 0 }
}

#[test]
fn insert_and_lookup_by_both_keys() {
    let mut p = PendingTimers::default();
    p.insert(info("t1", 5, 100));
    assert!(p.get(&TimerId::new("t1")).is_some());
    assert!(p.get_by_started_event_id(5).is_some());
    assert!(p.indices_are_consistent());
}

#[test]
fn remove_clears_both_indices() {
    let mut p = PendingTimers::default();
    p.insert(info("t1", 5, 100));
    p.remove(&TimerId::new("t1"));
    assert!(p.get_by_started_event_id(5).is_none());
    assert!(p.indices_are_consistent());
}

#[test]
fn earliest_picks_the_soonest_expiry() {
    let mut p = PendingTimers::default();
    p.insert(info("late", 1, 500));
    p.insert(info("soon", 2, 100));
    assert_eq!(p.earliest().unwrap().timer_id, TimerId::new("soon"));
}

#[test]
fn earliest_on_empty_collection_is_none() {
    assert!(PendingTimers::default().earliest().is_none());
}
