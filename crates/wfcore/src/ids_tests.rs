use super::*;

#[test]
fn uuid_id_round_trips_through_string() {
    let id = RunId::new();
    let parsed = RunId::parse_str(&id.to_string()).expect("valid uuid");
    assert_eq!(id, parsed);
}

#[test]
fn uuid_id_rejects_garbage() {
    assert!(RunId::parse_str("not-a-uuid").is_err());
    assert!(DomainId::parse_str("").is_err());
}

#[test]
fn nil_is_the_zero_uuid() {
    assert!(RunId::nil().is_nil());
    assert_eq!(RunId::default(), RunId::nil());
}

#[test]
fn string_id_equality_and_borrow() {
    let wf = WorkflowId::new("order-123");
    assert_eq!(wf, "order-123");
    assert_eq!(wf.as_str(), "order-123");

    let mut set = std::collections::HashSet::new();
    set.insert(wf.clone());
    assert!(set.contains("order-123"));
}

#[test]
fn string_id_from_owned_and_borrowed() {
    let a: TaskListId = "default".into();
    let b: TaskListId = String::from("default").into();
    assert_eq!(a, b);
}
