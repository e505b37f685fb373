use super::*;

fn branch_token() -> BranchToken {
    BranchToken::new("branch-a")
}

#[test]
fn append_enforces_monotonicity() {
    let mut h = VersionHistory::new(branch_token(), vec![VersionHistoryItem::new(1, 1)]);
    assert!(h.add_or_update_item(VersionHistoryItem::new(2, 1)).is_ok());
    assert!(h.add_or_update_item(VersionHistoryItem::new(1, 1)).is_err());
    assert!(h.add_or_update_item(VersionHistoryItem::new(3, 0)).is_err());
}

#[test]
fn append_replaces_same_event_id_in_place() {
    let mut h = VersionHistory::new(branch_token(), vec![VersionHistoryItem::new(1, 1)]);
    h.add_or_update_item(VersionHistoryItem::new(2, 2)).unwrap();
    h.add_or_update_item(VersionHistoryItem::new(2, 3)).unwrap();
    assert_eq!(h.items(), &[VersionHistoryItem::new(1, 1), VersionHistoryItem::new(2, 3)]);
}

#[test]
fn last_item_on_empty_history_errors() {
    let h = VersionHistory::new(branch_token(), vec![]);
    assert_eq!(h.last_item(), Err(VersionHistoryError::Empty));
}

#[test]
fn fork_keeps_only_items_up_to_fork_point() {
    let h = VersionHistory::new(
        branch_token(),
        vec![VersionHistoryItem::new(1, 1), VersionHistoryItem::new(5, 1), VersionHistoryItem::new(10, 2)],
    );
    let forked = h.fork(5, BranchToken::new("branch-b"));
    assert_eq!(forked.items(), &[VersionHistoryItem::new(1, 1), VersionHistoryItem::new(5, 1)]);
}

#[test]
fn histories_compare_by_version_first_then_event_id() {
    let a = VersionHistories::new(VersionHistory::new(
        branch_token(),
        vec![VersionHistoryItem::new(10, 2)],
    ));
    let b = VersionHistories::new(VersionHistory::new(
        BranchToken::new("branch-b"),
        vec![VersionHistoryItem::new(50, 1)],
    ));
    assert_eq!(a.compare(&b).unwrap(), HistoryOrdering::HappensAfter);
    assert_eq!(b.compare(&a).unwrap(), HistoryOrdering::HappensBefore);

    let c = VersionHistories::new(VersionHistory::new(
        BranchToken::new("branch-c"),
        vec![VersionHistoryItem::new(10, 2)],
    ));
    assert_eq!(a.compare(&c).unwrap(), HistoryOrdering::Equal);
}

#[test]
fn fork_current_branch_switches_to_the_new_branch() {
    let mut vh = VersionHistories::new(VersionHistory::new(
        branch_token(),
        vec![VersionHistoryItem::new(1, 1), VersionHistoryItem::new(5, 1)],
    ));
    let idx = vh.fork_current_branch(1, BranchToken::new("branch-b"));
    assert_eq!(idx, 1);
    assert_eq!(vh.current_branch_index(), 1);
    assert_eq!(vh.current_version_history().items(), &[VersionHistoryItem::new(1, 1)]);
    assert_eq!(vh.branches().len(), 2);
}
