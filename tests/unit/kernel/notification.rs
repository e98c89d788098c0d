use super::*;

#[test]
fn oldest_notifications_are_dropped_past_capacity() {
    let mut notes = Notifications::new(2);
    notes.info("one");
    notes.warn("two");
    let last = notes.error("three");

    assert_eq!(notes.len(), 2);
    let messages: Vec<&str> = notes.iter().map(|n| n.message.as_str()).collect();
    assert_eq!(messages, vec!["two", "three"]);
    assert_eq!(notes.last().map(|n| n.id), Some(last));
}

#[test]
fn ids_keep_increasing_after_clear() {
    let mut notes = Notifications::new(8);
    let first = notes.info("a");
    assert!(notes.clear());
    assert!(!notes.clear());
    assert!(notes.info("b") > first);
}
