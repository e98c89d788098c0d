use super::*;

fn snapshot(content: &str, version: &str) -> FileSnapshot {
    FileSnapshot {
        content: content.to_string(),
        version: VersionToken::new(version),
    }
}

fn session_with(paths: &[&str]) -> SessionState {
    let mut session = SessionState::new();
    for path in paths {
        session.apply_loaded(path, snapshot(path, "v1"), true);
    }
    session
}

#[test]
fn loading_a_path_twice_keeps_one_tab() {
    let mut session = session_with(&["a.txt"]);
    session.apply_loaded("a.txt", snapshot("fresh", "v2"), true);

    assert_eq!(session.tab_paths(), vec!["a.txt"]);
    let tab = session.tab("a.txt").unwrap();
    assert_eq!(tab.content(), "fresh");
    assert_eq!(tab.version(), &VersionToken::new("v2"));
}

#[test]
fn background_load_does_not_steal_focus() {
    let mut session = session_with(&["a.txt", "b.txt"]);
    let before = session.display_revision();
    session.apply_loaded("a.txt", snapshot("new a", "v2"), false);

    assert_eq!(session.active_path(), Some("b.txt"));
    assert_eq!(session.display_revision(), before);
    assert_eq!(session.tab("a.txt").unwrap().content(), "new a");
}

#[test]
fn closing_middle_active_tab_activates_first() {
    let mut session = session_with(&["a.txt", "b.txt", "c.txt"]);
    assert!(session.activate("b.txt"));

    let outcome = session.close("b.txt").unwrap();
    assert!(outcome.was_active);
    assert_eq!(outcome.next_active.as_deref(), Some("a.txt"));
    assert_eq!(session.tab_paths(), vec!["a.txt", "c.txt"]);
    assert_eq!(session.active_path(), Some("a.txt"));
    assert_eq!(session.displayed_content(), "a.txt");
}

#[test]
fn closing_first_active_tab_activates_second() {
    let mut session = session_with(&["a.txt", "b.txt", "c.txt"]);
    session.activate("a.txt");

    session.close("a.txt").unwrap();
    assert_eq!(session.active_path(), Some("b.txt"));
}

#[test]
fn closing_last_active_tab_activates_first() {
    let mut session = session_with(&["a.txt", "b.txt", "c.txt"]);
    assert_eq!(session.active_path(), Some("c.txt"));

    session.close("c.txt").unwrap();
    assert_eq!(session.active_path(), Some("a.txt"));
}

#[test]
fn closing_inactive_tab_keeps_active() {
    let mut session = session_with(&["a.txt", "b.txt", "c.txt"]);
    let before = session.display_revision();

    let outcome = session.close("a.txt").unwrap();
    assert!(!outcome.was_active);
    assert_eq!(outcome.next_active, None);
    assert_eq!(session.active_path(), Some("c.txt"));
    assert_eq!(session.display_revision(), before);
}

#[test]
fn closing_sole_tab_clears_display() {
    let mut session = session_with(&["a.txt"]);
    session.close("a.txt").unwrap();

    assert!(session.tabs().is_empty());
    assert_eq!(session.active_path(), None);
    assert_eq!(session.displayed_content(), "");
    assert!(session.close("a.txt").is_none());
}

#[test]
fn closing_drops_pending_open_for_that_path() {
    let mut session = session_with(&["a.txt"]);
    session.set_pending_open(PendingOpen {
        path: "a.txt".to_string(),
        request: RequestId::new(9),
    });
    session.close("a.txt");
    assert!(session.pending_open().is_none());
}

#[test]
fn edit_marks_dirty_and_counts_versions() {
    let mut session = session_with(&["a.txt"]);
    assert!(!session.edit("a.txt", "a.txt".to_string()));
    assert!(!session.edit("missing.txt", "x".to_string()));

    assert!(session.edit("a.txt", "changed".to_string()));
    let tab = session.tab("a.txt").unwrap();
    assert!(tab.is_dirty());
    assert_eq!(tab.edit_version(), 1);
    assert_eq!(tab.display_title(), "a.txt*");
}

#[test]
fn only_edits_to_the_active_tab_bump_display_revision() {
    let mut session = session_with(&["a.txt", "b.txt"]);
    let before = session.display_revision();
    session.edit("a.txt", "changed".to_string());
    assert_eq!(session.display_revision(), before);

    session.edit("b.txt", "changed".to_string());
    assert_ne!(session.display_revision(), before);
    assert_eq!(session.displayed_content(), "changed");
}

#[test]
fn save_keeps_dirty_when_edited_after_snapshot() {
    let mut session = session_with(&["a.txt"]);
    session.edit("a.txt", "one".to_string());
    let saved_at = session.tab("a.txt").unwrap().edit_version();

    let tab = session.tab_mut("a.txt").unwrap();
    tab.begin_save(RequestId::new(1));
    session.edit("a.txt", "two".to_string());
    let tab = session.tab_mut("a.txt").unwrap();
    tab.finish_save(VersionToken::new("v2"), saved_at);

    assert!(tab.is_dirty());
    assert!(!tab.is_saving());
    assert_eq!(tab.version(), &VersionToken::new("v2"));
}

#[test]
fn conflict_flag_clears_on_reload() {
    let mut session = session_with(&["a.txt"]);
    session.edit("a.txt", "mine".to_string());
    session.tab_mut("a.txt").unwrap().fail_save(true);
    assert!(session.tab("a.txt").unwrap().has_conflict());
    assert!(session.tab("a.txt").unwrap().is_dirty());

    session.apply_loaded("a.txt", snapshot("theirs", "v3"), true);
    let tab = session.tab("a.txt").unwrap();
    assert!(!tab.has_conflict());
    assert!(!tab.is_dirty());
    assert_eq!(tab.content(), "theirs");
}

#[test]
fn cycle_wraps_both_ways() {
    let mut session = session_with(&["a.txt", "b.txt", "c.txt"]);
    assert_eq!(session.cycle(1).as_deref(), Some("a.txt"));
    assert_eq!(session.cycle(-1).as_deref(), Some("c.txt"));
    assert_eq!(session.cycle(-1).as_deref(), Some("b.txt"));

    let mut single = session_with(&["a.txt"]);
    assert_eq!(single.cycle(1), None);
}

#[test]
fn take_pending_open_matches_request() {
    let mut session = SessionState::new();
    session.set_pending_open(PendingOpen {
        path: "a.txt".to_string(),
        request: RequestId::new(2),
    });
    assert!(session.has_requests_in_flight());
    assert_eq!(session.take_pending_open(RequestId::new(1)), None);
    assert_eq!(
        session.take_pending_open(RequestId::new(2)).map(|p| p.path),
        Some("a.txt".to_string())
    );
    assert!(!session.has_requests_in_flight());
}
