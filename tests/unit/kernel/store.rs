use super::*;
use crate::kernel::effect::RequestId;
use crate::kernel::notification::NotificationLevel;
use crate::kernel::save::SaveError;
use crate::kernel::services::ports::{
    EntryKind, FileSnapshot, RemoteEntry, StoreError, TabSwitchPolicy, Theme, VersionToken,
    WorkspaceId,
};
use crate::kernel::state::SessionConfig;
use crate::models::LoadState;

fn new_store_with(tab_switch: TabSwitchPolicy, strict_versioning: bool) -> Store {
    let config = SessionConfig {
        tab_switch,
        strict_versioning,
        ..SessionConfig::default()
    };
    Store::new(AppState::new(
        WorkspaceId::new("octo", "site"),
        config,
        Theme::Light,
    ))
}

fn new_store() -> Store {
    new_store_with(TabSwitchPolicy::Retain, false)
}

fn snapshot(content: &str, version: &str) -> FileSnapshot {
    FileSnapshot {
        content: content.to_string(),
        version: VersionToken::new(version),
    }
}

fn only_read(result: &DispatchResult) -> RequestId {
    match result.effects.as_slice() {
        [Effect::ReadFile { request, .. }] => *request,
        other => panic!("expected one ReadFile effect, got {other:?}"),
    }
}

fn only_list(result: &DispatchResult) -> RequestId {
    match result.effects.as_slice() {
        [Effect::ListDirectory { request, .. }] => *request,
        other => panic!("expected one ListDirectory effect, got {other:?}"),
    }
}

fn only_save(result: &DispatchResult) -> (RequestId, u64, Option<VersionToken>) {
    match result.effects.as_slice() {
        [Effect::SaveFile {
            request,
            edit_version,
            base_version,
            ..
        }] => (*request, *edit_version, base_version.clone()),
        other => panic!("expected one SaveFile effect, got {other:?}"),
    }
}

fn open_loaded(store: &mut Store, path: &str, content: &str, version: &str) {
    let result = store.dispatch(Action::OpenFile {
        path: path.to_string(),
    });
    let request = only_read(&result);
    store.dispatch(Action::FileLoaded {
        request,
        path: path.to_string(),
        snapshot: snapshot(content, version),
    });
}

fn edit(store: &mut Store, path: &str, content: &str) {
    store.dispatch(Action::Edit {
        path: path.to_string(),
        content: content.to_string(),
    });
}

fn save(store: &mut Store, path: &str) -> DispatchResult {
    store.dispatch(Action::Save {
        path: path.to_string(),
    })
}

fn saved(
    store: &mut Store,
    request: RequestId,
    path: &str,
    edit_version: u64,
    result: Result<VersionToken, SaveError>,
) {
    store.dispatch(Action::FileSaved {
        request,
        path: path.to_string(),
        edit_version,
        result,
    });
}

fn last_note(store: &Store) -> (NotificationLevel, String) {
    let note = store.state().notifications.last().expect("a notification");
    (note.level, note.message.clone())
}

fn load_dir(store: &mut Store, path: &str, entries: Vec<RemoteEntry>) {
    let result = store.dispatch(Action::ExplorerToggle {
        path: path.to_string(),
    });
    let request = only_list(&result);
    store.dispatch(Action::DirLoaded {
        request,
        path: path.to_string(),
        entries,
    });
}

#[test]
fn load_root_fetches_once() {
    let mut store = new_store();
    let first = store.dispatch(Action::ExplorerLoadRoot);
    only_list(&first);
    let second = store.dispatch(Action::ExplorerLoadRoot);
    assert!(second.effects.is_empty());
    assert!(!second.state_changed);
}

#[test]
fn double_toggle_issues_one_listing() {
    let mut store = new_store();
    load_dir(
        &mut store,
        "",
        vec![RemoteEntry::new("src", "src", EntryKind::Directory)],
    );

    let first = store.dispatch(Action::ExplorerToggle {
        path: "src".to_string(),
    });
    let request = only_list(&first);
    let second = store.dispatch(Action::ExplorerToggle {
        path: "src".to_string(),
    });
    assert!(second.effects.is_empty());

    store.dispatch(Action::DirLoaded {
        request,
        path: "src".to_string(),
        entries: vec![RemoteEntry::new("app.js", "src/app.js", EntryKind::File)],
    });
    assert_eq!(
        store.state().explorer.load_state("src"),
        Some(LoadState::Loaded)
    );
    assert_eq!(store.state().explorer.rows().len(), 2);
}

#[test]
fn collapse_all_hides_rows_without_refetching() {
    let mut store = new_store();
    load_dir(
        &mut store,
        "",
        vec![
            RemoteEntry::new("src", "src", EntryKind::Directory),
            RemoteEntry::new("README.md", "README.md", EntryKind::File),
        ],
    );
    load_dir(
        &mut store,
        "src",
        vec![RemoteEntry::new("app.js", "src/app.js", EntryKind::File)],
    );
    assert_eq!(store.state().explorer.rows().len(), 3);

    let result = store.dispatch(Action::ExplorerCollapseAll);
    assert!(result.state_changed);
    assert!(result.effects.is_empty());
    assert_eq!(store.state().explorer.rows().len(), 2);

    let again = store.dispatch(Action::ExplorerCollapseAll);
    assert!(!again.state_changed);

    let reopen = store.dispatch(Action::ExplorerToggle {
        path: "src".to_string(),
    });
    assert!(reopen.effects.is_empty());
    assert_eq!(store.state().explorer.rows().len(), 3);
}

#[test]
fn failed_listing_notifies_and_allows_retry() {
    let mut store = new_store();
    let request = only_list(&store.dispatch(Action::ExplorerLoadRoot));
    let result = store.dispatch(Action::DirLoadError {
        request,
        path: String::new(),
        error: StoreError::Transport("offline".to_string()),
    });

    assert!(result.state_changed);
    assert_eq!(
        store.state().explorer.load_state(""),
        Some(LoadState::NotLoaded)
    );
    let (level, message) = last_note(&store);
    assert_eq!(level, NotificationLevel::Error);
    assert_eq!(message, "Failed to list /: transport error: offline");

    only_list(&store.dispatch(Action::ExplorerLoadRoot));
}

#[test]
fn toggling_unknown_path_warns() {
    let mut store = new_store();
    store.dispatch(Action::ExplorerToggle {
        path: "ghost".to_string(),
    });
    assert_eq!(
        last_note(&store),
        (NotificationLevel::Warning, "ghost is not in the tree".to_string())
    );
}

#[test]
fn tab_is_created_only_when_content_arrives() {
    let mut store = new_store();
    let request = only_read(&store.dispatch(Action::OpenFile {
        path: "a.txt".to_string(),
    }));
    assert!(store.state().session.tabs().is_empty());
    assert!(store.state().has_requests_in_flight());

    store.dispatch(Action::FileLoaded {
        request,
        path: "a.txt".to_string(),
        snapshot: snapshot("hello", "v1"),
    });
    let session = &store.state().session;
    assert_eq!(session.tab_paths(), vec!["a.txt"]);
    assert_eq!(session.active_path(), Some("a.txt"));
    assert_eq!(session.displayed_content(), "hello");
    assert!(!store.state().has_requests_in_flight());
}

#[test]
fn superseded_open_is_discarded() {
    let mut store = new_store();
    let first = only_read(&store.dispatch(Action::OpenFile {
        path: "a.txt".to_string(),
    }));
    let second = only_read(&store.dispatch(Action::OpenFile {
        path: "b.txt".to_string(),
    }));

    let late = store.dispatch(Action::FileLoaded {
        request: first,
        path: "a.txt".to_string(),
        snapshot: snapshot("a", "v1"),
    });
    assert!(!late.state_changed);
    assert!(store.state().session.tabs().is_empty());

    store.dispatch(Action::FileLoaded {
        request: second,
        path: "b.txt".to_string(),
        snapshot: snapshot("b", "v1"),
    });
    assert_eq!(store.state().session.tab_paths(), vec!["b.txt"]);
}

#[test]
fn repeated_open_of_pending_path_does_not_refetch() {
    let mut store = new_store();
    only_read(&store.dispatch(Action::OpenFile {
        path: "a.txt".to_string(),
    }));
    let again = store.dispatch(Action::OpenFile {
        path: "/a.txt".to_string(),
    });
    assert!(again.effects.is_empty());
}

#[test]
fn opening_a_directory_is_ignored() {
    let mut store = new_store();
    load_dir(
        &mut store,
        "",
        vec![RemoteEntry::new("src", "src", EntryKind::Directory)],
    );
    let result = store.dispatch(Action::OpenFile {
        path: "src".to_string(),
    });
    assert!(result.effects.is_empty());
}

#[test]
fn load_failure_leaves_session_untouched() {
    let mut store = new_store();
    open_loaded(&mut store, "a.txt", "a", "v1");
    let request = only_read(&store.dispatch(Action::OpenFile {
        path: "missing.txt".to_string(),
    }));

    store.dispatch(Action::FileLoadError {
        request,
        path: "missing.txt".to_string(),
        error: StoreError::NotFound("missing.txt".to_string()),
    });
    let session = &store.state().session;
    assert_eq!(session.tab_paths(), vec!["a.txt"]);
    assert_eq!(session.active_path(), Some("a.txt"));
    assert_eq!(
        last_note(&store),
        (
            NotificationLevel::Error,
            "Failed to open missing.txt: not found: missing.txt".to_string()
        )
    );
}

#[test]
fn retain_policy_keeps_edits_when_switching_tabs() {
    let mut store = new_store();
    open_loaded(&mut store, "a.txt", "a", "v1");
    open_loaded(&mut store, "b.txt", "b", "v1");
    edit(&mut store, "a.txt", "a edited");

    let result = store.dispatch(Action::OpenFile {
        path: "a.txt".to_string(),
    });
    assert!(result.effects.is_empty());
    let session = &store.state().session;
    assert_eq!(session.active_path(), Some("a.txt"));
    assert_eq!(session.displayed_content(), "a edited");
    assert!(session.tab("a.txt").unwrap().is_dirty());
    assert_eq!(session.tab("b.txt").unwrap().content(), "b");
}

#[test]
fn refetch_policy_overwrites_edits_on_switch() {
    let mut store = new_store_with(TabSwitchPolicy::Refetch, false);
    open_loaded(&mut store, "a.txt", "a", "v1");
    open_loaded(&mut store, "b.txt", "b", "v1");
    edit(&mut store, "a.txt", "a edited");

    let request = only_read(&store.dispatch(Action::OpenFile {
        path: "a.txt".to_string(),
    }));
    assert_eq!(store.state().session.active_path(), Some("b.txt"));
    assert!(store.state().session.tab("a.txt").unwrap().is_loading());

    store.dispatch(Action::FileLoaded {
        request,
        path: "a.txt".to_string(),
        snapshot: snapshot("remote a", "v2"),
    });
    assert_eq!(store.state().session.active_path(), Some("a.txt"));
    let tab = store.state().session.tab("a.txt").unwrap();
    assert_eq!(tab.content(), "remote a");
    assert!(!tab.is_dirty());
    assert_eq!(tab.version(), &VersionToken::new("v2"));
    assert_eq!(store.state().session.tab_paths(), vec!["a.txt", "b.txt"]);
}

#[test]
fn failed_refetch_keeps_previous_active_tab() {
    let mut store = new_store_with(TabSwitchPolicy::Refetch, false);
    open_loaded(&mut store, "a.txt", "a", "v1");
    open_loaded(&mut store, "b.txt", "b", "v1");
    edit(&mut store, "a.txt", "a edited");

    let request = only_read(&store.dispatch(Action::OpenFile {
        path: "a.txt".to_string(),
    }));
    store.dispatch(Action::FileLoadError {
        request,
        path: "a.txt".to_string(),
        error: StoreError::Transport("HTTP 502 Bad Gateway".to_string()),
    });

    let session = &store.state().session;
    assert_eq!(session.active_path(), Some("b.txt"));
    assert_eq!(session.displayed_content(), "b");
    let tab = session.tab("a.txt").unwrap();
    assert!(!tab.is_loading());
    assert_eq!(tab.content(), "a edited");
    assert!(tab.is_dirty());
    assert!(!store.state().has_requests_in_flight());
    assert_eq!(last_note(&store).0, NotificationLevel::Error);
}

#[test]
fn edit_is_a_no_op_for_unchanged_or_closed_tabs() {
    let mut store = new_store();
    open_loaded(&mut store, "a.txt", "a", "v1");
    assert!(!store
        .dispatch(Action::Edit {
            path: "a.txt".to_string(),
            content: "a".to_string(),
        })
        .state_changed);
    assert!(!store
        .dispatch(Action::Edit {
            path: "zzz.txt".to_string(),
            content: "x".to_string(),
        })
        .state_changed);
    assert!(!store.state().session.tab("a.txt").unwrap().is_dirty());
}

#[test]
fn closing_active_middle_tab_moves_to_first() {
    let mut store = new_store();
    for path in ["a.txt", "b.txt", "c.txt"] {
        open_loaded(&mut store, path, path, "v1");
    }
    store.dispatch(Action::OpenFile {
        path: "b.txt".to_string(),
    });

    store.dispatch(Action::CloseTab {
        path: "b.txt".to_string(),
    });
    let session = &store.state().session;
    assert_eq!(session.tab_paths(), vec!["a.txt", "c.txt"]);
    assert_eq!(session.active_path(), Some("a.txt"));
    assert_eq!(session.displayed_content(), "a.txt");
}

#[test]
fn closing_inactive_tab_keeps_active_path() {
    let mut store = new_store();
    open_loaded(&mut store, "a.txt", "a", "v1");
    open_loaded(&mut store, "b.txt", "b", "v1");

    store.dispatch(Action::CloseTab {
        path: "a.txt".to_string(),
    });
    assert_eq!(store.state().session.active_path(), Some("b.txt"));
}

#[test]
fn closing_sole_tab_clears_display() {
    let mut store = new_store();
    open_loaded(&mut store, "a.txt", "a", "v1");
    store.dispatch(Action::CloseTab {
        path: "a.txt".to_string(),
    });
    assert_eq!(store.state().session.active_path(), None);
    assert_eq!(store.state().session.displayed_content(), "");
}

#[test]
fn refetch_policy_reloads_tab_activated_by_close() {
    let mut store = new_store_with(TabSwitchPolicy::Refetch, false);
    open_loaded(&mut store, "a.txt", "a", "v1");
    open_loaded(&mut store, "b.txt", "b", "v1");

    let result = store.dispatch(Action::CloseTab {
        path: "b.txt".to_string(),
    });
    only_read(&result);
    assert_eq!(store.state().session.active_path(), Some("a.txt"));
}

#[test]
fn next_and_prev_cycle_tabs() {
    let mut store = new_store();
    open_loaded(&mut store, "a.txt", "a", "v1");
    open_loaded(&mut store, "b.txt", "b", "v1");

    store.dispatch(Action::NextTab);
    assert_eq!(store.state().session.active_path(), Some("a.txt"));
    store.dispatch(Action::PrevTab);
    assert_eq!(store.state().session.active_path(), Some("b.txt"));
}

#[test]
fn clean_tab_save_is_a_no_op() {
    let mut store = new_store();
    open_loaded(&mut store, "a.txt", "a", "v1");
    let result = save(&mut store, "a.txt");
    assert!(result.effects.is_empty());
    assert!(save(&mut store, "unknown.txt").effects.is_empty());
}

#[test]
fn successful_save_clears_dirty_and_updates_token() {
    let mut store = new_store();
    open_loaded(&mut store, "a.txt", "a", "v1");
    edit(&mut store, "a.txt", "a2");

    let (request, edit_version, base) = only_save(&save(&mut store, "a.txt"));
    assert_eq!(base, None);
    assert!(store.state().session.tab("a.txt").unwrap().is_saving());
    assert!(save(&mut store, "a.txt").effects.is_empty());

    saved(&mut store, request, "a.txt", edit_version, Ok(VersionToken::new("v2")));
    let tab = store.state().session.tab("a.txt").unwrap();
    assert!(!tab.is_dirty());
    assert!(!tab.is_saving());
    assert_eq!(tab.version(), &VersionToken::new("v2"));
    assert_eq!(
        last_note(&store),
        (NotificationLevel::Info, "Saved a.txt".to_string())
    );
}

#[test]
fn conflict_keeps_dirty_and_flags_tab() {
    let mut store = new_store();
    open_loaded(&mut store, "a.txt", "a", "v1");
    edit(&mut store, "a.txt", "mine");
    let (request, edit_version, _) = only_save(&save(&mut store, "a.txt"));

    saved(
        &mut store,
        request,
        "a.txt",
        edit_version,
        Err(SaveError::VersionConflict {
            path: "a.txt".to_string(),
        }),
    );
    let tab = store.state().session.tab("a.txt").unwrap();
    assert!(tab.is_dirty());
    assert!(tab.has_conflict());
    assert_eq!(tab.version(), &VersionToken::new("v1"));
    assert_eq!(last_note(&store).0, NotificationLevel::Warning);
}

#[test]
fn failed_save_keeps_dirty_without_conflict() {
    let mut store = new_store();
    open_loaded(&mut store, "a.txt", "a", "v1");
    edit(&mut store, "a.txt", "mine");
    let (request, edit_version, _) = only_save(&save(&mut store, "a.txt"));

    saved(
        &mut store,
        request,
        "a.txt",
        edit_version,
        Err(SaveError::Failed {
            path: "a.txt".to_string(),
            source: StoreError::Transport("timeout".to_string()),
        }),
    );
    let tab = store.state().session.tab("a.txt").unwrap();
    assert!(tab.is_dirty());
    assert!(!tab.has_conflict());
    assert_eq!(last_note(&store).0, NotificationLevel::Error);
}

#[test]
fn edits_during_save_stay_dirty() {
    let mut store = new_store();
    open_loaded(&mut store, "a.txt", "a", "v1");
    edit(&mut store, "a.txt", "one");
    let (request, edit_version, _) = only_save(&save(&mut store, "a.txt"));
    edit(&mut store, "a.txt", "two");

    saved(&mut store, request, "a.txt", edit_version, Ok(VersionToken::new("v2")));
    let tab = store.state().session.tab("a.txt").unwrap();
    assert!(tab.is_dirty());
    assert_eq!(tab.content(), "two");
    assert_eq!(tab.version(), &VersionToken::new("v2"));
}

#[test]
fn stale_save_result_is_ignored() {
    let mut store = new_store();
    open_loaded(&mut store, "a.txt", "a", "v1");
    edit(&mut store, "a.txt", "one");
    let (request, edit_version, _) = only_save(&save(&mut store, "a.txt"));

    let bogus = RequestId::new(request.raw() + 100);
    saved(&mut store, bogus, "a.txt", edit_version, Ok(VersionToken::new("v9")));
    assert!(store.state().session.tab("a.txt").unwrap().is_saving());
}

#[test]
fn strict_versioning_sends_base_token_unless_forced() {
    let mut store = new_store_with(TabSwitchPolicy::Retain, true);
    open_loaded(&mut store, "a.txt", "a", "v1");
    edit(&mut store, "a.txt", "mine");

    let (request, edit_version, base) = only_save(&save(&mut store, "a.txt"));
    assert_eq!(base, Some(VersionToken::new("v1")));
    saved(
        &mut store,
        request,
        "a.txt",
        edit_version,
        Err(SaveError::VersionConflict {
            path: "a.txt".to_string(),
        }),
    );

    let forced = store.dispatch(Action::ForceSave {
        path: "a.txt".to_string(),
    });
    let (_, _, base) = only_save(&forced);
    assert_eq!(base, None);
}

#[test]
fn reload_resolves_conflict() {
    let mut store = new_store();
    open_loaded(&mut store, "a.txt", "a", "v1");
    edit(&mut store, "a.txt", "mine");
    let (request, edit_version, _) = only_save(&save(&mut store, "a.txt"));
    saved(
        &mut store,
        request,
        "a.txt",
        edit_version,
        Err(SaveError::VersionConflict {
            path: "a.txt".to_string(),
        }),
    );

    let request = only_read(&store.dispatch(Action::ReloadTab {
        path: "a.txt".to_string(),
    }));
    store.dispatch(Action::FileLoaded {
        request,
        path: "a.txt".to_string(),
        snapshot: snapshot("theirs", "v5"),
    });
    let tab = store.state().session.tab("a.txt").unwrap();
    assert_eq!(tab.content(), "theirs");
    assert!(!tab.is_dirty());
    assert!(!tab.has_conflict());
    assert_eq!(store.state().session.displayed_content(), "theirs");
}

#[test]
fn save_is_refused_while_tab_is_loading() {
    let mut store = new_store();
    open_loaded(&mut store, "a.txt", "a", "v1");
    edit(&mut store, "a.txt", "mine");
    only_read(&store.dispatch(Action::ReloadTab {
        path: "a.txt".to_string(),
    }));

    let result = save(&mut store, "a.txt");
    assert!(result.effects.is_empty());
    assert_eq!(last_note(&store).0, NotificationLevel::Warning);
}

#[test]
fn reload_is_refused_while_tab_is_saving() {
    let mut store = new_store();
    open_loaded(&mut store, "a.txt", "a", "v1");
    edit(&mut store, "a.txt", "mine");
    only_save(&save(&mut store, "a.txt"));

    let result = store.dispatch(Action::ReloadTab {
        path: "a.txt".to_string(),
    });
    assert!(result.effects.is_empty());
    assert_eq!(last_note(&store).0, NotificationLevel::Warning);
    assert_eq!(store.state().session.tab("a.txt").unwrap().content(), "mine");
}

#[test]
fn closing_tab_discards_its_pending_results() {
    let mut store = new_store();
    open_loaded(&mut store, "a.txt", "a", "v1");
    edit(&mut store, "a.txt", "mine");
    let (request, edit_version, _) = only_save(&save(&mut store, "a.txt"));
    store.dispatch(Action::CloseTab {
        path: "a.txt".to_string(),
    });

    let result = store.dispatch(Action::FileSaved {
        request,
        path: "a.txt".to_string(),
        edit_version,
        result: Ok(VersionToken::new("v2")),
    });
    assert!(!result.state_changed);
    assert!(store.state().session.tabs().is_empty());
}

#[test]
fn preview_has_an_in_flight_guard() {
    let mut store = new_store();
    let first = store.dispatch(Action::RequestPreview);
    assert_eq!(
        first.effects,
        vec![Effect::RequestPreview {
            workspace: WorkspaceId::new("octo", "site"),
        }]
    );
    assert!(store.dispatch(Action::RequestPreview).effects.is_empty());

    store.dispatch(Action::PreviewReady {
        url: "/preview/octo-site".to_string(),
    });
    assert!(!store.state().preview.in_flight);
    assert_eq!(
        store.state().preview.last_url.as_deref(),
        Some("/preview/octo-site")
    );
    assert_eq!(store.dispatch(Action::RequestPreview).effects.len(), 1);
}

#[test]
fn preview_failure_only_notifies() {
    let mut store = new_store();
    open_loaded(&mut store, "a.txt", "a", "v1");
    store.dispatch(Action::RequestPreview);
    store.dispatch(Action::PreviewFailed {
        error: "build failed".to_string(),
    });

    assert!(!store.state().preview.in_flight);
    assert_eq!(store.state().session.tab_paths(), vec!["a.txt"]);
    assert_eq!(
        last_note(&store),
        (
            NotificationLevel::Error,
            "Preview failed: build failed".to_string()
        )
    );
}

#[test]
fn toggle_theme_persists_preference() {
    let mut store = new_store();
    let result = store.dispatch(Action::ToggleTheme);
    assert_eq!(store.state().theme, Theme::Dark);
    assert_eq!(
        result.effects,
        vec![Effect::PersistPreference {
            key: "theme".to_string(),
            value: "dark".to_string(),
        }]
    );
}

#[test]
fn dismiss_clears_notifications() {
    let mut store = new_store();
    store.dispatch(Action::ExplorerToggle {
        path: "ghost".to_string(),
    });
    assert!(store.dispatch(Action::DismissNotifications).state_changed);
    assert!(store.state().notifications.is_empty());
    assert!(!store.dispatch(Action::DismissNotifications).state_changed);
}
