mod common;

use std::rc::Rc;
use std::time::Duration;

use common::RecordingHost;
use futures::executor::block_on;
use serde_json::json;
use workviews::{
    decode_state, encode_state, Document, Editor, HostError, ManualClock, PersistedState,
    Workview, WorkviewError, WorkviewId, WorkviewStore, WorkviewsPreferences,
};

fn store_with(
    host: RecordingHost,
    preferences: WorkviewsPreferences,
) -> (WorkviewStore<RecordingHost>, Rc<ManualClock>) {
    let clock = Rc::new(ManualClock::new());
    let store = WorkviewStore::load_with(host, preferences, clock.clone());
    (store, clock)
}

fn fresh_store() -> (WorkviewStore<RecordingHost>, Rc<ManualClock>) {
    store_with(RecordingHost::default(), WorkviewsPreferences::default())
}

fn seeded_host(workviews: Vec<Workview>, active: Option<&str>) -> RecordingHost {
    let state = PersistedState {
        workviews,
        active_workview_id: active.map(|id| WorkviewId::from_string(id)),
    };
    RecordingHost::with_blob(encode_state(&state).expect("encode"))
}

fn layout_workview(id: &str, name: &str) -> Workview {
    let mut workview = Workview::with_id(WorkviewId::from_string(id), name);
    workview.upsert_editor(Editor::new("file:///a.rs", Some(2), false));
    workview.upsert_editor(Editor::new("file:///b.rs", Some(1), true));
    workview.upsert_editor(Editor::new("file:///c.rs", Some(1), false));
    workview
}

fn persisted(store: &WorkviewStore<RecordingHost>) -> PersistedState {
    decode_state(store.host().blob.as_deref().expect("blob written")).expect("decode")
}

#[test]
fn start_new_workview_activates_and_persists() {
    let (mut store, _clock) = fresh_store();
    store.host_mut().show(&[("file:///scratch.txt", 1)]);

    let id = block_on(store.start_new_workview("  Feature work  ")).expect("start");

    let active = store.active_workview().expect("active");
    assert_eq!(active.id(), &id);
    assert_eq!(active.name(), "Feature work");
    assert_eq!(active.editor_count(), 0);
    assert_eq!(store.host().calls, vec!["close-all"]);
    assert_eq!(store.host().writes, 1);
    assert_eq!(persisted(&store).active_workview_id, Some(id));
}

#[test]
fn starting_another_workview_captures_the_previous_layout() {
    let (mut store, _clock) = fresh_store();
    let first = block_on(store.start_new_workview("first")).unwrap();

    store.host_mut().show(&[("file:///x.rs", 1), ("file:///y.rs", 2)]);
    block_on(store.handle_window_tab_changed()).unwrap();
    store.host_mut().show(&[("file:///y.rs", 2)]);

    let second = block_on(store.start_new_workview("second")).unwrap();
    assert_ne!(first, second);

    let first = store.workview(&first).unwrap();
    let x = first.editor("file:///x.rs").unwrap();
    let y = first.editor("file:///y.rs").unwrap();
    assert_eq!(x.visible, Some(false));
    assert_eq!(y.visible, Some(true));
    assert_eq!(y.view_column, Some(2));
    assert_eq!(store.active_workview().unwrap().name(), "second");
}

#[test]
fn restore_opens_editors_by_column_then_visibility() {
    let host = seeded_host(vec![layout_workview("1", "layout")], None);
    let (mut store, _clock) = store_with(host, WorkviewsPreferences::default());
    let id = WorkviewId::from_string("1");

    assert!(block_on(store.restore_workview(&id)).unwrap());

    assert_eq!(
        store.host().calls,
        vec![
            "close-all",
            "open file:///c.rs@1",
            "open file:///b.rs@1",
            "open file:///a.rs@2",
        ]
    );
    assert_eq!(store.active_workview_id(), Some(&id));
    assert_eq!(persisted(&store).active_workview_id, Some(id));
}

#[test]
fn restore_pinned_only_skips_hidden_unpinned_editors() {
    let mut workview = layout_workview("1", "layout");
    workview.pin_document(Document::new("file:///a.rs", Some(2)));
    let host = seeded_host(vec![workview], None);
    let preferences = WorkviewsPreferences {
        restore_pinned_only: true,
        ..WorkviewsPreferences::default()
    };
    let (mut store, _clock) = store_with(host, preferences);

    block_on(store.restore_workview(&WorkviewId::from_string("1"))).unwrap();

    assert_eq!(
        store.host().opened(),
        vec!["file:///b.rs@1", "file:///a.rs@2"]
    );
}

#[test]
fn restoring_recaptures_the_active_workview_first() {
    let host = seeded_host(
        vec![layout_workview("1", "one"), Workview::with_id(WorkviewId::from_string("2"), "two")],
        Some("2"),
    );
    let (mut store, _clock) = store_with(host, WorkviewsPreferences::default());
    store.host_mut().show(&[("file:///two.md", 3)]);

    block_on(store.restore_workview(&WorkviewId::from_string("1"))).unwrap();

    let two = store.workview(&WorkviewId::from_string("2")).unwrap();
    assert_eq!(two.editor("file:///two.md").unwrap().view_column, Some(3));
    assert_eq!(store.active_workview().unwrap().name(), "one");
}

#[test]
fn restore_of_unknown_workview_is_a_noop() {
    let (mut store, _clock) = fresh_store();
    let restored = block_on(store.restore_workview(&WorkviewId::from_string("missing"))).unwrap();
    assert!(!restored);
    assert!(store.host().calls.is_empty());
    assert_eq!(store.host().writes, 0);
}

#[test]
fn host_open_failure_propagates() {
    let host = seeded_host(vec![layout_workview("1", "layout")], None);
    let (mut store, _clock) = store_with(host, WorkviewsPreferences::default());
    store.host_mut().failing_uri = Some("file:///b.rs".to_string());

    let err = block_on(store.restore_workview(&WorkviewId::from_string("1"))).unwrap_err();
    match err {
        WorkviewError::Host(HostError::OpenDocument { uri, .. }) => assert_eq!(uri, "file:///b.rs"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.host().opened(), vec!["file:///c.rs@1"]);
    assert!(store.active_workview_id().is_none());
}

#[test]
fn rename_trims_and_saves() {
    let host = seeded_host(vec![layout_workview("1", "old")], None);
    let (mut store, _clock) = store_with(host, WorkviewsPreferences::default());
    let id = WorkviewId::from_string("1");

    assert!(block_on(store.rename_workview(&id, " new name ")).unwrap());
    assert_eq!(store.workview(&id).unwrap().name(), "new name");
    assert_eq!(store.host().writes, 1);
    assert_eq!(persisted(&store).workviews[0].name(), "new name");

    assert!(!block_on(store.rename_workview(&WorkviewId::from_string("nope"), "x")).unwrap());
}

#[test]
fn deleting_the_active_workview_clears_the_pointer() {
    let host = seeded_host(
        vec![layout_workview("1", "one"), layout_workview("2", "two")],
        Some("1"),
    );
    let (mut store, _clock) = store_with(host, WorkviewsPreferences::default());

    assert!(block_on(store.delete_workview(&WorkviewId::from_string("1"))).unwrap());
    assert!(store.active_workview_id().is_none());
    assert_eq!(store.workviews().len(), 1);
    assert!(persisted(&store).active_workview_id.is_none());
}

#[test]
fn deleting_another_workview_keeps_the_pointer() {
    let host = seeded_host(
        vec![layout_workview("1", "one"), layout_workview("2", "two")],
        Some("1"),
    );
    let (mut store, _clock) = store_with(host, WorkviewsPreferences::default());

    assert!(block_on(store.delete_workview(&WorkviewId::from_string("2"))).unwrap());
    assert_eq!(store.active_workview_id(), Some(&WorkviewId::from_string("1")));
    assert_eq!(store.host().writes, 1);
}

#[test]
fn notify_changed_writes_once_per_debounce_window() {
    let (mut store, clock) = fresh_store();
    clock.advance(Duration::from_secs(301));

    assert!(block_on(store.notify_changed(false)).unwrap());
    assert!(!block_on(store.notify_changed(false)).unwrap());

    assert_eq!(store.host().writes, 1);
    assert_eq!(store.host().notifications, 2);

    clock.advance(Duration::from_secs(300));
    assert!(!block_on(store.notify_changed(false)).unwrap());
    clock.advance(Duration::from_secs(1));
    assert!(block_on(store.notify_changed(false)).unwrap());
    assert!(block_on(store.notify_changed(true)).unwrap());
    assert_eq!(store.host().writes, 3);
}

#[test]
fn tab_changes_reconcile_without_saving_inside_the_window() {
    let (mut store, clock) = fresh_store();
    block_on(store.start_new_workview("active")).unwrap();
    let writes = store.host().writes;

    store.host_mut().show(&[("file:///a.rs", 1)]);
    block_on(store.handle_window_tab_changed()).unwrap();
    store.host_mut().show(&[("file:///b.rs", 2)]);
    block_on(store.handle_visible_editors_changed()).unwrap();

    assert_eq!(store.host().writes, writes);
    assert_eq!(store.active_workview().unwrap().editor_count(), 2);

    clock.advance(Duration::from_secs(600));
    block_on(store.handle_window_tab_changed()).unwrap();
    assert_eq!(store.host().writes, writes + 1);
}

#[test]
fn reconciled_uris_survive_until_removed() {
    let (mut store, _clock) = fresh_store();
    block_on(store.start_new_workview("history")).unwrap();

    let layouts: [&[(&str, u32)]; 4] = [
        &[("file:///a", 1), ("file:///b", 2)],
        &[],
        &[("file:///c", 1)],
        &[("file:///b", 3)],
    ];
    for layout in layouts {
        store.host_mut().show(layout);
        block_on(store.handle_window_tab_changed()).unwrap();
    }

    let uris: Vec<_> = store
        .active_workview()
        .unwrap()
        .editors()
        .map(|e| e.uri.clone())
        .collect();
    assert_eq!(uris, vec!["file:///a", "file:///b", "file:///c"]);

    assert!(block_on(store.remove_editor("file:///a")).unwrap());
    assert!(!block_on(store.remove_editor("file:///a")).unwrap());
    assert!(store.active_workview().unwrap().editor("file:///a").is_none());
}

#[test]
fn pin_requests_without_active_workview_do_nothing() {
    let (mut store, _clock) = fresh_store();
    let changed = block_on(store.pin_document(Document::new("file:///a", None))).unwrap();
    assert!(!changed);
    assert_eq!(store.host().writes, 0);
    assert_eq!(store.host().notifications, 0);
}

#[test]
fn pinning_twice_reports_no_change() {
    let (mut store, _clock) = fresh_store();
    block_on(store.start_new_workview("pins")).unwrap();
    let doc = Document::new("file:///notes.md", Some(2));

    assert!(block_on(store.pin_document(doc.clone())).unwrap());
    assert!(!block_on(store.pin_document(doc)).unwrap());
    assert_eq!(store.active_workview().unwrap().pinned_documents().count(), 1);

    assert!(!block_on(store.unpin_document("file:///other.md")).unwrap());
    assert!(block_on(store.unpin_document("file:///notes.md")).unwrap());
    assert_eq!(persisted(&store).workviews[0].pinned_documents().count(), 0);
}

#[test]
fn for_active_workview_saves_on_change_only_after_window() {
    let (mut store, _clock) = fresh_store();
    block_on(store.start_new_workview("custom")).unwrap();
    let writes = store.host().writes;

    let changed = block_on(store.for_active_workview(|w| {
        w.upsert_editor(Editor::new("file:///z", Some(1), true));
        true
    }, false))
    .unwrap();
    assert!(changed);
    assert_eq!(store.host().writes, writes);

    let unchanged = block_on(store.for_active_workview(|_| false, false)).unwrap();
    assert!(!unchanged);
    assert_eq!(store.host().writes, writes);
}

#[test]
fn open_document_uses_last_column_without_preview() {
    let (mut store, _clock) = fresh_store();
    block_on(store.open_document(&Document::new("file:///doc.md", Some(3)))).unwrap();
    assert_eq!(store.host().opened(), vec!["file:///doc.md@3"]);
}

#[test]
fn shutdown_saves_unconditionally() {
    let (mut store, _clock) = fresh_store();
    block_on(store.shutdown()).unwrap();
    assert_eq!(store.host().writes, 1);
    assert!(persisted(&store).is_empty());
}

#[test]
fn load_discards_active_when_not_remembered() {
    let host = seeded_host(vec![layout_workview("1", "one")], Some("1"));
    let preferences = WorkviewsPreferences {
        remember_active_workview: false,
        ..WorkviewsPreferences::default()
    };
    let (store, _clock) = store_with(host, preferences);
    assert!(store.active_workview_id().is_none());
    assert_eq!(store.workviews().len(), 1);
}

#[test]
fn load_drops_dangling_active_pointer() {
    let host = seeded_host(vec![layout_workview("1", "one")], Some("404"));
    let (store, _clock) = store_with(host, WorkviewsPreferences::default());
    assert!(store.active_workview_id().is_none());
}

#[test]
fn load_recovers_from_corrupt_blob() {
    let host = RecordingHost::with_blob("this is not base64!");
    let (store, _clock) = store_with(host, WorkviewsPreferences::default());
    assert!(store.workviews().is_empty());
    assert!(store.active_workview_id().is_none());
}

#[test]
fn load_reads_preferences_from_host_settings() {
    let mut host = seeded_host(vec![layout_workview("1", "one")], Some("1"));
    host.settings
        .insert("workviews.rememberActiveWorkview".into(), json!(false));
    host.settings
        .insert("workviews.restorePinnedOnly".into(), json!(true));
    host.settings
        .insert("workviews.saveDebounceSeconds".into(), json!(120));

    let store = WorkviewStore::load(host);
    assert!(store.preferences().restore_pinned_only);
    assert_eq!(store.preferences().save_debounce(), Duration::from_secs(120));
    assert!(store.active_workview_id().is_none());
}

#[test]
fn resolve_prefers_id_then_name() {
    let host = seeded_host(
        vec![layout_workview("alpha", "beta"), layout_workview("beta", "gamma")],
        None,
    );
    let (store, _clock) = store_with(host, WorkviewsPreferences::default());
    assert_eq!(store.resolve("beta").unwrap().name(), "gamma");
    assert_eq!(store.resolve("gamma").unwrap().id().as_str(), "beta");
    assert!(store.resolve("delta").is_none());
}
