use super::*;

#[test]
fn slot_name_keeps_safe_characters() {
    assert_eq!(slot_name("farmstay-token"), "farmstay-token");
    assert_eq!(slot_name("a/b c"), "a_b_c");
    assert_eq!(slot_name("../escape"), "___escape");
}

#[test]
fn open_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("nested").join("state");
    let storage = FileStorage::open(&root).unwrap();
    assert!(root.is_dir());
    assert_eq!(storage.root(), root.as_path());
}

#[test]
fn set_then_get_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    storage.set("farmstay-redirect", "/farmstays/5?tab=rooms#top").unwrap();
    assert_eq!(
        storage.get("farmstay-redirect").unwrap().as_deref(),
        Some("/farmstays/5?tab=rooms#top")
    );
}

#[test]
fn set_replaces_whole_value_and_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    storage.set("k", "a much longer first value").unwrap();
    storage.set("k", "short").unwrap();
    assert_eq!(storage.get("k").unwrap().as_deref(), Some("short"));

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn get_missing_key_is_none_and_remove_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    assert_eq!(storage.get("absent").unwrap(), None);
    storage.remove("absent").unwrap();

    storage.set("k", "v").unwrap();
    storage.remove("k").unwrap();
    storage.remove("k").unwrap();
    assert_eq!(storage.get("k").unwrap(), None);
}

#[test]
fn contexts_share_directory_and_notifications() {
    let dir = tempfile::tempdir().unwrap();
    let tab_a = FileStorage::open(dir.path()).unwrap();
    let tab_b = tab_a.open_context();
    let mut events = tab_b.subscribe().unwrap();

    tab_a.set("k", "v").unwrap();
    assert_eq!(tab_b.get("k").unwrap().as_deref(), Some("v"));
    let event = events.try_recv().unwrap();
    assert_eq!(event.origin, tab_a.context());
    assert_ne!(event.origin, tab_b.context());
}

#[test]
fn unchanged_value_does_not_notify() {
    let dir = tempfile::tempdir().unwrap();
    let tab_a = FileStorage::open(dir.path()).unwrap();
    let mut events = tab_a.open_context().subscribe().unwrap();

    tab_a.set("k", "v").unwrap();
    tab_a.set("k", "v").unwrap();
    assert_eq!(events.try_recv().unwrap().key, "k");
    assert!(events.try_recv().is_err());

    tab_a.set("k", "w").unwrap();
    assert!(events.try_recv().is_ok());
}

#[test]
fn failed_write_leaves_no_staging_file() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    let mut events = storage.subscribe().unwrap();
    // A non-empty directory in the slot's place makes the rename fail.
    let blocker = dir.path().join("k.slot");
    fs::create_dir(&blocker).unwrap();
    fs::write(blocker.join("inner"), "x").unwrap();

    assert!(storage.set("k", "v").is_err());
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
    assert!(events.try_recv().is_err());
}
