use super::*;

#[test]
fn get_missing_key_is_none() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.get("absent").unwrap(), None);
}

#[test]
fn set_then_get_returns_value() {
    let storage = MemoryStorage::new();
    storage.set("k", "v").unwrap();
    assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
}

#[test]
fn remove_absent_key_is_ok() {
    let storage = MemoryStorage::new();
    storage.remove("absent").unwrap();
    storage.remove("absent").unwrap();
}

#[test]
fn contexts_share_entries_but_not_identity() {
    let tab_a = MemoryStorage::new();
    let tab_b = tab_a.open_context();
    assert_ne!(tab_a.context(), tab_b.context());

    tab_a.set("k", "from a").unwrap();
    assert_eq!(tab_b.get("k").unwrap().as_deref(), Some("from a"));
}

#[test]
fn set_notifies_with_origin_context() {
    let tab_a = MemoryStorage::new();
    let tab_b = tab_a.open_context();
    let mut events = tab_b.subscribe().unwrap();

    tab_a.set("k", "v").unwrap();
    let event = events.try_recv().unwrap();
    assert_eq!(event.key, "k");
    assert_eq!(event.origin, tab_a.context());
}

#[test]
fn unchanged_set_and_absent_remove_do_not_notify() {
    let storage = MemoryStorage::new();
    storage.set("k", "v").unwrap();
    let mut events = storage.subscribe().unwrap();

    storage.set("k", "v").unwrap();
    storage.remove("other").unwrap();
    assert!(events.try_recv().is_err());

    storage.remove("k").unwrap();
    assert_eq!(events.try_recv().unwrap().key, "k");
}
