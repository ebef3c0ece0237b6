//! Round-trip specs
//!
//! Persisting and restoring into fresh elements reproduces every state.

use crate::prelude::*;
use similar_asserts::assert_eq;

fn persist_and_recover(store: Arc<dyn PersistenceStore>) {
    let first = context("orders", store.clone());
    operator(&first, "window", json!({"sum": 12, "keys": ["a", "b"]}));
    operator(&first, "dedupe", json!(["x", "y"]));
    receiver(&first, "kafka", json!({"p0": 41, "p1": 7}));
    let revision = first.persistence().persist().unwrap();
    drop(first);

    let second = context("orders", store);
    let window = operator(&second, "window", json!(null));
    let dedupe = operator(&second, "dedupe", json!(null));
    let kafka = receiver(&second, "kafka", json!(null));

    let restored = second.start().unwrap().unwrap();

    assert_eq!(restored.revision, revision);
    assert_eq!(restored.offset_revision, Some(revision));
    assert_eq!(window.value(), json!({"sum": 12, "keys": ["a", "b"]}));
    assert_eq!(dedupe.value(), json!(["x", "y"]));
    assert_eq!(kafka.value(), json!({"p0": 41, "p1": 7}));
}

#[test]
fn round_trip_through_memory_store() {
    persist_and_recover(Arc::new(InMemoryStore::new()));
}

#[test]
fn round_trip_through_file_store() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    persist_and_recover(store);
}

#[test]
fn stored_images_hold_exactly_the_registered_elements() {
    let store = Arc::new(InMemoryStore::new());
    let ctx = context("orders", store.clone());
    operator(&ctx, "window", json!(1));
    receiver(&ctx, "kafka", json!({"p0": 3}));

    let revision = ctx.persistence().persist().unwrap();

    let state = stored_image(store.as_ref(), "orders", &revision);
    let offsets = stored_image(store.as_ref(), "ordersoffset", &revision);
    assert_eq!(state.ids().cloned().collect::<Vec<_>>(), vec![ElementId::from("window")]);
    assert_eq!(offsets.get(&ElementId::from("kafka")), Some(&json!({"p0": 3})));
}

#[test]
fn unregistered_elements_are_not_captured() {
    let store = Arc::new(InMemoryStore::new());
    let ctx = context("orders", store.clone());
    operator(&ctx, "keep", json!(1));
    operator(&ctx, "gone", json!(2));
    ctx.states().unregister(&ElementId::from("gone"));

    let revision = ctx.persistence().persist().unwrap();

    let state = stored_image(store.as_ref(), "orders", &revision);
    assert_eq!(state.len(), 1);
    assert!(state.contains(&ElementId::from("keep")));
}

#[test]
fn restore_skips_elements_that_no_longer_exist() {
    let store = Arc::new(InMemoryStore::new());
    let first = context("orders", store.clone());
    operator(&first, "old", json!(1));
    operator(&first, "kept", json!(2));
    first.persistence().persist().unwrap();
    drop(first);

    let second = context("orders", store);
    let kept = operator(&second, "kept", json!(0));
    second.start().unwrap();

    assert_eq!(kept.value(), json!(2));
}
