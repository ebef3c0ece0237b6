//! First-run specs
//!
//! Restoring from a store that has never seen this context is a no-op.

use crate::prelude::*;

#[test]
fn restore_last_revision_on_empty_store_is_none() {
    let ctx = context("orders", Arc::new(InMemoryStore::new()));
    let window = operator(&ctx, "window", json!({"sum": 0}));
    let kafka = receiver(&ctx, "kafka", json!(null));

    assert_eq!(ctx.persistence().restore_last_revision().unwrap(), None);
    assert!(window.restores().is_empty());
    assert!(kafka.restores().is_empty());
    assert!(ctx.receivers().pending_ids().is_empty());
}

#[test]
fn other_contexts_checkpoints_are_ignored() {
    let store = Arc::new(InMemoryStore::new());
    let billing = context("billing", store.clone());
    operator(&billing, "window", json!(5));
    billing.persistence().persist().unwrap();

    let orders = context("orders", store);
    let window = operator(&orders, "window", json!(0));

    assert_eq!(orders.start().unwrap(), None);
    assert_eq!(window.value(), json!(0));
}

#[test]
fn empty_file_store_starts_empty() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    let ctx = context("orders", store);

    assert_eq!(ctx.start().unwrap(), None);
}
