//! Late receiver specs
//!
//! Receiver state restored before its receiver exists is applied exactly
//! once, when the receiver registers.

use crate::prelude::*;

fn checkpoint_with_receivers(store: Arc<InMemoryStore>) -> Revision {
    let ctx = context("orders", store);
    receiver(&ctx, "kafka", json!({"p0": 100}));
    receiver(&ctx, "files", json!({"line": 12}));
    ctx.persistence().persist().unwrap()
}

#[test]
fn late_receiver_gets_state_on_registration() {
    let store = Arc::new(InMemoryStore::new());
    checkpoint_with_receivers(store.clone());

    let ctx = context("orders", store);
    let restored = ctx.start().unwrap().unwrap();
    let outcome = restored.receivers.unwrap();
    assert_eq!(outcome.restored, 0);
    assert_eq!(outcome.deposited, 2);

    let kafka = receiver(&ctx, "kafka", json!(null));
    assert_eq!(kafka.value(), json!({"p0": 100}));
    assert_eq!(kafka.restores().len(), 1);
    assert_eq!(ctx.receivers().pending_ids(), vec![ElementId::from("files")]);
}

#[test]
fn pending_state_is_applied_only_once() {
    let store = Arc::new(InMemoryStore::new());
    checkpoint_with_receivers(store.clone());

    let ctx = context("orders", store);
    ctx.start().unwrap();

    let first = receiver(&ctx, "kafka", json!(null));
    ctx.receivers().unregister(&ElementId::from("kafka"));
    let second = receiver(&ctx, "kafka", json!({"p0": 0}));

    assert_eq!(first.restores().len(), 1);
    assert!(second.restores().is_empty());
    assert_eq!(second.value(), json!({"p0": 0}));
}

#[test]
fn live_receivers_are_restored_immediately() {
    let store = Arc::new(InMemoryStore::new());
    checkpoint_with_receivers(store.clone());

    let ctx = context("orders", store);
    let kafka = receiver(&ctx, "kafka", json!(null));
    let restored = ctx.start().unwrap().unwrap();

    assert_eq!(kafka.value(), json!({"p0": 100}));
    let outcome = restored.receivers.unwrap();
    assert_eq!(outcome.restored, 1);
    assert_eq!(outcome.deposited, 1);
}

#[test]
fn unclaimed_state_can_be_drained() {
    let store = Arc::new(InMemoryStore::new());
    checkpoint_with_receivers(store.clone());

    let ctx = context("orders", store);
    ctx.start().unwrap();

    assert_eq!(
        ctx.receivers().claim_pending(&ElementId::from("files")),
        Some(json!({"line": 12}))
    );
    assert_eq!(ctx.receivers().claim_pending(&ElementId::from("files")), None);

    let files = receiver(&ctx, "files", json!(null));
    assert!(files.restores().is_empty());
}
