//! Revision specs

use crate::prelude::*;

#[test]
fn revisions_are_millis_then_context_name() {
    let store = Arc::new(InMemoryStore::new());
    let ctx = ExecutionContext::builder("orders")
        .clock(Arc::new(FakeClock::new(1_712_000_000_123)))
        .store(store)
        .build();

    let revision = ctx.persistence().persist().unwrap();

    assert_eq!(revision.as_str(), "1712000000123_orders");
}

#[test]
fn revisions_increase_when_the_clock_stalls() {
    let store = Arc::new(InMemoryStore::new());
    let ctx = context("orders", store.clone());

    let revisions: Vec<Revision> = (0..5)
        .map(|_| ctx.persistence().persist().unwrap())
        .collect();

    let millis: Vec<u64> = revisions
        .iter()
        .map(|r| r.timestamp_millis().unwrap())
        .collect();
    assert!(millis.windows(2).all(|w| w[0] < w[1]), "{:?}", millis);
    assert_eq!(store.revisions("orders"), revisions);
}

#[test]
fn last_revision_is_the_latest_persist() {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(FakeClock::new(5_000));
    let ctx = ExecutionContext::builder("orders")
        .clock(clock.clone())
        .store(store.clone())
        .build();

    ctx.persistence().persist().unwrap();
    clock.advance(250);
    let latest = ctx.persistence().persist().unwrap();

    assert_eq!(latest.as_str(), "5250_orders");
    assert_eq!(store.last_revision("orders").unwrap(), Some(latest.clone()));
    assert_eq!(store.last_revision("ordersoffset").unwrap(), Some(latest));
}

#[test]
fn restore_of_unknown_revision_is_not_found() {
    let store = Arc::new(InMemoryStore::new());
    let ctx = context("orders", store);

    let err = ctx
        .persistence()
        .restore_revision(&Revision::new(99, "orders"))
        .unwrap_err();

    assert!(matches!(
        err,
        PersistenceError::RevisionNotFound { ref name, .. } if name == "orders"
    ));
}

#[test]
fn restoring_a_revision_keeps_later_revisions_increasing() {
    let store = Arc::new(InMemoryStore::new());
    let ahead = ExecutionContext::builder("orders")
        .clock(Arc::new(FakeClock::new(9_000)))
        .store(store.clone())
        .build();
    let saved = ahead.persistence().persist().unwrap();

    // Restarted with a clock behind the stored checkpoint
    let behind = context("orders", store);
    behind.start().unwrap();
    let next = behind.persistence().persist().unwrap();

    assert!(next.timestamp_millis() > saved.timestamp_millis());
}
