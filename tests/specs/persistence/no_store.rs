//! Missing-store specs

use crate::prelude::*;

fn storeless() -> ExecutionContext {
    ExecutionContext::builder("orders").build()
}

#[test]
fn persist_without_store_fails_before_capturing() {
    let ctx = storeless();
    let window = operator(&ctx, "window", json!(1));
    let kafka = receiver(&ctx, "kafka", json!(2));

    let err = ctx.persistence().persist().unwrap_err();

    assert!(matches!(err, PersistenceError::NoStore(ref name) if name == "orders"));
    assert_eq!(window.captures(), 0);
    assert_eq!(kafka.captures(), 0);
    assert!(kafka.acks().is_empty());
}

#[test]
fn restores_without_store_fail() {
    let ctx = storeless();
    let revision = Revision::new(1, "orders");

    assert!(matches!(
        ctx.persistence().restore_revision(&revision),
        Err(PersistenceError::NoStore(_))
    ));
    assert!(matches!(
        ctx.persistence().restore_offset_revision(&revision),
        Err(PersistenceError::NoStore(_))
    ));
    assert!(matches!(
        ctx.persistence().restore_last_revision(),
        Err(PersistenceError::NoStore(_))
    ));
}

#[test]
fn start_without_store_is_empty() {
    let ctx = storeless();
    let window = operator(&ctx, "window", json!(1));

    assert_eq!(ctx.start().unwrap(), None);
    assert!(window.restores().is_empty());
}
