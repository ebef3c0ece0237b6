//! Shared helpers for specs

#![allow(dead_code)]

pub use ck_core::test_support::{FakeElement, RecordingListener};
pub use ck_core::{
    ElementId, ExecutionContext, FakeClock, InMemoryStore, JsonCodec, OffsetHolder,
    PersistenceError, PersistenceStore, Revision, SnapshotCodec, SnapshotImage,
};
pub use ck_storage::FileStore;
pub use serde_json::json;
pub use std::sync::Arc;
pub use tempfile::TempDir;

/// Context over `store` with a fixed clock
pub fn context(name: &str, store: Arc<dyn PersistenceStore>) -> ExecutionContext {
    ExecutionContext::builder(name)
        .clock(Arc::new(FakeClock::new(1_000)))
        .store(store)
        .build()
}

/// Register a fake operator under `id`
pub fn operator(ctx: &ExecutionContext, id: &str, value: serde_json::Value) -> Arc<FakeElement> {
    let element = Arc::new(FakeElement::new(value));
    ctx.states().register(id, element.clone()).unwrap();
    element
}

/// Register a fake receiver under `id`
pub fn receiver(ctx: &ExecutionContext, id: &str, value: serde_json::Value) -> Arc<FakeElement> {
    let element = Arc::new(FakeElement::new(value));
    ctx.receivers().register(id, element.clone()).unwrap();
    element
}

/// Decode the image stored under `name` at `revision`
pub fn stored_image(
    store: &dyn PersistenceStore,
    name: &str,
    revision: &Revision,
) -> SnapshotImage {
    JsonCodec.decode(&store.load(name, revision).unwrap()).unwrap()
}
