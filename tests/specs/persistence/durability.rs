//! Durability specs
//!
//! Receivers are acknowledged only after both images are durably written,
//! and listeners hear about a revision only once it is stored.

use crate::prelude::*;
use ck_core::StoreError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Condvar, Mutex};
use std::time::Duration;

/// Store that records how many acks the receiver had seen at each save
struct ObservingStore {
    inner: InMemoryStore,
    receiver: Mutex<Option<Arc<FakeElement>>>,
    acks_at_save: Mutex<Vec<usize>>,
    fail_name: Option<String>,
}

impl ObservingStore {
    fn new(fail_name: Option<&str>) -> Self {
        Self {
            inner: InMemoryStore::new(),
            receiver: Mutex::new(None),
            acks_at_save: Mutex::new(Vec::new()),
            fail_name: fail_name.map(str::to_string),
        }
    }

    fn watch(&self, receiver: Arc<FakeElement>) {
        *self.receiver.lock().unwrap() = Some(receiver);
    }
}

impl PersistenceStore for ObservingStore {
    fn save(&self, name: &str, revision: &Revision, bytes: &[u8]) -> Result<(), StoreError> {
        if let Some(rx) = self.receiver.lock().unwrap().as_ref() {
            self.acks_at_save.lock().unwrap().push(rx.acks().len());
        }
        if self.fail_name.as_deref() == Some(name) {
            return Err(StoreError::Backend("disk full".to_string()));
        }
        self.inner.save(name, revision, bytes)
    }

    fn load(&self, name: &str, revision: &Revision) -> Result<Vec<u8>, StoreError> {
        self.inner.load(name, revision)
    }

    fn last_revision(&self, name: &str) -> Result<Option<Revision>, StoreError> {
        self.inner.last_revision(name)
    }
}

#[test]
fn acknowledgment_follows_both_writes() {
    let store = Arc::new(ObservingStore::new(None));
    let ctx = context("orders", store.clone());
    let kafka = receiver(&ctx, "kafka", json!({"p0": 9}));
    store.watch(kafka.clone());

    ctx.persistence().persist().unwrap();

    assert_eq!(*store.acks_at_save.lock().unwrap(), vec![0, 0]);
    assert_eq!(kafka.acks(), vec![json!({"p0": 9})]);
}

#[test]
fn failed_offset_write_is_not_acknowledged() {
    let store = Arc::new(ObservingStore::new(Some("ordersoffset")));
    let ctx = context("orders", store.clone());
    let kafka = receiver(&ctx, "kafka", json!({"p0": 9}));
    let listener = Arc::new(RecordingListener::default());
    ctx.persistence().add_listener(listener.clone());

    let err = ctx.persistence().persist().unwrap_err();

    assert!(matches!(err, PersistenceError::Store(StoreError::Backend(_))));
    assert!(kafka.acks().is_empty());
    assert!(listener.saved().is_empty());
}

#[test]
fn listeners_hear_each_stored_revision_once() {
    let store = Arc::new(InMemoryStore::new());
    let ctx = context("orders", store.clone());
    operator(&ctx, "window", json!(1));
    let listener = Arc::new(RecordingListener::default());
    ctx.persistence().add_listener(listener.clone());

    let first = ctx.persistence().persist().unwrap();
    let second = ctx.persistence().persist().unwrap();

    assert_eq!(
        listener.saved(),
        vec![
            ("orders".to_string(), first.clone()),
            ("orders".to_string(), second)
        ]
    );
    assert!(store.load("orders", &first).is_ok());
}

#[test]
fn acknowledged_offsets_become_committed() {
    let store = Arc::new(InMemoryStore::new());
    let ctx = context("orders", store);
    let offsets = Arc::new(OffsetHolder::new(ctx.barrier().clone()));
    ctx.receivers().register("kafka", offsets.clone()).unwrap();

    offsets.put_event_offset([("p0".to_string(), json!(10))].into_iter().collect());
    assert_eq!(offsets.committed_offset(), None);

    ctx.persistence().persist().unwrap();
    offsets.put_event_offset([("p0".to_string(), json!(11))].into_iter().collect());

    assert_eq!(
        offsets.committed_offset(),
        Some([("p0".to_string(), json!(10))].into_iter().collect())
    );
}

/// Store that holds the first save until `open` is called
struct GatedStore {
    inner: InMemoryStore,
    first: AtomicBool,
    entered: Mutex<Option<mpsc::Sender<()>>>,
    is_open: Mutex<bool>,
    opened: Condvar,
}

impl GatedStore {
    fn new(entered: mpsc::Sender<()>) -> Self {
        Self {
            inner: InMemoryStore::new(),
            first: AtomicBool::new(true),
            entered: Mutex::new(Some(entered)),
            is_open: Mutex::new(false),
            opened: Condvar::new(),
        }
    }

    fn open(&self) {
        *self.is_open.lock().unwrap() = true;
        self.opened.notify_all();
    }
}

impl PersistenceStore for GatedStore {
    fn save(&self, name: &str, revision: &Revision, bytes: &[u8]) -> Result<(), StoreError> {
        if self.first.swap(false, Ordering::SeqCst) {
            if let Some(entered) = self.entered.lock().unwrap().take() {
                entered.send(()).unwrap();
            }
            let mut is_open = self.is_open.lock().unwrap();
            while !*is_open {
                is_open = self.opened.wait(is_open).unwrap();
            }
        }
        self.inner.save(name, revision, bytes)
    }

    fn load(&self, name: &str, revision: &Revision) -> Result<Vec<u8>, StoreError> {
        self.inner.load(name, revision)
    }

    fn last_revision(&self, name: &str) -> Result<Option<Revision>, StoreError> {
        self.inner.last_revision(name)
    }
}

#[test]
fn overlapping_persists_commit_in_revision_order() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let store = Arc::new(GatedStore::new(entered_tx));
    let ctx = context("orders", store.clone());
    let offsets = Arc::new(OffsetHolder::new(ctx.barrier().clone()));
    ctx.receivers().register("kafka", offsets.clone()).unwrap();

    offsets.put_event_offset([("p0".to_string(), json!(10))].into_iter().collect());
    let first = {
        let persistence = ctx.persistence().clone();
        std::thread::spawn(move || persistence.persist())
    };
    entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    offsets.put_event_offset([("p0".to_string(), json!(11))].into_iter().collect());
    let second = {
        let persistence = ctx.persistence().clone();
        std::thread::spawn(move || persistence.persist())
    };
    std::thread::sleep(Duration::from_millis(50));
    assert!(store.inner.revisions("orders").is_empty());
    assert_eq!(offsets.committed_offset(), None);

    store.open();
    let first = first.join().unwrap().unwrap();
    let second = second.join().unwrap().unwrap();

    assert!(first < second);
    assert_eq!(store.last_revision("orders").unwrap(), Some(second.clone()));
    assert_eq!(store.last_revision("ordersoffset").unwrap(), Some(second.clone()));
    assert_eq!(
        stored_image(store.as_ref(), "ordersoffset", &second).get(&"kafka".into()),
        Some(&json!({"p0": 11}))
    );
    assert_eq!(
        offsets.committed_offset(),
        Some([("p0".to_string(), json!(11))].into_iter().collect())
    );
}
