// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ck-core: checkpoint and recovery core for stream processing
//!
//! This crate provides:
//! - A reentrant consistency barrier between checkpointing and event processing
//! - Registries for operator state and receiver offsets
//! - Snapshot capture/restore and the durable-store persistence protocol
//! - An in-memory store, a JSON image codec and a periodic persister

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod barrier;
pub mod clock;
pub mod codec;
pub mod config;
pub mod context;
pub mod element;
pub mod offsets;
pub mod persistence;
pub mod registry;
pub mod revision;
pub mod schedule;
pub mod snapshot;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

// Re-exports
pub use barrier::{
    Admission, BarrierError, BarrierGuard, ConsistencyBarrier, NoopBarrier, ThreadBarrier,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use codec::{CodecError, JsonCodec, SnapshotCodec, SnapshotImage};
pub use config::{ConfigError, PersistenceConfig, StoreConfig};
pub use context::{ExecutionContext, ExecutionContextBuilder};
pub use element::{ElementId, ReceiverElement, Snapshotable, StateValue};
pub use offsets::{OffsetHolder, OffsetMap};
pub use persistence::{
    PersistenceError, PersistenceListener, PersistenceService, RestoredCheckpoint,
};
pub use registry::{ReceiverRegistry, RegistryError, StateRegistry};
pub use revision::{offset_name, state_name, Revision, RevisionGenerator, OFFSET_SUFFIX};
pub use schedule::{spawn_periodic, PersistHandle};
pub use snapshot::{CapturedImage, ReceiverRestore, SnapshotError, SnapshotService};
pub use store::{InMemoryStore, PersistenceStore, StoreError};
