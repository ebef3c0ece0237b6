// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence orchestration
//!
//! Assigns revisions, drives the snapshot service and moves encoded images
//! in and out of the durable store.
//!
//! ## Ordering
//!
//! - Both images are captured under one barrier hold, then encoded and
//!   written outside it
//! - Receivers are acknowledged only after both writes returned success
//! - Listeners are notified last
//! - Persists are serialized: one runs from revision assignment through
//!   listener notification before the next starts, so saves and
//!   acknowledgments land in revision order

use crate::barrier::{BarrierGuard, ConsistencyBarrier};
use crate::clock::Clock;
use crate::revision::{offset_name, state_name, Revision, RevisionGenerator};
use crate::snapshot::{ReceiverRestore, SnapshotError, SnapshotService};
use crate::store::{PersistenceStore, StoreError};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors from persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("no persistence store assigned for execution context {0}")]
    NoStore(String),
    #[error("revision not found: {name}/{revision}")]
    RevisionNotFound { name: String, revision: Revision },
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for PersistenceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { name, revision } => Self::RevisionNotFound { name, revision },
            other => Self::Store(other),
        }
    }
}

/// Notified after each checkpoint is durably stored
pub trait PersistenceListener: Send + Sync {
    fn on_saved(&self, context_name: &str, revision: &Revision);
}

/// What `restore_last_revision` found and applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredCheckpoint {
    pub revision: Revision,
    pub offset_revision: Option<Revision>,
    pub receivers: Option<ReceiverRestore>,
}

/// Checkpoint and recovery entry point for one execution context
pub struct PersistenceService {
    context_name: String,
    barrier: Arc<dyn ConsistencyBarrier>,
    snapshots: Arc<SnapshotService>,
    store: Option<Arc<dyn PersistenceStore>>,
    clock: Arc<dyn Clock>,
    revisions: RevisionGenerator,
    listeners: Mutex<Vec<Arc<dyn PersistenceListener>>>,
    /// Taken before the barrier; restores never take it
    persist_lock: Mutex<()>,
}

impl PersistenceService {
    pub fn new(
        context_name: impl Into<String>,
        barrier: Arc<dyn ConsistencyBarrier>,
        snapshots: Arc<SnapshotService>,
        store: Option<Arc<dyn PersistenceStore>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let context_name = context_name.into();
        Self {
            revisions: RevisionGenerator::new(context_name.clone()),
            context_name,
            barrier,
            snapshots,
            store,
            clock,
            listeners: Mutex::new(Vec::new()),
            persist_lock: Mutex::new(()),
        }
    }

    pub fn context_name(&self) -> &str {
        &self.context_name
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    pub fn add_listener(&self, listener: Arc<dyn PersistenceListener>) {
        self.listeners().push(listener);
    }

    fn listeners(&self) -> MutexGuard<'_, Vec<Arc<dyn PersistenceListener>>> {
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn store(&self) -> Result<&Arc<dyn PersistenceStore>, PersistenceError> {
        self.store
            .as_ref()
            .ok_or_else(|| PersistenceError::NoStore(self.context_name.clone()))
    }

    /// Capture both images and write them under a new revision
    pub fn persist(&self) -> Result<Revision, PersistenceError> {
        let store = self.store()?;
        let _serial = self.persist_lock.lock().unwrap_or_else(|e| e.into_inner());
        tracing::debug!(context = %self.context_name, "persisting");

        let (revision, state_image, offset_image) = {
            let _hold = BarrierGuard::acquire(self.barrier.as_ref());
            let revision = self.revisions.next(self.clock.epoch_millis());
            (
                revision,
                self.snapshots.capture_state_image(),
                self.snapshots.capture_offset_image(),
            )
        };

        let state = self.snapshots.encode(state_image)?;
        let offsets = self.snapshots.encode(offset_image)?;

        store.save(&state_name(&self.context_name), &revision, &state.bytes)?;
        store.save(&offset_name(&self.context_name), &revision, &offsets.bytes)?;

        self.snapshots.acknowledge_saved(&offsets.image);

        let listeners = self.listeners().clone();
        for listener in listeners {
            listener.on_saved(&self.context_name, &revision);
        }

        tracing::info!(
            context = %self.context_name,
            %revision,
            elements = state.image.len(),
            receivers = offsets.image.len(),
            "persisted"
        );
        Ok(revision)
    }

    /// Restore operator state from `revision`
    pub fn restore_revision(&self, revision: &Revision) -> Result<(), PersistenceError> {
        let store = self.store()?;
        tracing::debug!(context = %self.context_name, %revision, "restoring revision");
        let bytes = store.load(&state_name(&self.context_name), revision)?;
        self.snapshots.apply_state(&bytes)?;
        self.revisions.observe(revision);
        tracing::info!(context = %self.context_name, %revision, "restored revision");
        Ok(())
    }

    /// Restore receiver offsets from `revision`
    pub fn restore_offset_revision(
        &self,
        revision: &Revision,
    ) -> Result<ReceiverRestore, PersistenceError> {
        let store = self.store()?;
        tracing::debug!(context = %self.context_name, %revision, "restoring offset revision");
        let bytes = store.load(&offset_name(&self.context_name), revision)?;
        let outcome = self.snapshots.apply_receiver_state(&bytes)?;
        self.revisions.observe(revision);
        tracing::info!(context = %self.context_name, %revision, "restored offset revision");
        Ok(outcome)
    }

    /// Restore the latest checkpoint, if any.
    ///
    /// The barrier is held across both restores so processing cannot start
    /// between loading state and loading offsets. Returns `None` when the
    /// store holds no state revision for this context.
    pub fn restore_last_revision(&self) -> Result<Option<RestoredCheckpoint>, PersistenceError> {
        let store = self.store()?;
        let _hold = BarrierGuard::acquire(self.barrier.as_ref());

        let revision = store.last_revision(&state_name(&self.context_name))?;
        let offset_revision = store.last_revision(&offset_name(&self.context_name))?;

        let Some(revision) = revision else {
            tracing::info!(context = %self.context_name, "no previous revision to restore");
            return Ok(None);
        };

        self.restore_revision(&revision)?;
        let receivers = match &offset_revision {
            Some(offset_revision) => Some(self.restore_offset_revision(offset_revision)?),
            None => None,
        };

        Ok(Some(RestoredCheckpoint {
            revision,
            offset_revision,
            receivers,
        }))
    }
}

#[cfg(test)]
#[path = "persistence_tests.rs"]
mod tests;
