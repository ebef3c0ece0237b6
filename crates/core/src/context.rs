// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution context wiring
//!
//! One context owns one barrier, both registries, a snapshot service and a
//! persistence service. Nothing is shared between contexts.

use crate::barrier::{ConsistencyBarrier, ThreadBarrier};
use crate::clock::{Clock, SystemClock};
use crate::codec::{JsonCodec, SnapshotCodec};
use crate::config::{ConfigError, PersistenceConfig};
use crate::persistence::{PersistenceError, PersistenceService, RestoredCheckpoint};
use crate::registry::{ReceiverRegistry, StateRegistry};
use crate::revision::Revision;
use crate::schedule::{spawn_periodic, PersistHandle};
use crate::snapshot::SnapshotService;
use crate::store::PersistenceStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Builder for [`ExecutionContext`]
pub struct ExecutionContextBuilder {
    name: String,
    barrier: Arc<dyn ConsistencyBarrier>,
    codec: Arc<dyn SnapshotCodec>,
    clock: Arc<dyn Clock>,
    store: Option<Arc<dyn PersistenceStore>>,
    restore_on_start: bool,
    persist_interval: Option<Duration>,
}

impl ExecutionContextBuilder {
    pub fn barrier(mut self, barrier: Arc<dyn ConsistencyBarrier>) -> Self {
        self.barrier = barrier;
        self
    }

    pub fn codec(mut self, codec: Arc<dyn SnapshotCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(mut self, store: Arc<dyn PersistenceStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn restore_on_start(mut self, restore: bool) -> Self {
        self.restore_on_start = restore;
        self
    }

    /// Interval for [`ExecutionContext::start_periodic`]
    pub fn persist_interval(mut self, interval: Duration) -> Self {
        self.persist_interval = Some(interval);
        self
    }

    pub fn build(self) -> ExecutionContext {
        let states = Arc::new(StateRegistry::new(self.barrier.clone()));
        let receivers = Arc::new(ReceiverRegistry::new(self.barrier.clone()));
        let snapshots = Arc::new(SnapshotService::new(
            self.name.clone(),
            self.barrier.clone(),
            self.codec,
            states,
            receivers,
        ));
        let persistence = Arc::new(PersistenceService::new(
            self.name.clone(),
            self.barrier.clone(),
            snapshots.clone(),
            self.store,
            self.clock,
        ));

        ExecutionContext {
            name: self.name,
            barrier: self.barrier,
            snapshots,
            persistence,
            restore_on_start: self.restore_on_start,
            persist_interval: self.persist_interval,
        }
    }
}

/// A running query graph's checkpoint state
pub struct ExecutionContext {
    name: String,
    barrier: Arc<dyn ConsistencyBarrier>,
    snapshots: Arc<SnapshotService>,
    persistence: Arc<PersistenceService>,
    restore_on_start: bool,
    persist_interval: Option<Duration>,
}

impl ExecutionContext {
    pub fn builder(name: impl Into<String>) -> ExecutionContextBuilder {
        ExecutionContextBuilder {
            name: name.into(),
            barrier: Arc::new(ThreadBarrier::new()),
            codec: Arc::new(JsonCodec),
            clock: Arc::new(SystemClock),
            store: None,
            restore_on_start: true,
            persist_interval: None,
        }
    }

    /// Builder preloaded from config. The store is resolved by the caller
    /// since store backends live outside this crate.
    pub fn builder_from_config(
        config: &PersistenceConfig,
    ) -> Result<ExecutionContextBuilder, ConfigError> {
        config.validate()?;
        let mut builder =
            Self::builder(config.name.clone()).restore_on_start(config.restore_on_start);
        builder.persist_interval = config.persist_interval;
        Ok(builder)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn barrier(&self) -> &Arc<dyn ConsistencyBarrier> {
        &self.barrier
    }

    pub fn states(&self) -> &Arc<StateRegistry> {
        self.snapshots.states()
    }

    pub fn receivers(&self) -> &Arc<ReceiverRegistry> {
        self.snapshots.receivers()
    }

    pub fn snapshots(&self) -> &Arc<SnapshotService> {
        &self.snapshots
    }

    pub fn persistence(&self) -> &Arc<PersistenceService> {
        &self.persistence
    }

    /// Recover on start-up when configured to.
    ///
    /// Elements registered so far are restored immediately; receiver state
    /// for receivers that register later waits in the pending inbox.
    pub fn start(&self) -> Result<Option<RestoredCheckpoint>, PersistenceError> {
        if !self.restore_on_start {
            tracing::debug!(context = %self.name, "restore on start disabled");
            return Ok(None);
        }
        if !self.persistence.has_store() {
            tracing::warn!(context = %self.name, "no persistence store; starting empty");
            return Ok(None);
        }
        self.persistence.restore_last_revision()
    }

    pub fn persist_interval(&self) -> Option<Duration> {
        self.persist_interval
    }

    /// Start the periodic persister when an interval is configured.
    ///
    /// Returns `None` without an interval or without a store. Must be
    /// called from within a tokio runtime.
    pub fn start_periodic(
        &self,
        revisions: Option<mpsc::UnboundedSender<Revision>>,
    ) -> Option<PersistHandle> {
        let interval = self.persist_interval?;
        if !self.persistence.has_store() {
            tracing::warn!(context = %self.name, "no persistence store; periodic persist disabled");
            return None;
        }
        tracing::info!(context = %self.name, ?interval, "starting periodic persist");
        Some(spawn_periodic(self.persistence.clone(), interval, revisions))
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
