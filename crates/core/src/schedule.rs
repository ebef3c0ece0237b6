// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic checkpoint trigger
//!
//! Persists on a fixed interval from a tokio task. Capture blocks on the
//! barrier and the store may block on I/O, so each persist runs on the
//! blocking pool. A failed persist is logged and the next tick tries again.

use crate::persistence::PersistenceService;
use crate::revision::Revision;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a running periodic persister
pub struct PersistHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PersistHandle {
    /// Stop the persister and wait for an in-flight persist to finish
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "periodic persister task failed");
        }
    }
}

/// Start persisting every `interval`. The first persist happens one
/// interval after start. Successful revisions are sent on `revisions`
/// when provided; a closed receiver is ignored.
pub fn spawn_periodic(
    persistence: Arc<PersistenceService>,
    interval: Duration,
    revisions: Option<mpsc::UnboundedSender<Revision>>,
) -> PersistHandle {
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = ticker.tick() => {
                    let persistence = Arc::clone(&persistence);
                    let context = persistence.context_name().to_string();
                    match tokio::task::spawn_blocking(move || persistence.persist()).await {
                        Ok(Ok(revision)) => {
                            if let Some(tx) = &revisions {
                                let _ = tx.send(revision);
                            }
                        }
                        Ok(Err(e)) => {
                            tracing::error!(
                                context = %context,
                                error = %e,
                                "periodic persist failed"
                            );
                        }
                        Err(e) => {
                            tracing::error!(
                                context = %context,
                                error = %e,
                                "periodic persist panicked"
                            );
                        }
                    }
                }
            }
        }
        tracing::debug!("periodic persister stopped");
    });

    PersistHandle {
        shutdown: Some(shutdown_tx),
        task,
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
