// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot coordination
//!
//! Walks the registries under the consistency barrier to capture or apply
//! images. Encoding and decoding happen outside the barrier so the hold
//! only covers in-memory element calls.
//!
//! ```text
//! capture:  registry --(barrier)--> SnapshotImage --codec--> bytes
//! restore:  bytes --codec--> SnapshotImage --(barrier)--> registry
//! ```

use crate::barrier::{BarrierGuard, ConsistencyBarrier};
use crate::codec::{CodecError, SnapshotCodec, SnapshotImage};
use crate::registry::{ReceiverRegistry, StateRegistry};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during snapshot operations
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("corrupt snapshot image: {0}")]
    Corrupt(#[source] CodecError),
    #[error("failed to encode snapshot image: {0}")]
    Encode(#[source] CodecError),
}

/// An image together with its encoded bytes
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub image: SnapshotImage,
    pub bytes: Vec<u8>,
}

/// Outcome of applying a receiver image
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiverRestore {
    /// Receivers restored in place
    pub restored: usize,
    /// Entries parked in the pending inbox for late registration
    pub deposited: usize,
}

/// Captures and restores images for one execution context
pub struct SnapshotService {
    context_name: String,
    barrier: Arc<dyn ConsistencyBarrier>,
    codec: Arc<dyn SnapshotCodec>,
    states: Arc<StateRegistry>,
    receivers: Arc<ReceiverRegistry>,
}

impl SnapshotService {
    pub fn new(
        context_name: impl Into<String>,
        barrier: Arc<dyn ConsistencyBarrier>,
        codec: Arc<dyn SnapshotCodec>,
        states: Arc<StateRegistry>,
        receivers: Arc<ReceiverRegistry>,
    ) -> Self {
        Self {
            context_name: context_name.into(),
            barrier,
            codec,
            states,
            receivers,
        }
    }

    pub fn states(&self) -> &Arc<StateRegistry> {
        &self.states
    }

    pub fn receivers(&self) -> &Arc<ReceiverRegistry> {
        &self.receivers
    }

    /// Image of every registered operator, taken under the barrier
    pub fn capture_state_image(&self) -> SnapshotImage {
        let _hold = BarrierGuard::acquire(self.barrier.as_ref());
        self.states
            .all_elements()
            .into_iter()
            .map(|(id, element)| (id, element.current_state()))
            .collect()
    }

    /// Image of every registered receiver, taken under the barrier
    pub fn capture_offset_image(&self) -> SnapshotImage {
        let _hold = BarrierGuard::acquire(self.barrier.as_ref());
        self.receivers
            .all_elements()
            .into_iter()
            .map(|(id, element)| (id, element.current_state()))
            .collect()
    }

    /// Capture and encode the operator state image
    pub fn capture_state(&self) -> Result<CapturedImage, SnapshotError> {
        tracing::debug!(context = %self.context_name, "taking snapshot");
        let image = self.capture_state_image();
        tracing::info!(
            context = %self.context_name,
            elements = image.len(),
            "snapshot taken"
        );
        self.encode(image)
    }

    /// Capture and encode the receiver offset image
    pub fn capture_offsets(&self) -> Result<CapturedImage, SnapshotError> {
        tracing::debug!(context = %self.context_name, "taking offset snapshot");
        let image = self.capture_offset_image();
        tracing::info!(
            context = %self.context_name,
            receivers = image.len(),
            "offset snapshot taken"
        );
        self.encode(image)
    }

    pub fn encode(&self, image: SnapshotImage) -> Result<CapturedImage, SnapshotError> {
        let bytes = self.codec.encode(&image).map_err(SnapshotError::Encode)?;
        Ok(CapturedImage { image, bytes })
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<SnapshotImage, SnapshotError> {
        self.codec.decode(bytes).map_err(SnapshotError::Corrupt)
    }

    /// Restore operators from an encoded state image.
    ///
    /// Operators missing from the image keep their current state; image
    /// entries without a live operator are skipped. Returns the number of
    /// operators restored.
    pub fn apply_state(&self, bytes: &[u8]) -> Result<usize, SnapshotError> {
        let image = self.decode(bytes)?;
        Ok(self.apply_state_image(&image))
    }

    pub fn apply_state_image(&self, image: &SnapshotImage) -> usize {
        let _hold = BarrierGuard::acquire(self.barrier.as_ref());
        let mut restored = 0;
        for (id, element) in self.states.all_elements() {
            if let Some(state) = image.get(&id) {
                element.restore_state(state.clone());
                restored += 1;
            }
        }

        let skipped = image.ids().filter(|id| !self.states.contains(id)).count();
        if skipped > 0 {
            tracing::warn!(
                context = %self.context_name,
                skipped,
                "state image has entries with no registered element"
            );
        }
        tracing::info!(context = %self.context_name, restored, "state restored");
        restored
    }

    /// Restore receivers from an encoded offset image.
    ///
    /// Entries without a live receiver are deposited in the pending inbox
    /// and applied when that receiver registers.
    pub fn apply_receiver_state(&self, bytes: &[u8]) -> Result<ReceiverRestore, SnapshotError> {
        let image = self.decode(bytes)?;
        Ok(self.apply_receiver_image(image))
    }

    pub fn apply_receiver_image(&self, image: SnapshotImage) -> ReceiverRestore {
        let _hold = BarrierGuard::acquire(self.barrier.as_ref());
        let mut outcome = ReceiverRestore::default();
        for (id, state) in image {
            match self.receivers.get(&id) {
                Some(receiver) => {
                    receiver.restore_state(state);
                    outcome.restored += 1;
                }
                None => {
                    self.receivers.deposit_pending_state(id, state);
                    outcome.deposited += 1;
                }
            }
        }
        tracing::info!(
            context = %self.context_name,
            restored = outcome.restored,
            deposited = outcome.deposited,
            "receiver state restored"
        );
        outcome
    }

    /// Tell live receivers that `image` is durably stored.
    ///
    /// Must only be called after the store write of `image` returned
    /// success. Returns the number of receivers acknowledged.
    pub fn acknowledge_saved(&self, image: &SnapshotImage) -> usize {
        let mut acknowledged = 0;
        for (id, receiver) in self.receivers.all_elements() {
            if let Some(state) = image.get(&id) {
                receiver.on_save_acknowledged(state);
                acknowledged += 1;
            }
        }
        tracing::debug!(context = %self.context_name, acknowledged, "receivers acknowledged");
        acknowledged
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
