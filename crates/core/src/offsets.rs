// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Receiver offset tracking
//!
//! [`OffsetHolder`] is a ready-made receiver element: the receiver records
//! its latest read position after each event, and learns which position is
//! safe to commit upstream once a checkpoint containing it is durable.

use crate::barrier::{Admission, ConsistencyBarrier};
use crate::element::{ReceiverElement, Snapshotable, StateValue};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Offset data of one receiver, e.g. `{"partition-0": 1042}`
pub type OffsetMap = BTreeMap<String, StateValue>;

#[derive(Debug, Default)]
struct Offsets {
    current: Option<OffsetMap>,
    committed: Option<OffsetMap>,
}

/// Read-position state for one receiver
pub struct OffsetHolder {
    barrier: Arc<dyn ConsistencyBarrier>,
    offsets: Mutex<Offsets>,
}

impl OffsetHolder {
    pub fn new(barrier: Arc<dyn ConsistencyBarrier>) -> Self {
        Self {
            barrier,
            offsets: Mutex::new(Offsets::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Offsets> {
        self.offsets.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the receiver's latest read position
    pub fn put_event_offset(&self, offsets: OffsetMap) {
        let _admit = Admission::enter(self.barrier.as_ref());
        self.lock().current = Some(offsets);
    }

    /// Latest recorded (or restored) read position
    pub fn last_event_offset(&self) -> Option<OffsetMap> {
        self.lock().current.clone()
    }

    /// Position covered by the most recent durable checkpoint
    pub fn committed_offset(&self) -> Option<OffsetMap> {
        self.lock().committed.clone()
    }
}

impl Snapshotable for OffsetHolder {
    fn current_state(&self) -> StateValue {
        match &self.lock().current {
            Some(offsets) => StateValue::Object(offsets.clone().into_iter().collect()),
            None => StateValue::Null,
        }
    }

    fn restore_state(&self, state: StateValue) {
        let restored = match state {
            StateValue::Object(map) => Some(map.into_iter().collect()),
            StateValue::Null => None,
            other => {
                tracing::warn!(state = %other, "ignoring non-object receiver offset state");
                return;
            }
        };
        tracing::info!(offsets = ?restored, "restored receiver offsets");
        self.lock().current = restored;
    }
}

impl ReceiverElement for OffsetHolder {
    fn on_save_acknowledged(&self, state: &StateValue) {
        if let StateValue::Object(map) = state {
            let committed: OffsetMap = map.clone().into_iter().collect();
            self.lock().committed = Some(committed);
        }
    }
}

#[cfg(test)]
#[path = "offsets_tests.rs"]
mod tests;
