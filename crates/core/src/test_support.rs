// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake elements and stores for tests

use crate::element::{ReceiverElement, Snapshotable, StateValue};
use crate::persistence::PersistenceListener;
use crate::revision::Revision;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct FakeState {
    value: StateValue,
    captures: usize,
    restores: Vec<StateValue>,
    acks: Vec<StateValue>,
}

/// In-memory element that records every call made to it
#[derive(Clone, Debug, Default)]
pub struct FakeElement {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeElement {
    pub fn new(value: StateValue) -> Self {
        let element = Self::default();
        element.set(value);
        element
    }

    pub fn set(&self, value: StateValue) {
        self.lock().value = value;
    }

    pub fn value(&self) -> StateValue {
        self.lock().value.clone()
    }

    /// Number of `current_state` calls
    pub fn captures(&self) -> usize {
        self.lock().captures
    }

    /// Every state passed to `restore_state`, oldest first
    pub fn restores(&self) -> Vec<StateValue> {
        self.lock().restores.clone()
    }

    /// Every state passed to `on_save_acknowledged`, oldest first
    pub fn acks(&self) -> Vec<StateValue> {
        self.lock().acks.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Snapshotable for FakeElement {
    fn current_state(&self) -> StateValue {
        let mut inner = self.lock();
        inner.captures += 1;
        inner.value.clone()
    }

    fn restore_state(&self, state: StateValue) {
        let mut inner = self.lock();
        inner.restores.push(state.clone());
        inner.value = state;
    }
}

impl ReceiverElement for FakeElement {
    fn on_save_acknowledged(&self, state: &StateValue) {
        self.lock().acks.push(state.clone());
    }
}

/// Listener that records every saved revision
#[derive(Clone, Debug, Default)]
pub struct RecordingListener {
    saved: Arc<Mutex<Vec<(String, Revision)>>>,
}

impl RecordingListener {
    pub fn saved(&self) -> Vec<(String, Revision)> {
        self.saved.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl PersistenceListener for RecordingListener {
    fn on_saved(&self, context_name: &str, revision: &Revision) {
        self.saved
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((context_name.to_string(), revision.clone()));
    }
}
