// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registries of stateful elements
//!
//! Two independent registries exist per execution context:
//! - **StateRegistry** - operator state (window buffers, accumulators)
//! - **ReceiverRegistry** - receiver read positions, with a pending-state
//!   inbox for offsets restored before their receiver registered
//!
//! Registries hold weak references; the engine owns its elements. An entry
//! whose element has been dropped is treated as vacant.
//!
//! Registry mutations run as barrier admissions: they never overlap a
//! capture or restore walk, and processing threads that are already
//! admitted (or the barrier holder) can register without blocking.

use crate::barrier::{Admission, ConsistencyBarrier};
use crate::element::{ElementId, ReceiverElement, Snapshotable, StateValue};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use thiserror::Error;

/// Errors from registry operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("element already registered: {0}")]
    Duplicate(ElementId),
}

/// Id-keyed map of weak element references
struct ElementMap<E: ?Sized> {
    entries: Mutex<BTreeMap<ElementId, Weak<E>>>,
}

impl<E: ?Sized> ElementMap<E> {
    fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<ElementId, Weak<E>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn insert(&self, id: ElementId, element: Weak<E>) -> Result<(), RegistryError> {
        let mut entries = self.lock();
        if entries.get(&id).is_some_and(|e| e.strong_count() > 0) {
            return Err(RegistryError::Duplicate(id));
        }
        entries.insert(id, element);
        Ok(())
    }

    fn remove(&self, id: &ElementId) -> bool {
        self.lock().remove(id).is_some()
    }

    fn get(&self, id: &ElementId) -> Option<Arc<E>> {
        self.lock().get(id).and_then(Weak::upgrade)
    }

    /// Live elements in id order; dead entries are pruned
    fn live(&self) -> Vec<(ElementId, Arc<E>)> {
        let mut entries = self.lock();
        entries.retain(|_, e| e.strong_count() > 0);
        entries
            .iter()
            .filter_map(|(id, e)| e.upgrade().map(|e| (id.clone(), e)))
            .collect()
    }

    fn len(&self) -> usize {
        self.lock().values().filter(|e| e.strong_count() > 0).count()
    }
}

/// Registry of operator state
pub struct StateRegistry {
    barrier: Arc<dyn ConsistencyBarrier>,
    elements: ElementMap<dyn Snapshotable>,
}

impl StateRegistry {
    pub fn new(barrier: Arc<dyn ConsistencyBarrier>) -> Self {
        Self {
            barrier,
            elements: ElementMap::new(),
        }
    }

    /// Register an element under `id`. The registry keeps a weak reference.
    pub fn register(
        &self,
        id: impl Into<ElementId>,
        element: Arc<dyn Snapshotable>,
    ) -> Result<(), RegistryError> {
        let id = id.into();
        let _admit = Admission::enter(self.barrier.as_ref());
        self.elements.insert(id.clone(), Arc::downgrade(&element))?;
        tracing::debug!(element = %id, "registered snapshotable");
        Ok(())
    }

    /// Remove `id`; returns whether it was registered
    pub fn unregister(&self, id: &ElementId) -> bool {
        let _admit = Admission::enter(self.barrier.as_ref());
        self.elements.remove(id)
    }

    /// Live elements, stable in id order
    pub fn all_elements(&self) -> Vec<(ElementId, Arc<dyn Snapshotable>)> {
        self.elements.live()
    }

    pub fn get(&self, id: &ElementId) -> Option<Arc<dyn Snapshotable>> {
        self.elements.get(id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Registry of receiver elements with late-state reconciliation
pub struct ReceiverRegistry {
    barrier: Arc<dyn ConsistencyBarrier>,
    elements: ElementMap<dyn ReceiverElement>,
    /// Restored state for receivers that have not registered yet
    pending: Mutex<BTreeMap<ElementId, StateValue>>,
}

impl ReceiverRegistry {
    pub fn new(barrier: Arc<dyn ConsistencyBarrier>) -> Self {
        Self {
            barrier,
            elements: ElementMap::new(),
            pending: Mutex::new(BTreeMap::new()),
        }
    }

    fn pending(&self) -> MutexGuard<'_, BTreeMap<ElementId, StateValue>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a receiver. State deposited for `id` before registration is
    /// applied immediately and removed from the inbox.
    pub fn register(
        &self,
        id: impl Into<ElementId>,
        element: Arc<dyn ReceiverElement>,
    ) -> Result<(), RegistryError> {
        let id = id.into();
        let _admit = Admission::enter(self.barrier.as_ref());
        self.elements.insert(id.clone(), Arc::downgrade(&element))?;

        let deposited = self.pending().remove(&id);
        match deposited {
            Some(state) => {
                tracing::info!(receiver = %id, "applying pending receiver state");
                element.restore_state(state);
            }
            None => tracing::debug!(receiver = %id, "registered receiver"),
        }
        Ok(())
    }

    /// Remove `id`; returns whether it was registered
    pub fn unregister(&self, id: &ElementId) -> bool {
        let _admit = Admission::enter(self.barrier.as_ref());
        self.elements.remove(id)
    }

    /// Hold `state` for a receiver that is not registered yet.
    ///
    /// If the receiver registered in the meantime it is restored directly.
    pub fn deposit_pending_state(&self, id: impl Into<ElementId>, state: StateValue) {
        let id = id.into();
        let _admit = Admission::enter(self.barrier.as_ref());
        match self.elements.get(&id) {
            Some(element) => element.restore_state(state),
            None => {
                tracing::info!(receiver = %id, "deposited receiver state for late registration");
                self.pending().insert(id, state);
            }
        }
    }

    /// Take the pending state for `id` without registering a receiver
    pub fn claim_pending(&self, id: &ElementId) -> Option<StateValue> {
        let _admit = Admission::enter(self.barrier.as_ref());
        self.pending().remove(id)
    }

    /// Ids that still have unclaimed pending state
    pub fn pending_ids(&self) -> Vec<ElementId> {
        self.pending().keys().cloned().collect()
    }

    /// Live receivers, stable in id order
    pub fn all_elements(&self) -> Vec<(ElementId, Arc<dyn ReceiverElement>)> {
        self.elements.live()
    }

    pub fn get(&self, id: &ElementId) -> Option<Arc<dyn ReceiverElement>> {
        self.elements.get(id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
