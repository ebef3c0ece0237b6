// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Consistency barrier that freezes state mutation during capture and restore
//!
//! The control path (snapshot, restore, registration) takes an exclusive,
//! reentrant hold. Event-processing threads wrap each mutation in an
//! admission section; a hold waits for in-flight admissions to drain and
//! new admissions wait while a hold is active or requested.

use std::collections::HashMap;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::thread::{self, ThreadId};
use thiserror::Error;

/// Errors raised by barrier misuse
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BarrierError {
    #[error("barrier released by a thread that does not hold it")]
    NotHeld,
}

/// Mutual-exclusion gate between checkpoint control and event processing
pub trait ConsistencyBarrier: Send + Sync {
    /// Block until exclusive hold is granted. Reentrant for the holder.
    fn acquire(&self);

    /// Give up one level of hold taken with [`ConsistencyBarrier::acquire`]
    fn release(&self) -> Result<(), BarrierError>;

    /// Start a state mutation on an event-processing thread
    fn enter(&self);

    /// Finish a state mutation started with [`ConsistencyBarrier::enter`]
    fn exit(&self);
}

/// RAII hold on a barrier, released on drop
pub struct BarrierGuard<'a> {
    barrier: &'a dyn ConsistencyBarrier,
}

impl<'a> BarrierGuard<'a> {
    pub fn acquire(barrier: &'a dyn ConsistencyBarrier) -> Self {
        barrier.acquire();
        Self { barrier }
    }
}

impl Drop for BarrierGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.barrier.release() {
            tracing::error!(error = %e, "barrier guard released without hold");
        }
    }
}

/// RAII admission for one state mutation, exited on drop
pub struct Admission<'a> {
    barrier: &'a dyn ConsistencyBarrier,
}

impl<'a> Admission<'a> {
    pub fn enter(barrier: &'a dyn ConsistencyBarrier) -> Self {
        barrier.enter();
        Self { barrier }
    }
}

impl Drop for Admission<'_> {
    fn drop(&mut self) {
        self.barrier.exit();
    }
}

#[derive(Debug, Default)]
struct GateState {
    holder: Option<ThreadId>,
    depth: usize,
    /// Threads waiting in `acquire`; admissions yield to them
    waiting: usize,
    /// In-flight admissions per processing thread
    admitted: HashMap<ThreadId, usize>,
}

impl GateState {
    fn admitted_elsewhere(&self, me: ThreadId) -> bool {
        self.admitted.keys().any(|id| *id != me)
    }
}

/// Blocking barrier for multi-threaded execution contexts
#[derive(Debug, Default)]
pub struct ThreadBarrier {
    state: Mutex<GateState>,
    changed: Condvar,
}

impl ThreadBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any thread currently holds the barrier
    pub fn is_held(&self) -> bool {
        self.lock().holder.is_some()
    }

    /// Whether the calling thread holds the barrier
    pub fn is_held_by_current(&self) -> bool {
        self.lock().holder == Some(thread::current().id())
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, GateState>) -> MutexGuard<'a, GateState> {
        self.changed.wait(guard).unwrap_or_else(|e| e.into_inner())
    }
}

impl ConsistencyBarrier for ThreadBarrier {
    fn acquire(&self) {
        let me = thread::current().id();
        let mut state = self.lock();

        if state.holder == Some(me) {
            state.depth += 1;
            return;
        }

        state.waiting += 1;
        while state.holder.is_some() || state.admitted_elsewhere(me) {
            state = self.wait(state);
        }
        state.waiting -= 1;
        state.holder = Some(me);
        state.depth = 1;
    }

    fn release(&self) -> Result<(), BarrierError> {
        let me = thread::current().id();
        let mut state = self.lock();

        if state.holder != Some(me) {
            tracing::error!(thread = ?me, "unmatched barrier release");
            return Err(BarrierError::NotHeld);
        }

        state.depth -= 1;
        if state.depth == 0 {
            state.holder = None;
            drop(state);
            self.changed.notify_all();
        }
        Ok(())
    }

    fn enter(&self) {
        let me = thread::current().id();
        let mut state = self.lock();

        // Nested admissions and the holder itself pass straight through
        let reentrant = state.admitted.contains_key(&me) || state.holder == Some(me);
        if !reentrant {
            while state.holder.is_some() || state.waiting > 0 {
                state = self.wait(state);
            }
        }
        *state.admitted.entry(me).or_insert(0) += 1;
    }

    fn exit(&self) {
        let me = thread::current().id();
        let mut state = self.lock();

        if let Some(count) = state.admitted.get_mut(&me) {
            *count -= 1;
            if *count == 0 {
                state.admitted.remove(&me);
                drop(state);
                self.changed.notify_all();
            }
        }
    }
}

/// Barrier for single-threaded builds and tests; never blocks
#[derive(Debug, Default)]
pub struct NoopBarrier;

impl ConsistencyBarrier for NoopBarrier {
    fn acquire(&self) {}

    fn release(&self) -> Result<(), BarrierError> {
        Ok(())
    }

    fn enter(&self) {}

    fn exit(&self) {}
}

#[cfg(test)]
#[path = "barrier_tests.rs"]
mod tests;
