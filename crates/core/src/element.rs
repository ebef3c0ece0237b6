// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stateful element capabilities
//!
//! Operators and receivers are owned by the execution engine. They expose
//! their state as an opaque [`StateValue`] and accept it back on restore.

use serde::{Deserialize, Serialize};

/// Opaque per-element state
pub type StateValue = serde_json::Value;

/// Registry key for a stateful element (operator path, receiver name, ...)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Operator state that takes part in snapshots
///
/// Both methods are only called while the consistency barrier is held, so an
/// implementation never races its own processing-thread mutations as long as
/// those mutations run inside an admission section.
pub trait Snapshotable: Send + Sync {
    fn current_state(&self) -> StateValue;

    fn restore_state(&self, state: StateValue);
}

/// Source/receiver read-position state
pub trait ReceiverElement: Snapshotable {
    /// Called once the offset image containing `state` is durably stored.
    /// Receivers advance their upstream consumption marker here.
    fn on_save_acknowledged(&self, state: &StateValue);
}
