// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable store interface
//!
//! A store keeps opaque byte images keyed by `(logical name, revision)` and
//! remembers, per logical name, the most recently written revision.

use crate::revision::Revision;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Errors from store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("revision not found: {name}/{revision}")]
    NotFound { name: String, revision: Revision },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Pluggable durable byte store
pub trait PersistenceStore: Send + Sync {
    /// Durably write `bytes`. Returns only after the write is durable.
    fn save(&self, name: &str, revision: &Revision, bytes: &[u8]) -> Result<(), StoreError>;

    /// Read back an image; [`StoreError::NotFound`] if absent
    fn load(&self, name: &str, revision: &Revision) -> Result<Vec<u8>, StoreError>;

    /// Most recently written revision for `name`
    fn last_revision(&self, name: &str) -> Result<Option<Revision>, StoreError>;
}

#[derive(Debug, Default)]
struct Namespace {
    images: HashMap<Revision, Vec<u8>>,
    /// Revisions in write order
    written: Vec<Revision>,
}

/// Store with all data in memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    names: Mutex<HashMap<String, Namespace>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revisions written under `name`, oldest first
    pub fn revisions(&self, name: &str) -> Vec<Revision> {
        self.lock()
            .get(name)
            .map(|ns| ns.written.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Namespace>> {
        self.names.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PersistenceStore for InMemoryStore {
    fn save(&self, name: &str, revision: &Revision, bytes: &[u8]) -> Result<(), StoreError> {
        let mut names = self.lock();
        let ns = names.entry(name.to_string()).or_default();
        ns.written.retain(|r| r != revision);
        ns.written.push(revision.clone());
        ns.images.insert(revision.clone(), bytes.to_vec());
        Ok(())
    }

    fn load(&self, name: &str, revision: &Revision) -> Result<Vec<u8>, StoreError> {
        self.lock()
            .get(name)
            .and_then(|ns| ns.images.get(revision))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                name: name.to_string(),
                revision: revision.clone(),
            })
    }

    fn last_revision(&self, name: &str) -> Result<Option<Revision>, StoreError> {
        Ok(self
            .lock()
            .get(name)
            .and_then(|ns| ns.written.last().cloned()))
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
