// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::file::{FileStore, FileStoreError};
use ck_core::{InMemoryStore, PersistenceStore, StoreConfig};
use std::sync::Arc;

/// Build the store described by `config`; `None` when no store is configured
pub fn open_store(
    config: &StoreConfig,
) -> Result<Option<Arc<dyn PersistenceStore>>, FileStoreError> {
    let store: Arc<dyn PersistenceStore> = match config {
        StoreConfig::None => return Ok(None),
        StoreConfig::Memory => Arc::new(InMemoryStore::new()),
        StoreConfig::File { path } => Arc::new(FileStore::open(path)?),
    };
    Ok(Some(store))
}

#[cfg(test)]
#[path = "open_tests.rs"]
mod tests;
