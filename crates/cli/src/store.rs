// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Locate the store a command reads from

use anyhow::{bail, Context, Result};
use ck_core::{PersistenceConfig, StoreConfig};
use ck_storage::FileStore;
use std::path::Path;

/// Open the store named by `--store`, or the file store in `--config`.
///
/// The store is opened read-only so inspection works while a running
/// context holds the writer lock.
pub fn resolve(store: Option<&Path>, config: Option<&Path>) -> Result<FileStore> {
    if let Some(dir) = store {
        return open_dir(dir);
    }

    let Some(config_path) = config else {
        bail!("no store given: pass --store <dir> or --config <file>");
    };
    let config = PersistenceConfig::load(config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    match &config.store {
        StoreConfig::File { path } => open_dir(path),
        StoreConfig::Memory => bail!(
            "context '{}' uses an in-memory store; nothing to inspect",
            config.name
        ),
        StoreConfig::None => bail!("context '{}' has no store configured", config.name),
    }
}

fn open_dir(dir: &Path) -> Result<FileStore> {
    if !dir.is_dir() {
        bail!("store directory not found: {}", dir.display());
    }
    tracing::debug!(root = %dir.display(), "inspecting store");
    Ok(FileStore::open_read_only(dir))
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
