// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory-backed persistence store
//!
//! Layout under the store root:
//!
//! ```text
//! .lock                      exclusive while a writer has the store open
//! <name>/<revision>.snap     framed image, see `frame`
//! <name>/LATEST              most recently written revision
//! ```
//!
//! Images and the `LATEST` pointer are written to a temp file, fsynced and
//! renamed into place, so a crash leaves either the old or the new file.

use crate::frame::{self, FrameError};
use ck_core::{PersistenceStore, Revision, StoreError};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

const LOCK_FILE: &str = ".lock";
const LATEST_FILE: &str = "LATEST";
const IMAGE_EXT: &str = "snap";

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("store at {path} is locked by another writer")]
    Locked {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("store at {0} was opened read-only")]
    ReadOnly(PathBuf),
    #[error("invalid {kind} for file store: {value:?}")]
    InvalidName { kind: &'static str, value: String },
    #[error("corrupt image {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: FrameError,
    },
}

impl From<FileStoreError> for StoreError {
    fn from(e: FileStoreError) -> Self {
        match e {
            FileStoreError::Io(e) => StoreError::Io(e),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Store keeping one file per `(name, revision)` under a root directory
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    // NOTE(lifetime): Held to keep the exclusive store lock; released on drop
    lock: Option<File>,
    /// Serializes writers within the process; temp names are per file
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open for writing, creating the root if needed.
    ///
    /// Fails with [`FileStoreError::Locked`] while another writer holds the
    /// store, in this process or another.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, FileStoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(root.join(LOCK_FILE))?;
        lock.try_lock_exclusive()
            .map_err(|source| FileStoreError::Locked {
                path: root.clone(),
                source,
            })?;

        tracing::debug!(root = %root.display(), "opened file store");
        Ok(Self {
            root,
            lock: Some(lock),
            write_lock: Mutex::new(()),
        })
    }

    /// Open for inspection without taking the writer lock. Saves fail.
    pub fn open_read_only(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            lock: None,
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_read_only(&self) -> bool {
        self.lock.is_none()
    }

    /// Revisions stored under `name`, oldest first
    pub fn list_revisions(&self, name: &str) -> Result<Vec<Revision>, FileStoreError> {
        let dir = self.name_dir(name)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut revisions = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().map(|e| e == IMAGE_EXT).unwrap_or(false) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if !stem.starts_with('.') {
                        revisions.push(Revision::from(stem));
                    }
                }
            }
        }

        revisions.sort();
        Ok(revisions)
    }

    /// Read and verify one image
    pub fn read_image(
        &self,
        name: &str,
        revision: &Revision,
    ) -> Result<Option<Vec<u8>>, FileStoreError> {
        let path = self.image_path(name, revision)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let payload = frame::decode(&bytes).map_err(|source| FileStoreError::Corrupt {
            path: path.clone(),
            source,
        })?;
        Ok(Some(payload.to_vec()))
    }

    /// Revision recorded in the `LATEST` pointer for `name`
    pub fn latest(&self, name: &str) -> Result<Option<Revision>, FileStoreError> {
        let path = self.name_dir(name)?.join(LATEST_FILE);
        match fs::read_to_string(&path) {
            Ok(content) => {
                let trimmed = content.trim();
                if trimmed.is_empty() {
                    tracing::warn!(path = %path.display(), "empty LATEST pointer");
                    Ok(None)
                } else {
                    Ok(Some(Revision::from(trimmed)))
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_image(
        &self,
        name: &str,
        revision: &Revision,
        payload: &[u8],
    ) -> Result<(), FileStoreError> {
        if self.is_read_only() {
            return Err(FileStoreError::ReadOnly(self.root.clone()));
        }
        let path = self.image_path(name, revision)?;
        let dir = self.name_dir(name)?;
        fs::create_dir_all(&dir)?;

        let _writing = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        write_atomic(&dir, &path, &frame::encode(payload))?;
        write_atomic(&dir, &dir.join(LATEST_FILE), revision.as_str().as_bytes())?;

        tracing::debug!(
            name,
            revision = %revision,
            bytes = payload.len(),
            "image written"
        );
        Ok(())
    }

    fn name_dir(&self, name: &str) -> Result<PathBuf, FileStoreError> {
        validate_component("name", name)?;
        Ok(self.root.join(name))
    }

    fn image_path(&self, name: &str, revision: &Revision) -> Result<PathBuf, FileStoreError> {
        validate_component("revision", revision.as_str())?;
        Ok(self
            .name_dir(name)?
            .join(format!("{}.{}", revision.as_str(), IMAGE_EXT)))
    }
}

impl PersistenceStore for FileStore {
    fn save(&self, name: &str, revision: &Revision, bytes: &[u8]) -> Result<(), StoreError> {
        Ok(self.write_image(name, revision, bytes)?)
    }

    fn load(&self, name: &str, revision: &Revision) -> Result<Vec<u8>, StoreError> {
        self.read_image(name, revision)?
            .ok_or_else(|| StoreError::NotFound {
                name: name.to_string(),
                revision: revision.clone(),
            })
    }

    fn last_revision(&self, name: &str) -> Result<Option<Revision>, StoreError> {
        Ok(self.latest(name)?)
    }
}

/// Names and revisions become single path components
fn validate_component(kind: &'static str, value: &str) -> Result<(), FileStoreError> {
    let invalid = value.is_empty()
        || value.starts_with('.')
        || value == LATEST_FILE
        || value.contains(['/', '\\', '\0']);
    if invalid {
        return Err(FileStoreError::InvalidName {
            kind,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image");
    let tmp = dir.join(format!(".{}.tmp", file_name));

    let mut file = File::create(&tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp, path)?;
    sync_dir(dir)
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
