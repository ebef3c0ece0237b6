// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot images and their serialization boundary

use crate::element::{ElementId, StateValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors produced while encoding or decoding an image
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported image version: {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Per-element state captured from one registry at one instant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotImage {
    elements: BTreeMap<ElementId, StateValue>,
}

impl SnapshotImage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ElementId, state: StateValue) {
        self.elements.insert(id, state);
    }

    pub fn get(&self, id: &ElementId) -> Option<&StateValue> {
        self.elements.get(id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &ElementId> {
        self.elements.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ElementId, &StateValue)> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl FromIterator<(ElementId, StateValue)> for SnapshotImage {
    fn from_iter<I: IntoIterator<Item = (ElementId, StateValue)>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for SnapshotImage {
    type Item = (ElementId, StateValue);
    type IntoIter = std::collections::btree_map::IntoIter<ElementId, StateValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

/// Turns images into bytes and back. Must round-trip state values exactly.
pub trait SnapshotCodec: Send + Sync {
    fn encode(&self, image: &SnapshotImage) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, bytes: &[u8]) -> Result<SnapshotImage, CodecError>;
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    elements: &'a SnapshotImage,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    elements: SnapshotImage,
}

/// JSON codec wrapping the image in a versioned envelope
#[derive(Clone, Debug, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Current version of the image format
    pub const CURRENT_VERSION: u32 = 1;
}

impl SnapshotCodec for JsonCodec {
    fn encode(&self, image: &SnapshotImage) -> Result<Vec<u8>, CodecError> {
        let envelope = EnvelopeRef {
            version: Self::CURRENT_VERSION,
            elements: image,
        };
        Ok(serde_json::to_vec(&envelope)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<SnapshotImage, CodecError> {
        let envelope: Envelope = serde_json::from_slice(bytes)?;
        if envelope.version != Self::CURRENT_VERSION {
            return Err(CodecError::UnsupportedVersion {
                found: envelope.version,
                expected: Self::CURRENT_VERSION,
            });
        }
        Ok(envelope.elements)
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
