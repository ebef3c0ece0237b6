// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Revision identifiers and logical store names
//!
//! A revision is `<epoch-millis>_<context-name>`. The state image of a
//! context is stored under the context name and the offset image under the
//! context name followed by `offset`. Both formats are shared with other
//! readers of the same store and must not change.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Suffix appended to the context name for the offset image
pub const OFFSET_SUFFIX: &str = "offset";

/// Logical store name of a context's state image
pub fn state_name(context: &str) -> String {
    context.to_string()
}

/// Logical store name of a context's offset image
pub fn offset_name(context: &str) -> String {
    format!("{}{}", context, OFFSET_SUFFIX)
}

/// Identifier of one persisted checkpoint
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(pub String);

impl Revision {
    pub fn new(timestamp_millis: u64, context: &str) -> Self {
        Self(format!("{}_{}", timestamp_millis, context))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Capture time encoded in the revision, if it has the standard shape
    pub fn timestamp_millis(&self) -> Option<u64> {
        let (millis, _) = self.0.split_once('_')?;
        millis.parse().ok()
    }

    /// Context name encoded in the revision, if it has the standard shape
    pub fn context(&self) -> Option<&str> {
        self.0
            .split_once('_')
            .filter(|(millis, _)| millis.parse::<u64>().is_ok())
            .map(|(_, context)| context)
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Capture time first, then the raw string. Revisions without a parsable
/// timestamp sort before all others.
impl Ord for Revision {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.timestamp_millis()
            .cmp(&other.timestamp_millis())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Revision {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for Revision {
    fn from(revision: &str) -> Self {
        Self(revision.to_string())
    }
}

/// Issues strictly increasing revisions for one context.
///
/// When the clock has not moved past the previous revision the timestamp
/// is bumped by one millisecond, so two checkpoints never share a name.
#[derive(Debug)]
pub struct RevisionGenerator {
    context: String,
    last_millis: Mutex<Option<u64>>,
}

impl RevisionGenerator {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            last_millis: Mutex::new(None),
        }
    }

    /// Next revision for a capture at `now_millis`
    pub fn next(&self, now_millis: u64) -> Revision {
        let mut last = self.last_millis.lock().unwrap_or_else(|e| e.into_inner());
        let millis = match *last {
            Some(prev) if now_millis <= prev => prev + 1,
            _ => now_millis,
        };
        *last = Some(millis);
        Revision::new(millis, &self.context)
    }

    /// Continue after an existing revision (e.g. the last one in the store)
    pub fn observe(&self, revision: &Revision) {
        if let Some(millis) = revision.timestamp_millis() {
            let mut last = self.last_millis.lock().unwrap_or_else(|e| e.into_inner());
            if last.map_or(true, |prev| millis > prev) {
                *last = Some(millis);
            }
        }
    }
}

#[cfg(test)]
#[path = "revision_tests.rs"]
mod tests;
