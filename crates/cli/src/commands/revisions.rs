// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::output::{self, OutputFormat};
use anyhow::Result;
use ck_storage::FileStore;
use serde::Serialize;

#[derive(Serialize)]
struct RevisionEntry {
    revision: String,
    timestamp_millis: Option<u64>,
    latest: bool,
}

pub fn revisions(store: &FileStore, name: &str, format: OutputFormat) -> Result<()> {
    let revisions = store.list_revisions(name)?;
    let latest = store.latest(name)?;

    let entries: Vec<RevisionEntry> = revisions
        .iter()
        .map(|r| RevisionEntry {
            revision: r.to_string(),
            timestamp_millis: r.timestamp_millis(),
            latest: latest.as_ref() == Some(r),
        })
        .collect();

    match format {
        OutputFormat::Json => output::print_json(&entries)?,
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("No revisions for '{}'", name);
                return Ok(());
            }
            for entry in &entries {
                if entry.latest {
                    println!("{} (latest)", entry.revision);
                } else {
                    println!("{}", entry.revision);
                }
            }
        }
    }
    Ok(())
}
