// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::output::{self, OutputFormat};
use anyhow::{bail, Result};
use ck_storage::FileStore;

pub fn last(store: &FileStore, name: &str, format: OutputFormat) -> Result<()> {
    let Some(revision) = store.latest(name)? else {
        bail!("no revisions for '{}'", name);
    };

    match format {
        OutputFormat::Json => output::print_json(&revision)?,
        OutputFormat::Text => println!("{}", revision),
    }
    Ok(())
}
