// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::output::{self, OutputFormat};
use anyhow::{anyhow, bail, Context, Result};
use ck_core::{JsonCodec, Revision, SnapshotCodec};
use ck_storage::FileStore;

pub fn show(
    store: &FileStore,
    name: &str,
    revision: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let revision = match revision {
        Some(r) => Revision::from(r),
        None => store
            .latest(name)?
            .ok_or_else(|| anyhow!("no revisions for '{}'", name))?,
    };

    let Some(bytes) = store.read_image(name, &revision)? else {
        bail!("revision not found: {}/{}", name, revision);
    };
    let image = JsonCodec
        .decode(&bytes)
        .with_context(|| format!("failed to decode {}/{}", name, revision))?;

    match format {
        OutputFormat::Json => output::print_json(&image)?,
        OutputFormat::Text => {
            println!("Revision: {}", revision);
            println!("Elements: {}", image.len());
            for (id, state) in image.iter() {
                println!("  {}: {}", id, serde_json::to_string(state)?);
            }
        }
    }
    Ok(())
}
