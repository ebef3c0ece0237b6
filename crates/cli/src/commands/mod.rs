// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command handlers

mod last;
mod revisions;
mod show;

pub use last::last;
pub use revisions::revisions;
pub use show::show;
