// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ck - inspect persisted checkpoints

mod commands;
mod output;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ck",
    version,
    about = "ck - inspect checkpoints written by ck execution contexts"
)]
struct Cli {
    /// Checkpoint store directory
    #[arg(long, global = true, conflicts_with = "config")]
    store: Option<PathBuf>,

    /// Persistence config file naming a file store
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List revisions stored under a logical name, oldest first
    Revisions {
        /// Logical store name (context name, or context name + "offset")
        name: String,
    },
    /// Print the most recently written revision
    Last {
        /// Logical store name
        name: String,
    },
    /// Dump a stored image
    Show {
        /// Logical store name
        name: String,
        /// Revision to show; defaults to the most recent
        revision: Option<String>,
    },
}

fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();

    let store = store::resolve(cli.store.as_deref(), cli.config.as_deref())?;

    match cli.command {
        Commands::Revisions { name } => commands::revisions(&store, &name, cli.output),
        Commands::Last { name } => commands::last(&store, &name, cli.output),
        Commands::Show { name, revision } => {
            commands::show(&store, &name, revision.as_deref(), cli.output)
        }
    }
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
