// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # bucketgen
//!
//! Command-line interface for generating balanced test buckets.
//!
//! ## Usage
//! ```bash
//! # Write the bucket document for every configured run
//! bucketgen --config buckets.toml generate --history test-class-data.json
//!
//! # Show resolved costs and buckets for one run
//! bucketgen --config buckets.toml inspect --run linux_amd64_17_quick
//!
//! # Compare bucket counts for one run
//! bucketgen --config buckets.toml compare --run linux_amd64_17_quick --sweep 4,8,16
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "bucketgen",
    about = "Splits weighted test work units into balanced CI buckets",
    version,
    author
)]
struct Cli {
    /// Path to the TOML generator configuration.
    #[arg(short, long, global = true, default_value = "buckets.toml")]
    config: PathBuf,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate buckets for every configured run and write the document.
    Generate {
        /// Historical timing dataset (defaults to `history_file` from the config).
        #[arg(long)]
        history: Option<PathBuf>,

        /// Output path (defaults to `output_file` from the config).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the document to stdout instead of writing it.
        #[arg(long)]
        print: bool,
    },

    /// Show resolved costs and the resulting buckets for one run.
    Inspect {
        /// Historical timing dataset (defaults to `history_file` from the config).
        #[arg(long)]
        history: Option<PathBuf>,

        /// Run id as listed in the config.
        #[arg(short, long)]
        run: String,
    },

    /// Compare partitions of one run across several bucket counts.
    Compare {
        /// Historical timing dataset (defaults to `history_file` from the config).
        #[arg(long)]
        history: Option<PathBuf>,

        /// Run id as listed in the config.
        #[arg(short, long)]
        run: String,

        /// Comma-separated bucket counts to try (e.g., "4,8,16").
        #[arg(long, default_value = "4,8,16")]
        sweep: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            history,
            output,
            print,
        } => commands::generate::execute(cli.config, history, output, print),
        Commands::Inspect { history, run } => commands::inspect::execute(cli.config, history, run),
        Commands::Compare {
            history,
            run,
            sweep,
        } => commands::compare::execute(cli.config, history, run, sweep),
    }
}
