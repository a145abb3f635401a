// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared setup.

pub mod compare;
pub mod generate;
pub mod inspect;

use bucket_generator::{BucketGenerator, GeneratorConfig, Loaded};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads the config and the dataset, falling back to the configured
/// `history_file` when `history` is not given.
pub fn load_generator(
    config_path: &Path,
    history: Option<PathBuf>,
) -> anyhow::Result<BucketGenerator<Loaded>> {
    tracing::debug!("loading config from '{}'", config_path.display());
    let config = GeneratorConfig::from_file(config_path)?;
    let generator = BucketGenerator::new(config);

    let loaded = match history {
        Some(path) => generator.load_history(&path).map_err(|e| {
            anyhow::anyhow!("failed to load history from '{}': {e}", path.display())
        })?,
        None => generator.load_configured_history()?,
    };
    Ok(loaded)
}

/// Formats milliseconds as seconds with two decimals.
pub fn secs(ms: i64) -> String {
    format!("{:.2} s", ms as f64 / 1000.0)
}
