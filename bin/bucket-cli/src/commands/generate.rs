// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `bucketgen generate` command: plan every run and write the document.

use std::path::PathBuf;

pub fn execute(
    config: PathBuf,
    history: Option<PathBuf>,
    output: Option<PathBuf>,
    print: bool,
) -> anyhow::Result<()> {
    let generator = super::load_generator(&config, history)?;
    let document = generator.generate()?;

    if print {
        println!("{}", document.to_json_pretty()?);
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║            bucketgen · Bucket Generator              ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    println!("  {:<32} {:>8}  {}", "Run", "Buckets", "Cost source");
    println!("  {}", "-".repeat(64));
    for run in &document.runs {
        println!("  {:<32} {:>8}  {}", run.run_id, run.num_buckets(), run.source);
    }
    println!();

    let output = output.unwrap_or_else(|| generator.config().output_file.clone());
    document
        .write_to(&output)
        .map_err(|e| anyhow::anyhow!("failed to write bucket document: {e}"))?;

    println!(
        "  Wrote {} buckets for {} runs to {}",
        document.num_buckets(),
        document.runs.len(),
        output.display()
    );
    Ok(())
}
