// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `bucketgen compare` command: sweep one run across bucket counts.
//!
//! Plans the run once per target and prints a table of bucket count,
//! heaviest and lightest bucket, and imbalance.

use super::secs;
use std::path::PathBuf;

pub fn execute(
    config: PathBuf,
    history: Option<PathBuf>,
    run: String,
    sweep: String,
) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║            bucketgen · Target Comparison             ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let targets: Vec<usize> = sweep
        .split(',')
        .map(|s| {
            s.trim()
                .parse::<usize>()
                .map_err(|e| anyhow::anyhow!("invalid bucket count '{}': {e}", s.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let generator = super::load_generator(&config, history)?;
    let costs = generator.resolve(&run)?;

    println!("  Run:        {run}");
    println!("  Costs:      {}", costs.source);
    println!("  Total cost: {}", secs(costs.total_cost_ms()));
    println!();

    println!(
        "  {:>8} {:>8} {:>8} {:>12} {:>12} {:>10}",
        "Target", "Buckets", "Splits", "Max load", "Min load", "Imbalance",
    );
    println!("  {}", "-".repeat(64));

    for target in targets {
        match generator.plan_run_with_target(&run, target) {
            Ok(planned) => {
                let plan = &planned.plan;
                let splits = plan.buckets.iter().filter(|b| b.is_split()).count();
                println!(
                    "  {:>8} {:>8} {:>8} {:>12} {:>12} {:>9.2}x",
                    target,
                    plan.num_buckets(),
                    splits,
                    secs(plan.max_load_ms()),
                    secs(plan.min_load_ms()),
                    plan.imbalance(),
                );
            }
            Err(e) => println!("  {:>8} {e}", target),
        }
    }
    println!();
    Ok(())
}
