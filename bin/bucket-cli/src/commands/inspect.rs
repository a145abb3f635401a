// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `bucketgen inspect` command: resolved costs and buckets of one run.
//!
//! Prints where the costs came from, every work unit with its cost, and
//! the buckets the run would get with its configured bucket count.

use super::secs;
use std::path::PathBuf;

pub fn execute(config: PathBuf, history: Option<PathBuf>, run: String) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║             bucketgen · Run Inspector                ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let generator = super::load_generator(&config, history)?;
    let planned = generator.plan_run(&run)?;

    // ── Summary ────────────────────────────────────────────────
    println!("  Run:        {}", planned.run);
    println!("  Costs:      {}", planned.costs.source);
    println!("  Work units: {}", planned.costs.num_units());
    println!("  Total cost: {}", secs(planned.costs.total_cost_ms()));
    println!("  Limits:     {}", planned.plan.limits);
    println!();

    // ── Work units ─────────────────────────────────────────────
    println!("  {:<40} {:>12}", "Work unit", "Cost");
    println!("  {}", "-".repeat(54));
    for unit in planned.costs.sorted_work_units() {
        println!("  {:<40} {:>12}", truncate(&unit.id, 40), secs(unit.cost_ms));
    }
    println!();

    // ── Buckets ────────────────────────────────────────────────
    println!("  {:<4} {:<36} {:>6} {:>12}  {}", "#", "Bucket", "Units", "Load", "Parallelization");
    println!("  {}", "-".repeat(78));
    for (i, bucket) in planned.plan.buckets.iter().enumerate() {
        println!(
            "  {:<4} {:<36} {:>6} {:>12}  {}",
            i,
            truncate(&bucket.name(), 36),
            bucket.num_units(),
            secs(bucket.load_ms()),
            bucket.parallelization(),
        );
    }
    println!();
    println!("  {}", planned.plan.summary());
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
