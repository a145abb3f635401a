// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Greedy balancing partitioning strategy.
//!
//! Distributes weighted work units over a fixed number of buckets so that
//! bucket loads come out roughly equal.
//!
//! # Algorithm
//!
//! 1. Work units are ordered by descending cost (stable, so equal costs keep
//!    their input order).
//! 2. If there are fewer work units than buckets, every work unit gets a
//!    bucket of its own. With exactly as many, the steps below still hand
//!    every work unit its own bucket unless one of them dominates.
//! 3. **Large-item splitting.** The fair share is the remaining cost divided
//!    by the remaining bucket count. While the largest remaining work unit
//!    exceeds it, the work unit is split into
//!
//!    ```text
//!    N = ceil(cost / fair_share)
//!    ```
//!
//!    batches, capped so that at least one bucket stays available for the
//!    work units after it. The batches take `N` buckets and the fair share
//!    is recomputed.
//! 4. **Greedy packing.** The rest go largest-first into the bin with the
//!    smallest load, skipping bins that already hold the item cap. Ties go
//!    to the bin with fewer work units, then to the lowest index. When every
//!    bin is full the cap yields before the bucket count does.
//! 5. Bins with one work unit become single buckets, bins with several
//!    become grouped buckets. The result is deduplicated by bucket key
//!    (see [`crate::BucketKey`]), keeping first occurrences, and is not
//!    re-sorted.
//!
//! # When to use
//! - Whenever timing data exists for the run.

use crate::plan::PlanBuilder;
use crate::strategy::{validate_units, PartitionStrategy};
use crate::{Bucket, BucketFactory, PartitionPlan, SplitError, SplitLimits};
use cost_model::WorkUnit;
use std::collections::{HashSet, VecDeque};

/// Greedy largest-first balancing with large-item splitting.
#[derive(Debug, Clone, Default)]
pub struct GreedyBalancing;

impl GreedyBalancing {
    pub fn new() -> Self {
        Self
    }
}

impl PartitionStrategy for GreedyBalancing {
    fn name(&self) -> &str {
        "greedy-balancing"
    }

    fn partition(
        &self,
        units: &[WorkUnit],
        limits: SplitLimits,
        factory: &dyn BucketFactory,
    ) -> Result<PartitionPlan, SplitError> {
        let buckets = split(units, limits, factory)?;
        let plan = PlanBuilder::new(self.name(), limits, true, units).build(buckets);
        if plan.cap_breaches() > 0 {
            tracing::warn!(
                "{} buckets exceed the cap of {} work units",
                plan.cap_breaches(),
                limits.max_items_per_bucket,
            );
        }
        plan.validate()?;
        Ok(plan)
    }
}

/// Splits `units` into at most `limits.target_buckets` buckets.
///
/// Fails before producing anything if the limits are unusable or a work
/// unit has a negative cost or a repeated identity. An empty input yields
/// an empty result.
pub fn split(
    units: &[WorkUnit],
    limits: SplitLimits,
    factory: &dyn BucketFactory,
) -> Result<Vec<Bucket>, SplitError> {
    limits.validate()?;
    validate_units(units)?;

    if units.is_empty() {
        return Ok(Vec::new());
    }

    let mut sorted = units.to_vec();
    sorted.sort_by(|a, b| b.cost_ms.cmp(&a.cost_ms));

    if limits.target_buckets > sorted.len() {
        tracing::debug!(
            "{} work units fit into {} buckets; one bucket each",
            sorted.len(),
            limits.target_buckets,
        );
        let buckets = sorted.into_iter().map(|u| factory.single(u)).collect();
        return Ok(dedup_by_key(buckets));
    }

    let mut remaining: VecDeque<WorkUnit> = sorted.into();
    let mut buckets_left = limits.target_buckets;
    let mut cost_left: u128 = remaining.iter().map(|u| u.cost_ms as u128).sum();
    let mut buckets = Vec::with_capacity(limits.target_buckets);

    // Large-item splitting.
    while let Some(factor) = remaining
        .front()
        .and_then(|u| batch_factor(u.cost_ms, cost_left, buckets_left, remaining.len() - 1))
    {
        let Some(unit) = remaining.pop_front() else {
            break;
        };
        tracing::debug!(
            "splitting '{}' ({} ms) into {} batches, {} buckets left",
            unit.id,
            unit.cost_ms,
            factor,
            buckets_left - factor,
        );
        buckets.extend(factory.split(&unit, factor));
        buckets_left -= factor;
        cost_left -= unit.cost_ms as u128;
    }

    if !remaining.is_empty() {
        let bins = pack(remaining, buckets_left, limits.max_items_per_bucket);
        for bin in bins.into_iter().filter(|b| !b.units.is_empty()) {
            buckets.push(bin.into_bucket(factory));
        }
    }

    Ok(dedup_by_key(buckets))
}

/// Returns the batch factor for a work unit of `cost` if it exceeds the
/// fair share of `cost_left` over `buckets_left`.
///
/// `others` is the number of work units still waiting after this one; each
/// of them needs at least one bucket in total, so the factor leaves one
/// bucket free when `others > 0`. Returns `None` when the work unit fits
/// its share or cannot be split into at least two batches.
fn batch_factor(cost: i64, cost_left: u128, buckets_left: usize, others: usize) -> Option<usize> {
    if cost_left == 0 || buckets_left < 2 {
        return None;
    }
    let scaled = cost as u128 * buckets_left as u128;
    if scaled <= cost_left {
        return None;
    }
    // cost <= cost_left, so this never exceeds buckets_left.
    let wanted = scaled.div_ceil(cost_left) as usize;
    let available = if others > 0 {
        buckets_left - 1
    } else {
        buckets_left
    };
    let factor = wanted.min(available);
    (factor >= 2).then_some(factor)
}

/// An accumulating bucket during greedy packing.
#[derive(Debug, Default)]
struct Bin {
    load_ms: i64,
    units: Vec<WorkUnit>,
}

impl Bin {
    fn push(&mut self, unit: WorkUnit) {
        self.load_ms = self.load_ms.saturating_add(unit.cost_ms);
        self.units.push(unit);
    }

    fn into_bucket(mut self, factory: &dyn BucketFactory) -> Bucket {
        if self.units.len() == 1 {
            if let Some(unit) = self.units.pop() {
                return factory.single(unit);
            }
        }
        factory.merge(self.units)
    }
}

/// Places `units` (largest first) into `bin_count` bins.
fn pack(units: VecDeque<WorkUnit>, bin_count: usize, max_items: usize) -> Vec<Bin> {
    let bin_count = bin_count.clamp(1, units.len());
    let mut bins: Vec<Bin> = (0..bin_count).map(|_| Bin::default()).collect();

    for unit in units {
        let index = match lightest_bin(&bins, Some(max_items)) {
            Some(index) => index,
            None => {
                let index = lightest_bin(&bins, None).unwrap_or(0);
                tracing::warn!(
                    "all {} buckets hold {} work units; '{}' exceeds the cap",
                    bins.len(),
                    max_items,
                    unit.id,
                );
                index
            }
        };
        tracing::debug!(
            "placing '{}' ({} ms) into bucket {} (load {} ms)",
            unit.id,
            unit.cost_ms,
            index,
            bins[index].load_ms,
        );
        bins[index].push(unit);
    }

    bins
}

/// Index of the least loaded bin with room below `cap`.
///
/// Ties go to the bin with fewer work units, then to the lowest index.
fn lightest_bin(bins: &[Bin], cap: Option<usize>) -> Option<usize> {
    bins.iter()
        .enumerate()
        .filter(|(_, bin)| cap.map_or(true, |cap| bin.units.len() < cap))
        .min_by_key(|(index, bin)| (bin.load_ms, bin.units.len(), *index))
        .map(|(index, _)| index)
}

/// Drops buckets whose key was already produced, keeping order.
fn dedup_by_key(buckets: Vec<Bucket>) -> Vec<Bucket> {
    let mut seen = HashSet::with_capacity(buckets.len());
    buckets
        .into_iter()
        .filter(|b| seen.insert(b.key()))
        .collect()
}
