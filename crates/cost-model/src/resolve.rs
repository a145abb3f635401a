// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Cost resolution: historical dataset → per-run [`CostModel`].
//!
//! Resolution never fails. The fallback chain is:
//!
//! ```text
//! exact run id in dataset           → CostSource::Direct
//! soak run (not substitutable)      → CostSource::Unavailable
//! first known run on same platform  → CostSource::Borrowed
//! nothing found                     → CostSource::Unavailable
//! ```
//!
//! Only known work units produce entries; data for unknown ids is dropped
//! and known ids without data cost zero.

use crate::dataset::RunTimings;
use crate::{CostModel, CostSource, HistoricalDataset, RunIdentity, WorkUnit};
use std::collections::HashSet;

/// Source set whose timings double-count the integration suites.
const DEFAULT_EXCLUDED_SOURCE_SET: &str = "test";

/// Work unit id used by the data collector when it cannot attribute a test.
const DEFAULT_UNKNOWN_IDENTITY: &str = "UNKNOWN";

/// Knobs for aggregating timing records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Records whose source set is listed here are not counted.
    pub excluded_source_sets: Vec<String>,
    /// Sentinel id that is never turned into a work unit.
    pub unknown_identity: String,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            excluded_source_sets: vec![DEFAULT_EXCLUDED_SOURCE_SET.to_string()],
            unknown_identity: DEFAULT_UNKNOWN_IDENTITY.to_string(),
        }
    }
}

impl ResolveOptions {
    fn counts(&self, source_set: &str) -> bool {
        !self.excluded_source_sets.iter().any(|s| s == source_set)
    }
}

/// Resolves a cost for every known work unit of `run`.
///
/// `known_runs` is the full list of runs of the current configuration, in
/// priority order; it is searched for a platform-compatible donor when the
/// dataset has no entry for `run`.
pub fn resolve_costs(
    known: &[String],
    dataset: &HistoricalDataset,
    run: &RunIdentity,
    known_runs: &[RunIdentity],
    options: &ResolveOptions,
) -> CostModel {
    if let Some(timings) = dataset.get(&run.id) {
        tracing::debug!("run '{}' has direct timing data", run.id);
        let units = aggregate(known, timings, options);
        return CostModel::new(run.id.clone(), CostSource::Direct, units);
    }

    if !run.kind.is_substitutable() {
        tracing::warn!(
            "no timing data for {} run '{}'; other runs cannot stand in, using zero costs",
            run.kind,
            run.id,
        );
        return unavailable(known, run, options);
    }

    let donor = known_runs.iter().find(|candidate| {
        candidate.id != run.id
            && candidate.kind.is_substitutable()
            && run.shares_platform(candidate)
            && dataset.contains_run(&candidate.id)
    });

    match donor.and_then(|d| dataset.get(&d.id).map(|t| (d, t))) {
        Some((donor, timings)) => {
            tracing::info!(
                "no timing data for run '{}'; borrowing data from '{}' ({})",
                run.id,
                donor.id,
                donor.platform,
            );
            let units = aggregate(known, timings, options);
            CostModel::new(
                run.id.clone(),
                CostSource::Borrowed {
                    from: donor.id.clone(),
                },
                units,
            )
        }
        None => {
            tracing::warn!(
                "no timing data for run '{}' and no run on {} to borrow from; using zero costs",
                run.id,
                run.platform,
            );
            unavailable(known, run, options)
        }
    }
}

fn unavailable(known: &[String], run: &RunIdentity, options: &ResolveOptions) -> CostModel {
    let ids: Vec<String> = distinct_known(known, options).map(str::to_string).collect();
    CostModel::unavailable(run.id.clone(), &ids)
}

/// Known ids in input order, without duplicates or the unknown sentinel.
fn distinct_known<'a>(
    known: &'a [String],
    options: &'a ResolveOptions,
) -> impl Iterator<Item = &'a str> {
    let mut seen = HashSet::new();
    known
        .iter()
        .map(String::as_str)
        .filter(move |id| *id != options.unknown_identity && seen.insert(*id))
}

/// Sums the counted records of every known work unit.
fn aggregate(known: &[String], timings: &RunTimings, options: &ResolveOptions) -> Vec<WorkUnit> {
    let units: Vec<WorkUnit> = distinct_known(known, options)
        .map(|id| {
            let cost = timings
                .get(id)
                .map(|records| {
                    records
                        .iter()
                        .filter(|r| options.counts(&r.source_set))
                        .fold(0i64, |acc, r| acc.saturating_add(r.build_time_ms))
                })
                .unwrap_or(0);
            WorkUnit::new(id, cost)
        })
        .collect();

    let ignored = timings
        .keys()
        .filter(|id| !units.iter().any(|u| &u.id == *id))
        .count();
    if ignored > 0 {
        tracing::debug!("ignored timing data for {ignored} unknown work units");
    }

    units
}
