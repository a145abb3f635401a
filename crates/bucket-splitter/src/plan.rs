// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Partition plan: the output of a partition strategy.
//!
//! A plan is the ordered list of [`Bucket`]s for one run plus the limits it
//! was built against. It is the contract between the splitter and whatever
//! turns buckets into CI jobs.

use crate::{Bucket, SplitError, SplitLimits};
use cost_model::WorkUnit;
use std::collections::HashSet;

/// The complete partition produced by a [`crate::PartitionStrategy`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct PartitionPlan {
    /// Strategy name that produced this plan.
    pub strategy_name: String,
    /// Limits the plan was built against.
    pub limits: SplitLimits,
    /// Whether the bucket count must stay within `limits.target_buckets`.
    pub bounded: bool,
    /// Buckets in the order they were finalized.
    pub buckets: Vec<Bucket>,
    /// Identities of the work units that were partitioned.
    #[serde(skip)]
    input_ids: Vec<String>,
    /// Total cost of the work units that were partitioned.
    pub input_cost_ms: i64,
}

impl PartitionPlan {
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Number of distinct work units covered by the plan.
    pub fn num_units(&self) -> usize {
        self.covered_units().len()
    }

    /// Sum of work unit costs, counting each split work unit once.
    pub fn accounted_cost_ms(&self) -> i64 {
        self.covered_units()
            .iter()
            .fold(0i64, |acc, u| acc.saturating_add(u.cost_ms))
    }

    /// The heaviest bucket load in milliseconds.
    pub fn max_load_ms(&self) -> i64 {
        self.buckets.iter().map(Bucket::load_ms).max().unwrap_or(0)
    }

    /// The lightest bucket load in milliseconds.
    pub fn min_load_ms(&self) -> i64 {
        self.buckets.iter().map(Bucket::load_ms).min().unwrap_or(0)
    }

    /// Ratio of the heaviest bucket to the mean bucket load.
    ///
    /// `1.0` is a perfect balance; an empty or zero-cost plan reports `1.0`.
    pub fn imbalance(&self) -> f64 {
        let total: f64 = self.buckets.iter().map(|b| b.load_ms() as f64).sum();
        if self.buckets.is_empty() || total == 0.0 {
            return 1.0;
        }
        let mean = total as f64 / self.buckets.len() as f64;
        self.max_load_ms() as f64 / mean
    }

    /// Buckets holding more work units than the item cap allows.
    pub fn cap_breaches(&self) -> usize {
        self.buckets
            .iter()
            .filter(|b| b.num_units() > self.limits.max_items_per_bucket)
            .count()
    }

    /// Validates the plan.
    ///
    /// Checks:
    /// - No bucket is empty.
    /// - No two buckets cover the same work units in the same way, and
    ///   bucket names are distinct.
    /// - Every input work unit is covered by exactly one bucket or one
    ///   split group, and nothing else is covered.
    /// - The accounted cost equals the input cost.
    /// - A bounded plan has at most `target_buckets` buckets.
    pub fn validate(&self) -> Result<(), SplitError> {
        let mut keys = HashSet::new();
        let mut names = HashSet::new();
        for bucket in &self.buckets {
            if bucket.num_units() == 0 {
                return Err(self.invalid("empty bucket".into()));
            }
            let name = bucket.name();
            if !keys.insert(bucket.key()) {
                return Err(self.invalid(format!("bucket '{name}' appears twice")));
            }
            if !names.insert(name.clone()) {
                return Err(self.invalid(format!("bucket name '{name}' is ambiguous")));
            }
        }

        // Split groups contribute their work unit once; everything else
        // must not repeat a work unit.
        let mut seen_splits = HashSet::new();
        let mut covered = HashSet::new();
        for bucket in &self.buckets {
            for unit in bucket.units() {
                let first_batch = bucket.is_split() && seen_splits.insert(unit.id.as_str());
                if (!bucket.is_split() || first_batch) && !covered.insert(unit.id.as_str()) {
                    return Err(self.invalid(format!(
                        "work unit '{}' appears in more than one bucket",
                        unit.id
                    )));
                }
            }
        }

        let expected: HashSet<&str> = self.input_ids.iter().map(String::as_str).collect();
        if covered != expected {
            let missing: Vec<_> = expected.difference(&covered).collect();
            let extra: Vec<_> = covered.difference(&expected).collect();
            return Err(self.invalid(format!(
                "coverage mismatch: missing {missing:?}, unexpected {extra:?}"
            )));
        }

        if self.accounted_cost_ms() != self.input_cost_ms {
            return Err(self.invalid(format!(
                "accounted cost {} ms differs from input cost {} ms",
                self.accounted_cost_ms(),
                self.input_cost_ms,
            )));
        }

        if self.bounded && self.buckets.len() > self.limits.target_buckets {
            return Err(self.invalid(format!(
                "{} buckets exceed the target of {}",
                self.buckets.len(),
                self.limits.target_buckets,
            )));
        }

        Ok(())
    }

    /// Returns a human-readable summary of the plan.
    pub fn summary(&self) -> String {
        let splits = self.buckets.iter().filter(|b| b.is_split()).count();
        let grouped = self
            .buckets
            .iter()
            .filter(|b| matches!(b, Bucket::Grouped { .. }))
            .count();
        format!(
            "Plan '{}': {}/{} buckets, {} work units, {} grouped, {} batch slices, \
             load {:.1}-{:.1} s, imbalance {:.2}",
            self.strategy_name,
            self.num_buckets(),
            self.limits.target_buckets,
            self.num_units(),
            grouped,
            splits,
            self.min_load_ms() as f64 / 1000.0,
            self.max_load_ms() as f64 / 1000.0,
            self.imbalance(),
        )
    }

    /// Distinct work units in first-seen order.
    fn covered_units(&self) -> Vec<&WorkUnit> {
        let mut seen = HashSet::new();
        self.buckets
            .iter()
            .flat_map(Bucket::units)
            .filter(|u| seen.insert(u.id.as_str()))
            .collect()
    }

    fn invalid(&self, detail: String) -> SplitError {
        SplitError::InvalidPartition {
            strategy: self.strategy_name.clone(),
            detail,
        }
    }
}

/// Builder helper for constructing a `PartitionPlan`.
///
/// Used internally by strategy implementations.
pub(crate) struct PlanBuilder {
    strategy_name: String,
    limits: SplitLimits,
    bounded: bool,
    input_ids: Vec<String>,
    input_cost_ms: i64,
}

impl PlanBuilder {
    /// Creates a builder for partitioning `units`.
    pub fn new(strategy_name: &str, limits: SplitLimits, bounded: bool, units: &[WorkUnit]) -> Self {
        Self {
            strategy_name: strategy_name.to_string(),
            limits,
            bounded,
            input_ids: units.iter().map(|u| u.id.clone()).collect(),
            input_cost_ms: units
                .iter()
                .fold(0i64, |acc, u| acc.saturating_add(u.cost_ms)),
        }
    }

    /// Consumes the builder and returns the finished plan.
    pub fn build(self, buckets: Vec<Bucket>) -> PartitionPlan {
        PartitionPlan {
            strategy_name: self.strategy_name,
            limits: self.limits,
            bounded: self.bounded,
            buckets,
            input_ids: self.input_ids,
            input_cost_ms: self.input_cost_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BucketFactory, DefaultBucketFactory};

    fn units() -> Vec<WorkUnit> {
        vec![
            WorkUnit::new("big", 90),
            WorkUnit::new("a", 20),
            WorkUnit::new("b", 10),
            WorkUnit::new("c", 5),
        ]
    }

    fn sample_plan() -> PartitionPlan {
        let f = DefaultBucketFactory::new();
        let units = units();
        let mut buckets = f.split(&units[0], 2);
        buckets.push(f.single(units[1].clone()));
        buckets.push(f.merge(vec![units[2].clone(), units[3].clone()]));
        PlanBuilder::new("test", SplitLimits::new(4, 2), true, &units).build(buckets)
    }

    #[test]
    fn test_validate_ok() {
        sample_plan().validate().unwrap();
    }

    #[test]
    fn test_accounting() {
        let plan = sample_plan();
        assert_eq!(plan.num_buckets(), 4);
        assert_eq!(plan.num_units(), 4);
        assert_eq!(plan.accounted_cost_ms(), 125);
        assert_eq!(plan.input_cost_ms, 125);
    }

    #[test]
    fn test_loads() {
        let plan = sample_plan();
        assert_eq!(plan.max_load_ms(), 45);
        assert_eq!(plan.min_load_ms(), 15);
        let mean = (45.0 + 45.0 + 20.0 + 15.0) / 4.0;
        assert!((plan.imbalance() - 45.0 / mean).abs() < 1e-9);
        assert_eq!(plan.cap_breaches(), 0);
    }

    #[test]
    fn test_validate_missing_unit() {
        let f = DefaultBucketFactory::new();
        let units = units();
        let buckets = vec![f.single(units[1].clone())];
        let plan = PlanBuilder::new("gap", SplitLimits::new(4, 2), true, &units).build(buckets);
        let err = plan.validate().unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_validate_duplicate_unit() {
        let f = DefaultBucketFactory::new();
        let units = vec![WorkUnit::new("a", 1), WorkUnit::new("b", 1)];
        let buckets = vec![
            f.single(units[0].clone()),
            f.merge(vec![units[0].clone(), units[1].clone()]),
        ];
        let plan = PlanBuilder::new("dup", SplitLimits::new(4, 2), true, &units).build(buckets);
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_validate_duplicate_name() {
        let f = DefaultBucketFactory::new();
        let units = vec![WorkUnit::new("a", 1)];
        let buckets = vec![f.single(units[0].clone()), f.single(units[0].clone())];
        let plan = PlanBuilder::new("dup", SplitLimits::new(4, 2), true, &units).build(buckets);
        let err = plan.validate().unwrap_err();
        assert!(err.to_string().contains("appears twice"));
    }

    #[test]
    fn test_validate_ambiguous_name() {
        let units = vec![WorkUnit::new("a", 1)];
        let buckets = vec![
            DefaultBucketFactory::new().single(units[0].clone()),
            Bucket::Grouped {
                units: units.clone(),
                parallelization: crate::Parallelization::None,
            },
        ];
        let plan = PlanBuilder::new("odd", SplitLimits::new(4, 2), true, &units).build(buckets);
        let err = plan.validate().unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn test_accounting_near_max_cost() {
        let f = DefaultBucketFactory::new();
        let half = i64::MAX / 2;
        let units = vec![
            WorkUnit::new("a", half),
            WorkUnit::new("b", half),
            WorkUnit::new("c", 1),
        ];
        let buckets = vec![
            f.merge(vec![units[0].clone(), units[2].clone()]),
            f.single(units[1].clone()),
        ];
        let plan = PlanBuilder::new("max", SplitLimits::new(2, 2), true, &units).build(buckets);
        plan.validate().unwrap();
        assert_eq!(plan.input_cost_ms, i64::MAX);
        assert_eq!(plan.accounted_cost_ms(), i64::MAX);
        assert_eq!(plan.max_load_ms(), half + 1);
        assert!((plan.imbalance() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_validate_exceeds_target() {
        let f = DefaultBucketFactory::new();
        let units = units();
        let buckets = units.iter().cloned().map(|u| f.single(u)).collect();
        let bounded = PlanBuilder::new("big", SplitLimits::new(2, 2), true, &units).build(buckets);
        assert!(bounded.validate().is_err());

        let buckets = units.iter().cloned().map(|u| f.single(u)).collect();
        let unbounded = PlanBuilder::new("big", SplitLimits::new(2, 2), false, &units).build(buckets);
        unbounded.validate().unwrap();
    }

    #[test]
    fn test_cap_breach_is_reported_not_rejected() {
        let f = DefaultBucketFactory::new();
        let units = units();
        let buckets = vec![f.merge(units.clone())];
        let plan = PlanBuilder::new("full", SplitLimits::new(1, 2), true, &units).build(buckets);
        plan.validate().unwrap();
        assert_eq!(plan.cap_breaches(), 1);
    }

    #[test]
    fn test_summary() {
        let s = sample_plan().summary();
        assert!(s.contains("test"));
        assert!(s.contains("4/4 buckets"));
        assert!(s.contains("2 batch slices"));
    }

    #[test]
    fn test_empty_plan() {
        let plan = PlanBuilder::new("empty", SplitLimits::new(3, 2), true, &[]).build(vec![]);
        plan.validate().unwrap();
        assert_eq!(plan.imbalance(), 1.0);
        assert_eq!(plan.max_load_ms(), 0);
    }
}
