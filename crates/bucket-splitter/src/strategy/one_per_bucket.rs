// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! One-per-bucket partitioning strategy.
//!
//! Every work unit gets a bucket of its own and nothing is parallelized.
//! This is the assignment used when a run has no usable timing data: with
//! all costs at zero there is nothing to balance, so the bucket count is
//! not bounded by the target.

use crate::plan::PlanBuilder;
use crate::strategy::{validate_units, PartitionStrategy};
use crate::{Bucket, BucketFactory, Parallelization, PartitionPlan, SplitError, SplitLimits};
use cost_model::WorkUnit;

/// One work unit per bucket, no parallelization, no target bound.
#[derive(Debug, Clone, Default)]
pub struct OnePerBucket;

impl OnePerBucket {
    pub fn new() -> Self {
        Self
    }
}

impl PartitionStrategy for OnePerBucket {
    fn name(&self) -> &str {
        "one-per-bucket"
    }

    /// The factory is not consulted: these buckets never carry a
    /// parallelization.
    fn partition(
        &self,
        units: &[WorkUnit],
        limits: SplitLimits,
        _factory: &dyn BucketFactory,
    ) -> Result<PartitionPlan, SplitError> {
        limits.validate()?;
        validate_units(units)?;

        let buckets = units
            .iter()
            .cloned()
            .map(|unit| Bucket::SingleItem {
                unit,
                parallelization: Parallelization::None,
            })
            .collect();

        let plan = PlanBuilder::new(self.name(), limits, false, units).build(buckets);
        plan.validate()?;
        Ok(plan)
    }
}
