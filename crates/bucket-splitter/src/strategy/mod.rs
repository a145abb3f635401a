// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`PartitionStrategy`] trait and strategy implementations.

pub mod greedy;
pub mod one_per_bucket;

use crate::{BucketFactory, PartitionPlan, SplitError, SplitLimits};
use cost_model::WorkUnit;
use std::collections::HashSet;

/// Trait for partition strategies.
///
/// Each strategy takes the weighted work units of one run and the limits
/// to respect, and produces a [`PartitionPlan`]. Strategies are pure: same
/// input, same plan.
pub trait PartitionStrategy: Send + Sync {
    /// Human-readable name of this strategy.
    fn name(&self) -> &str;

    /// Produces a partition plan for the given work units.
    fn partition(
        &self,
        units: &[WorkUnit],
        limits: SplitLimits,
        factory: &dyn BucketFactory,
    ) -> Result<PartitionPlan, SplitError>;
}

/// Rejects negative costs, repeated identities and totals that overflow.
///
/// Once this passes, any sum over a subset of `units` fits in an `i64`.
pub(crate) fn validate_units(units: &[WorkUnit]) -> Result<(), SplitError> {
    let mut seen = HashSet::with_capacity(units.len());
    let mut total: i64 = 0;
    for unit in units {
        if unit.cost_ms < 0 {
            return Err(SplitError::NegativeCost {
                id: unit.id.clone(),
                cost_ms: unit.cost_ms,
            });
        }
        total = total
            .checked_add(unit.cost_ms)
            .ok_or_else(|| SplitError::CostOverflow {
                id: unit.id.clone(),
            })?;
        if !seen.insert(unit.id.as_str()) {
            return Err(SplitError::DuplicateWorkUnit {
                id: unit.id.clone(),
            });
        }
    }
    Ok(())
}
