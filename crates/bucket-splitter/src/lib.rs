// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # bucket-splitter
//!
//! Partitions the weighted work units of a run into parallel test buckets
//! of roughly equal duration.
//!
//! # Strategies
//!
//! | Strategy | Buckets | Balancing | Used when |
//! |---|---|---|---|
//! | [`GreedyBalancing`] | <= target | largest-first, large units split into batches | timing data exists |
//! | [`OnePerBucket`] | one per work unit | none | no timing data |
//!
//! # Trait-Based Extensibility
//!
//! Strategies implement [`PartitionStrategy`]; how buckets are represented
//! and executed is decided by a [`BucketFactory`]:
//!
//! ```ignore
//! struct Sharded;
//! impl BucketFactory for Sharded {
//!     fn single(&self, unit: WorkUnit) -> Bucket { /* ... */ }
//!     fn split(&self, unit: &WorkUnit, factor: usize) -> Vec<Bucket> { /* ... */ }
//!     fn merge(&self, units: Vec<WorkUnit>) -> Bucket { /* ... */ }
//! }
//! ```
//!
//! # Example
//! ```
//! use bucket_splitter::{split, DefaultBucketFactory, SplitLimits};
//! use cost_model::WorkUnit;
//!
//! let units = vec![
//!     WorkUnit::new("A", 100),
//!     WorkUnit::new("B", 1),
//!     WorkUnit::new("C", 1),
//!     WorkUnit::new("D", 1),
//! ];
//! let buckets = split(&units, SplitLimits::new(4, 10), &DefaultBucketFactory::new()).unwrap();
//! let names: Vec<_> = buckets.iter().map(|b| b.name()).collect();
//! assert_eq!(names, ["A#0", "A#1", "A#2", "B_C_D"]);
//! ```

mod bucket;
mod error;
mod limits;
pub(crate) mod plan;
pub mod strategy;

pub use bucket::{Bucket, BucketFactory, BucketKey, DefaultBucketFactory, Parallelization};
pub use error::SplitError;
pub use limits::{SplitLimits, DEFAULT_MAX_ITEMS_PER_BUCKET};
pub use plan::PartitionPlan;
pub use strategy::greedy::{split, GreedyBalancing};
pub use strategy::one_per_bucket::OnePerBucket;
pub use strategy::PartitionStrategy;

use cost_model::WorkUnit;

/// Selects and runs the strategy that fits the available data.
///
/// - Without timing data every cost is zero, so each work unit gets its own
///   unparallelized bucket ([`OnePerBucket`]).
/// - Otherwise the units are balanced with [`GreedyBalancing`].
pub fn auto_partition(
    units: &[WorkUnit],
    limits: SplitLimits,
    factory: &dyn BucketFactory,
    has_data: bool,
) -> Result<PartitionPlan, SplitError> {
    if !has_data {
        tracing::info!("no timing data → using one-per-bucket strategy");
        return OnePerBucket::new().partition(units, limits, factory);
    }

    tracing::info!(
        "{} work units over {} → using greedy-balancing strategy",
        units.len(),
        limits,
    );
    GreedyBalancing::new().partition(units, limits, factory)
}
