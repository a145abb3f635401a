// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The bucket generator with a type-state pipeline.
//!
//! ```text
//! BucketGenerator<Configured>
//!     │  .load_history() / .with_history()
//!     ▼
//! BucketGenerator<Loaded>
//!     │  .plan_run() / .generate()
//!     ▼
//!   BucketDocument
//! ```
//!
//! Loading consumes the configured generator, so a document can only be
//! produced once a validated configuration and a dataset are in place.

use crate::{BucketDocument, GeneratorConfig, GeneratorError, RunBuckets};
use bucket_splitter::{auto_partition, PartitionPlan};
use cost_model::{resolve_costs, CostModel, HistoricalDataset, RunIdentity};
use std::path::Path;

// ── Type-state markers ─────────────────────────────────────────

/// Configuration is known but no historical data is loaded.
#[derive(Debug)]
pub struct Configured;

/// Historical data is loaded; runs can be planned.
#[derive(Debug)]
pub struct Loaded {
    dataset: HistoricalDataset,
}

/// Sealed trait for generator states.
pub trait GeneratorState: std::fmt::Debug {}
impl GeneratorState for Configured {}
impl GeneratorState for Loaded {}

// ── Run plan ───────────────────────────────────────────────────

/// Resolved costs and the partition built from them for one run.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub run: RunIdentity,
    pub costs: CostModel,
    pub plan: PartitionPlan,
}

impl RunPlan {
    pub fn to_run_buckets(&self) -> RunBuckets {
        RunBuckets::from_plan(self.run.id.clone(), self.costs.source.clone(), &self.plan)
    }
}

// ── Generator ──────────────────────────────────────────────────

/// Turns a configuration and a historical dataset into bucket assignments.
///
/// # Example
/// ```no_run
/// use bucket_generator::{BucketGenerator, GeneratorConfig};
/// use std::path::Path;
///
/// # fn example() -> Result<(), bucket_generator::GeneratorError> {
/// let config = GeneratorConfig::from_file(Path::new("buckets.toml"))?;
/// let output = config.output_file.clone();
/// let document = BucketGenerator::new(config)
///     .load_history(Path::new("test-class-data.json"))?
///     .generate()?;
/// document.write_to(&output)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BucketGenerator<S: GeneratorState = Configured> {
    config: GeneratorConfig,
    state: S,
}

impl<S: GeneratorState> BucketGenerator<S> {
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

// ── Configured → Loaded ────────────────────────────────────────

impl BucketGenerator<Configured> {
    pub fn new(config: GeneratorConfig) -> Self {
        tracing::info!(
            "generator created for {} runs, {} work units",
            config.runs.len(),
            config.work_units.len()
        );
        Self {
            config,
            state: Configured,
        }
    }

    /// Reads the historical dataset from `path`.
    /// Transitions to the `Loaded` state.
    pub fn load_history(self, path: &Path) -> Result<BucketGenerator<Loaded>, GeneratorError> {
        let dataset = HistoricalDataset::from_file(path)?;
        tracing::info!(
            "loaded timings for {} runs from '{}'",
            dataset.num_runs(),
            path.display()
        );
        self.with_history(dataset)
    }

    /// Reads the dataset named by `history_file` in the configuration.
    pub fn load_configured_history(self) -> Result<BucketGenerator<Loaded>, GeneratorError> {
        let path = self.config.history_file.clone().ok_or_else(|| {
            GeneratorError::ConfigError("no history file given and none configured".into())
        })?;
        self.load_history(&path)
    }

    /// Uses an already loaded dataset.
    /// Transitions to the `Loaded` state.
    pub fn with_history(
        self,
        dataset: HistoricalDataset,
    ) -> Result<BucketGenerator<Loaded>, GeneratorError> {
        self.config.validate()?;
        Ok(BucketGenerator {
            config: self.config,
            state: Loaded { dataset },
        })
    }
}

// ── Loaded ─────────────────────────────────────────────────────

impl BucketGenerator<Loaded> {
    pub fn dataset(&self) -> &HistoricalDataset {
        &self.state.dataset
    }

    /// Resolves the costs of every work unit of `run_id`.
    pub fn resolve(&self, run_id: &str) -> Result<CostModel, GeneratorError> {
        let run = self.config.run(run_id)?;
        Ok(resolve_costs(
            self.config.work_units_for(run),
            &self.state.dataset,
            &run.identity(),
            &self.config.known_runs(),
            &self.config.resolve_options(),
        ))
    }

    /// Plans `run_id` with the bucket count from its configuration.
    pub fn plan_run(&self, run_id: &str) -> Result<RunPlan, GeneratorError> {
        let buckets = self.config.run(run_id)?.buckets;
        self.plan_run_with_target(run_id, buckets)
    }

    /// Plans `run_id` as if it were allowed `target_buckets` buckets.
    pub fn plan_run_with_target(
        &self,
        run_id: &str,
        target_buckets: usize,
    ) -> Result<RunPlan, GeneratorError> {
        let run = self.config.run(run_id)?;
        let costs = self.resolve(run_id)?;
        tracing::info!("{}", costs.summary());

        let mut limits = self.config.limits_for(run);
        limits.target_buckets = target_buckets;

        let plan = auto_partition(
            &costs.sorted_work_units(),
            limits,
            &self.config.factory(),
            costs.has_data(),
        )?;
        tracing::info!("run '{}': {}", run.id, plan.summary());

        Ok(RunPlan {
            run: run.identity(),
            costs,
            plan,
        })
    }

    /// Plans every configured run in declaration order.
    pub fn generate(&self) -> Result<BucketDocument, GeneratorError> {
        let runs = self
            .config
            .runs
            .iter()
            .map(|run| self.plan_run(&run.id).map(|p| p.to_run_buckets()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(BucketDocument { runs })
    }
}
