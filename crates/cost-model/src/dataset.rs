// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Historical timing dataset parsing.
//!
//! The dataset maps a run id to the work units measured in that run, and
//! each work unit to the per-test-class timings recorded for it.
//!
//! # Format
//! ```json
//! {
//!   "linux_java17_quick": {
//!     "core": [
//!       { "testClassName": "org.example.CoreTest", "sourceSet": "integTest", "buildTimeMs": 1200 }
//!     ],
//!     "launcher": []
//!   }
//! }
//! ```
//!
//! Unknown keys at any level are ignored.

use crate::CostModelError;
use std::collections::BTreeMap;
use std::path::Path;

/// One timing sample for a test class within a work unit.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostRecord {
    /// Test class the sample belongs to, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_class_name: Option<String>,
    /// Source set the test class lives in (e.g., `"integTest"`).
    pub source_set: String,
    /// Measured duration in milliseconds.
    pub build_time_ms: i64,
}

impl CostRecord {
    pub fn new(source_set: impl Into<String>, build_time_ms: i64) -> Self {
        Self {
            test_class_name: None,
            source_set: source_set.into(),
            build_time_ms,
        }
    }
}

/// Timings per work unit within one run.
pub type RunTimings = BTreeMap<String, Vec<CostRecord>>;

/// The full historical dataset: run id → work unit id → timing records.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct HistoricalDataset {
    runs: BTreeMap<String, RunTimings>,
}

impl HistoricalDataset {
    /// Loads a dataset from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, CostModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses a dataset from a JSON string.
    ///
    /// Negative durations and runs whose total overflows are rejected.
    pub fn from_json(json: &str) -> Result<Self, CostModelError> {
        let dataset: Self = serde_json::from_str(json)?;
        for (run_id, timings) in &dataset.runs {
            check_timings(run_id, timings)?;
        }
        tracing::debug!("parsed historical dataset with {} runs", dataset.runs.len());
        Ok(dataset)
    }

    /// Returns the timings recorded for `run_id`, if any.
    pub fn get(&self, run_id: &str) -> Option<&RunTimings> {
        self.runs.get(run_id)
    }

    /// Returns `true` if the dataset has an entry for `run_id`.
    pub fn contains_run(&self, run_id: &str) -> bool {
        self.runs.contains_key(run_id)
    }

    /// Iterates over the run ids present in the dataset, in sorted order.
    pub fn run_ids(&self) -> impl Iterator<Item = &str> {
        self.runs.keys().map(String::as_str)
    }

    pub fn num_runs(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Adds or replaces the timings of one run.
    pub fn insert_run(
        &mut self,
        run_id: impl Into<String>,
        timings: RunTimings,
    ) -> Result<(), CostModelError> {
        let run_id = run_id.into();
        check_timings(&run_id, &timings)?;
        self.runs.insert(run_id, timings);
        Ok(())
    }
}

/// Every duration is non-negative and the run total fits in an `i64`, so
/// any sum over a subset of the records does too.
fn check_timings(run_id: &str, timings: &RunTimings) -> Result<(), CostModelError> {
    let invalid = |work_unit: &str, detail: String| CostModelError::InvalidRecord {
        run: run_id.to_string(),
        work_unit: work_unit.to_string(),
        detail,
    };

    let mut total: i64 = 0;
    for (work_unit, records) in timings {
        for record in records {
            if record.build_time_ms < 0 {
                return Err(invalid(
                    work_unit,
                    format!("negative duration {} ms", record.build_time_ms),
                ));
            }
            total = total
                .checked_add(record.build_time_ms)
                .ok_or_else(|| invalid(work_unit, "total duration overflows".into()))?;
        }
    }
    Ok(())
}
