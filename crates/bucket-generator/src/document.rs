// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The generated bucket document.
//!
//! [`BucketDocument`] is what CI consumes: for every run, the ordered list
//! of buckets with the work units each one covers and how it executes.
//!
//! ```json
//! {
//!   "runs": [
//!     {
//!       "runId": "linux_amd64_17_quick",
//!       "source": { "kind": "direct" },
//!       "buckets": [
//!         { "name": "core#0", "workUnits": ["core"], "batchIndex": 0,
//!           "parallelization": { "kind": "batch", "factor": 2 } }
//!       ]
//!     }
//!   ]
//! }
//! ```

use crate::GeneratorError;
use bucket_splitter::{Bucket, Parallelization, PartitionPlan};
use cost_model::CostSource;
use std::path::Path;

/// One bucket as seen by CI.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketDescriptor {
    pub name: String,
    pub work_units: Vec<String>,
    /// Position of this slice when the work unit is split into batches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_index: Option<usize>,
    pub parallelization: Parallelization,
}

impl From<&Bucket> for BucketDescriptor {
    fn from(bucket: &Bucket) -> Self {
        Self {
            name: bucket.name(),
            work_units: bucket.work_unit_ids().into_iter().map(str::to_string).collect(),
            batch_index: bucket.batch_index(),
            parallelization: bucket.parallelization().clone(),
        }
    }
}

/// The buckets of a single run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunBuckets {
    pub run_id: String,
    /// Where the costs behind this partition came from.
    pub source: CostSource,
    pub buckets: Vec<BucketDescriptor>,
}

impl RunBuckets {
    pub fn from_plan(run_id: impl Into<String>, source: CostSource, plan: &PartitionPlan) -> Self {
        Self {
            run_id: run_id.into(),
            source,
            buckets: plan.buckets.iter().map(BucketDescriptor::from).collect(),
        }
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }
}

/// Bucket assignments for every configured run.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BucketDocument {
    pub runs: Vec<RunBuckets>,
}

impl BucketDocument {
    pub fn run(&self, run_id: &str) -> Option<&RunBuckets> {
        self.runs.iter().find(|r| r.run_id == run_id)
    }

    pub fn num_buckets(&self) -> usize {
        self.runs.iter().map(RunBuckets::num_buckets).sum()
    }

    pub fn to_json_pretty(&self) -> Result<String, GeneratorError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GeneratorError::ConfigError(format!("JSON serialise error: {e}")))
    }

    /// Writes the document to `path`, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> Result<(), GeneratorError> {
        let json = self.to_json_pretty()?;
        std::fs::write(path, json + "\n").map_err(|e| GeneratorError::OutputError {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        tracing::info!(
            "wrote {} buckets for {} runs to '{}'",
            self.num_buckets(),
            self.runs.len(),
            path.display()
        );
        Ok(())
    }

    /// Reads a previously written document.
    pub fn from_file(path: &Path) -> Result<Self, GeneratorError> {
        let content = std::fs::read_to_string(path).map_err(|e| GeneratorError::OutputError {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        serde_json::from_str(&content)
            .map_err(|e| GeneratorError::ConfigError(format!("invalid bucket document: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bucket_splitter::{split, DefaultBucketFactory, SplitLimits};
    use cost_model::WorkUnit;

    fn sample() -> BucketDocument {
        let units = vec![
            WorkUnit::new("A", 100),
            WorkUnit::new("B", 1),
            WorkUnit::new("C", 1),
            WorkUnit::new("D", 1),
        ];
        let buckets = split(&units, SplitLimits::new(4, 10), &DefaultBucketFactory::new()).unwrap();
        BucketDocument {
            runs: vec![RunBuckets {
                run_id: "r1".into(),
                source: CostSource::Direct,
                buckets: buckets.iter().map(BucketDescriptor::from).collect(),
            }],
        }
    }

    #[test]
    fn test_descriptor_from_split_batch() {
        let doc = sample();
        let first = &doc.runs[0].buckets[0];
        assert_eq!(first.name, "A#0");
        assert_eq!(first.work_units, vec!["A".to_string()]);
        assert_eq!(first.batch_index, Some(0));
        assert_eq!(first.parallelization, Parallelization::Batch { factor: 3 });

        let indices: Vec<_> = doc.runs[0].buckets.iter().map(|b| b.batch_index).collect();
        assert_eq!(indices, vec![Some(0), Some(1), Some(2), None]);
    }

    #[test]
    fn test_json_shape() {
        let json = sample().to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let run = &value["runs"][0];
        assert_eq!(run["runId"], "r1");
        assert_eq!(run["source"]["kind"], "direct");
        assert_eq!(run["buckets"][3]["workUnits"], serde_json::json!(["B", "C", "D"]));
        assert_eq!(run["buckets"][3]["parallelization"]["kind"], "none");
        assert_eq!(run["buckets"][2]["batchIndex"], 2);
        assert!(run["buckets"][3].get("batchIndex").is_none());
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buckets.json");
        let doc = sample();
        doc.write_to(&path).unwrap();
        let back = BucketDocument::from_file(&path).unwrap();
        assert_eq!(back, doc);
        assert_eq!(back.num_buckets(), 4);
        assert!(back.run("r1").is_some());
        assert!(back.run("r2").is_none());
    }
}
