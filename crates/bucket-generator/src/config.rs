// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Generator configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! history_file = "./test-class-data.json"
//! output_file = "test-buckets.json"
//! max_items_per_bucket = 10
//! excluded_source_sets = ["test"]
//! unknown_identity = "UNKNOWN"
//! work_units = ["core", "launcher", "plugins", "tooling-api"]
//! distributed_work_units = ["core"]
//! distribution_strategy = "test-distribution"
//!
//! [[runs]]
//! id = "linux_amd64_17_quick"
//! os = "linux"
//! arch = "amd64"
//! runtime_version = 17
//! kind = "quick"
//! buckets = 8
//! ```

use crate::GeneratorError;
use bucket_splitter::{DefaultBucketFactory, SplitLimits, DEFAULT_MAX_ITEMS_PER_BUCKET};
use cost_model::{Arch, Os, Platform, ResolveOptions, RunIdentity, RunKind};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One CI run to generate buckets for.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RunConfig {
    /// Key of the run in the historical dataset.
    pub id: String,
    pub os: Os,
    pub arch: Arch,
    pub runtime_version: u32,
    pub kind: RunKind,
    /// Number of parallel buckets the run is allowed.
    pub buckets: usize,
    /// Work units covered by this run, if different from the global list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_units: Option<Vec<String>>,
}

impl RunConfig {
    pub fn identity(&self) -> RunIdentity {
        RunIdentity::new(
            self.id.clone(),
            Platform::new(self.os, self.arch, self.runtime_version),
            self.kind,
        )
    }
}

/// Configuration for the bucket generator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GeneratorConfig {
    /// Historical dataset used when no path is given explicitly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,
    /// Where the generated document is written.
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
    /// Soft cap on the number of work units per bucket.
    #[serde(default = "default_max_items")]
    pub max_items_per_bucket: usize,
    /// Source sets whose timings are not counted.
    #[serde(default = "default_excluded_source_sets")]
    pub excluded_source_sets: Vec<String>,
    /// Sentinel id used by the dataset for unattributed timings.
    #[serde(default = "default_unknown_identity")]
    pub unknown_identity: String,
    /// Known work-unit identities, in declaration order.
    #[serde(default)]
    pub work_units: Vec<String>,
    /// Work units that run through a distributed-execution strategy.
    #[serde(default)]
    pub distributed_work_units: Vec<String>,
    /// Name of that strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution_strategy: Option<String>,
    #[serde(default)]
    pub runs: Vec<RunConfig>,
}

fn default_output_file() -> PathBuf {
    PathBuf::from("test-buckets.json")
}

fn default_max_items() -> usize {
    DEFAULT_MAX_ITEMS_PER_BUCKET
}

fn default_excluded_source_sets() -> Vec<String> {
    ResolveOptions::default().excluded_source_sets
}

fn default_unknown_identity() -> String {
    ResolveOptions::default().unknown_identity
}

impl GeneratorConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, GeneratorError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GeneratorError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, GeneratorError> {
        toml::from_str(toml_str)
            .map_err(|e| GeneratorError::ConfigError(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, GeneratorError> {
        toml::to_string_pretty(self)
            .map_err(|e| GeneratorError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Checks the partition parameters before anything is generated.
    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.max_items_per_bucket == 0 {
            return Err(GeneratorError::ConfigError(
                "max_items_per_bucket must be at least 1".into(),
            ));
        }

        let mut seen = HashSet::new();
        for run in &self.runs {
            if !seen.insert(run.id.as_str()) {
                return Err(GeneratorError::ConfigError(format!(
                    "run '{}' is defined more than once",
                    run.id
                )));
            }
            if run.buckets == 0 {
                return Err(GeneratorError::ConfigError(format!(
                    "run '{}' needs at least one bucket",
                    run.id
                )));
            }
        }

        if !self.distributed_work_units.is_empty() && self.distribution_strategy.is_none() {
            return Err(GeneratorError::ConfigError(
                "distributed_work_units is set but distribution_strategy is missing".into(),
            ));
        }

        Ok(())
    }

    /// Looks up a run by id.
    pub fn run(&self, id: &str) -> Result<&RunConfig, GeneratorError> {
        self.runs
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| GeneratorError::UnknownRun(id.to_string()))
    }

    /// Identities of all configured runs, in declaration order.
    pub fn known_runs(&self) -> Vec<RunIdentity> {
        self.runs.iter().map(RunConfig::identity).collect()
    }

    /// Work units covered by `run`.
    pub fn work_units_for<'a>(&'a self, run: &'a RunConfig) -> &'a [String] {
        run.work_units.as_deref().unwrap_or(&self.work_units)
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            excluded_source_sets: self.excluded_source_sets.clone(),
            unknown_identity: self.unknown_identity.clone(),
        }
    }

    pub fn limits_for(&self, run: &RunConfig) -> SplitLimits {
        SplitLimits::new(run.buckets, self.max_items_per_bucket)
    }

    /// Creates the bucket factory described by the distribution settings.
    pub fn factory(&self) -> DefaultBucketFactory {
        match &self.distribution_strategy {
            Some(strategy) => DefaultBucketFactory::with_distribution(
                strategy.clone(),
                self.distributed_work_units.iter().cloned(),
            ),
            None => DefaultBucketFactory::new(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            history_file: None,
            output_file: default_output_file(),
            max_items_per_bucket: default_max_items(),
            excluded_source_sets: default_excluded_source_sets(),
            unknown_identity: default_unknown_identity(),
            work_units: Vec::new(),
            distributed_work_units: Vec::new(),
            distribution_strategy: None,
            runs: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bucket_splitter::{BucketFactory, Parallelization};
    use cost_model::WorkUnit;

    fn run(id: &str, buckets: usize) -> RunConfig {
        RunConfig {
            id: id.into(),
            os: Os::Linux,
            arch: Arch::Amd64,
            runtime_version: 17,
            kind: RunKind::Quick,
            buckets,
            work_units: None,
        }
    }

    #[test]
    fn test_default() {
        let c = GeneratorConfig::default();
        assert_eq!(c.max_items_per_bucket, 10);
        assert_eq!(c.output_file, PathBuf::from("test-buckets.json"));
        assert_eq!(c.excluded_source_sets, vec!["test".to_string()]);
        assert_eq!(c.unknown_identity, "UNKNOWN");
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
max_items_per_bucket = 4
work_units = ["core", "launcher"]
distributed_work_units = ["core"]
distribution_strategy = "remote"

[[runs]]
id = "linux_quick"
os = "linux"
arch = "x86_64"
runtime_version = 11
kind = "quick"
buckets = 8

[[runs]]
id = "mac_soak"
os = "darwin"
arch = "arm64"
runtime_version = 17
kind = "soak"
buckets = 2
work_units = ["core"]
"#;
        let c = GeneratorConfig::from_toml(toml).unwrap();
        assert_eq!(c.max_items_per_bucket, 4);
        assert_eq!(c.output_file, PathBuf::from("test-buckets.json"));
        assert_eq!(c.runs.len(), 2);
        assert_eq!(c.runs[0].arch, Arch::Amd64);
        assert_eq!(c.runs[1].os, Os::MacOs);
        assert_eq!(c.runs[1].kind, RunKind::Soak);
        assert_eq!(c.work_units_for(&c.runs[0]).len(), 2);
        assert_eq!(c.work_units_for(&c.runs[1]), ["core".to_string()]);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = GeneratorConfig {
            work_units: vec!["core".into()],
            runs: vec![run("r1", 3)],
            ..Default::default()
        };
        let toml = c.to_toml().unwrap();
        let back = GeneratorConfig::from_toml(&toml).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            GeneratorConfig::from_toml("runs = 3"),
            Err(GeneratorError::ConfigError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_buckets() {
        let c = GeneratorConfig {
            runs: vec![run("r1", 0)],
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_cap() {
        let c = GeneratorConfig {
            max_items_per_bucket: 0,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_runs() {
        let c = GeneratorConfig {
            runs: vec![run("r1", 2), run("r1", 4)],
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_requires_strategy_name() {
        let c = GeneratorConfig {
            distributed_work_units: vec!["core".into()],
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_unknown_run() {
        let c = GeneratorConfig {
            runs: vec![run("r1", 2)],
            ..Default::default()
        };
        assert!(c.run("r1").is_ok());
        assert!(matches!(c.run("nope"), Err(GeneratorError::UnknownRun(_))));
    }

    #[test]
    fn test_factory_uses_distribution() {
        let c = GeneratorConfig {
            distributed_work_units: vec!["core".into()],
            distribution_strategy: Some("remote".into()),
            ..Default::default()
        };
        let factory = c.factory();
        let core = factory.single(WorkUnit::new("core", 10));
        let other = factory.single(WorkUnit::new("launcher", 10));
        assert_eq!(
            core.parallelization(),
            &Parallelization::Distributed {
                strategy: "remote".into()
            }
        );
        assert_eq!(other.parallelization(), &Parallelization::None);
    }
}
