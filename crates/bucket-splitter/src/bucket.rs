// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Buckets and the factory that builds them.
//!
//! A [`Bucket`] is one parallel execution slot. It either runs a single
//! work unit, a group of small work units, or one batch of a work unit that
//! was too large for a single slot. How a bucket executes is described by
//! its [`Parallelization`], which the [`BucketFactory`] chooses; the
//! splitter only decides which work units go together.

use cost_model::WorkUnit;
use std::borrow::Cow;
use std::collections::HashSet;

/// How the contents of a bucket are executed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Parallelization {
    /// Run everything in one job.
    None,
    /// The work unit's tests are divided into `factor` parallel batches.
    Batch { factor: usize },
    /// Hand the bucket to a named distributed-execution strategy.
    Distributed { strategy: String },
}

impl std::fmt::Display for Parallelization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Batch { factor } => write!(f, "batch x{factor}"),
            Self::Distributed { strategy } => write!(f, "distributed ({strategy})"),
        }
    }
}

/// One execution slot of a partition.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Bucket {
    /// A work unit that runs on its own.
    SingleItem {
        unit: WorkUnit,
        parallelization: Parallelization,
    },
    /// Several small work units sharing one slot.
    Grouped {
        units: Vec<WorkUnit>,
        parallelization: Parallelization,
    },
    /// Batch `batch_index` (0-based) of `batch_count` slices of one large
    /// work unit.
    SplitBatch {
        unit: WorkUnit,
        batch_index: usize,
        batch_count: usize,
        parallelization: Parallelization,
    },
}

/// Structural identity of a bucket, used for deduplication.
///
/// Two buckets share a key only if they cover the same work units in the
/// same way, whatever characters the work-unit ids contain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BucketKey {
    Single(String),
    Group(Vec<String>),
    Batch(String, usize),
}

/// Separators with a meaning inside bucket names.
const NAME_RESERVED: [char; 4] = ['_', '#', '"', '\\'];

/// Renders one work-unit id as a bucket-name component.
///
/// Ids that are empty or contain a separator are quoted, with `"` and `\`
/// escaped, so that `a_b` alone never reads like the group of `a` and `b`.
fn name_part(id: &str) -> Cow<'_, str> {
    if !id.is_empty() && !id.contains(&NAME_RESERVED[..]) {
        return Cow::Borrowed(id);
    }
    let mut quoted = String::with_capacity(id.len() + 2);
    quoted.push('"');
    for c in id.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

impl Bucket {
    /// Human-readable name, also used as the CI job suffix.
    ///
    /// Single items are named after their work unit, groups join their
    /// members with `_`, and batches append `#<index>`. Ids containing
    /// `_`, `#`, `"` or `\` appear quoted.
    pub fn name(&self) -> String {
        match self {
            Self::SingleItem { unit, .. } => name_part(&unit.id).into_owned(),
            Self::Grouped { units, .. } => units
                .iter()
                .map(|u| name_part(&u.id))
                .collect::<Vec<_>>()
                .join("_"),
            Self::SplitBatch {
                unit, batch_index, ..
            } => format!("{}#{}", name_part(&unit.id), batch_index),
        }
    }

    pub fn key(&self) -> BucketKey {
        match self {
            Self::SingleItem { unit, .. } => BucketKey::Single(unit.id.clone()),
            Self::Grouped { units, .. } => {
                BucketKey::Group(units.iter().map(|u| u.id.clone()).collect())
            }
            Self::SplitBatch {
                unit, batch_index, ..
            } => BucketKey::Batch(unit.id.clone(), *batch_index),
        }
    }

    /// Batch index for split buckets.
    pub fn batch_index(&self) -> Option<usize> {
        match self {
            Self::SplitBatch { batch_index, .. } => Some(*batch_index),
            _ => None,
        }
    }

    /// The work units this bucket covers.
    pub fn units(&self) -> &[WorkUnit] {
        match self {
            Self::SingleItem { unit, .. } | Self::SplitBatch { unit, .. } => {
                std::slice::from_ref(unit)
            }
            Self::Grouped { units, .. } => units,
        }
    }

    pub fn work_unit_ids(&self) -> Vec<&str> {
        self.units().iter().map(|u| u.id.as_str()).collect()
    }

    pub fn parallelization(&self) -> &Parallelization {
        match self {
            Self::SingleItem {
                parallelization, ..
            }
            | Self::Grouped {
                parallelization, ..
            }
            | Self::SplitBatch {
                parallelization, ..
            } => parallelization,
        }
    }

    pub fn num_units(&self) -> usize {
        self.units().len()
    }

    pub fn is_split(&self) -> bool {
        matches!(self, Self::SplitBatch { .. })
    }

    /// Expected duration of this slot in milliseconds.
    ///
    /// A batch carries an even share of its work unit, rounded up.
    pub fn load_ms(&self) -> i64 {
        match self {
            Self::SingleItem { unit, .. } => unit.cost_ms,
            Self::Grouped { units, .. } => units
                .iter()
                .fold(0i64, |acc, u| acc.saturating_add(u.cost_ms)),
            Self::SplitBatch {
                unit, batch_count, ..
            } => {
                let count = i64::try_from((*batch_count).max(1)).unwrap_or(i64::MAX);
                unit.cost_ms / count + i64::from(unit.cost_ms % count != 0)
            }
        }
    }
}

/// Builds buckets on behalf of the splitter.
///
/// The splitter decides grouping; the factory decides representation and
/// [`Parallelization`].
pub trait BucketFactory {
    /// A work unit that fills a bucket on its own.
    fn single(&self, unit: WorkUnit) -> Bucket;

    /// `factor` buckets that together run `unit`.
    fn split(&self, unit: &WorkUnit, factor: usize) -> Vec<Bucket>;

    /// One bucket running all of `units`.
    fn merge(&self, units: Vec<WorkUnit>) -> Bucket;
}

/// The standard factory.
///
/// Work units listed as distributed run under the configured distributed
/// strategy when they sit in a bucket of their own; everything else runs
/// unparallelized, and split work units become `Batch { factor }` slices.
#[derive(Debug, Clone, Default)]
pub struct DefaultBucketFactory {
    distributed: HashSet<String>,
    strategy: Option<String>,
}

impl DefaultBucketFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `work_units` to the distributed strategy named `strategy`.
    pub fn with_distribution<I, S>(strategy: impl Into<String>, work_units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            distributed: work_units.into_iter().map(Into::into).collect(),
            strategy: Some(strategy.into()),
        }
    }

    fn single_parallelization(&self, unit: &WorkUnit) -> Parallelization {
        match &self.strategy {
            Some(strategy) if self.distributed.contains(&unit.id) => Parallelization::Distributed {
                strategy: strategy.clone(),
            },
            _ => Parallelization::None,
        }
    }
}

impl BucketFactory for DefaultBucketFactory {
    fn single(&self, unit: WorkUnit) -> Bucket {
        let parallelization = self.single_parallelization(&unit);
        Bucket::SingleItem {
            unit,
            parallelization,
        }
    }

    fn split(&self, unit: &WorkUnit, factor: usize) -> Vec<Bucket> {
        (0..factor)
            .map(|batch_index| Bucket::SplitBatch {
                unit: unit.clone(),
                batch_index,
                batch_count: factor,
                parallelization: Parallelization::Batch { factor },
            })
            .collect()
    }

    fn merge(&self, units: Vec<WorkUnit>) -> Bucket {
        Bucket::Grouped {
            units,
            parallelization: Parallelization::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        let f = DefaultBucketFactory::new();
        assert_eq!(f.single(WorkUnit::new("core", 10)).name(), "core");
        let group = f.merge(vec![WorkUnit::new("a", 1), WorkUnit::new("b", 2)]);
        assert_eq!(group.name(), "a_b");
        let batches = f.split(&WorkUnit::new("big", 90), 3);
        let names: Vec<_> = batches.iter().map(Bucket::name).collect();
        assert_eq!(names, vec!["big#0", "big#1", "big#2"]);
    }

    #[test]
    fn test_names_quote_separators() {
        let f = DefaultBucketFactory::new();
        let single = f.single(WorkUnit::new("a_b", 10));
        let group = f.merge(vec![WorkUnit::new("a", 1), WorkUnit::new("b", 2)]);
        assert_eq!(single.name(), r#""a_b""#);
        assert_ne!(single.name(), group.name());

        let unit = f.single(WorkUnit::new("x#0", 1));
        let batch = &f.split(&WorkUnit::new("x", 90), 2)[0];
        assert_eq!(unit.name(), r#""x#0""#);
        assert_eq!(batch.name(), "x#0");

        let group = f.merge(vec![WorkUnit::new("x#0", 1), WorkUnit::new("y", 1)]);
        assert_eq!(group.name(), r#""x#0"_y"#);
        assert_eq!(f.single(WorkUnit::new(r#"q"\"#, 1)).name(), r#""q\"\\""#);
        assert_eq!(f.single(WorkUnit::new("", 1)).name(), r#""""#);
    }

    #[test]
    fn test_keys_are_structural() {
        let f = DefaultBucketFactory::new();
        let single = f.single(WorkUnit::new("a_b", 10));
        let group = f.merge(vec![WorkUnit::new("a", 1), WorkUnit::new("b", 2)]);
        assert_eq!(single.key(), BucketKey::Single("a_b".into()));
        assert_eq!(group.key(), BucketKey::Group(vec!["a".into(), "b".into()]));
        let batch = &f.split(&WorkUnit::new("x", 90), 2)[1];
        assert_eq!(batch.key(), BucketKey::Batch("x".into(), 1));
        assert_eq!(batch.batch_index(), Some(1));
        assert_eq!(single.batch_index(), None);
    }

    #[test]
    fn test_split_descriptors() {
        let f = DefaultBucketFactory::new();
        let batches = f.split(&WorkUnit::new("big", 90), 3);
        assert_eq!(batches.len(), 3);
        for (i, b) in batches.iter().enumerate() {
            assert!(b.is_split());
            assert_eq!(b.parallelization(), &Parallelization::Batch { factor: 3 });
            match b {
                Bucket::SplitBatch { batch_index, .. } => assert_eq!(*batch_index, i),
                other => panic!("expected a batch, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_load() {
        let f = DefaultBucketFactory::new();
        assert_eq!(f.single(WorkUnit::new("a", 7)).load_ms(), 7);
        assert_eq!(
            f.merge(vec![WorkUnit::new("a", 1), WorkUnit::new("b", 2)]).load_ms(),
            3
        );
        // 100 / 3 rounds up.
        assert_eq!(f.split(&WorkUnit::new("big", 100), 3)[0].load_ms(), 34);
        assert_eq!(f.split(&WorkUnit::new("big", 99), 3)[0].load_ms(), 33);
    }

    #[test]
    fn test_load_near_max_cost() {
        let f = DefaultBucketFactory::new();
        assert_eq!(
            f.split(&WorkUnit::new("big", i64::MAX), 2)[0].load_ms(),
            i64::MAX / 2 + 1
        );
        let group = f.merge(vec![WorkUnit::new("a", i64::MAX), WorkUnit::new("b", 1)]);
        assert_eq!(group.load_ms(), i64::MAX);
    }

    #[test]
    fn test_distributed_single() {
        let f = DefaultBucketFactory::with_distribution("test-distribution", ["core"]);
        assert_eq!(
            f.single(WorkUnit::new("core", 5)).parallelization(),
            &Parallelization::Distributed {
                strategy: "test-distribution".into()
            }
        );
        assert_eq!(
            f.single(WorkUnit::new("launcher", 5)).parallelization(),
            &Parallelization::None
        );
        // Grouped buckets never go to the distributed strategy.
        let group = f.merge(vec![WorkUnit::new("core", 1), WorkUnit::new("b", 1)]);
        assert_eq!(group.parallelization(), &Parallelization::None);
    }

    #[test]
    fn test_units_and_ids() {
        let f = DefaultBucketFactory::new();
        let group = f.merge(vec![WorkUnit::new("a", 1), WorkUnit::new("b", 2)]);
        assert_eq!(group.num_units(), 2);
        assert_eq!(group.work_unit_ids(), vec!["a", "b"]);
        let batch = &f.split(&WorkUnit::new("big", 4), 2)[1];
        assert_eq!(batch.work_unit_ids(), vec!["big"]);
    }

    #[test]
    fn test_serialize_tagged() {
        let f = DefaultBucketFactory::new();
        let json = serde_json::to_value(&f.split(&WorkUnit::new("big", 4), 2)[0]).unwrap();
        assert_eq!(json["type"], "split_batch");
        assert_eq!(json["parallelization"]["kind"], "batch");
        assert_eq!(json["parallelization"]["factor"], 2);
    }

    #[test]
    fn test_parallelization_display() {
        assert_eq!(Parallelization::None.to_string(), "none");
        assert_eq!(Parallelization::Batch { factor: 4 }.to_string(), "batch x4");
    }
}
