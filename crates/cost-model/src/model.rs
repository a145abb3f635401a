// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The resolved cost model of one run.

use crate::WorkUnit;
use std::fmt;

/// Where the costs of a run came from.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CostSource {
    /// The dataset has an entry for the run itself.
    Direct,
    /// Costs were borrowed from another run on the same platform.
    Borrowed { from: String },
    /// No usable data; every cost is zero.
    Unavailable,
}

impl CostSource {
    /// Returns `true` if the costs are backed by measured timings.
    pub fn has_data(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

impl fmt::Display for CostSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str("direct"),
            Self::Borrowed { from } => write!(f, "borrowed from '{from}'"),
            Self::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// A cost for every known work unit of a run.
///
/// Units are kept in the order of the known-identity set they were
/// resolved from; [`CostModel::sorted_work_units`] produces the ordering
/// the splitter expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostModel {
    pub run_id: String,
    pub source: CostSource,
    units: Vec<WorkUnit>,
}

impl CostModel {
    pub(crate) fn new(run_id: String, source: CostSource, units: Vec<WorkUnit>) -> Self {
        Self {
            run_id,
            source,
            units,
        }
    }

    /// Builds a zero-cost model for runs without usable data.
    pub fn unavailable(run_id: impl Into<String>, known: &[String]) -> Self {
        let units = known.iter().map(|id| WorkUnit::new(id.clone(), 0)).collect();
        Self::new(run_id.into(), CostSource::Unavailable, units)
    }

    /// Work units in known-identity order.
    pub fn work_units(&self) -> &[WorkUnit] {
        &self.units
    }

    /// Work units sorted by descending cost. Ties keep known-identity order.
    pub fn sorted_work_units(&self) -> Vec<WorkUnit> {
        let mut sorted = self.units.clone();
        // `sort_by` is stable, which keeps tie-breaking reproducible.
        sorted.sort_by(|a, b| b.cost_ms.cmp(&a.cost_ms));
        sorted
    }

    /// Returns the cost of `id`, or `None` if it is not a known work unit.
    pub fn cost_of(&self, id: &str) -> Option<i64> {
        self.units.iter().find(|u| u.id == id).map(|u| u.cost_ms)
    }

    pub fn num_units(&self) -> usize {
        self.units.len()
    }

    pub fn total_cost_ms(&self) -> i64 {
        self.units
            .iter()
            .fold(0i64, |acc, u| acc.saturating_add(u.cost_ms))
    }

    pub fn has_data(&self) -> bool {
        self.source.has_data()
    }

    /// Returns a summary string describing the model.
    pub fn summary(&self) -> String {
        let largest = self
            .units
            .iter()
            .max_by_key(|u| u.cost_ms)
            .map(WorkUnit::summary)
            .unwrap_or_else(|| "-".to_string());
        format!(
            "Run '{}': {} work units, {:.1} s total, largest {}, source {}",
            self.run_id,
            self.num_units(),
            self.total_cost_ms() as f64 / 1000.0,
            largest,
            self.source,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(costs: &[(&str, i64)]) -> CostModel {
        let units = costs.iter().map(|&(id, c)| WorkUnit::new(id, c)).collect();
        CostModel::new("run".into(), CostSource::Direct, units)
    }

    #[test]
    fn test_total_near_max_cost() {
        let half = i64::MAX / 2;
        let m = model(&[("a", half), ("b", half), ("c", 1)]);
        assert_eq!(m.total_cost_ms(), i64::MAX);
    }

    #[test]
    fn test_sorted_descending() {
        let m = model(&[("a", 5), ("b", 30), ("c", 10)]);
        let ids: Vec<_> = m.sorted_work_units().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sorted_ties_keep_input_order() {
        let m = model(&[("x", 7), ("y", 9), ("z", 7), ("w", 7)]);
        let ids: Vec<_> = m.sorted_work_units().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["y", "x", "z", "w"]);
    }

    #[test]
    fn test_unavailable_is_all_zero() {
        let known = vec!["a".to_string(), "b".to_string()];
        let m = CostModel::unavailable("soak", &known);
        assert!(!m.has_data());
        assert_eq!(m.total_cost_ms(), 0);
        assert_eq!(m.num_units(), 2);
    }

    #[test]
    fn test_cost_of() {
        let m = model(&[("a", 5)]);
        assert_eq!(m.cost_of("a"), Some(5));
        assert_eq!(m.cost_of("b"), None);
    }

    #[test]
    fn test_summary() {
        let m = model(&[("a", 1500), ("b", 500)]);
        let s = m.summary();
        assert!(s.contains("2 work units"));
        assert!(s.contains("2.0 s total"));
        assert!(s.contains("a (1.50 s)"));
        assert!(s.contains("direct"));
    }

    #[test]
    fn test_source_display() {
        let s = CostSource::Borrowed {
            from: "linux_java17_platform".into(),
        };
        assert_eq!(s.to_string(), "borrowed from 'linux_java17_platform'");
        assert!(s.has_data());
        assert!(!CostSource::Unavailable.has_data());
    }
}
