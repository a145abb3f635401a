// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for loading historical cost data.

/// Errors that can occur when loading cost data.
///
/// Missing data for a run is not an error; see [`crate::CostSource`].
#[derive(Debug, thiserror::Error)]
pub enum CostModelError {
    /// The historical dataset file could not be read.
    #[error("failed to read historical dataset: {0}")]
    DatasetReadError(#[from] std::io::Error),

    /// The dataset does not have the run → work unit → records shape.
    #[error("failed to parse historical dataset: {0}")]
    DatasetParseError(#[from] serde_json::Error),

    /// A timing record is negative, or a run's timings do not fit in an
    /// `i64` when summed.
    #[error("invalid timings for '{work_unit}' in run '{run}': {detail}")]
    InvalidRecord {
        run: String,
        work_unit: String,
        detail: String,
    },

    /// A platform dimension string was not recognised.
    #[error("unknown {dimension} '{value}'")]
    UnknownDimension {
        dimension: &'static str,
        value: String,
    },
}
