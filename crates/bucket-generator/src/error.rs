// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for bucket generation.

/// Errors that can occur while generating buckets.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// The historical dataset could not be loaded.
    #[error("cost model error: {0}")]
    CostModelError(#[from] cost_model::CostModelError),

    /// The splitter rejected its inputs or produced an invalid plan.
    #[error("split error: {0}")]
    SplitError(#[from] bucket_splitter::SplitError),

    /// A run id was requested that the configuration does not define.
    #[error("unknown run '{0}'")]
    UnknownRun(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The output document could not be written.
    #[error("failed to write '{path}': {detail}")]
    OutputError { path: String, detail: String },
}
