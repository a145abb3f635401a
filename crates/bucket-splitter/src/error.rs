// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for bucket splitting.

/// Errors that abort a split before any bucket is produced.
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    /// The requested number of buckets is zero.
    #[error("target bucket count must be at least 1, got {target}")]
    InvalidTarget { target: usize },

    /// The per-bucket item cap is zero.
    #[error("maximum items per bucket must be at least 1, got {max_items}")]
    InvalidItemCap { max_items: usize },

    /// A work unit carries a negative cost.
    #[error("work unit '{id}' has negative cost {cost_ms} ms")]
    NegativeCost { id: String, cost_ms: i64 },

    /// The summed cost of the work units does not fit in an `i64`.
    #[error("total cost overflows at work unit '{id}'")]
    CostOverflow { id: String },

    /// Two work units share an identity.
    #[error("work unit '{id}' appears more than once")]
    DuplicateWorkUnit { id: String },

    /// A strategy produced a partition that breaks an invariant.
    #[error("strategy '{strategy}' produced an invalid partition: {detail}")]
    InvalidPartition { strategy: String, detail: String },
}
