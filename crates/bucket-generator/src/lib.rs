// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # bucket-generator
//!
//! Produces the per-run bucket document CI uses to fan test work out over
//! parallel jobs.
//!
//! The generator takes:
//! - A [`GeneratorConfig`] listing the known work units and the runs.
//! - A `HistoricalDataset` from `cost-model`.
//!
//! For every run it resolves costs (falling back to a platform-compatible
//! run or to zero costs), hands them to `bucket-splitter`, validates the
//! resulting plan and records it in a [`BucketDocument`].
//!
//! # Type-State Pipeline
//! ```text
//! BucketGenerator<Configured> → BucketGenerator<Loaded>
//! ```
//! Planning is only available once history is loaded.

mod config;
mod document;
mod error;
mod generator;

pub use config::{GeneratorConfig, RunConfig};
pub use document::{BucketDescriptor, BucketDocument, RunBuckets};
pub use error::GeneratorError;
pub use generator::{BucketGenerator, Configured, GeneratorState, Loaded, RunPlan};
