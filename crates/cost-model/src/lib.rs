// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # cost-model
//!
//! Turns historical test timings into a cost for every work unit of a run.
//!
//! - [`WorkUnit`]: a schedulable unit (e.g. a subproject) and its cost in ms.
//! - [`RunIdentity`]: a CI run and the platform it executes on.
//! - [`HistoricalDataset`]: the JSON timing document, keyed by run id.
//! - [`resolve_costs`]: maps the dataset onto the currently known work
//!   units, borrowing data from a platform-compatible run when needed.
//! - [`CostModel`]: the resolution result, sorted for the bucket splitter.
//!
//! # Dataset Format
//! ```json
//! {
//!   "linux_java17_quick": {
//!     "core": [
//!       { "testClassName": "org.example.CoreTest", "sourceSet": "integTest", "buildTimeMs": 1200 },
//!       { "sourceSet": "test", "buildTimeMs": 300 }
//!     ]
//!   }
//! }
//! ```
//!
//! # Example
//! ```no_run
//! use cost_model::{
//!     resolve_costs, Arch, HistoricalDataset, Os, Platform, ResolveOptions, RunIdentity, RunKind,
//! };
//! use std::path::Path;
//!
//! let dataset = HistoricalDataset::from_file(Path::new("test-class-data.json")).unwrap();
//! let platform = Platform::new(Os::Linux, Arch::Amd64, 17);
//! let run = RunIdentity::new("linux_java17_quick", platform, RunKind::Quick);
//! let known = vec!["core".to_string(), "launcher".to_string()];
//! let model = resolve_costs(&known, &dataset, &run, &[], &ResolveOptions::default());
//! println!("{}", model.summary());
//! ```

mod dataset;
mod error;
mod model;
mod resolve;
mod unit;

pub use dataset::{CostRecord, HistoricalDataset, RunTimings};
pub use error::CostModelError;
pub use model::{CostModel, CostSource};
pub use resolve::{resolve_costs, ResolveOptions};
pub use unit::{Arch, Os, Platform, RunIdentity, RunKind, WorkUnit};
