// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Partition limits: how many buckets, and how full each may get.

use crate::SplitError;
use std::fmt;

/// Default cap on the number of work units grouped into one bucket.
pub const DEFAULT_MAX_ITEMS_PER_BUCKET: usize = 10;

/// The shape a partition has to fit into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SplitLimits {
    /// Number of parallel buckets requested.
    pub target_buckets: usize,
    /// Maximum number of work units grouped into one bucket.
    pub max_items_per_bucket: usize,
}

impl SplitLimits {
    pub fn new(target_buckets: usize, max_items_per_bucket: usize) -> Self {
        Self {
            target_buckets,
            max_items_per_bucket,
        }
    }

    /// Limits with the default item cap.
    pub fn with_target(target_buckets: usize) -> Self {
        Self::new(target_buckets, DEFAULT_MAX_ITEMS_PER_BUCKET)
    }

    /// Rejects limits no partition can satisfy.
    pub fn validate(&self) -> Result<(), SplitError> {
        if self.target_buckets == 0 {
            return Err(SplitError::InvalidTarget {
                target: self.target_buckets,
            });
        }
        if self.max_items_per_bucket == 0 {
            return Err(SplitError::InvalidItemCap {
                max_items: self.max_items_per_bucket,
            });
        }
        Ok(())
    }
}

impl fmt::Display for SplitLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} buckets, <= {} units each",
            self.target_buckets, self.max_items_per_bucket
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        SplitLimits::new(4, 10).validate().unwrap();
        assert!(matches!(
            SplitLimits::new(0, 10).validate(),
            Err(SplitError::InvalidTarget { target: 0 })
        ));
        assert!(matches!(
            SplitLimits::new(4, 0).validate(),
            Err(SplitError::InvalidItemCap { .. })
        ));
    }

    #[test]
    fn test_with_target_uses_default_cap() {
        let l = SplitLimits::with_target(8);
        assert_eq!(l.max_items_per_bucket, DEFAULT_MAX_ITEMS_PER_BUCKET);
        assert_eq!(l.to_string(), "8 buckets, <= 10 units each");
    }
}
