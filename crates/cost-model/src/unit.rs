// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Work units, platforms and run identities.
//!
//! A [`WorkUnit`] is the smallest thing the splitter schedules. Its cost is
//! the aggregated historical duration of everything it runs, in milliseconds.
//! A [`RunIdentity`] names one CI run (a test coverage on a platform) and is
//! the key into the historical dataset.

use crate::CostModelError;
use std::fmt;
use std::str::FromStr;

/// A schedulable piece of work and its historical cost.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct WorkUnit {
    /// Unique identifier within a run (e.g., `"dependency-management"`).
    pub id: String,
    /// Aggregated historical duration in milliseconds.
    ///
    /// Signed so that corrupt timings survive loading and are rejected by
    /// the splitter instead of silently wrapping.
    pub cost_ms: i64,
}

impl WorkUnit {
    pub fn new(id: impl Into<String>, cost_ms: i64) -> Self {
        Self {
            id: id.into(),
            cost_ms,
        }
    }

    /// Returns a one-line description, e.g. `core (1.20 s)`.
    pub fn summary(&self) -> String {
        format!("{} ({:.2} s)", self.id, self.cost_ms as f64 / 1000.0)
    }
}

/// Operating system a run executes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Windows,
    #[serde(alias = "darwin")]
    MacOs,
}

/// CPU architecture a run executes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    #[serde(alias = "x86_64", alias = "x64")]
    Amd64,
    #[serde(alias = "arm64")]
    Aarch64,
}

impl Os {
    /// Parses an OS name, accepting common aliases.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linux" => Some(Self::Linux),
            "windows" | "win" => Some(Self::Windows),
            "macos" | "mac" | "darwin" | "osx" => Some(Self::MacOs),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Windows => "windows",
            Self::MacOs => "macos",
        }
    }
}

impl Arch {
    /// Parses an architecture name, accepting common aliases.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "amd64" | "x86_64" | "x64" => Some(Self::Amd64),
            "aarch64" | "arm64" => Some(Self::Aarch64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Aarch64 => "aarch64",
        }
    }
}

impl FromStr for Os {
    type Err = CostModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_loose(s).ok_or_else(|| CostModelError::UnknownDimension {
            dimension: "operating system",
            value: s.to_string(),
        })
    }
}

impl FromStr for Arch {
    type Err = CostModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_loose(s).ok_or_else(|| CostModelError::UnknownDimension {
            dimension: "architecture",
            value: s.to_string(),
        })
    }
}

/// The dimensions that decide whether timings of two runs are comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
    /// Language runtime major version the tests execute on (e.g., `17`).
    pub runtime_version: u32,
}

impl Platform {
    pub fn new(os: Os, arch: Arch, runtime_version: u32) -> Self {
        Self {
            os,
            arch,
            runtime_version,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/v{}",
            self.os.as_str(),
            self.arch.as_str(),
            self.runtime_version
        )
    }
}

/// The kind of test coverage a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    Quick,
    Platform,
    CrossVersion,
    /// Long-running stability tests; their timings depend on the run itself.
    Soak,
}

impl RunKind {
    /// Whether timings from another run may stand in for this kind of run.
    pub fn is_substitutable(&self) -> bool {
        !matches!(self, Self::Soak)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Platform => "platform",
            Self::CrossVersion => "cross_version",
            Self::Soak => "soak",
        }
    }
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One CI run: the key into the historical dataset plus its platform.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RunIdentity {
    pub id: String,
    pub platform: Platform,
    pub kind: RunKind,
}

impl RunIdentity {
    pub fn new(id: impl Into<String>, platform: Platform, kind: RunKind) -> Self {
        Self {
            id: id.into(),
            platform,
            kind,
        }
    }

    /// Returns `true` if `other` runs on the same OS, architecture and
    /// runtime version.
    pub fn shares_platform(&self, other: &RunIdentity) -> bool {
        self.platform == other.platform
    }
}

impl fmt::Display for RunIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{} on {}]", self.id, self.kind, self.platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_aliases() {
        assert_eq!(Os::from_str_loose("Linux"), Some(Os::Linux));
        assert_eq!(Os::from_str_loose("darwin"), Some(Os::MacOs));
        assert_eq!(Os::from_str_loose("win"), Some(Os::Windows));
        assert_eq!(Os::from_str_loose("plan9"), None);
    }

    #[test]
    fn test_arch_from_str() {
        assert_eq!("x86_64".parse::<Arch>().unwrap(), Arch::Amd64);
        assert_eq!("arm64".parse::<Arch>().unwrap(), Arch::Aarch64);
        let err = "sparc".parse::<Arch>().unwrap_err();
        assert!(err.to_string().contains("sparc"));
    }

    #[test]
    fn test_soak_is_not_substitutable() {
        assert!(!RunKind::Soak.is_substitutable());
        assert!(RunKind::Quick.is_substitutable());
        assert!(RunKind::Platform.is_substitutable());
        assert!(RunKind::CrossVersion.is_substitutable());
    }

    #[test]
    fn test_shares_platform() {
        let linux17 = Platform::new(Os::Linux, Arch::Amd64, 17);
        let a = RunIdentity::new("a", linux17, RunKind::Quick);
        let b = RunIdentity::new("b", linux17, RunKind::Platform);
        let c = RunIdentity::new("c", Platform::new(Os::Linux, Arch::Amd64, 21), RunKind::Quick);
        assert!(a.shares_platform(&b));
        assert!(!a.shares_platform(&c));
    }

    #[test]
    fn test_platform_serde_aliases() {
        let p: Platform =
            serde_json::from_str(r#"{ "os": "darwin", "arch": "arm64", "runtime_version": 21 }"#)
                .unwrap();
        assert_eq!(p, Platform::new(Os::MacOs, Arch::Aarch64, 21));
        assert_eq!(p.to_string(), "macos/aarch64/v21");
    }

    #[test]
    fn test_work_unit_summary() {
        let u = WorkUnit::new("core", 1200);
        assert_eq!(u.summary(), "core (1.20 s)");
    }
}
