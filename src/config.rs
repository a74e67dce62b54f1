//! Harness configuration.
//!
//! Defaults reproduce the standard experiment layout: solver binaries under
//! `cmake-build-release/`, test groups under `tests/test-groups`, reports
//! under `reports`. Any subset of fields can be overridden from a JSON file.

use crate::error::{HarnessError, Result};
use crate::generator::DEFAULT_SEED;
use crate::runner::Executable;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub solvers: SolverPaths,
    pub tests_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub seed: u64,
    pub max_weight: u32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            solvers: SolverPaths::default(),
            tests_dir: PathBuf::from("tests/test-groups"),
            reports_dir: PathBuf::from("reports"),
            seed: DEFAULT_SEED,
            max_weight: 1000,
        }
    }
}

/// Locations of the known solver binaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverPaths {
    pub approximate: PathBuf,
    pub naive: PathBuf,
    pub greedy: PathBuf,
}

impl Default for SolverPaths {
    fn default() -> Self {
        Self {
            approximate: PathBuf::from("cmake-build-release/approximate_algorithm"),
            naive: PathBuf::from("cmake-build-release/naive_algorithm"),
            greedy: PathBuf::from("cmake-build-release/greedy_algorithm"),
        }
    }
}

impl HarnessConfig {
    /// Load from a JSON file; absent fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| HarnessError::Config(format!("invalid configuration: {}", e)))
    }

    /// `approximate`, `naive` and `greedy` name the configured binaries;
    /// anything else is taken as a path
    pub fn resolve_solver(&self, spec: &str) -> Executable {
        match spec {
            "approximate" => Executable::new(&self.solvers.approximate),
            "naive" => Executable::new(&self.solvers.naive),
            "greedy" => Executable::new(&self.solvers.greedy),
            path => Executable::new(path),
        }
    }
}
