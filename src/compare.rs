//! Single-trial comparison of two solvers.

use crate::error::Result;
use crate::runner::{RunResult, Solver};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Ratio reported when the reference solver returns 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ZeroReferencePolicy {
    /// `-1`, marks the trial as degenerate (test-group runs)
    Sentinel,
    /// `1`, counts the trial as exact (grid sweeps)
    Neutral,
}

impl ZeroReferencePolicy {
    pub fn zero_ratio(self) -> f64 {
        match self {
            ZeroReferencePolicy::Sentinel => -1.0,
            ZeroReferencePolicy::Neutral => 1.0,
        }
    }

    /// `subject / reference`, or the policy value when `reference == 0`
    pub fn ratio(self, subject: i64, reference: i64) -> f64 {
        if reference == 0 {
            self.zero_ratio()
        } else {
            subject as f64 / reference as f64
        }
    }
}

/// Solution-quality summary over one or more trials
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub worst_ratio: f64,
    pub average_ratio: f64,
    pub tests_count: usize,
}

impl Comparison {
    /// One trial with the given ratio
    pub fn single(ratio: f64) -> Self {
        Self {
            worst_ratio: ratio,
            average_ratio: ratio,
            tests_count: 1,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tests:           {}", self.tests_count)?;
        writeln!(f, "Average ratio:   {:.6}", self.average_ratio)?;
        write!(f, "Worst ratio:     {:.6}", self.worst_ratio)
    }
}

/// Latency summary over one or more trials
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    pub worst_time: f64,
    pub average_time: f64,
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Average time:    {:.6} s", self.average_time)?;
        write!(f, "Worst time:      {:.6} s", self.worst_time)
    }
}

/// One-trial comparison from two finished runs
pub fn comparison_of(
    subject: &RunResult,
    reference: &RunResult,
    policy: ZeroReferencePolicy,
) -> Comparison {
    Comparison::single(policy.ratio(subject.output, reference.output))
}

/// Run `subject`, then `reference`, on the same instance text
pub fn compare(
    input: &str,
    subject: &dyn Solver,
    reference: &dyn Solver,
    policy: ZeroReferencePolicy,
) -> Result<Comparison> {
    let subject_result = subject.solve(input)?;
    let reference_result = reference.solve(input)?;

    let comparison = comparison_of(&subject_result, &reference_result, policy);
    debug!(
        subject = subject.name(),
        reference = reference.name(),
        subject_output = subject_result.output,
        reference_output = reference_result.output,
        ratio = comparison.average_ratio,
        "Compared solvers"
    );
    Ok(comparison)
}
