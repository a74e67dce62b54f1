//! cut_harness: benchmarking and comparison harness for k-cut solvers
//!
//! Generates random weighted graphs, feeds them to external solver
//! executables over stdin, and aggregates the reported objective values and
//! latencies over test groups and parameter grids.

pub mod compare;
pub mod config;
pub mod error;
pub mod generator;
pub mod group;
pub mod instance;
pub mod logging;
pub mod report;
pub mod runner;
pub mod sweep;

pub use compare::{compare, Benchmark, Comparison, ZeroReferencePolicy};
pub use error::{HarnessError, Result};
pub use generator::{GraphModel, InstanceGenerator, WeightRange};
pub use group::{collect_benchmark, merge_comparisons, TestGroupStore};
pub use instance::{Edge, Instance};
pub use report::{ExperimentLabel, GridReport, ReportStore, SweepMatrices};
pub use runner::{Executable, RunResult, Solver};
pub use sweep::{ColumnLabel, GridShape, SweepConfig, SweepGrid};
