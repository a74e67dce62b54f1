//! Parameter-grid sweeps.
//!
//! Each grid row fixes the partition count `k`; each cell in the row fixes
//! the vertex count `n` and edge probability `p`. The small and large shapes
//! vary `n` along a row, the density shape varies `p`. Every cell gets
//! `trials_count` freshly generated instances, and the per-trial ratios are
//! reduced to one average and one maximum per cell.

use crate::compare::{compare, Comparison, ZeroReferencePolicy};
use crate::error::{HarnessError, Result};
use crate::generator::InstanceGenerator;
use crate::group::merge_comparisons;
use crate::report::SweepMatrices;
use crate::runner::Solver;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

/// Exclusive upper bound of `k` and `n` in the small grid
const SMALL_UPPER: usize = 12;

/// Exclusive upper bound of `k` in the density grid
const DENSITY_K_UPPER: usize = 8;

/// The grid layouts used by experiments and the report renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GridShape {
    /// `k` in 2..12, `n` in k..12; rows shrink as `k` grows
    Small,
    /// `k` in 3..13, `n` in 50, 100, ..., 350
    Large,
    /// `k` in 2..8, `p` in 0.1, 0.2, ..., 0.9 at a fixed `n`
    Density,
}

impl GridShape {
    /// Name used in report file names
    pub fn as_str(self) -> &'static str {
        match self {
            GridShape::Small => "small",
            GridShape::Large => "big",
            GridShape::Density => "density",
        }
    }

    /// Row labels
    pub fn k_values(self) -> Vec<usize> {
        match self {
            GridShape::Small => (2..SMALL_UPPER).collect(),
            GridShape::Large => (3..13).collect(),
            GridShape::Density => (2..DENSITY_K_UPPER).collect(),
        }
    }

    /// Vertex counts along the row for `k`; empty for the density shape
    pub fn n_values(self, k: usize) -> Vec<usize> {
        match self {
            GridShape::Small => (k..SMALL_UPPER).collect(),
            GridShape::Large => (50..400).step_by(50).collect(),
            GridShape::Density => Vec::new(),
        }
    }

    /// Edge probabilities along every row; empty unless this is the density
    /// shape
    pub fn p_values(self) -> Vec<f64> {
        match self {
            GridShape::Density => (1..10).map(|i| i as f64 / 10.0).collect(),
            GridShape::Small | GridShape::Large => Vec::new(),
        }
    }

    /// Which parameter varies along a row
    pub fn column_name(self) -> &'static str {
        match self {
            GridShape::Small | GridShape::Large => "n",
            GridShape::Density => "p",
        }
    }

    /// Column labels of the row for `k`
    pub fn column_labels(self, k: usize) -> Vec<ColumnLabel> {
        match self {
            GridShape::Small | GridShape::Large => self
                .n_values(k)
                .into_iter()
                .map(ColumnLabel::Vertices)
                .collect(),
            GridShape::Density => self
                .p_values()
                .into_iter()
                .map(ColumnLabel::Probability)
                .collect(),
        }
    }
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The varying parameter of one grid column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColumnLabel {
    Vertices(usize),
    Probability(f64),
}

impl ColumnLabel {
    /// Cell parameters with this column's value replacing the fixed one
    pub fn cell(self, n: usize, p: f64) -> CellParams {
        match self {
            ColumnLabel::Vertices(n) => CellParams { n, p },
            ColumnLabel::Probability(p) => CellParams { n, p },
        }
    }
}

impl fmt::Display for ColumnLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnLabel::Vertices(n) => write!(f, "{}", n),
            ColumnLabel::Probability(p) => write!(f, "{}", p),
        }
    }
}

/// Generator parameters of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellParams {
    pub n: usize,
    pub p: f64,
}

/// One grid row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridRow {
    pub k: usize,
    pub cells: Vec<CellParams>,
}

/// Two-dimensional parameter grid, possibly ragged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepGrid {
    pub rows: Vec<GridRow>,
}

impl SweepGrid {
    /// Grid of the given shape. The small and large shapes hold `p` fixed
    /// and ignore `n`; the density shape holds `n` fixed and ignores `p`.
    pub fn for_shape(shape: GridShape, n: usize, p: f64) -> Self {
        let rows = shape
            .k_values()
            .into_iter()
            .map(|k| GridRow {
                k,
                cells: shape
                    .column_labels(k)
                    .into_iter()
                    .map(|column| column.cell(n, p))
                    .collect(),
            })
            .collect();
        Self { rows }
    }

    /// Arbitrary `k` × `p` grid at a fixed vertex count
    pub fn density(ks: impl IntoIterator<Item = usize>, n: usize, ps: &[f64]) -> Self {
        let rows = ks
            .into_iter()
            .map(|k| GridRow {
                k,
                cells: ps.iter().map(|&p| CellParams { n, p }).collect(),
            })
            .collect();
        Self { rows }
    }

    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(|row| row.cells.len()).sum()
    }
}

/// Per-sweep settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Fresh instances per cell
    pub trials_count: usize,
    pub max_weight: u32,
    pub policy: ZeroReferencePolicy,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            trials_count: 200,
            max_weight: 1000,
            policy: ZeroReferencePolicy::Neutral,
        }
    }
}

/// Sweep `grid`, comparing `subject` against `reference` in every cell
pub fn run_sweep(
    grid: &SweepGrid,
    generator: &dyn InstanceGenerator,
    rng: &mut dyn RngCore,
    subject: &dyn Solver,
    reference: &dyn Solver,
    config: &SweepConfig,
) -> Result<SweepMatrices> {
    if config.trials_count == 0 {
        return Err(HarnessError::EmptyAggregation);
    }

    info!(
        model = %generator.model(),
        cells = grid.cell_count(),
        trials = config.trials_count,
        subject = subject.name(),
        reference = reference.name(),
        "Starting grid sweep"
    );
    let started = Instant::now();

    let mut matrices = SweepMatrices::default();
    for row in &grid.rows {
        let mut avg_row = Vec::with_capacity(row.cells.len());
        let mut max_row = Vec::with_capacity(row.cells.len());

        for cell in &row.cells {
            let summary = run_cell(row.k, cell, generator, rng, subject, reference, config)?;
            debug!(
                k = row.k,
                n = cell.n,
                p = cell.p,
                avg = summary.average_ratio,
                max = summary.worst_ratio,
                "Cell finished"
            );
            avg_row.push(summary.average_ratio);
            max_row.push(summary.worst_ratio);
        }

        info!(k = row.k, cells = row.cells.len(), "Row finished");
        matrices.avg.push(avg_row);
        matrices.max.push(max_row);
    }

    info!(elapsed_ms = started.elapsed().as_millis() as u64, "Grid sweep finished");
    Ok(matrices)
}

fn run_cell(
    k: usize,
    cell: &CellParams,
    generator: &dyn InstanceGenerator,
    rng: &mut dyn RngCore,
    subject: &dyn Solver,
    reference: &dyn Solver,
    config: &SweepConfig,
) -> Result<Comparison> {
    let mut trials = Vec::with_capacity(config.trials_count);
    for _ in 0..config.trials_count {
        let test = generator
            .generate(rng, k, cell.n, cell.p, config.max_weight)?
            .to_protocol();
        trials.push(compare(&test, subject, reference, config.policy)?);
    }
    merge_comparisons(&trials)
}
