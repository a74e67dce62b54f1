//! Sweep reports.
//!
//! A report file is a JSON object with two matrices, `max` and `avg`,
//! indexed `[k-row][column]`. Row and column labels are not stored; they
//! are rebuilt from the grid shape the report was produced with.

use crate::error::Result;
use crate::generator::GraphModel;
use crate::sweep::{ColumnLabel, GridShape};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Per-cell maximum and average ratios of one sweep
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepMatrices {
    pub max: Vec<Vec<f64>>,
    pub avg: Vec<Vec<f64>>,
}

impl SweepMatrices {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Names a report by graph model, grid shape and a free-form tag
/// (edge probability and trial scale, e.g. `0.2-500`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentLabel {
    pub model: GraphModel,
    pub shape: GridShape,
    pub tag: String,
}

impl ExperimentLabel {
    pub fn new(model: GraphModel, shape: GridShape, tag: impl Into<String>) -> Self {
        Self {
            model,
            shape,
            tag: tag.into(),
        }
    }

    /// File name without extension, e.g. `erdos_renyi_small_0.2-500`
    pub fn file_stem(&self) -> String {
        format!("{}_{}_{}", self.model, self.shape, self.tag)
    }
}

/// Directory holding report files
#[derive(Debug, Clone)]
pub struct ReportStore {
    root: PathBuf,
}

impl ReportStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, label: &ExperimentLabel) -> PathBuf {
        self.root.join(format!("{}.json", label.file_stem()))
    }

    /// Write the matrices, replacing any earlier report with the same label
    pub fn write(&self, label: &ExperimentLabel, matrices: &SweepMatrices) -> Result<PathBuf> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(label);
        fs::write(&path, matrices.to_json()?)?;
        info!(report = %path.display(), "Wrote report");
        Ok(path)
    }

    pub fn read(&self, label: &ExperimentLabel) -> Result<GridReport> {
        GridReport::load(&self.path_for(label), label.shape)
    }
}

/// Report of a small (ragged) sweep
#[derive(Debug, Clone, PartialEq)]
pub struct SmallGridReport {
    pub matrices: SweepMatrices,
}

/// Report of a large (rectangular) sweep
#[derive(Debug, Clone, PartialEq)]
pub struct LargeGridReport {
    pub matrices: SweepMatrices,
}

/// Report of a `k` × `p` sweep at a fixed vertex count
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGridReport {
    pub matrices: SweepMatrices,
}

/// One labelled cell of a report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelledCell {
    pub k: usize,
    pub column: ColumnLabel,
    pub avg: Option<f64>,
    pub max: Option<f64>,
}

/// A report together with the shape that gives its indices meaning
#[derive(Debug, Clone, PartialEq)]
pub enum GridReport {
    Small(SmallGridReport),
    Large(LargeGridReport),
    Density(DensityGridReport),
}

impl GridReport {
    pub fn new(matrices: SweepMatrices, shape: GridShape) -> Self {
        match shape {
            GridShape::Small => GridReport::Small(SmallGridReport { matrices }),
            GridShape::Large => GridReport::Large(LargeGridReport { matrices }),
            GridShape::Density => GridReport::Density(DensityGridReport { matrices }),
        }
    }

    pub fn load(path: &Path, shape: GridShape) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(Self::new(SweepMatrices::from_json(&json)?, shape))
    }

    pub fn shape(&self) -> GridShape {
        match self {
            GridReport::Small(_) => GridShape::Small,
            GridReport::Large(_) => GridShape::Large,
            GridReport::Density(_) => GridShape::Density,
        }
    }

    pub fn matrices(&self) -> &SweepMatrices {
        match self {
            GridReport::Small(report) => &report.matrices,
            GridReport::Large(report) => &report.matrices,
            GridReport::Density(report) => &report.matrices,
        }
    }

    /// Distinct column labels across all rows, in ascending order.
    ///
    /// Later rows never introduce a column the earlier rows lack, so the
    /// order of first appearance is already sorted.
    pub fn column_labels(&self) -> Vec<ColumnLabel> {
        let shape = self.shape();
        let mut labels = Vec::new();
        for label in shape.k_values().into_iter().flat_map(|k| shape.column_labels(k)) {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }

    /// Every labelled position of the grid. A value is `None` when the
    /// matrix row is shorter than the shape's row.
    pub fn cells(&self) -> Vec<LabelledCell> {
        let shape = self.shape();
        let matrices = self.matrices();
        let mut cells = Vec::new();
        for (i, k) in shape.k_values().into_iter().enumerate() {
            for (j, column) in shape.column_labels(k).into_iter().enumerate() {
                let avg = matrices.avg.get(i).and_then(|row| row.get(j)).copied();
                let max = matrices.max.get(i).and_then(|row| row.get(j)).copied();
                cells.push(LabelledCell {
                    k,
                    column,
                    avg,
                    max,
                });
            }
        }
        cells
    }

    /// Text table of one matrix with `k` rows and one column per `n` (or
    /// `p`); absent cells are left blank
    pub fn render_table(&self, use_max: bool) -> String {
        let shape = self.shape();
        let columns = self.column_labels();
        let cells = self.cells();
        let mut out = format!("{:>4}", format!("k\\{}", shape.column_name()));
        for column in &columns {
            out.push_str(&format!(" {:>7}", column.to_string()));
        }
        for k in shape.k_values() {
            out.push_str(&format!("\n{:>4}", k));
            for column in &columns {
                let value = cells
                    .iter()
                    .find(|c| c.k == k && c.column == *column)
                    .and_then(|c| if use_max { c.max } else { c.avg });
                match value {
                    Some(v) => out.push_str(&format!(" {:>7.2}", v)),
                    None => out.push_str(&format!(" {:>7}", "")),
                }
            }
        }
        out
    }
}
