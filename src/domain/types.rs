//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the core and whatever front-end drives it (CLI, TUI)
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::ModelKind;

/// A closed interval `[low, high]` bounding one axis.
///
/// `low > high` is accepted. Nothing can satisfy both ends of such an
/// interval, so every row tested against it is an outlier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub low: f64,
    pub high: f64,
}

impl Interval {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, v: f64) -> bool {
        !(v < self.low || v > self.high)
    }
}

/// Where a dataset came from (shown next to the plot).
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSource {
    pub name: String,
    pub modified: Option<NaiveDateTime>,
}

/// A table whose first two columns are the numeric x and y values.
///
/// All columns are kept as raw cells so inlier/outlier downloads carry every
/// column of the original rows. `x`, `y` and `rows` always have equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    x: Vec<f64>,
    y: Vec<f64>,
    source: Option<DatasetSource>,
}

impl Dataset {
    /// Build a dataset from raw rows plus the parsed first two columns.
    pub fn new(
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
        x: Vec<f64>,
        y: Vec<f64>,
    ) -> Result<Self, CoreError> {
        if x.len() != y.len() {
            return Err(CoreError::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        if rows.len() != x.len() {
            return Err(CoreError::Decode(format!(
                "{} raw rows for {} numeric rows",
                rows.len(),
                x.len()
            )));
        }
        if columns.len() < 2 {
            return Err(CoreError::Decode(
                "at least two columns are required".to_string(),
            ));
        }
        Ok(Self {
            columns,
            rows,
            x,
            y,
            source: None,
        })
    }

    /// Build a two-column dataset directly from numeric columns.
    pub fn from_columns(
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        x: Vec<f64>,
        y: Vec<f64>,
    ) -> Result<Self, CoreError> {
        let rows = x
            .iter()
            .zip(y.iter())
            .map(|(xi, yi)| vec![xi.to_string(), yi.to_string()])
            .collect();
        Self::new(vec![x_label.into(), y_label.into()], rows, x, y)
    }

    pub fn with_source(mut self, source: DatasetSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn x_label(&self) -> &str {
        &self.columns[0]
    }

    pub fn y_label(&self) -> &str {
        &self.columns[1]
    }

    pub fn source(&self) -> Option<&DatasetSource> {
        self.source.as_ref()
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Inlier/outlier split of a dataset.
///
/// Every row lands in exactly one side, and both sides keep the original row
/// order. `inlier_rows` / `outlier_rows` are indices into the source dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub x_inliers: Vec<f64>,
    pub y_inliers: Vec<f64>,
    pub x_outliers: Vec<f64>,
    pub y_outliers: Vec<f64>,
    pub inlier_rows: Vec<usize>,
    pub outlier_rows: Vec<usize>,
}

impl Partition {
    pub fn inlier_count(&self) -> usize {
        self.x_inliers.len()
    }

    pub fn outlier_count(&self) -> usize {
        self.x_outliers.len()
    }
}

/// Which data a successful fit was computed on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FitSource {
    /// The inlier subset.
    Inliers,
    /// The full dataset, after the inlier attempt failed for `inlier_error`.
    AllData { inlier_error: String },
}

impl FitSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, FitSource::AllData { .. })
    }
}

/// Fit quality diagnostics over the points the fit used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub bic: f64,
    pub n: usize,
}

/// Evenly spaced evaluation of a fitted model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurveGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl CurveGrid {
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.x.iter().copied().zip(self.y.iter().copied()).collect()
    }
}

/// Output of a single fit pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub model: ModelKind,
    pub params: Vec<f64>,
    pub source: FitSource,
    pub quality: FitQuality,
    pub grid: CurveGrid,
    pub equation: String,
    pub partition: Partition,
}

/// One labelled tick on a range slider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisMark {
    pub position: f64,
    pub label: String,
}

/// Slider configuration derived from one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSummary {
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// Decimal digits used for rounded display values.
    pub digits: u32,
    pub marks: Vec<AxisMark>,
    /// Initial `[low, high]` selection.
    pub value: [f64; 2],
}

impl AxisSummary {
    pub fn initial_interval(&self) -> Interval {
        Interval::new(self.value[0], self.value[1])
    }
}

/// A straight boundary line drawn at one interval edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub label: String,
    pub from: (f64, f64),
    pub to: (f64, f64),
}

/// Everything a renderer needs to draw the scatter plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotDescription {
    pub x_label: String,
    pub y_label: String,
    pub inliers: Vec<(f64, f64)>,
    pub outliers: Vec<(f64, f64)>,
    /// `None` when no curve could be fitted.
    pub curve: Option<Vec<(f64, f64)>>,
    pub bounds: Vec<ReferenceLine>,
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
    pub equation: String,
}

/// A full run's configuration as understood by the CLI/TUI.
///
/// This is derived from CLI flags, environment defaults, and built-in defaults.
#[derive(Debug, Clone)]
pub struct FitConfig {
    /// Data file; `None` means use the generated sample dataset.
    pub data_path: Option<PathBuf>,
    pub model: String,
    pub x_bounds: Option<Interval>,
    pub y_bounds: Option<Interval>,
    /// Number of points in the evaluated fit curve.
    pub resolution: usize,
    /// How many slider steps the initial selection sits inside the data range.
    pub inset_steps: f64,

    pub sample_seed: u64,
    pub sample_count: usize,

    /// Include the piecewise models when ranking.
    pub include_piecewise: bool,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_inliers: Option<PathBuf>,
    pub export_outliers: Option<PathBuf>,
    pub export_plot: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_is_inclusive() {
        let iv = Interval::new(0.0, 10.0);
        assert!(iv.contains(0.0));
        assert!(iv.contains(10.0));
        assert!(!iv.contains(-0.001));
        assert!(!iv.contains(10.001));
    }

    #[test]
    fn inverted_interval_contains_nothing() {
        let iv = Interval::new(5.0, 1.0);
        for v in [0.0, 1.0, 3.0, 5.0, 6.0] {
            assert!(!iv.contains(v));
        }
    }

    #[test]
    fn dataset_rejects_mismatched_columns() {
        let err = Dataset::from_columns("x", "y", vec![1.0, 2.0], vec![1.0]).unwrap_err();
        assert_eq!(err, CoreError::LengthMismatch { x: 2, y: 1 });
    }

    #[test]
    fn dataset_from_columns_keeps_labels() {
        let ds = Dataset::from_columns("Governor Demand", "Generator MWG", vec![1.0], vec![2.0])
            .unwrap();
        assert_eq!(ds.x_label(), "Governor Demand");
        assert_eq!(ds.y_label(), "Generator MWG");
        assert_eq!(ds.rows()[0], vec!["1".to_string(), "2".to_string()]);
    }
}
