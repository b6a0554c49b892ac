//! Shared "fit pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! partition -> fit (with fallback) -> grid -> equation -> plot description
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).
//! Nothing here keeps state between calls: the caller passes the current
//! dataset, bounds and model every time.

use crate::domain::{
    AxisSummary, CurveGrid, Dataset, FitResult, FitSource, Interval, Partition, PlotDescription,
    ReferenceLine,
};
use crate::error::CoreError;
use crate::fit::{evaluate_grid, fit_with_fallback, partition};
use crate::fit::grid::finite_extent;
use crate::io::export::subset_csv;
use crate::models::ModelKind;
use crate::report::{format_equation, summarize_axis_inset};

/// Fraction of the data range added on each side of the plot axes.
pub const AXIS_PADDING: f64 = 0.10;

/// Run the pipeline for one `(dataset, bounds, model)` selection.
///
/// The model name is resolved before any work is done, so an unknown name
/// fails with [`CoreError::ModelNotFound`] without fitting anything.
pub fn fit_pipeline(
    dataset: &Dataset,
    x_bounds: Interval,
    y_bounds: Interval,
    model_name: &str,
    resolution: usize,
) -> Result<FitResult, CoreError> {
    let model: ModelKind = model_name.parse()?;
    if resolution < 2 {
        return Err(CoreError::InvalidResolution(resolution));
    }
    let part = partition(dataset.x(), dataset.y(), x_bounds, y_bounds)?;
    fit_partition(dataset, part, model, resolution)
}

/// Fit `model` to an existing partition of `dataset`.
pub fn fit_partition(
    dataset: &Dataset,
    part: Partition,
    model: ModelKind,
    resolution: usize,
) -> Result<FitResult, CoreError> {
    let sourced = fit_with_fallback(
        model,
        &part.x_inliers,
        &part.y_inliers,
        dataset.x(),
        dataset.y(),
    )?;

    // The curve spans the points the fit actually used.
    let grid_x: &[f64] = if sourced.source.is_fallback() {
        dataset.x()
    } else {
        &part.x_inliers
    };
    let grid = evaluate_grid(grid_x, &sourced.fit.params, model, resolution)?;
    let equation = format_equation(model, &sourced.fit.params)?;

    Ok(FitResult {
        model,
        params: sourced.fit.params,
        source: sourced.source,
        quality: sourced.fit.quality,
        grid,
        equation,
        partition: part,
    })
}

/// Build the render-facing description: three series, four boundary lines,
/// padded axis ranges.
///
/// `fit` is `None` when no curve could be fitted; `equation` is shown either
/// way (the failure message in that case).
pub fn build_plot(
    dataset: &Dataset,
    part: &Partition,
    fit: Option<&FitResult>,
    x_bounds: Interval,
    y_bounds: Interval,
    equation: &str,
) -> PlotDescription {
    let x_range = padded_range(dataset.x());
    let y_range = padded_range(dataset.y());

    let bounds = vec![
        ReferenceLine {
            label: "x low".to_string(),
            from: (x_bounds.low, y_range[0]),
            to: (x_bounds.low, y_range[1]),
        },
        ReferenceLine {
            label: "x high".to_string(),
            from: (x_bounds.high, y_range[0]),
            to: (x_bounds.high, y_range[1]),
        },
        ReferenceLine {
            label: "y low".to_string(),
            from: (x_range[0], y_bounds.low),
            to: (x_range[1], y_bounds.low),
        },
        ReferenceLine {
            label: "y high".to_string(),
            from: (x_range[0], y_bounds.high),
            to: (x_range[1], y_bounds.high),
        },
    ];

    PlotDescription {
        x_label: dataset.x_label().to_string(),
        y_label: dataset.y_label().to_string(),
        inliers: zip_points(&part.x_inliers, &part.y_inliers),
        outliers: zip_points(&part.x_outliers, &part.y_outliers),
        curve: fit.map(|f| finite_points(&f.grid)),
        bounds,
        x_range,
        y_range,
        equation: equation.to_string(),
    }
}

/// Data extent padded by [`AXIS_PADDING`] of the range on each side.
///
/// A zero range is padded by `max(|v| * 0.1, 1)` so the axis keeps a width.
pub fn padded_range(values: &[f64]) -> [f64; 2] {
    let Some((min, max)) = finite_extent(values) else {
        return [0.0, 1.0];
    };
    let range = max - min;
    let pad = if range > 0.0 {
        range * AXIS_PADDING
    } else {
        (min.abs() * AXIS_PADDING).max(1.0)
    };
    [min - pad, max + pad]
}

/// Curve points the model is defined at. The grid overshoots the data, so
/// e.g. `root` on data starting at x = 0 has a NaN first point.
fn finite_points(grid: &CurveGrid) -> Vec<(f64, f64)> {
    grid.points()
        .into_iter()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect()
}

fn zip_points(x: &[f64], y: &[f64]) -> Vec<(f64, f64)> {
    x.iter().copied().zip(y.iter().copied()).collect()
}

/// Outcome of the fit step as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum FitStatus {
    /// Fitted on the inliers.
    Fitted,
    /// Fitted on every point because the inlier fit failed.
    FittedOnAllData { inlier_error: String },
    /// Both attempts failed; no curve is drawn.
    Failed { reason: String },
}

/// Everything one dashboard refresh shows.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub plot: PlotDescription,
    pub status: FitStatus,
    pub fit: Option<FitResult>,
    pub partition: Partition,
    /// Equation text, or the failure message.
    pub equation: String,
    pub x_axis: AxisSummary,
    pub y_axis: AxisSummary,
    /// Inlier rows (all columns) as CSV text.
    pub inliers_csv: String,
    /// Outlier rows (all columns) as CSV text.
    pub outliers_csv: String,
}

/// Recompute the whole dashboard for the current selection.
///
/// A fit that fails on both the inliers and all data is reported through
/// [`FitStatus::Failed`] (no curve, message in place of the equation). Every
/// other error is returned.
pub fn run_dashboard(
    dataset: &Dataset,
    x_bounds: Interval,
    y_bounds: Interval,
    model_name: &str,
    resolution: usize,
    inset_steps: f64,
) -> Result<DashboardView, CoreError> {
    if dataset.is_empty() {
        return Err(CoreError::NoData);
    }
    let model: ModelKind = model_name.parse()?;
    if resolution < 2 {
        return Err(CoreError::InvalidResolution(resolution));
    }

    let x_axis = summarize_axis_inset(dataset.x(), dataset.x_label(), inset_steps)?;
    let y_axis = summarize_axis_inset(dataset.y(), dataset.y_label(), inset_steps)?;

    let part = partition(dataset.x(), dataset.y(), x_bounds, y_bounds)?;
    let inliers_csv = subset_csv(dataset, &part.inlier_rows)?;
    let outliers_csv = subset_csv(dataset, &part.outlier_rows)?;

    let (fit, status, equation) = match fit_partition(dataset, part.clone(), model, resolution) {
        Ok(fit) => {
            let status = match &fit.source {
                FitSource::Inliers => FitStatus::Fitted,
                FitSource::AllData { inlier_error } => FitStatus::FittedOnAllData {
                    inlier_error: inlier_error.clone(),
                },
            };
            let eq = fit.equation.clone();
            (Some(fit), status, eq)
        }
        Err(err @ CoreError::FitDidNotConverge { .. }) => {
            let reason = err.to_string();
            (None, FitStatus::Failed { reason: reason.clone() }, reason)
        }
        Err(err) => return Err(err),
    };

    let plot = build_plot(dataset, &part, fit.as_ref(), x_bounds, y_bounds, &equation);

    Ok(DashboardView {
        plot,
        status,
        fit,
        partition: part,
        equation,
        x_axis,
        y_axis,
        inliers_csv,
        outliers_csv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_dataset() -> Dataset {
        let x: Vec<f64> = (-5..=5).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 3.0).collect();
        Dataset::from_columns("x", "y", x, y).unwrap()
    }

    #[test]
    fn unknown_model_is_rejected_first() {
        let ds = line_dataset();
        let err = fit_pipeline(&ds, Interval::new(-10.0, 10.0), Interval::new(-100.0, 100.0), "eval(x)", 1)
            .unwrap_err();
        assert_eq!(err, CoreError::ModelNotFound("eval(x)".to_string()));
    }

    #[test]
    fn linear_pipeline_recovers_line() {
        let ds = line_dataset();
        let r = fit_pipeline(&ds, Interval::new(-10.0, 10.0), Interval::new(-100.0, 100.0), "linear", 101)
            .unwrap();
        assert_eq!(r.source, FitSource::Inliers);
        assert!((r.params[0] - 2.0).abs() < 1e-6);
        assert!((r.params[1] - 3.0).abs() < 1e-6);
        assert_eq!(r.grid.x.len(), 101);
        // Span is [-5.1, 5.1], so the middle point is x = 0.
        assert!(r.grid.x[50].abs() < 1e-12);
        assert!((r.grid.y[50] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn plot_has_four_bounds_and_padding() {
        let ds = line_dataset();
        let xb = Interval::new(-2.0, 2.0);
        let yb = Interval::new(-100.0, 100.0);
        let r = fit_pipeline(&ds, xb, yb, "linear", 10).unwrap();
        let plot = build_plot(&ds, &r.partition, Some(&r), xb, yb, &r.equation);

        assert_eq!(plot.bounds.len(), 4);
        assert_eq!(plot.x_range, [-6.0, 6.0]);
        assert_eq!(plot.inliers.len(), 5);
        assert_eq!(plot.outliers.len(), 6);
        assert_eq!(plot.bounds[0].from, (-2.0, plot.y_range[0]));
        assert_eq!(plot.bounds[2].to, (6.0, -100.0));
        assert_eq!(plot.curve.as_ref().map(Vec::len), Some(10));
    }

    #[test]
    fn curve_drops_points_outside_the_model_domain() {
        let x: Vec<f64> = (0..=10).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v.sqrt() + 1.0).collect();
        let ds = Dataset::from_columns("x", "y", x, y).unwrap();
        let xb = Interval::new(0.0, 10.0);
        let yb = Interval::new(-100.0, 100.0);

        let r = fit_pipeline(&ds, xb, yb, "root", 50).unwrap();
        // Grid starts at -0.1, where sqrt is undefined.
        assert!(r.grid.y[0].is_nan());

        let plot = build_plot(&ds, &r.partition, Some(&r), xb, yb, &r.equation);
        let curve = plot.curve.unwrap();
        assert_eq!(curve.len(), 49);
        assert!(curve.iter().all(|(x, y)| x.is_finite() && y.is_finite()));
    }

    #[test]
    fn zero_range_axis_still_padded() {
        assert_eq!(padded_range(&[5.0, 5.0]), [4.0, 6.0]);
        assert_eq!(padded_range(&[100.0]), [90.0, 110.0]);
        assert_eq!(padded_range(&[]), [0.0, 1.0]);
    }

    #[test]
    fn dashboard_reports_failed_fit_without_curve() {
        // sqrt is undefined for every x, on the inliers and on all data.
        let ds = Dataset::from_columns("x", "y", vec![-4.0, -3.0, -2.0], vec![1.0, 2.0, 3.0]).unwrap();
        let view = run_dashboard(&ds, Interval::new(-10.0, 10.0), Interval::new(-10.0, 10.0), "root", 50, 0.0)
            .unwrap();
        assert!(matches!(view.status, FitStatus::Failed { .. }));
        assert!(view.plot.curve.is_none());
        assert!(view.equation.contains("did not converge"));
    }

    #[test]
    fn dashboard_exports_partition_tables() {
        let ds = line_dataset();
        let view = run_dashboard(&ds, Interval::new(0.0, 10.0), Interval::new(-100.0, 100.0), "linear", 20, 10.0)
            .unwrap();
        assert_eq!(view.status, FitStatus::Fitted);
        assert_eq!(view.inliers_csv.lines().count(), 1 + 6);
        assert_eq!(view.outliers_csv.lines().count(), 1 + 5);
        assert!(view.inliers_csv.starts_with("x,y\n"));
    }

    #[test]
    fn empty_dataset_is_no_data() {
        let ds = Dataset::from_columns("x", "y", vec![], vec![]).unwrap();
        let err = run_dashboard(&ds, Interval::new(0.0, 1.0), Interval::new(0.0, 1.0), "linear", 10, 0.0)
            .unwrap_err();
        assert_eq!(err, CoreError::NoData);
    }
}
