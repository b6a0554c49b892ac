//! Fit-curve grid evaluation.
//!
//! The curve is sampled at `resolution` evenly spaced points spanning the data
//! x-range widened by 1% on each side, so the line stays visible slightly past
//! the outermost points.

use crate::domain::CurveGrid;
use crate::error::CoreError;
use crate::models::ModelKind;

/// Fraction of the x-range added on each side of the grid.
pub const GRID_OVERSHOOT: f64 = 0.01;

/// Default number of grid points.
pub const DEFAULT_RESOLUTION: usize = 100;

/// `n` evenly spaced points from `start` to `end` (both included).
///
/// When `start == end` every point equals `start`.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let last = (n - 1) as f64;
            let mut out: Vec<f64> = (0..n)
                .map(|i| start + (end - start) * (i as f64 / last))
                .collect();
            out[n - 1] = end;
            out
        }
    }
}

/// Grid span for `x_data`: `[min - 1%·range, max + 1%·range]`.
///
/// Non-finite values are ignored. Returns `None` when no finite value exists.
pub fn grid_span(x_data: &[f64]) -> Option<(f64, f64)> {
    let (min, max) = finite_extent(x_data)?;
    let pad = (max - min) * GRID_OVERSHOOT;
    Some((min - pad, max + pad))
}

/// Evaluate `model` with `params` on the grid spanning `x_data`.
pub fn evaluate_grid(
    x_data: &[f64],
    params: &[f64],
    model: ModelKind,
    resolution: usize,
) -> Result<CurveGrid, CoreError> {
    if resolution < 2 {
        return Err(CoreError::InvalidResolution(resolution));
    }
    if params.len() != model.param_count() {
        return Err(CoreError::ParamCount {
            model: model.name().to_string(),
            expected: model.param_count(),
            got: params.len(),
        });
    }
    let (lo, hi) = grid_span(x_data).ok_or(CoreError::NoData)?;

    let x = linspace(lo, hi, resolution);
    let y = x.iter().map(|&xi| model.predict(xi, params)).collect();
    Ok(CurveGrid { x, y })
}

pub(crate) fn finite_extent(values: &[f64]) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}
