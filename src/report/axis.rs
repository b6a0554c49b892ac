//! Range-slider configuration for one numeric column.
//!
//! Display precision follows `ceil(log10(1/range)) + 3` decimal digits, which
//! shows about three significant digits whatever the data's scale. A
//! zero-width column has no such precision and uses [`FALLBACK_DIGITS`].

use crate::domain::{AxisMark, AxisSummary};
use crate::error::CoreError;
use crate::fit::grid::finite_extent;

/// Slider positions across the full data range.
pub const SLIDER_DIVISIONS: f64 = 200.0;

/// Digits used when the range is zero.
pub const FALLBACK_DIGITS: u32 = 3;

/// Upper clamp on display digits; `10^MAX_DIGITS` is still a finite f64.
pub const MAX_DIGITS: u32 = 300;

/// Decimal digits for displaying values from a column spanning `[min, max]`.
pub fn precision_digits(min: f64, max: f64) -> Result<u32, CoreError> {
    let range = (max - min).abs();
    if range == 0.0 || !range.is_finite() {
        return Err(CoreError::DegenerateRange { min, max });
    }
    let raw = (1.0 / range).log10().ceil() + 3.0;
    Ok(raw.clamp(0.0, MAX_DIGITS as f64) as u32)
}

/// Round `v` to `digits` decimal places.
pub fn round_to(v: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    let scaled = v * factor;
    if !scaled.is_finite() {
        return v;
    }
    scaled.round() / factor
}

/// Display text for a rounded value (`5.0`, `12.346`).
pub fn format_tick(v: f64, digits: u32) -> String {
    let s = round_to(v, digits).to_string();
    if s.contains('.') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{s}.0")
    }
}

/// Summarize `values` with the initial selection covering the full range.
pub fn summarize_axis(values: &[f64], label: &str) -> Result<AxisSummary, CoreError> {
    summarize_axis_inset(values, label, 0.0)
}

/// Summarize `values` with the initial selection narrowed by `inset_steps`
/// slider steps on each side. A selection that would cross collapses to the
/// midpoint.
pub fn summarize_axis_inset(
    values: &[f64],
    label: &str,
    inset_steps: f64,
) -> Result<AxisSummary, CoreError> {
    let (min, max) = finite_extent(values).ok_or(CoreError::NoData)?;

    let digits = match precision_digits(min, max) {
        Ok(d) => d,
        Err(CoreError::DegenerateRange { .. }) => FALLBACK_DIGITS,
        Err(e) => return Err(e),
    };

    let raw_step = (max - min) / SLIDER_DIVISIONS;
    let mut step = round_to(raw_step, digits);
    if step <= 0.0 {
        // Only a zero-width column falls back to one unit in the last digit.
        step = if raw_step > 0.0 {
            raw_step
        } else {
            1.0 / 10f64.powi(digits as i32)
        };
    }

    let lo_mark = round_to(min, digits);
    let hi_mark = round_to(max, digits);
    let mut marks = vec![AxisMark {
        position: lo_mark,
        label: format!("{label}={}", format_tick(min, digits)),
    }];
    if hi_mark != lo_mark {
        marks.push(AxisMark {
            position: hi_mark,
            label: format_tick(max, digits),
        });
    }

    let inset = (inset_steps.max(0.0)) * step;
    let mut value = [min + inset, max - inset];
    if value[0] > value[1] {
        let mid = (min + max) / 2.0;
        value = [mid, mid];
    }

    Ok(AxisSummary {
        label: label.to_string(),
        min,
        max,
        step,
        digits,
        marks,
        value,
    })
}
