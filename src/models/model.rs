//! The model catalog.
//!
//! Every curve shape the fitter understands is a variant of [`ModelKind`].
//! Names coming from a UI are resolved with `str::parse`, which rejects any
//! name outside the catalog before fitting starts.
//!
//! Parameter order (highest power first for polynomials):
//!
//! | model | form | params |
//! |---|---|---|
//! | linear | `m·x + b` | `[m, b]` |
//! | quadratic | `a·x² + b·x + c` | `[a, b, c]` |
//! | cubic | `a·x³ + b·x² + c·x + d` | `[a, b, c, d]` |
//! | fourth | `a·x⁴ + … + e` | `[a, b, c, d, e]` |
//! | power | `a·xⁿ + b` | `[a, n, b]` |
//! | root | `a·√x + b` | `[a, b]` |
//! | piecewise_2 | two lines meeting at `(x0, y0)` | `[x0, y0, k1, k2]` |
//! | piecewise_3 | three joined lines, breaks at `min(x0, x1)`, `max(x0, x1)` | `[x0, x1, b, k1, k2, k3]` |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A named parametric curve shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Linear,
    Quadratic,
    Cubic,
    Fourth,
    Power,
    Root,
    #[serde(rename = "piecewise_2")]
    Piecewise2,
    #[serde(rename = "piecewise_3")]
    Piecewise3,
}

impl ModelKind {
    /// The whole catalog, in display order.
    pub const ALL: [ModelKind; 8] = [
        ModelKind::Linear,
        ModelKind::Quadratic,
        ModelKind::Cubic,
        ModelKind::Fourth,
        ModelKind::Power,
        ModelKind::Root,
        ModelKind::Piecewise2,
        ModelKind::Piecewise3,
    ];

    /// Models offered by the model selector. The piecewise fits stay
    /// reachable by name but are not listed.
    pub const SELECTABLE: [ModelKind; 6] = [
        ModelKind::Linear,
        ModelKind::Quadratic,
        ModelKind::Cubic,
        ModelKind::Fourth,
        ModelKind::Power,
        ModelKind::Root,
    ];

    /// Canonical catalog name.
    pub fn name(self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::Quadratic => "quadratic",
            ModelKind::Cubic => "cubic",
            ModelKind::Fourth => "fourth",
            ModelKind::Power => "power",
            ModelKind::Root => "root",
            ModelKind::Piecewise2 => "piecewise_2",
            ModelKind::Piecewise3 => "piecewise_3",
        }
    }

    /// Selector label.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::Quadratic => "x^2",
            ModelKind::Cubic => "x^3",
            ModelKind::Fourth => "x^4",
            ModelKind::Power => "a*x^n",
            ModelKind::Root => "sqrt(x)",
            ModelKind::Piecewise2 => "piecewise (2)",
            ModelKind::Piecewise3 => "piecewise (3)",
        }
    }

    /// Number of free parameters.
    pub fn param_count(self) -> usize {
        match self {
            ModelKind::Linear | ModelKind::Root => 2,
            ModelKind::Quadratic | ModelKind::Power => 3,
            ModelKind::Cubic | ModelKind::Piecewise2 => 4,
            ModelKind::Fourth => 5,
            ModelKind::Piecewise3 => 6,
        }
    }

    /// Next entry of `SELECTABLE` (wrapping). Models outside the list map to the first entry.
    pub fn next_selectable(self) -> ModelKind {
        let pos = Self::SELECTABLE.iter().position(|&m| m == self);
        match pos {
            Some(i) => Self::SELECTABLE[(i + 1) % Self::SELECTABLE.len()],
            None => Self::SELECTABLE[0],
        }
    }

    /// Previous entry of `SELECTABLE` (wrapping).
    pub fn prev_selectable(self) -> ModelKind {
        let n = Self::SELECTABLE.len();
        let pos = Self::SELECTABLE.iter().position(|&m| m == self);
        match pos {
            Some(i) => Self::SELECTABLE[(i + n - 1) % n],
            None => Self::SELECTABLE[0],
        }
    }

    /// Evaluate `y = f(x; params)`.
    ///
    /// # Panics
    /// Panics if `params` is shorter than `self.param_count()`. Callers size
    /// parameter vectors from the same model.
    pub fn predict(self, x: f64, params: &[f64]) -> f64 {
        match self {
            ModelKind::Linear => params[0] * x + params[1],
            ModelKind::Quadratic => horner(x, &params[..3]),
            ModelKind::Cubic => horner(x, &params[..4]),
            ModelKind::Fourth => horner(x, &params[..5]),
            ModelKind::Power => params[0] * x.powf(params[1]) + params[2],
            ModelKind::Root => params[0] * x.sqrt() + params[1],
            ModelKind::Piecewise2 => {
                let (x0, y0, k1, k2) = (params[0], params[1], params[2], params[3]);
                if x < x0 {
                    y0 + k1 * (x - x0)
                } else {
                    y0 + k2 * (x - x0)
                }
            }
            ModelKind::Piecewise3 => {
                // Breaks are read in ascending order whatever order they are stored in.
                let (x0, x1) = (params[0].min(params[1]), params[0].max(params[1]));
                let b = params[2];
                let (k1, k2, k3) = (params[3], params[4], params[5]);
                if x < x0 {
                    k1 * x + b
                } else if x < x1 {
                    k1 * x0 + b + k2 * (x - x0)
                } else {
                    k1 * x0 + b + k2 * (x1 - x0) + k3 * (x - x1)
                }
            }
        }
    }

    /// Store the breakpoints of `Piecewise3` in ascending order. The curve is
    /// unchanged; every other model is left as is.
    pub fn normalize_params(self, params: &mut [f64]) {
        if self == ModelKind::Piecewise3 && params.len() >= 2 && params[0] > params[1] {
            params.swap(0, 1);
        }
    }

    /// Starting point for the least-squares solver.
    ///
    /// All ones, except that piecewise breakpoints start at the data's
    /// 1/2 (two segments) or 1/3 and 2/3 (three segments) quantiles; a
    /// breakpoint outside the data has a zero derivative and never moves.
    pub fn initial_guess(self, x: &[f64]) -> Vec<f64> {
        let mut p0 = vec![1.0; self.param_count()];
        match self {
            ModelKind::Piecewise2 => {
                if let Some(q) = quantile(x, 0.5) {
                    p0[0] = q;
                }
            }
            ModelKind::Piecewise3 => {
                if let (Some(q1), Some(q2)) = (quantile(x, 1.0 / 3.0), quantile(x, 2.0 / 3.0)) {
                    p0[0] = q1;
                    p0[1] = q2;
                }
            }
            _ => {}
        }
        p0
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = CoreError;

    /// Accepts the canonical name or the selector label, exactly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ModelKind::ALL
            .iter()
            .copied()
            .find(|m| m.name() == s || m.display_name() == s)
            .ok_or_else(|| CoreError::ModelNotFound(s.to_string()))
    }
}

/// Evaluate a polynomial with coefficients ordered highest power first.
fn horner(x: f64, coeffs: &[f64]) -> f64 {
    coeffs.iter().fold(0.0, |acc, &c| acc * x + c)
}

/// Linear-interpolated quantile of the finite values in `x`.
fn quantile(x: &[f64], q: f64) -> Option<f64> {
    let mut v: Vec<f64> = x.iter().copied().filter(|v| v.is_finite()).collect();
    if v.is_empty() {
        return None;
    }
    v.sort_by(f64::total_cmp);
    let pos = q.clamp(0.0, 1.0) * (v.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(v[lo] + (v[hi] - v[lo]) * frac)
}
