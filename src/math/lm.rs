//! Levenberg–Marquardt nonlinear least squares.
//!
//! Minimizes `Σ (y_i - f(x_i; p))²` over `p`, starting from a caller-supplied
//! guess. The iteration itself is the MINPACK port in the
//! `levenberg-marquardt` crate; this module adapts a scalar model
//! `f(x, p)` to its [`LeastSquaresProblem`] and estimates the Jacobian with
//! forward differences.
//!
//! Failure when there are fewer points than parameters, the model is not
//! finite at the starting point, or the solver stops without converging
//! (budget exhausted, numerical breakdown).

use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt, TerminationReason};
use nalgebra::{DMatrix, DVector, Dyn, storage::Owned};

use crate::error::CoreError;

/// Residual used in place of a non-finite prediction, so a trial step that
/// leaves the model's domain is rejected rather than ending the fit.
const NON_FINITE_RESIDUAL: f64 = 1e100;

/// Solver tolerances and budget.
#[derive(Debug, Clone)]
pub struct LmOptions {
    /// Evaluation budget in units of `k + 1` model evaluations.
    pub patience: usize,
    /// Relative SSE reduction considered converged.
    pub ftol: f64,
    /// Relative step size considered converged.
    pub xtol: f64,
}

impl Default for LmOptions {
    /// MINPACK `curve_fit` defaults: `200·(k+1)` evaluations, `ftol = xtol = 1.49012e-8`.
    fn default() -> Self {
        Self {
            patience: 200,
            ftol: 1.49012e-8,
            xtol: 1.49012e-8,
        }
    }
}

/// Solver output.
#[derive(Debug, Clone)]
pub struct LmReport {
    pub params: Vec<f64>,
    pub sse: f64,
}

/// Fit `f` to `(x, y)` starting from `p0`.
pub fn levenberg_marquardt<F>(
    f: F,
    x: &[f64],
    y: &[f64],
    p0: &[f64],
    opts: &LmOptions,
) -> Result<LmReport, CoreError>
where
    F: Fn(f64, &[f64]) -> f64,
{
    let n = x.len();
    let k = p0.len();

    if n != y.len() {
        return Err(CoreError::LengthMismatch { x: n, y: y.len() });
    }
    if k == 0 {
        return Err(CoreError::Solver("model has no parameters".to_string()));
    }
    if n < k {
        return Err(CoreError::Solver(format!(
            "{n} data point(s) cannot determine {k} parameters"
        )));
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(CoreError::Solver("data contains non-finite values".to_string()));
    }
    if sse(&f, x, y, p0).is_none() {
        return Err(CoreError::Solver(
            "model is not finite at the initial guess".to_string(),
        ));
    }

    let problem = CurveProblem {
        f: &f,
        x,
        y,
        params: DVector::from_column_slice(p0),
    };
    let (problem, report) = LevenbergMarquardt::new()
        .with_ftol(opts.ftol)
        .with_xtol(opts.xtol)
        .with_patience(opts.patience)
        .minimize(problem);

    if !report.termination.was_successful() {
        return Err(match report.termination {
            TerminationReason::LostPatience => CoreError::Solver(format!(
                "optimal parameters not found: number of calls to function has reached maxfev = {}",
                opts.patience * (k + 1)
            )),
            other => CoreError::Solver(format!("optimal parameters not found: {other:?}")),
        });
    }

    let params: Vec<f64> = problem.params.iter().copied().collect();
    if params.iter().any(|p| !p.is_finite()) {
        return Err(CoreError::Solver(
            "solver produced non-finite parameters".to_string(),
        ));
    }
    let sse = sse(&f, x, y, &params).ok_or_else(|| {
        CoreError::Solver("model is not finite at the fitted parameters".to_string())
    })?;

    Ok(LmReport { params, sse })
}

/// Sum of squared residuals, `None` if any prediction is non-finite.
fn sse<F>(f: &F, x: &[f64], y: &[f64], p: &[f64]) -> Option<f64>
where
    F: Fn(f64, &[f64]) -> f64,
{
    let mut total = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let r = f(xi, p) - yi;
        if !r.is_finite() {
            return None;
        }
        total += r * r;
    }
    Some(total)
}

/// A scalar model bound to its data.
struct CurveProblem<'a, F> {
    f: &'a F,
    x: &'a [f64],
    y: &'a [f64],
    params: DVector<f64>,
}

impl<F> CurveProblem<'_, F>
where
    F: Fn(f64, &[f64]) -> f64,
{
    fn predictions(&self, p: &[f64]) -> Vec<f64> {
        self.x.iter().map(|&xi| (self.f)(xi, p)).collect()
    }
}

impl<F> LeastSquaresProblem<f64, Dyn, Dyn> for CurveProblem<'_, F>
where
    F: Fn(f64, &[f64]) -> f64,
{
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, p: &DVector<f64>) {
        self.params.copy_from(p);
    }

    fn params(&self) -> DVector<f64> {
        self.params.clone_owned()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        let fitted = self.predictions(self.params.as_slice());
        Some(DVector::from_iterator(
            self.x.len(),
            fitted.iter().zip(self.y).map(|(&fi, &yi)| {
                let r = fi - yi;
                if r.is_finite() { r } else { NON_FINITE_RESIDUAL }
            }),
        ))
    }

    /// Forward differences with step `√ε·max(|p_j|, 1)`.
    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let n = self.x.len();
        let k = self.params.len();
        let eps = f64::EPSILON.sqrt();

        let fitted = self.predictions(self.params.as_slice());
        let mut jac = DMatrix::<f64>::zeros(n, k);
        let mut shifted: Vec<f64> = self.params.iter().copied().collect();

        for j in 0..k {
            let h = eps * self.params[j].abs().max(1.0);
            shifted[j] = self.params[j] + h;
            for i in 0..n {
                let d = ((self.f)(self.x[i], &shifted) - fitted[i]) / h;
                if !d.is_finite() {
                    return None;
                }
                jac[(i, j)] = d;
            }
            shifted[j] = self.params[j];
        }

        Some(jac)
    }
}
