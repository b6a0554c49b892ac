//! Fitting routines for a single model.
//!
//! Given:
//! - inlier points `(x_in, y_in)`
//! - every point `(x_all, y_all)`
//! - a model from the catalog
//!
//! we first try the inliers. If that attempt fails (too few points, the model
//! is not finite on the data, or the solver runs out of budget) we try again on
//! every point. Only when both attempts fail is the fit reported as
//! [`CoreError::FitDidNotConverge`].

use crate::domain::{FitQuality, FitSource};
use crate::error::CoreError;
use crate::math::{LmOptions, levenberg_marquardt};
use crate::models::ModelKind;

/// Best fit for a single model on one set of points.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFit {
    pub model: ModelKind,
    pub params: Vec<f64>,
    pub quality: FitQuality,
}

/// A fit together with the data it was computed on.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedFit {
    pub fit: ModelFit,
    pub source: FitSource,
}

/// Fit `model` to `(x, y)` once, with no fallback.
pub fn fit_model(model: ModelKind, x: &[f64], y: &[f64]) -> Result<ModelFit, CoreError> {
    if x.is_empty() {
        return Err(CoreError::Solver("no data points to fit".to_string()));
    }

    let k = model.param_count();
    let p0 = model.initial_guess(x);
    let opts = LmOptions::default();
    let mut out = levenberg_marquardt(|xi, p| model.predict(xi, p), x, y, &p0, &opts)?;
    model.normalize_params(&mut out.params);

    Ok(ModelFit {
        model,
        params: out.params,
        quality: fit_quality(x.len(), out.sse, k),
    })
}

/// Fit on the inliers, falling back to every point.
pub fn fit_with_fallback(
    model: ModelKind,
    x_in: &[f64],
    y_in: &[f64],
    x_all: &[f64],
    y_all: &[f64],
) -> Result<SourcedFit, CoreError> {
    let inlier_err = match fit_model(model, x_in, y_in) {
        Ok(fit) => {
            return Ok(SourcedFit {
                fit,
                source: FitSource::Inliers,
            });
        }
        Err(e) => e,
    };

    match fit_model(model, x_all, y_all) {
        Ok(fit) => Ok(SourcedFit {
            fit,
            source: FitSource::AllData {
                inlier_error: inlier_err.to_string(),
            },
        }),
        Err(fallback_err) => Err(CoreError::FitDidNotConverge {
            model: model.name().to_string(),
            inlier_reason: inlier_err.to_string(),
            fallback_reason: fallback_err.to_string(),
        }),
    }
}

/// SSE/RMSE/BIC over `n` points for a `k`-parameter model.
pub fn fit_quality(n: usize, sse: f64, k: usize) -> FitQuality {
    let rmse = if n > 0 { (sse / n as f64).sqrt() } else { f64::NAN };
    FitQuality {
        sse,
        rmse,
        bic: bic(n, sse, k),
        n,
    }
}

fn bic(n: usize, sse: f64, k: usize) -> f64 {
    if n == 0 {
        return f64::INFINITY;
    }
    // Floor the SSE so exact fits stay comparable instead of producing -inf.
    let nf = n as f64;
    let sse = sse.max(1e-300);
    nf * (sse / nf).ln() + k as f64 * nf.ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(x: &[f64]) -> Vec<f64> {
        x.iter().map(|v| 2.0 * v + 3.0).collect()
    }

    #[test]
    fn fit_model_recovers_line() {
        let x: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let fit = fit_model(ModelKind::Linear, &x, &line(&x)).unwrap();
        assert!((fit.params[0] - 2.0).abs() < 1e-8);
        assert!((fit.params[1] - 3.0).abs() < 1e-8);
        assert_eq!(fit.quality.n, 8);
    }

    #[test]
    fn fit_model_recovers_quadratic() {
        let x: Vec<f64> = (-5..=5).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 0.5 * v * v - v + 2.0).collect();
        let fit = fit_model(ModelKind::Quadratic, &x, &y).unwrap();
        for (a, b) in fit.params.iter().zip([0.5, -1.0, 2.0]) {
            assert!((a - b).abs() < 1e-6, "{a} vs {b}");
        }
    }

    #[test]
    fn inlier_success_reports_inlier_source() {
        let x: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let y = line(&x);
        let out = fit_with_fallback(ModelKind::Linear, &x[..4], &y[..4], &x, &y).unwrap();
        assert_eq!(out.source, FitSource::Inliers);
        assert_eq!(out.fit.quality.n, 4);
    }

    #[test]
    fn too_few_inliers_falls_back_to_all_points() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| v * v * v - v).collect();
        let out = fit_with_fallback(ModelKind::Cubic, &x[..1], &y[..1], &x, &y).unwrap();
        assert!(out.source.is_fallback());
        assert_eq!(out.fit.quality.n, 10);
    }

    #[test]
    fn empty_inliers_fall_back() {
        let x = [1.0, 2.0, 3.0];
        let y = line(&x);
        let out = fit_with_fallback(ModelKind::Linear, &[], &[], &x, &y).unwrap();
        assert!(out.source.is_fallback());
    }

    #[test]
    fn both_attempts_failing_is_did_not_converge() {
        let x = [-3.0, -2.0, -1.0];
        let y = [1.0, 2.0, 3.0];
        let err = fit_with_fallback(ModelKind::Root, &x[..1], &y[..1], &x, &y).unwrap_err();
        match err {
            CoreError::FitDidNotConverge { model, .. } => assert_eq!(model, "root"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bic_penalizes_parameters() {
        let a = fit_quality(20, 1.0, 2);
        let b = fit_quality(20, 1.0, 4);
        assert!(a.bic < b.bic);
        assert!(fit_quality(5, 0.0, 2).bic.is_finite());
    }
}
