//! Model comparison.
//!
//! Fits several catalog models to the same partition (in parallel) and orders
//! the successful fits by BIC, so a user can see which shape the selected
//! points support best.

use rayon::prelude::*;

use crate::domain::Partition;
use crate::error::CoreError;
use crate::fit::fitter::{SourcedFit, fit_with_fallback};
use crate::models::ModelKind;

/// Result of fitting every requested model.
#[derive(Debug, Clone)]
pub struct ModelRanking {
    /// Successful fits, best (lowest BIC) first.
    pub fits: Vec<SourcedFit>,
    /// Models that failed on both the inliers and the full dataset.
    pub failures: Vec<(ModelKind, CoreError)>,
}

impl ModelRanking {
    pub fn best(&self) -> Option<&SourcedFit> {
        self.fits.first()
    }
}

/// Fit each of `models` with the inlier-then-all-data policy and rank by BIC.
///
/// Ties keep the order of `models`, so the output is deterministic.
pub fn rank_models(
    models: &[ModelKind],
    partition: &Partition,
    x_all: &[f64],
    y_all: &[f64],
) -> ModelRanking {
    let results: Vec<(usize, ModelKind, Result<SourcedFit, CoreError>)> = models
        .par_iter()
        .enumerate()
        .map(|(idx, &model)| {
            let res = fit_with_fallback(
                model,
                &partition.x_inliers,
                &partition.y_inliers,
                x_all,
                y_all,
            );
            (idx, model, res)
        })
        .collect();

    let mut ranked: Vec<(usize, SourcedFit)> = Vec::new();
    let mut failures = Vec::new();
    for (idx, model, res) in results {
        match res {
            Ok(fit) => ranked.push((idx, fit)),
            Err(e) => failures.push((model, e)),
        }
    }

    ranked.sort_by(|(ia, a), (ib, b)| {
        a.fit
            .quality
            .bic
            .total_cmp(&b.fit.quality.bic)
            .then(ia.cmp(ib))
    });

    ModelRanking {
        fits: ranked.into_iter().map(|(_, f)| f).collect(),
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Interval;
    use crate::fit::partition::partition;

    #[test]
    fn linear_data_ranks_linear_first() {
        let x: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        // Small deterministic wiggle so higher-order fits are not exact.
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, v)| 2.0 * v + 1.0 + if i % 2 == 0 { 0.1 } else { -0.1 })
            .collect();
        let p = partition(&x, &y, Interval::new(0.0, 100.0), Interval::new(-100.0, 100.0)).unwrap();

        let ranking = rank_models(&ModelKind::SELECTABLE, &p, &x, &y);
        assert_eq!(ranking.best().unwrap().fit.model, ModelKind::Linear);
        assert_eq!(ranking.fits.len() + ranking.failures.len(), ModelKind::SELECTABLE.len());
    }

    #[test]
    fn failing_models_are_listed() {
        let x = [-3.0, -2.0, -1.0, -0.5];
        let y = [1.0, 2.0, 3.0, 4.0];
        let p = partition(&x, &y, Interval::new(-10.0, 10.0), Interval::new(-10.0, 10.0)).unwrap();
        let ranking = rank_models(&[ModelKind::Linear, ModelKind::Root], &p, &x, &y);
        assert_eq!(ranking.fits.len(), 1);
        assert_eq!(ranking.failures.len(), 1);
        assert_eq!(ranking.failures[0].0, ModelKind::Root);
    }
}
