//! Synthetic default dataset: generator output against governor demand.
//!
//! Used whenever no data file is given. Points follow a saturating response
//! curve with Gaussian noise; a small share of points get a large jump up or
//! down so there is something to exclude with the bounds. The origin is
//! always the first row.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::Dataset;
use crate::error::AppError;

pub const X_LABEL: &str = "Governor Demand";
pub const Y_LABEL: &str = "Generator MWG";

/// Rated output (MW) the curve saturates towards.
const RATED_MW: f64 = 120.0;
/// Demand constant of the response curve.
const RESPONSE_K: f64 = 2.5;
/// Noise standard deviation as a fraction of rated output.
const NOISE_FRACTION: f64 = 0.015;

const JUMP_PROB_HIGH: f64 = 0.04;
const JUMP_PROB_LOW: f64 = 0.04;
const JUMP_MW: f64 = 35.0;

/// Noise-free response at demand `x` (0..1).
pub fn response_curve(x: f64) -> f64 {
    RATED_MW * (1.0 - (-RESPONSE_K * x).exp())
}

/// Generate `count` random points plus the origin, reproducibly from `seed`.
pub fn generate_sample(seed: u64, count: usize) -> Result<Dataset, AppError> {
    if count == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, RATED_MW * NOISE_FRACTION)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut x = Vec::with_capacity(count + 1);
    let mut y = Vec::with_capacity(count + 1);
    x.push(0.0);
    y.push(0.0);

    for _ in 0..count {
        let demand: f64 = rng.gen_range(0.01..=1.0);
        let jump = sample_jump(&mut rng);
        let mw = response_curve(demand) + noise.sample(&mut rng) + jump;
        x.push(round3(demand));
        y.push(round3(mw));
    }

    Ok(Dataset::from_columns(X_LABEL, Y_LABEL, x, y)?)
}

fn sample_jump(rng: &mut StdRng) -> f64 {
    let roll: f64 = rng.r#gen();
    if roll < JUMP_PROB_HIGH {
        JUMP_MW
    } else if roll < JUMP_PROB_HIGH + JUMP_PROB_LOW {
        -JUMP_MW
    } else {
        0.0
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_origin() {
        let ds = generate_sample(7, 50).unwrap();
        assert_eq!(ds.len(), 51);
        assert_eq!(ds.x()[0], 0.0);
        assert_eq!(ds.y()[0], 0.0);
        assert_eq!(ds.x_label(), X_LABEL);
        assert_eq!(ds.y_label(), Y_LABEL);
    }

    #[test]
    fn same_seed_same_data() {
        let a = generate_sample(42, 100).unwrap();
        let b = generate_sample(42, 100).unwrap();
        assert_eq!(a, b);
        let c = generate_sample(43, 100).unwrap();
        assert_ne!(a.y(), c.y());
    }

    #[test]
    fn demand_stays_in_unit_range() {
        let ds = generate_sample(1, 200).unwrap();
        assert!(ds.x().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn zero_count_is_rejected() {
        assert_eq!(generate_sample(1, 0).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn response_saturates() {
        assert_eq!(response_curve(0.0), 0.0);
        assert!(response_curve(1.0) > 0.9 * RATED_MW);
        assert!(response_curve(1.0) < RATED_MW);
    }
}
