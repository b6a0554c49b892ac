//! Environment-driven defaults.
//!
//! `.env` is loaded (if present) before reading the process environment.
//! CLI flags take precedence over everything here.

use std::path::PathBuf;

use crate::error::AppError;
use crate::fit::grid::DEFAULT_RESOLUTION;

pub const ENV_RESOLUTION: &str = "OV_RESOLUTION";
pub const ENV_DATA: &str = "OV_DATA";
pub const ENV_SEED: &str = "OV_SEED";
pub const ENV_INSET_STEPS: &str = "OV_INSET_STEPS";

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_INSET_STEPS: f64 = 10.0;

/// Defaults resolved from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub resolution: usize,
    pub data_path: Option<PathBuf>,
    pub seed: u64,
    pub inset_steps: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            data_path: None,
            seed: DEFAULT_SEED,
            inset_steps: DEFAULT_INSET_STEPS,
        }
    }
}

impl Settings {
    /// Load `.env` and read the `OV_*` variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut s = Settings::default();

        if let Some(raw) = lookup(ENV_RESOLUTION) {
            let n: usize = parse_var(ENV_RESOLUTION, &raw)?;
            if n < 2 {
                return Err(AppError::new(2, format!("{ENV_RESOLUTION} must be >= 2 (got {n}).")));
            }
            s.resolution = n;
        }
        if let Some(raw) = lookup(ENV_DATA) {
            let raw = raw.trim();
            if !raw.is_empty() {
                s.data_path = Some(PathBuf::from(raw));
            }
        }
        if let Some(raw) = lookup(ENV_SEED) {
            s.seed = parse_var(ENV_SEED, &raw)?;
        }
        if let Some(raw) = lookup(ENV_INSET_STEPS) {
            let v: f64 = parse_var(ENV_INSET_STEPS, &raw)?;
            if !(v.is_finite() && v >= 0.0) {
                return Err(AppError::new(2, format!("{ENV_INSET_STEPS} must be a non-negative number.")));
            }
            s.inset_steps = v;
        }

        Ok(s)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::new(2, format!("Invalid value for {key}: '{raw}'.")))
}
