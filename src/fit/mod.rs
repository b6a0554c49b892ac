//! Curve fitting.
//!
//! Responsibilities:
//!
//! - split points into inliers/outliers (`partition`)
//! - fit one model with the inlier-then-all-data policy (`fitter`)
//! - sample a fitted model for plotting (`grid`)
//! - compare several models on the same selection (`selection`)

pub mod fitter;
pub mod grid;
pub mod partition;
pub mod selection;

pub use fitter::*;
pub use grid::*;
pub use partition::*;
pub use selection::*;
