//! Nonlinear least squares for the model catalog.

pub mod lm;

pub use lm::*;
