//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the dataset and the bounds applied to it (`Dataset`, `Interval`)
//! - the inlier/outlier split (`Partition`)
//! - fit outputs (`FitResult`, `CurveGrid`, `FitQuality`)
//! - render-facing descriptions (`AxisSummary`, `PlotDescription`)

pub mod types;

pub use types::*;
