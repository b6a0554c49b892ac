//! Read/write plot JSON files.
//!
//! A plot file is the portable form of one dashboard render: the three point
//! series, the four boundary lines, axis ranges and the equation text. It can
//! be drawn again later with `ov plot` without the source data.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{FitResult, PlotDescription};
use crate::error::AppError;

/// On-disk schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotFile {
    pub tool: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub params: Vec<f64>,
    pub plot: PlotDescription,
}

impl PlotFile {
    pub fn new(plot: PlotDescription, fit: Option<&FitResult>) -> Self {
        Self {
            tool: "ov".to_string(),
            model: fit.map(|f| f.model.name().to_string()),
            params: fit.map(|f| f.params.clone()).unwrap_or_default(),
            plot,
        }
    }
}

/// Write a plot JSON file.
pub fn write_plot_json(path: &Path, file: &PlotFile) -> Result<(), AppError> {
    let out = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create plot JSON '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(out, file)
        .map_err(|e| AppError::new(2, format!("Failed to write plot JSON: {e}")))?;
    tracing::info!(path = %path.display(), "plot written");
    Ok(())
}

/// Read a plot JSON file.
pub fn read_plot_json(path: &Path) -> Result<PlotFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open plot JSON '{}': {e}", path.display()))
    })?;
    let plot: PlotFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid plot JSON: {e}")))?;
    Ok(plot)
}
