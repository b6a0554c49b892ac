//! Export inlier/outlier sub-tables to CSV.
//!
//! The export carries every column of the source rows, in original order, so
//! it can be opened next to the uploaded file in a spreadsheet.

use std::path::Path;

use crate::domain::Dataset;
use crate::error::{AppError, CoreError};

/// Serialise the rows of `dataset` at `row_indices` (header included).
pub fn subset_csv(dataset: &Dataset, row_indices: &[usize]) -> Result<String, CoreError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(dataset.columns())
        .map_err(|e| CoreError::Encode(e.to_string()))?;

    for &i in row_indices {
        let row = dataset
            .rows()
            .get(i)
            .ok_or_else(|| CoreError::Encode(format!("row index {i} out of range")))?;
        writer
            .write_record(row)
            .map_err(|e| CoreError::Encode(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Encode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CoreError::Encode(e.to_string()))
}

/// Write `rows` of `dataset` to a CSV file at `path`.
pub fn write_subset_csv(path: &Path, dataset: &Dataset, row_indices: &[usize]) -> Result<(), AppError> {
    let text = subset_csv(dataset, row_indices)?;
    std::fs::write(path, text).map_err(|e| {
        AppError::new(2, format!("Failed to write export CSV '{}': {e}", path.display()))
    })?;
    tracing::info!(path = %path.display(), rows = row_indices.len(), "export written");
    Ok(())
}
