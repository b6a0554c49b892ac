//! Input/output helpers.
//!
//! - CSV decode + validation (`ingest`)
//! - inlier/outlier table exports (`export`)
//! - plot JSON read/write (`plot_file`)

pub mod export;
pub mod ingest;
pub mod plot_file;

pub use export::*;
pub use ingest::*;
pub use plot_file::*;
