//! `outlier-viz` library crate.
//!
//! The binary (`ov`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the fitting pipeline can be driven from the CLI, the TUI or a test
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;
