//! Command-line parsing for the outlier visualiser.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting code. Values left unset here fall back to the
//! environment (`config::Settings`) and then to built-in defaults.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ov", version, about = "Outlier visualiser: bound inliers, fit a curve")]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Partition by the bounds, fit one model, print the result and optionally plot/export.
    Fit(FitArgs),
    /// Fit every model to the same selection and print them ordered by BIC.
    Rank(RankArgs),
    /// Print slider bounds, step and tick labels for both columns.
    Axis(AxisArgs),
    /// Plot a previously exported plot JSON.
    Plot(PlotArgs),
    /// Launch the interactive dashboard.
    ///
    /// This uses the same underlying pipeline as `ov fit`, but renders results
    /// in a terminal UI using Ratatui.
    Tui(TuiArgs),
}

/// Where the data comes from.
#[derive(Debug, Args, Clone, Default)]
pub struct DataArgs {
    /// Data file (CSV or spreadsheet; first two columns are x and y). Defaults to OV_DATA,
    /// then to the generated sample.
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Choose a data file from the current directory tree interactively.
    #[arg(long, conflicts_with = "file")]
    pub pick: bool,

    /// Random seed for the sample dataset (defaults to OV_SEED, then 42).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of random points in the sample dataset.
    #[arg(short = 'n', long, default_value_t = 150)]
    pub sample_count: usize,
}

/// Bounds, model and grid resolution.
#[derive(Debug, Args, Clone)]
pub struct SelectionArgs {
    /// Model name or label (linear, quadratic, cubic, fourth, power, root,
    /// piecewise_2, piecewise_3).
    #[arg(short = 'm', long, default_value = "linear")]
    pub model: String,

    /// Lower x bound (defaults to the initial slider value).
    #[arg(long, allow_negative_numbers = true)]
    pub x_lo: Option<f64>,

    /// Upper x bound.
    #[arg(long, allow_negative_numbers = true)]
    pub x_hi: Option<f64>,

    /// Lower y bound.
    #[arg(long, allow_negative_numbers = true)]
    pub y_lo: Option<f64>,

    /// Upper y bound.
    #[arg(long, allow_negative_numbers = true)]
    pub y_hi: Option<f64>,

    /// Number of points in the fit curve (defaults to OV_RESOLUTION, then 100).
    #[arg(long)]
    pub resolution: Option<usize>,

    /// Slider steps the default bounds sit inside the data range
    /// (defaults to OV_INSET_STEPS, then 10).
    #[arg(long)]
    pub inset_steps: Option<f64>,
}

/// Options for `ov fit`.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Write the inlier rows (all columns) to CSV.
    #[arg(long)]
    pub export_inliers: Option<PathBuf>,

    /// Write the outlier rows (all columns) to CSV.
    #[arg(long)]
    pub export_outliers: Option<PathBuf>,

    /// Write the plot description to JSON (re-draw with `ov plot`).
    #[arg(long)]
    pub export_plot: Option<PathBuf>,
}

/// Options for `ov rank`.
#[derive(Debug, Args, Clone)]
pub struct RankArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Include the piecewise models.
    #[arg(long)]
    pub all: bool,
}

/// Options for `ov axis`.
#[derive(Debug, Args, Clone)]
pub struct AxisArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Slider steps the initial selection sits inside the data range.
    #[arg(long)]
    pub inset_steps: Option<f64>,
}

/// Options for `ov tui`.
#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Initially selected model.
    #[arg(short = 'm', long, default_value = "linear")]
    pub model: String,

    /// Number of points in the fit curve.
    #[arg(long)]
    pub resolution: Option<usize>,

    /// Slider steps the initial bounds sit inside the data range.
    #[arg(long)]
    pub inset_steps: Option<f64>,
}

/// Options for plotting a saved plot file.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Plot JSON file produced by `ov fit --export-plot`.
    #[arg(long, value_name = "JSON")]
    pub file: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_flags_parse() {
        let cli = Cli::parse_from([
            "ov", "fit", "-f", "data.csv", "--model", "x^2", "--x-lo", "-1.5", "--x-hi", "2",
            "--no-plot", "--export-inliers", "in.csv",
        ]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.data.file, Some(PathBuf::from("data.csv")));
        assert_eq!(args.selection.model, "x^2");
        assert_eq!(args.selection.x_lo, Some(-1.5));
        assert_eq!(args.selection.x_hi, Some(2.0));
        assert_eq!(args.selection.y_lo, None);
        assert!(args.no_plot);
        assert_eq!(args.export_inliers, Some(PathBuf::from("in.csv")));
    }

    #[test]
    fn rank_all_and_global_verbose() {
        let cli = Cli::parse_from(["ov", "rank", "--all", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Rank(RankArgs { all: true, .. })));
    }

    #[test]
    fn pick_conflicts_with_file() {
        assert!(Cli::try_parse_from(["ov", "fit", "--pick", "-f", "a.csv"]).is_err());
    }
}
