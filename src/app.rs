//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs logging and reads environment defaults
//! - loads the data file (or generates the sample dataset)
//! - runs the fit pipeline
//! - prints reports/plots
//! - writes optional exports

use std::io;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{AxisArgs, Command, DataArgs, FitArgs, PlotArgs, RankArgs, SelectionArgs, TuiArgs};
use crate::config::Settings;
use crate::domain::{Dataset, FitConfig, Interval};
use crate::error::AppError;
use crate::models::ModelKind;

pub mod pipeline;

use pipeline::FitStatus;

/// Entry point for the `ov` binary.
pub fn run() -> Result<(), AppError> {
    // `ov` with no subcommand (or only flags) behaves like `ov tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // The dashboard owns the terminal; anything below `error` would draw over it.
    let default_level = match (&cli.command, cli.verbose) {
        (Command::Tui(_), _) => "error",
        (_, true) => "debug",
        (_, false) => "info",
    };
    init_tracing(default_level);

    let settings = Settings::from_env()?;

    match cli.command {
        Command::Fit(args) => handle_fit(args, &settings),
        Command::Rank(args) => handle_rank(args, &settings),
        Command::Axis(args) => handle_axis(args, &settings),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => handle_tui(args, &settings),
    }
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn handle_fit(args: FitArgs, settings: &Settings) -> Result<(), AppError> {
    let config = fit_config_from_args(&args, settings);
    let dataset = load_data(&args.data, &config)?;
    let (x_bounds, y_bounds) = resolve_bounds(&dataset, &config)?;

    let view = pipeline::run_dashboard(
        &dataset,
        x_bounds,
        y_bounds,
        &config.model,
        config.resolution,
        config.inset_steps,
    )?;

    if let Some(fit) = &view.fit {
        println!(
            "{}",
            crate::report::format_run_summary(&dataset, x_bounds, y_bounds, fit)
        );
    }
    println!("{}", crate::report::format_axis_summary(&view.x_axis));
    println!("{}", crate::report::format_axis_summary(&view.y_axis));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(&view.plot, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_inliers {
        crate::io::export::write_subset_csv(path, &dataset, &view.partition.inlier_rows)?;
    }
    if let Some(path) = &config.export_outliers {
        crate::io::export::write_subset_csv(path, &dataset, &view.partition.outlier_rows)?;
    }
    if let Some(path) = &config.export_plot {
        let file = crate::io::plot_file::PlotFile::new(view.plot.clone(), view.fit.as_ref());
        crate::io::plot_file::write_plot_json(path, &file)?;
    }

    match view.status {
        FitStatus::Fitted => Ok(()),
        FitStatus::FittedOnAllData { inlier_error } => {
            tracing::warn!(model = %config.model, %inlier_error, "inlier fit failed; fitted on all points");
            Ok(())
        }
        FitStatus::Failed { reason } => Err(AppError::new(4, reason)),
    }
}

fn handle_rank(args: RankArgs, settings: &Settings) -> Result<(), AppError> {
    let mut config = selection_config(&args.data, &args.selection, settings);
    config.include_piecewise = args.all;

    let dataset = load_data(&args.data, &config)?;
    let (x_bounds, y_bounds) = resolve_bounds(&dataset, &config)?;
    let part = crate::fit::partition(dataset.x(), dataset.y(), x_bounds, y_bounds)?;

    let models: &[ModelKind] = if config.include_piecewise {
        &ModelKind::ALL
    } else {
        &ModelKind::SELECTABLE
    };
    let ranking = crate::fit::rank_models(models, &part, dataset.x(), dataset.y());
    for (model, err) in &ranking.failures {
        tracing::warn!(%model, error = %err, "fit failed");
    }

    println!(
        "Selection: x in [{}, {}] | y in [{}, {}] | inliers={} outliers={}\n",
        x_bounds.low,
        x_bounds.high,
        y_bounds.low,
        y_bounds.high,
        part.inlier_count(),
        part.outlier_count()
    );
    println!("{}", crate::report::format_ranking(&ranking));

    if ranking.fits.is_empty() {
        return Err(AppError::new(4, "No model could be fitted to this selection."));
    }
    Ok(())
}

fn handle_axis(args: AxisArgs, settings: &Settings) -> Result<(), AppError> {
    let config = FitConfig {
        inset_steps: args.inset_steps.unwrap_or(settings.inset_steps),
        ..base_config(&args.data, settings)
    };
    let dataset = load_data(&args.data, &config)?;

    let x = crate::report::summarize_axis_inset(dataset.x(), dataset.x_label(), config.inset_steps)?;
    let y = crate::report::summarize_axis_inset(dataset.y(), dataset.y_label(), config.inset_steps)?;
    println!("{}", crate::report::format_axis_summary(&x));
    println!("{}", crate::report::format_axis_summary(&y));
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::plot_file::read_plot_json(&args.file)?;
    let plot = crate::plot::render_ascii_plot(&file.plot, args.width, args.height);
    println!("{plot}");
    Ok(())
}

fn handle_tui(args: TuiArgs, settings: &Settings) -> Result<(), AppError> {
    let config = FitConfig {
        model: args.model.clone(),
        resolution: args.resolution.unwrap_or(settings.resolution),
        inset_steps: args.inset_steps.unwrap_or(settings.inset_steps),
        ..base_config(&args.data, settings)
    };
    let model: ModelKind = config.model.parse()?;
    let dataset = load_data(&args.data, &config)?;

    crate::tui::run(crate::tui::TuiOptions {
        dataset,
        files: Vec::new(),
        model,
        resolution: config.resolution,
        inset_steps: config.inset_steps,
    })
}

/// Resolve the `ov fit` configuration: CLI flags, then environment, then defaults.
pub fn fit_config_from_args(args: &FitArgs, settings: &Settings) -> FitConfig {
    FitConfig {
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_inliers: args.export_inliers.clone(),
        export_outliers: args.export_outliers.clone(),
        export_plot: args.export_plot.clone(),
        ..selection_config(&args.data, &args.selection, settings)
    }
}

fn selection_config(data: &DataArgs, sel: &SelectionArgs, settings: &Settings) -> FitConfig {
    let x_bounds = match (sel.x_lo, sel.x_hi) {
        (None, None) => None,
        (lo, hi) => Some(Interval::new(lo.unwrap_or(f64::NAN), hi.unwrap_or(f64::NAN))),
    };
    let y_bounds = match (sel.y_lo, sel.y_hi) {
        (None, None) => None,
        (lo, hi) => Some(Interval::new(lo.unwrap_or(f64::NAN), hi.unwrap_or(f64::NAN))),
    };
    FitConfig {
        model: sel.model.clone(),
        x_bounds,
        y_bounds,
        resolution: sel.resolution.unwrap_or(settings.resolution),
        inset_steps: sel.inset_steps.unwrap_or(settings.inset_steps),
        ..base_config(data, settings)
    }
}

fn base_config(data: &DataArgs, settings: &Settings) -> FitConfig {
    FitConfig {
        data_path: data.file.clone().or_else(|| settings.data_path.clone()),
        model: ModelKind::Linear.name().to_string(),
        x_bounds: None,
        y_bounds: None,
        resolution: settings.resolution,
        inset_steps: settings.inset_steps,
        sample_seed: data.seed.unwrap_or(settings.seed),
        sample_count: data.sample_count,
        include_piecewise: false,
        plot: false,
        plot_width: 100,
        plot_height: 25,
        export_inliers: None,
        export_outliers: None,
        export_plot: None,
    }
}

/// Fill unset bounds (or unset ends, stored as NaN) from the initial slider
/// values of each column.
fn resolve_bounds(dataset: &Dataset, config: &FitConfig) -> Result<(Interval, Interval), AppError> {
    let x_axis = crate::report::summarize_axis_inset(dataset.x(), dataset.x_label(), config.inset_steps)?;
    let y_axis = crate::report::summarize_axis_inset(dataset.y(), dataset.y_label(), config.inset_steps)?;
    Ok((
        fill_interval(config.x_bounds, x_axis.initial_interval()),
        fill_interval(config.y_bounds, y_axis.initial_interval()),
    ))
}

fn fill_interval(given: Option<Interval>, default: Interval) -> Interval {
    match given {
        None => default,
        Some(iv) => Interval::new(
            if iv.low.is_nan() { default.low } else { iv.low },
            if iv.high.is_nan() { default.high } else { iv.high },
        ),
    }
}

/// Load the dataset named by `--file`/`--pick`/`OV_DATA`, or generate the sample.
fn load_data(data: &DataArgs, config: &FitConfig) -> Result<Dataset, AppError> {
    let path = if data.pick {
        Some(crate::cli::picker::prompt_for_data_path()?)
    } else {
        config.data_path.clone()
    };

    match path {
        Some(path) => Ok(crate::io::ingest::load_dataset(&path)?.dataset),
        None => {
            tracing::info!(
                seed = config.sample_seed,
                count = config.sample_count,
                "no data file given; using the sample dataset"
            );
            crate::data::generate_sample(config.sample_seed, config.sample_count)
        }
    }
}

/// Rewrite argv so `ov` defaults to `ov tui`.
///
/// Rules:
/// - `ov`                      -> `ov tui`
/// - `ov -f data.csv ...`      -> `ov tui -f data.csv ...`
/// - `ov --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "rank" | "axis" | "plot" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
