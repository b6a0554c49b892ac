//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting code stays clean and testable
//! - output changes are localized

use crate::domain::{AxisSummary, Dataset, FitResult, FitSource, Interval};
use crate::fit::selection::ModelRanking;

/// Format the run summary for one fit (dataset, selection, chosen model).
pub fn format_run_summary(
    dataset: &Dataset,
    x_bounds: Interval,
    y_bounds: Interval,
    result: &FitResult,
) -> String {
    let mut out = String::new();

    out.push_str("=== ov - Outlier Visualisation ===\n");
    match dataset.source() {
        Some(src) => {
            out.push_str(&format!("Data: {}", src.name));
            if let Some(ts) = src.modified {
                out.push_str(&format!(" (modified {})", ts.format("%Y-%m-%d %H:%M")));
            }
            out.push('\n');
        }
        None => out.push_str("Data: generated sample\n"),
    }
    out.push_str(&format!(
        "Columns: x = {} | y = {}\n",
        dataset.x_label(),
        dataset.y_label()
    ));
    out.push_str(&format!(
        "Selection: x in [{}, {}] | y in [{}, {}]\n",
        x_bounds.low, x_bounds.high, y_bounds.low, y_bounds.high
    ));
    out.push_str(&format!(
        "Points: n={} | inliers={} | outliers={}\n",
        dataset.len(),
        result.partition.inlier_count(),
        result.partition.outlier_count()
    ));

    out.push_str("\nFit:\n");
    out.push_str(&format!("- model: {}\n", result.model.display_name()));
    match &result.source {
        FitSource::Inliers => out.push_str("- data : inliers\n"),
        FitSource::AllData { inlier_error } => {
            out.push_str(&format!("- data : all points (inlier fit failed: {inlier_error})\n"));
        }
    }
    out.push_str(&format!("- params: {}\n", fmt_vec(&result.params)));
    out.push_str(&format!(
        "- SSE={:.4} RMSE={:.4} BIC={:.3} (n={})\n",
        result.quality.sse, result.quality.rmse, result.quality.bic, result.quality.n
    ));
    out.push_str(&format!("- {}\n", result.equation));
    out.push('\n');

    out
}

/// Format the slider configuration for one column.
pub fn format_axis_summary(summary: &AxisSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}:\n", summary.label));
    out.push_str(&format!("  min    : {}\n", summary.min));
    out.push_str(&format!("  max    : {}\n", summary.max));
    out.push_str(&format!("  step   : {}\n", summary.step));
    out.push_str(&format!("  digits : {}\n", summary.digits));
    let marks: Vec<String> = summary
        .marks
        .iter()
        .map(|m| format!("{} -> \"{}\"", m.position, m.label))
        .collect();
    out.push_str(&format!("  marks  : {}\n", marks.join(", ")));
    out.push_str(&format!(
        "  value  : [{}, {}]\n",
        summary.value[0], summary.value[1]
    ));
    out
}

/// Format the model comparison table (best first).
pub fn format_ranking(ranking: &ModelRanking) -> String {
    let mut out = String::new();

    out.push_str(
        format!(
            "{:<2} {:<14} {:>12} {:>12} {:>12} {:>6} {:<8}\n",
            "", "model", "SSE", "RMSE", "BIC", "n", "data"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<2} {:-<14} {:-<12} {:-<12} {:-<12} {:-<6} {:-<8}\n",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for (i, sf) in ranking.fits.iter().enumerate() {
        let chosen = if i == 0 { "*" } else { " " };
        let data = if sf.source.is_fallback() { "all" } else { "inliers" };
        out.push_str(
            format!(
                "{chosen:<2} {:<14} {:>12.4} {:>12.4} {:>12.3} {:>6} {:<8}\n",
                truncate(sf.fit.model.display_name(), 14),
                sf.fit.quality.sse,
                sf.fit.quality.rmse,
                sf.fit.quality.bic,
                sf.fit.quality.n,
                data,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    for (model, err) in &ranking.failures {
        out.push_str(&format!("  (failed {}) {err}\n", model.display_name()));
    }

    out
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitQuality, Partition};
    use crate::fit::fitter::{ModelFit, SourcedFit};
    use crate::models::ModelKind;
    use crate::report::axis::summarize_axis;

    #[test]
    fn ranking_marks_best_and_failures() {
        let ranking = ModelRanking {
            fits: vec![SourcedFit {
                fit: ModelFit {
                    model: ModelKind::Linear,
                    params: vec![2.0, 1.0],
                    quality: FitQuality { sse: 0.5, rmse: 0.1, bic: -10.0, n: 50 },
                },
                source: FitSource::Inliers,
            }],
            failures: vec![(
                ModelKind::Root,
                crate::error::CoreError::Solver("model is not finite at the initial guess".into()),
            )],
        };
        let text = format_ranking(&ranking);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[2].starts_with("*  linear"));
        assert!(lines[2].ends_with("inliers"));
        assert!(lines[3].contains("(failed sqrt(x))"));
    }

    #[test]
    fn axis_summary_lists_marks() {
        let s = summarize_axis(&[0.0, 1.0], "x").unwrap();
        let text = format_axis_summary(&s);
        assert!(text.starts_with("x:\n"));
        assert!(text.contains("0 -> \"x=0.0\", 1 -> \"1.0\""));
    }

    #[test]
    fn run_summary_reports_fallback() {
        let ds = Dataset::from_columns("a", "b", vec![1.0, 2.0], vec![1.0, 2.0]).unwrap();
        let result = FitResult {
            model: ModelKind::Linear,
            params: vec![1.0, 0.0],
            source: FitSource::AllData { inlier_error: "too few points".into() },
            quality: FitQuality { sse: 0.0, rmse: 0.0, bic: 0.0, n: 2 },
            grid: Default::default(),
            equation: "y = 1.00e+00*x + 0.00e+00".into(),
            partition: Partition::default(),
        };
        let text = format_run_summary(
            &ds,
            Interval::new(0.0, 1.0),
            Interval::new(0.0, 1.0),
            &result,
        );
        assert!(text.contains("Data: generated sample"));
        assert!(text.contains("all points (inlier fit failed: too few points)"));
        assert!(text.contains("y = 1.00e+00*x + 0.00e+00"));
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("piecewise (2)", 20), "piecewise (2)");
        assert_eq!(truncate("abcdef", 4), "abc.");
    }
}
