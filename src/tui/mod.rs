//! Ratatui-based terminal UI.
//!
//! The dashboard shows the scatter plot (inliers, outliers, fit curve and the
//! four boundary lines) above a settings panel holding the two range sliders
//! and the model selector. Every change re-runs the whole pipeline with the
//! current dataset and bounds.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::pipeline::{DashboardView, FitStatus, run_dashboard};
use crate::cli::picker::{discover_data_files, pretty_path};
use crate::domain::{AxisSummary, Dataset, Interval};
use crate::error::AppError;
use crate::models::ModelKind;
use crate::report::{format_tick, summarize_axis_inset};

mod plotters_chart;

use plotters_chart::OutlierChart;

/// Steps moved per key press with Shift held.
const FAST_STEPS: f64 = 10.0;

/// Where the dashboard's data comes from.
#[derive(Debug, Clone)]
pub struct TuiOptions {
    pub dataset: Dataset,
    /// Files offered by `o`; discovered under the current directory when empty.
    pub files: Vec<PathBuf>,
    pub model: ModelKind,
    pub resolution: usize,
    pub inset_steps: f64,
}

/// Start the TUI.
pub fn run(mut opts: TuiOptions) -> Result<(), AppError> {
    if opts.files.is_empty() {
        opts.files = discover_data_files();
    }
    let mut app = App::new(opts)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    XLow,
    XHigh,
    YLow,
    YHigh,
    Model,
}

impl Field {
    const ALL: [Field; 5] = [Field::XLow, Field::XHigh, Field::YLow, Field::YHigh, Field::Model];
}

struct App {
    dataset: Dataset,
    /// Sample dataset, restored when `o` wraps past the last file.
    sample: Dataset,
    files: Vec<PathBuf>,
    /// Index into `files`; `None` while showing the sample.
    file_idx: Option<usize>,
    model: ModelKind,
    resolution: usize,
    inset_steps: f64,
    x_axis: AxisSummary,
    y_axis: AxisSummary,
    x_bounds: Interval,
    y_bounds: Interval,
    selected: usize,
    status: String,
    view: Option<DashboardView>,
}

impl App {
    fn new(opts: TuiOptions) -> Result<Self, AppError> {
        let x_axis = summarize_axis_inset(opts.dataset.x(), opts.dataset.x_label(), opts.inset_steps)?;
        let y_axis = summarize_axis_inset(opts.dataset.y(), opts.dataset.y_label(), opts.inset_steps)?;
        let mut app = Self {
            sample: opts.dataset.clone(),
            dataset: opts.dataset,
            files: opts.files,
            file_idx: None,
            model: opts.model,
            resolution: opts.resolution,
            inset_steps: opts.inset_steps,
            x_bounds: x_axis.initial_interval(),
            y_bounds: y_axis.initial_interval(),
            x_axis,
            y_axis,
            selected: 0,
            status: String::new(),
            view: None,
        };
        app.recompute();
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let steps = if key.modifiers.contains(KeyModifiers::SHIFT) {
            FAST_STEPS
        } else {
            1.0
        };

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => self.selected = (self.selected + 1).min(Field::ALL.len() - 1),
            KeyCode::Left => self.adjust(-steps),
            KeyCode::Right => self.adjust(steps),
            KeyCode::Char('m') => self.set_model(self.model.next_selectable()),
            KeyCode::Char('M') => self.set_model(self.model.prev_selectable()),
            KeyCode::Char('r') => {
                self.reset_bounds();
                self.status = "Bounds reset.".to_string();
                self.recompute();
            }
            KeyCode::Char('o') => self.next_file(),
            KeyCode::Char('e') => self.export(),
            _ => {}
        }
        false
    }

    fn adjust(&mut self, steps: f64) {
        match Field::ALL[self.selected] {
            Field::XLow => {
                let v = step_value(self.x_bounds.low, steps, &self.x_axis);
                self.x_bounds.low = v.min(self.x_bounds.high);
            }
            Field::XHigh => {
                let v = step_value(self.x_bounds.high, steps, &self.x_axis);
                self.x_bounds.high = v.max(self.x_bounds.low);
            }
            Field::YLow => {
                let v = step_value(self.y_bounds.low, steps, &self.y_axis);
                self.y_bounds.low = v.min(self.y_bounds.high);
            }
            Field::YHigh => {
                let v = step_value(self.y_bounds.high, steps, &self.y_axis);
                self.y_bounds.high = v.max(self.y_bounds.low);
            }
            Field::Model => {
                let next = if steps >= 0.0 {
                    self.model.next_selectable()
                } else {
                    self.model.prev_selectable()
                };
                self.set_model(next);
                return;
            }
        }
        self.recompute();
    }

    fn set_model(&mut self, model: ModelKind) {
        self.model = model;
        self.status = format!("model: {}", model.display_name());
        self.recompute();
    }

    fn reset_bounds(&mut self) {
        self.x_bounds = self.x_axis.initial_interval();
        self.y_bounds = self.y_axis.initial_interval();
    }

    /// Replace the dataset; sliders and bounds follow the new columns.
    fn load_dataset(&mut self, dataset: Dataset) -> Result<(), AppError> {
        let x_axis = summarize_axis_inset(dataset.x(), dataset.x_label(), self.inset_steps)?;
        let y_axis = summarize_axis_inset(dataset.y(), dataset.y_label(), self.inset_steps)?;
        self.dataset = dataset;
        self.x_axis = x_axis;
        self.y_axis = y_axis;
        self.reset_bounds();
        self.recompute();
        Ok(())
    }

    fn next_file(&mut self) {
        if self.files.is_empty() {
            self.status = "No data files found under the current directory.".to_string();
            return;
        }
        let next = match self.file_idx {
            None => Some(0),
            Some(i) if i + 1 < self.files.len() => Some(i + 1),
            Some(_) => None,
        };

        let loaded = match next {
            Some(i) => crate::io::ingest::load_dataset(&self.files[i]).map(|ingested| {
                let skipped = ingested.row_errors.len();
                (ingested.dataset, format!("loaded {} ({skipped} row(s) skipped)", pretty_path(&self.files[i])))
            }),
            None => Ok((self.sample.clone(), "sample dataset".to_string())),
        };

        // The index moves on even for a bad file so it does not block the rest.
        self.file_idx = next;
        match loaded.and_then(|(ds, msg)| self.load_dataset(ds).map(|()| msg)) {
            Ok(msg) => {
                if self.view.is_some() {
                    self.status = msg;
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "dataset load failed");
                self.status = format!("Error: {err}");
            }
        }
    }

    fn export(&mut self) {
        let Some(view) = &self.view else {
            self.status = "Nothing to export.".to_string();
            return;
        };
        let result = std::fs::write("inliers.csv", &view.inliers_csv)
            .and_then(|()| std::fs::write("outliers.csv", &view.outliers_csv));
        match result {
            Ok(()) => {
                tracing::info!(
                    inliers = view.partition.inlier_count(),
                    outliers = view.partition.outlier_count(),
                    "export written"
                );
                self.status = "Wrote inliers.csv and outliers.csv.".to_string();
            }
            Err(e) => self.status = format!("Error: export failed: {e}"),
        }
    }

    fn recompute(&mut self) {
        match run_dashboard(
            &self.dataset,
            self.x_bounds,
            self.y_bounds,
            self.model.name(),
            self.resolution,
            self.inset_steps,
        ) {
            Ok(view) => {
                match &view.status {
                    FitStatus::Fitted => {}
                    FitStatus::FittedOnAllData { inlier_error } => {
                        tracing::warn!(model = %self.model, %inlier_error, "fit used all data");
                    }
                    FitStatus::Failed { reason } => {
                        tracing::warn!(model = %self.model, %reason, "fit failed");
                    }
                }
                self.view = Some(view);
            }
            Err(err) => {
                self.status = format!("Error: {err}");
                self.view = None;
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let source = match self.dataset.source() {
            Some(src) => match src.modified {
                Some(ts) => format!("{} ({})", src.name, ts.format("%Y-%m-%d %H:%M")),
                None => src.name.clone(),
            },
            None => "sample dataset".to_string(),
        };

        let mut lines = vec![Line::from(vec![
            Span::styled("ov", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | {source} | n={}", self.dataset.len())),
        ])];

        if let Some(view) = &self.view {
            let style = match view.status {
                FitStatus::Failed { .. } => Style::default().fg(Color::Red),
                FitStatus::FittedOnAllData { .. } => Style::default().fg(Color::Yellow),
                FitStatus::Fitted => Style::default().fg(Color::Gray),
            };
            let mut text = view.equation.clone();
            if matches!(view.status, FitStatus::FittedOnAllData { .. }) {
                text.push_str("  (fitted on all points)");
            }
            lines.push(Line::from(Span::styled(text, style)));
        }

        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(8)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = match &self.view {
            Some(v) => format!(
                "{} inliers / {} outliers",
                v.partition.inlier_count(),
                v.partition.outlier_count()
            ),
            None => "Plot".to_string(),
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(view) = &self.view else {
            let msg = Paragraph::new("No plot for the current selection.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let widget = OutlierChart {
            plot: &view.plot,
            fmt_x: fmt_axis,
            fmt_y: fmt_axis,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = Field::ALL
            .iter()
            .map(|&f| ListItem::new(self.field_label(f)))
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Selection").borders(Borders::ALL))
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn field_label(&self, field: Field) -> String {
        let x = &self.x_axis;
        let y = &self.y_axis;
        match field {
            Field::XLow => format!(
                "{} low : {}   [{} .. {}, step {}]",
                x.label,
                format_tick(self.x_bounds.low, x.digits),
                format_tick(x.min, x.digits),
                format_tick(x.max, x.digits),
                x.step
            ),
            Field::XHigh => format!("{} high: {}", x.label, format_tick(self.x_bounds.high, x.digits)),
            Field::YLow => format!(
                "{} low : {}   [{} .. {}, step {}]",
                y.label,
                format_tick(self.y_bounds.low, y.digits),
                format_tick(y.min, y.digits),
                format_tick(y.max, y.digits),
                y.step
            ),
            Field::YHigh => format!("{} high: {}", y.label, format_tick(self.y_bounds.high, y.digits)),
            Field::Model => format!("Model: {}", self.model.display_name()),
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust (Shift x10)  m model  o open file  e export  r reset  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Move `value` by `steps` slider steps, staying inside the column range.
fn step_value(value: f64, steps: f64, axis: &AxisSummary) -> f64 {
    (value + steps * axis.step).clamp(axis.min, axis.max)
}

fn fmt_axis(v: f64) -> String {
    if v.abs() >= 100.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let x: Vec<f64> = (0..=200).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 0.5 * v + 1.0).collect();
        let dataset = Dataset::from_columns("x", "y", x, y).unwrap();
        App::new(TuiOptions {
            dataset,
            files: Vec::new(),
            model: ModelKind::Linear,
            resolution: 50,
            inset_steps: 10.0,
        })
        .unwrap()
    }

    fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
        app.handle_key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn starts_with_inset_bounds_and_a_fit() {
        let app = app();
        assert_eq!(app.x_axis.step, 1.0);
        assert_eq!(app.x_bounds, Interval::new(10.0, 190.0));
        let view = app.view.as_ref().unwrap();
        assert_eq!(view.status, FitStatus::Fitted);
        assert_eq!(view.partition.inlier_count() + view.partition.outlier_count(), 201);
    }

    #[test]
    fn arrows_step_and_shift_steps_ten() {
        let mut app = app();
        press(&mut app, KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(app.x_bounds.low, 11.0);
        press(&mut app, KeyCode::Left, KeyModifiers::SHIFT);
        assert_eq!(app.x_bounds.low, 1.0);
        press(&mut app, KeyCode::Left, KeyModifiers::SHIFT);
        assert_eq!(app.x_bounds.low, 0.0);
    }

    #[test]
    fn low_never_passes_high() {
        let mut app = app();
        for _ in 0..50 {
            press(&mut app, KeyCode::Right, KeyModifiers::SHIFT);
        }
        assert_eq!(app.x_bounds.low, app.x_bounds.high);
    }

    #[test]
    fn model_cycles_and_reset_restores_bounds() {
        let mut app = app();
        press(&mut app, KeyCode::Char('m'), KeyModifiers::NONE);
        assert_eq!(app.model, ModelKind::Quadratic);
        press(&mut app, KeyCode::Right, KeyModifiers::NONE);
        press(&mut app, KeyCode::Char('r'), KeyModifiers::NONE);
        assert_eq!(app.x_bounds, Interval::new(10.0, 190.0));
    }

    #[test]
    fn open_without_files_reports() {
        let mut app = app();
        press(&mut app, KeyCode::Char('o'), KeyModifiers::NONE);
        assert!(app.status.contains("No data files"));
    }

    #[test]
    fn q_quits() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Char('q'), KeyModifiers::NONE));
    }
}
