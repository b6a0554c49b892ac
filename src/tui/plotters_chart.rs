//! Plotters-powered scatter/fit chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::PlotDescription;

/// Render-only view of a [`PlotDescription`].
///
/// All series, bounds and ranges are computed by the pipeline; `render()`
/// only draws.
pub struct OutlierChart<'a> {
    pub plot: &'a PlotDescription,
    /// Formatting of tick labels.
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for OutlierChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.plot.x_range;
        let [y0, y1] = self.plot.y_range;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let plot = self.plot;
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(plot.x_label.as_str())
                .y_desc(plot.y_label.as_str())
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let bound_color = RGBColor(128, 128, 128);
            let curve_color = RGBColor(0, 255, 255); // cyan
            let inlier_color = RGBColor(0, 255, 0); // green
            let outlier_color = RGBColor(255, 0, 0); // red

            // Boundary lines go underneath everything else.
            for line in &plot.bounds {
                chart.draw_series(LineSeries::new([line.from, line.to], &bound_color))?;
            }

            if let Some(curve) = &plot.curve {
                chart.draw_series(LineSeries::new(
                    curve.iter().copied().filter(|(x, y)| x.is_finite() && y.is_finite()),
                    &curve_color,
                ))?;
            }

            // `Pixel` rather than `Circle`: the backend maps circle radii to
            // canvas units and draws them far too large.
            chart.draw_series(
                plot.inliers
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), inlier_color)),
            )?;
            chart.draw_series(
                plot.outliers
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), outlier_color)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
