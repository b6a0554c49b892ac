//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements, later ones drawn on top:
//! - boundary lines: `:` (vertical), `.` (horizontal)
//! - fitted curve: `-` line
//! - inliers `o`, outliers `x`

use crate::domain::PlotDescription;

const VERTICAL_BOUND: char = ':';
const HORIZONTAL_BOUND: char = '.';
const CURVE: char = '-';
const INLIER: char = 'o';
const OUTLIER: char = 'x';

/// Render a plot description into a `width` x `height` character grid.
pub fn render_ascii_plot(plot: &PlotDescription, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let [x_min, x_max] = plot.x_range;
    let [y_min, y_max] = plot.y_range;

    let mut grid = vec![vec![' '; width]; height];
    let to_cell = |(x, y): (f64, f64)| {
        (
            map_x(x, x_min, x_max, width),
            map_y(y, y_min, y_max, height),
        )
    };

    for line in &plot.bounds {
        let ch = if line.from.0 == line.to.0 {
            VERTICAL_BOUND
        } else {
            HORIZONTAL_BOUND
        };
        let (x0, y0) = to_cell(line.from);
        let (x1, y1) = to_cell(line.to);
        draw_line(&mut grid, x0, y0, x1, y1, ch, &[]);
    }

    if let Some(curve) = &plot.curve {
        let cells: Vec<(usize, usize)> = curve
            .iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|&p| to_cell(p))
            .collect();
        if let Some(&(x, y)) = cells.first() {
            grid[y][x] = CURVE;
        }
        for w in cells.windows(2) {
            let ((x0, y0), (x1, y1)) = (w[0], w[1]);
            draw_line(&mut grid, x0, y0, x1, y1, CURVE, &[VERTICAL_BOUND, HORIZONTAL_BOUND]);
        }
    }

    for &p in &plot.inliers {
        let (x, y) = to_cell(p);
        grid[y][x] = INLIER;
    }
    for &p in &plot.outliers {
        let (x, y) = to_cell(p);
        grid[y][x] = OUTLIER;
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {}=[{x_min:.3}, {x_max:.3}] | {}=[{y_min:.3}, {y_max:.3}]\n",
        plot.x_label, plot.y_label
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    if !plot.equation.is_empty() {
        out.push_str(&plot.equation);
        out.push('\n');
    }

    out
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = unit(t, t_min, t_max);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = unit(y, y_min, y_max);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn unit(v: f64, lo: f64, hi: f64) -> f64 {
    let span = hi - lo;
    if !(span > 0.0) || !v.is_finite() {
        return 0.0;
    }
    ((v - lo) / span).clamp(0.0, 1.0)
}

/// Integer line drawing (Bresenham). Only blank cells and cells holding one of
/// `over` are written.
fn draw_line(
    grid: &mut [Vec<char>],
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
    ch: char,
    over: &[char],
) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            let cell = &mut grid[y0 as usize][x0 as usize];
            if *cell == ' ' || over.contains(cell) {
                *cell = ch;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReferenceLine;

    fn small_plot() -> PlotDescription {
        PlotDescription {
            x_label: "x".to_string(),
            y_label: "y".to_string(),
            inliers: vec![(5.0, 2.0)],
            outliers: vec![(9.0, 4.0)],
            curve: Some(vec![(0.0, 0.0), (10.0, 0.0)]),
            bounds: vec![
                ReferenceLine {
                    label: "x low".to_string(),
                    from: (2.0, 0.0),
                    to: (2.0, 4.0),
                },
                ReferenceLine {
                    label: "y high".to_string(),
                    from: (0.0, 3.0),
                    to: (10.0, 3.0),
                },
            ],
            x_range: [0.0, 10.0],
            y_range: [0.0, 4.0],
            equation: String::new(),
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let txt = render_ascii_plot(&small_plot(), 11, 5);
        let expected = concat!(
            "Plot: x=[0.000, 10.000] | y=[0.000, 4.000]\n",
            "  :      x \n",
            "..:........\n",
            "  :  o     \n",
            "  :        \n",
            "-----------\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn missing_curve_and_equation_line() {
        let mut plot = small_plot();
        plot.curve = None;
        plot.equation = "Fit did not converge".to_string();
        let txt = render_ascii_plot(&plot, 11, 5);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[5], "  :        ");
        assert_eq!(lines[6], "Fit did not converge");
    }
}
