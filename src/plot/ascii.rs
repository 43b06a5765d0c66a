//! Terminal preview of a `Figure` on a fixed character grid.
//!
//! Output is deterministic for a given size, so previews can be compared
//! verbatim in tests. Glyphs:
//! - `o` / `x`: measured points (circle / cross markers)
//! - `-`: fitted curve
//! - `.`: tangent construction

use crate::plot::figure::{Figure, Marker};

/// Render a figure preview on a `width` × `height` character grid.
pub fn render_ascii_plot(figure: &Figure, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let (x_min, x_max, y_min, y_max) = figure.bounds().unwrap_or((0.0, 1.0, 0.0, 1.0));

    let mut grid = vec![vec![' '; width]; height];
    let frame = Frame {
        x_min,
        x_max,
        y_min,
        y_max,
        width,
        height,
    };

    // Lines first so points can overlay.
    draw_polyline(&mut grid, &figure.curve, &frame, '-');
    draw_polyline(&mut grid, &figure.tangent, &frame, '.');

    let ch = match figure.marker {
        Marker::Circle => 'o',
        Marker::Cross => 'x',
    };
    for &(x, y) in &figure.points {
        if x.is_finite() && y.is_finite() {
            grid[frame.row(y)][frame.col(x)] = ch;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} | x=[{x_min:.3}, {x_max:.3}] | y=[{y_min:.3}, {y_max:.3}]\n",
        figure.name
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

struct Frame {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    width: usize,
    height: usize,
}

impl Frame {
    fn col(&self, x: f64) -> usize {
        let u = ((x - self.x_min) / (self.x_max - self.x_min)).clamp(0.0, 1.0);
        (u * (self.width as f64 - 1.0)).round() as usize
    }

    fn row(&self, y: f64) -> usize {
        let u = ((y - self.y_min) / (self.y_max - self.y_min)).clamp(0.0, 1.0);
        // y=top is max -> row 0
        (self.height as f64 - 1.0 - (u * (self.height as f64 - 1.0))).round() as usize
    }
}

fn draw_polyline(grid: &mut [Vec<char>], line: &[(f64, f64)], frame: &Frame, ch: char) {
    let cells: Vec<(usize, usize)> = line
        .iter()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|&(x, y)| (frame.col(x), frame.row(y)))
        .collect();
    match cells.as_slice() {
        [] => {}
        [only] => draw_segment(grid, *only, *only, ch),
        _ => {
            for pair in cells.windows(2) {
                draw_segment(grid, pair[0], pair[1], ch);
            }
        }
    }
}

/// Step along the segment one cell at a time on its longer axis; occupied cells are kept.
fn draw_segment(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let (c0, r0) = (from.0 as f64, from.1 as f64);
    let (dc, dr) = (to.0 as f64 - c0, to.1 as f64 - r0);
    let steps = dc.abs().max(dr.abs()).max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let col = (c0 + t * dc).round() as usize;
        let row = (r0 + t * dr).round() as usize;
        if let Some(cell) = grid.get_mut(row).and_then(|r| r.get_mut(col)) {
            if *cell == ' ' {
                *cell = ch;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_golden_snapshot_small() {
        let fig = Figure {
            name: "distance-photocurrent",
            x_label: String::new(),
            y_label: String::new(),
            points: vec![(0.0, 0.0), (9.0, 4.0)],
            marker: Marker::Cross,
            curve: vec![(0.0, 0.0), (9.0, 0.0)],
            tangent: vec![],
        };

        let txt = render_ascii_plot(&fig, 10, 5);
        let expected = concat!(
            "Plot: distance-photocurrent | x=[-0.450, 9.450] | y=[-0.200, 4.200]\n",
            "         x\n",
            "\n",
            "\n",
            "\n",
            "x---------\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn tangent_uses_its_own_glyph() {
        let fig = Figure {
            name: "spectra",
            x_label: String::new(),
            y_label: String::new(),
            points: vec![],
            marker: Marker::Circle,
            curve: vec![],
            tangent: vec![(0.0, 0.0), (1.0, 1.0)],
        };
        let txt = render_ascii_plot(&fig, 12, 6);
        let body: Vec<_> = txt.lines().skip(1).collect();
        assert!(body.iter().any(|l| l.contains('.')));
        assert!(body.iter().all(|l| !l.contains('-')));
    }
}
