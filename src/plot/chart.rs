//! SVG figure rendering with Plotters.
//!
//! Styling follows the lab figures: black hollow markers, a black fitted curve
//! and a grey tangent.

use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::ReduceError;
use crate::plot::figure::{Figure, Marker};

/// Output size in pixels.
pub const FIGURE_SIZE: (u32, u32) = (640, 480);

const MARKER_SIZE: i32 = 4;
const TANGENT_COLOR: RGBColor = RGBColor(128, 128, 128);

/// Render `figure` to `<dir>/<figure.name>.svg` and return the written path.
pub fn save_figure(figure: &Figure, dir: &Path) -> Result<PathBuf, ReduceError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| ReduceError::Input(format!("failed to create '{}': {e}", dir.display())))?;
    let path = dir.join(format!("{}.svg", figure.name));
    render_svg(figure, &path, FIGURE_SIZE)?;
    log::info!("wrote {}", path.display());
    Ok(path)
}

/// Render `figure` as an SVG file at `path`.
pub fn render_svg(figure: &Figure, path: &Path, size: (u32, u32)) -> Result<(), ReduceError> {
    let bounds = figure
        .bounds()
        .ok_or_else(|| ReduceError::Render(format!("figure `{}` has no finite data", figure.name)))?;

    let root = SVGBackend::new(path, size).into_drawing_area();
    draw(&root, figure, bounds).map_err(|e| ReduceError::Render(format!("{}: {e}", figure.name)))?;
    root.present()
        .map_err(|e| ReduceError::Render(format!("{}: {e}", path.display())))
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    (x0, x1, y0, y1): (f64, f64, f64, f64),
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(56)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .x_labels(6)
        .y_labels(6)
        .label_style(("sans-serif", 14).into_font().color(&BLACK))
        .axis_style(&BLACK)
        .draw()?;

    if figure.curve.len() >= 2 {
        chart.draw_series(LineSeries::new(figure.curve.iter().copied(), BLACK.stroke_width(2)))?;
    }
    if figure.tangent.len() >= 2 {
        chart.draw_series(LineSeries::new(
            figure.tangent.iter().copied(),
            TANGENT_COLOR.stroke_width(2),
        ))?;
    }

    let style = BLACK.stroke_width(1);
    match figure.marker {
        Marker::Circle => {
            chart.draw_series(figure.points.iter().map(|&p| Circle::new(p, MARKER_SIZE, style)))?;
        }
        Marker::Cross => {
            chart.draw_series(figure.points.iter().map(|&p| Cross::new(p, MARKER_SIZE, style)))?;
        }
    }

    Ok(())
}
