//! Line plots of training curves (SVG output).
//!
//! Uses the SVG backend to avoid system font dependencies.

use std::path::Path;

use plotters::prelude::*;

use crate::error::AgentError;

fn plot_error<E: std::fmt::Display>(e: E) -> AgentError {
    AgentError::Plot(e.to_string())
}

/// Draws `series` against its index, replacing any existing file at `path`.
///
/// Non-finite values are skipped.
pub fn line_plot(path: &Path, title: &str, series: &[f64]) -> Result<(), AgentError> {
    let root = SVGBackend::new(path, (800, 500)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let points: Vec<(usize, f64)> = series
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .collect();

    let (mut y_min, mut y_max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| {
            (lo.min(*v), hi.max(*v))
        });
    if points.is_empty() {
        (y_min, y_max) = (0.0, 1.0);
    } else if y_min == y_max {
        y_min -= 0.5;
        y_max += 0.5;
    }

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0..series.len().max(1), y_min..y_max)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("Record")
        .draw()
        .map_err(plot_error)?;

    chart
        .draw_series(LineSeries::new(points, &BLUE))
        .map_err(plot_error)?;

    root.present().map_err(plot_error)?;
    Ok(())
}
