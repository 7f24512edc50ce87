//! Diagnostic figure for a Beta fit: sample density histogram with the fitted
//! density drawn over it, in the variable's own domain.
//!
//! The figure carries no text so it renders without a system font stack.

use std::path::Path;

use plotters::prelude::*;

use crate::constants::{PLOT_BINS, PLOT_POINTS, PLOT_SIZE};
use crate::error::{AnalysisError, Result};
use crate::fit::FittedVariable;

/// One histogram bar: `[lower, upper)` with density height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityBin {
    pub lower: f64,
    pub upper: f64,
    pub density: f64,
}

/// Equal-width bins over `[min, max]` of the samples, normalised so the
/// bar areas sum to 1. The last bin is closed on the right.
pub fn density_histogram(samples: &[f64], bins: usize) -> Vec<DensityBin> {
    if samples.is_empty() || bins == 0 {
        return Vec::new();
    }
    let lo = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, lo + 0.5) };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &s in samples {
        let idx = (((s - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    let n = samples.len() as f64;
    counts
        .iter()
        .enumerate()
        .map(|(i, &c)| DensityBin {
            lower: lo + i as f64 * width,
            upper: lo + (i + 1) as f64 * width,
            density: c as f64 / (n * width),
        })
        .collect()
}

/// Fitted density evaluated on an even grid over [0, 1], shifted into the
/// variable's domain. Non-finite boundary values are dropped.
pub fn density_curve(fit: &FittedVariable, points: usize) -> Result<Vec<(f64, f64)>> {
    let mut curve = Vec::with_capacity(points);
    for i in 0..points {
        let x = i as f64 / (points.max(2) - 1) as f64;
        let y = fit.shape.pdf(x)?;
        if y.is_finite() {
            curve.push((x - fit.offset, y));
        }
    }
    Ok(curve)
}

/// Write `<path>` as a PNG.
pub fn render_fit(path: &Path, fit: &FittedVariable) -> Result<()> {
    let shown: Vec<f64> = fit.samples.iter().map(|s| s - fit.offset).collect();
    let bins = density_histogram(&shown, PLOT_BINS);
    let curve = density_curve(fit, PLOT_POINTS)?;

    draw(path, &bins, &curve, fit.offset).map_err(|e| AnalysisError::Plot(format!("{}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), "wrote fit plot");
    Ok(())
}

fn draw(
    path: &Path,
    bins: &[DensityBin],
    curve: &[(f64, f64)],
    offset: f64,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let y_max = bins
        .iter()
        .map(|b| b.density)
        .chain(curve.iter().map(|&(_, y)| y))
        .fold(0.0f64, f64::max)
        * 1.05;
    let y_max = if y_max > 0.0 { y_max } else { 1.0 };

    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(-offset..(1.0 - offset), 0f64..y_max)?;

    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new(
            [(b.lower, 0.0), (b.upper, b.density)],
            BLUE.mix(0.5).filled(),
        )
    }))?;
    chart.draw_series(LineSeries::new(
        curve.iter().copied(),
        RED.stroke_width(2),
    ))?;

    root.present()?;
    Ok(())
}
