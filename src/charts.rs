//! Line chart rendering.
//!
//! [`ChartRenderer`] is the seam between the reporting series and the image
//! backend. `PngChartRenderer` draws with plotters' bitmap backend.

use std::ops::Range;
use std::path::Path;

use plotters::prelude::*;

use crate::error::{AnalysisError, Result};
use crate::reporting::{LineChart, SeriesPoint};

pub trait ChartRenderer {
    fn render(&self, chart: &LineChart, path: &Path) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PngChartRenderer;

fn chart_err<E: std::fmt::Display>(e: E) -> AnalysisError {
    AnalysisError::Chart(e.to_string())
}

/// Y range with some headroom so points never sit on the frame.
fn value_range(points: &[SeriesPoint]) -> Range<f64> {
    let (min, max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| (lo.min(*v), hi.max(*v)));
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let span = max - min;
    let pad = if span > 0.0 { span * 0.1 } else { max.abs().max(1.0) * 0.1 };
    (min - pad)..(max + pad)
}

/// Per-point value label, e.g. `(1.300)` for three decimals.
fn point_label(value: f64, decimals: usize) -> String {
    format!("({:.*})", decimals, value)
}

impl ChartRenderer for PngChartRenderer {
    fn render(&self, chart: &LineChart, path: &Path) -> Result<()> {
        if chart.points.is_empty() {
            return Err(AnalysisError::Chart(format!("'{}' has no points", chart.title)));
        }

        let root = BitMapBackend::new(path, (chart.width, chart.height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let labels: Vec<&str> = chart.points.iter().map(|(l, _)| l.as_str()).collect();
        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d((0..labels.len()).into_segmented(), value_range(&chart.points))
            .map_err(chart_err)?;

        ctx.configure_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .x_labels(labels.len())
            .x_label_formatter(&|x| match x {
                SegmentValue::CenterOf(i) => labels.get(*i).map(|l| l.to_string()).unwrap_or_default(),
                _ => String::new(),
            })
            .draw()
            .map_err(chart_err)?;

        let coords: Vec<(SegmentValue<usize>, f64)> = chart
            .points
            .iter()
            .enumerate()
            .map(|(i, (_, v))| (SegmentValue::CenterOf(i), *v))
            .collect();

        ctx.draw_series(LineSeries::new(coords.clone(), &BLUE))
            .map_err(chart_err)?;
        ctx.draw_series(coords.iter().map(|c| Circle::new(c.clone(), 4, BLUE.filled())))
            .map_err(chart_err)?;

        if let Some(decimals) = chart.annotate {
            ctx.draw_series(coords.iter().map(|(x, y)| {
                Text::new(
                    point_label(*y, decimals),
                    (x.clone(), *y),
                    ("sans-serif", 15).into_font(),
                )
            }))
            .map_err(chart_err)?;
        }

        root.present().map_err(chart_err)?;
        Ok(())
    }
}
