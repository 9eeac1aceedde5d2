//! Turns a loaded [`MetricsSeries`] into renderable figures.
//!
//! Figures here are plain data: titles, panels and the `(epoch, value)` points
//! of each line. Scaling and drawing happen in the display sinks, so the same
//! figures can go to the terminal or to an image file.

use tracing::{debug, warn};

use crate::config::{ChartConfig, Layout};
use crate::error::{PlotError, Result};
use crate::metrics::{Metric, MetricsSeries, Schema};

pub const X_LABEL: &str = "Epoch";

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub label: String,
    pub color: (u8, u8, u8),
    pub points: Vec<(f64, f64)>,
}

/// One set of axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub x_label: String,
    pub y_label: String,
    pub log_x: bool,
    pub integer_x_ticks: bool,
    pub lines: Vec<Line>,
}

impl Panel {
    /// Each line with the points its x scale can place; a log axis has no room for epochs <= 0.
    pub fn drawable_lines(&self) -> Vec<(&Line, Vec<(f64, f64)>)> {
        self.lines
            .iter()
            .map(|line| {
                if !self.log_x {
                    return (line, line.points.clone());
                }
                let points: Vec<(f64, f64)> =
                    line.points.iter().copied().filter(|(x, _)| *x > 0.0).collect();
                let dropped = line.points.len() - points.len();
                if dropped > 0 {
                    warn!(dropped, "{}: skipping non-positive epochs on log axis", line.label);
                }
                (line, points)
            })
            .collect()
    }

    /// Axis ranges over the drawable points, as `((x_min, x_max), (y_min, y_max))`,
    /// with a little headroom on y. Flat data still gets a non-empty range.
    pub fn axis_ranges(&self) -> Option<((f64, f64), (f64, f64))> {
        let lines = self.drawable_lines();
        let mut points = lines.iter().flat_map(|(_, points)| points.iter());
        let &(x, y) = points.next()?;
        let ((x0, x1), (y0, y1)) =
            points.fold(((x, x), (y, y)), |((x0, x1), (y0, y1)), &(x, y)| {
                ((x0.min(x), x1.max(x)), (y0.min(y), y1.max(y)))
            });

        let (x0, x1) = match (self.log_x, x0 == x1) {
            (true, true) => (x0 / 2.0, x1 * 2.0),
            (false, true) => (x0 - 1.0, x1 + 1.0),
            _ => (x0, x1),
        };
        let pad = if y0 == y1 {
            (y0.abs() * 0.1).max(1e-9)
        } else {
            (y1 - y0) * 0.05
        };
        Some(((x0, x1), (y0 - pad, y1 + pad)))
    }
}

/// A window's worth of panels laid out in one row.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub size: (u32, u32),
    pub panels: Vec<Panel>,
}

impl Figure {
    /// File-name friendly version of the title.
    pub fn slug(&self) -> String {
        self.title
            .split_whitespace()
            .map(|word| word.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join("_")
    }
}

pub fn build_figures(series: &MetricsSeries, config: &ChartConfig) -> Result<Vec<Figure>> {
    if series.is_empty() {
        return Err(PlotError::EmptySeries(series.source.clone()));
    }
    let metrics: Vec<Metric> = config
        .requested_metrics(series.schema)?
        .into_iter()
        .filter(|metric| series.column(*metric).is_some())
        .collect();
    if metrics.is_empty() {
        return Err(PlotError::Config(format!(
            "none of the requested metrics were loaded from {}",
            series.source.display()
        )));
    }

    let panel = |metrics: &[Metric]| -> Panel {
        Panel {
            x_label: X_LABEL.to_string(),
            y_label: metrics[0].axis_name().to_string(),
            log_x: config.log_x,
            integer_x_ticks: config.integer_ticks,
            lines: metrics.iter().filter_map(|m| line(series, *m)).collect(),
        }
    };

    let mut figures = Vec::new();
    match series.schema {
        Schema::Aggregate => {
            figures.push(figure("Average Epoch Error", vec![panel(&metrics)], config));
        }
        _ => {
            let errors: Vec<Metric> = metrics.iter().copied().filter(|m| m.is_error()).collect();
            if !errors.is_empty() {
                let panels = match config.layout {
                    Layout::Split => errors.iter().map(|m| panel(&[*m])).collect(),
                    Layout::Overlay => vec![panel(&errors)],
                };
                figures.push(figure("Training Errors", panels, config));
            }
            if metrics.contains(&Metric::LearningRate) {
                figures.push(figure("Learning Rate", vec![panel(&[Metric::LearningRate])], config));
            }
        }
    }

    debug!(
        figures = figures.len(),
        panels = figures.iter().map(|f| f.panels.len()).sum::<usize>(),
        "built figures"
    );
    Ok(figures)
}

fn line(series: &MetricsSeries, metric: Metric) -> Option<Line> {
    Some(Line {
        label: metric.label().to_string(),
        color: metric.color(),
        points: series.points(metric)?,
    })
}

fn figure(title: &str, panels: Vec<Panel>, config: &ChartConfig) -> Figure {
    Figure {
        title: title.to_string(),
        size: config.figure_size(panels.len()),
        panels,
    }
}
