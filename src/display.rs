use std::fs;
use std::path::{Path, PathBuf};

use textplots::{Chart, LabelBuilder, LabelFormat, Plot, Shape};
use tracing::info;

use crate::chart::{Figure, Panel};
use crate::csv_plot::{render_figure, ImageFormat};
use crate::error::{PlotError, Result};

/// Where built figures end up.
pub trait Viewer {
    fn present(&self, figures: &[Figure]) -> Result<()>;
}

/// Draws every panel as a braille line chart on stdout.
pub struct TerminalViewer {
    pub width: u32,
    pub height: u32,
}

// textplots refuses canvases smaller than this
const MIN_WIDTH: u32 = 32;
const MIN_HEIGHT: u32 = 3;

impl TerminalViewer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(MIN_WIDTH),
            height: height.max(MIN_HEIGHT),
        }
    }

    /// Text drawn above a panel's chart: axis names and the legend.
    pub fn panel_header(panel: &Panel) -> String {
        let scale = if panel.log_x { " (log scale)" } else { "" };
        let mut header = format!("{} vs {}{}", panel.y_label, panel.x_label, scale);
        for line in &panel.lines {
            header.push_str(&format!("\n  - {}", line.label));
        }
        header
    }

    fn draw_panel(&self, panel: &Panel) -> Result<()> {
        // terminal canvases are linear, so a log axis is drawn in log10 space
        let lines: Vec<Vec<(f32, f32)>> = panel
            .drawable_lines()
            .into_iter()
            .map(|(_, points)| {
                points
                    .into_iter()
                    .map(|(x, y)| {
                        let x = if panel.log_x { x.log10() } else { x };
                        (x as f32, y as f32)
                    })
                    .collect()
            })
            .collect();
        let ((x0, x1), (y0, y1)) = panel.axis_ranges().ok_or_else(|| {
            PlotError::Render(format!("nothing to draw on the {} panel", panel.y_label))
        })?;
        let (x0, x1) = if panel.log_x {
            (x0.log10(), x1.log10())
        } else {
            (x0, x1)
        };

        println!("{}", Self::panel_header(panel));
        let shapes: Vec<Shape> = lines
            .iter()
            .map(|points| Shape::Lines(points.as_slice()))
            .collect();
        let (log_x, integer) = (panel.log_x, panel.integer_x_ticks);
        let mut chart = Chart::new_with_y_range(
            self.width,
            self.height,
            x0 as f32,
            x1 as f32,
            y0 as f32,
            y1 as f32,
        );
        let chart = chart.x_label_format(LabelFormat::Custom(Box::new(move |x| {
            x_tick_label(x, log_x, integer)
        })));
        shapes
            .iter()
            .fold(chart, |chart, shape| chart.lineplot(shape))
            .display();
        Ok(())
    }
}

/// Label for a terminal x-axis position, given in the canvas' (possibly log10) space.
pub(crate) fn x_tick_label(x: f32, log_x: bool, integer: bool) -> String {
    let epoch = if log_x { 10f32.powf(x) } else { x };
    if integer {
        format!("{:.0}", epoch.round())
    } else {
        format!("{:.1}", epoch)
    }
}

impl Default for TerminalViewer {
    fn default() -> Self {
        Self::new(120, 40)
    }
}

impl Viewer for TerminalViewer {
    fn present(&self, figures: &[Figure]) -> Result<()> {
        for figure in figures {
            println!("\n== {} ==", figure.title);
            for panel in &figure.panels {
                self.draw_panel(panel)?;
            }
        }
        Ok(())
    }
}

/// Renders each figure to `<dir>/<stem>_<figure>.<ext>` with plotters.
pub struct ImageViewer {
    pub output_dir: PathBuf,
    pub stem: String,
    pub format: ImageFormat,
}

impl ImageViewer {
    pub fn new(output_dir: impl Into<PathBuf>, source: &Path, format: ImageFormat) -> Self {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "metrics".to_string());
        Self {
            output_dir: output_dir.into(),
            stem,
            format,
        }
    }

    pub fn output_path(&self, figure: &Figure) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{}.{}",
            self.stem,
            figure.slug(),
            self.format.extension()
        ))
    }
}

impl Viewer for ImageViewer {
    fn present(&self, figures: &[Figure]) -> Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        for figure in figures {
            let path = self.output_path(figure);
            render_figure(figure, &path, self.format)?;
            println!("{} saved to {}", figure.title, path.display());
        }
        info!(count = figures.len(), "rendered figures");
        Ok(())
    }
}
