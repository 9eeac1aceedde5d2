use std::path::Path;

use clap::ValueEnum;
use plotters::coord::ranged1d::{Ranged, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::chart::{Figure, Line, Panel};
use crate::error::{PlotError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

pub fn render_figure(figure: &Figure, output_file: &Path, format: ImageFormat) -> Result<()> {
    match format {
        ImageFormat::Png => {
            let root = BitMapBackend::new(output_file, figure.size).into_drawing_area();
            draw_figure(&root, figure)?;
        }
        ImageFormat::Svg => {
            let root = SVGBackend::new(output_file, figure.size).into_drawing_area();
            draw_figure(&root, figure)?;
        }
    }
    Ok(())
}

fn draw_figure<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, figure: &Figure) -> Result<()> {
    root.fill(&WHITE).map_err(PlotError::render)?;
    let body = root
        .titled(&figure.title, ("sans-serif", 30))
        .map_err(PlotError::render)?;

    let areas = body.split_evenly((1, figure.panels.len().max(1)));
    for (area, panel) in areas.iter().zip(&figure.panels) {
        draw_panel(area, panel)?;
    }

    root.present().map_err(PlotError::render)?;
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, panel: &Panel) -> Result<()> {
    let lines = panel.drawable_lines();
    let ((x0, x1), (y0, y1)) = panel.axis_ranges().ok_or_else(|| {
        PlotError::Render(format!("nothing to draw on the {} panel", panel.y_label))
    })?;

    let mut builder = ChartBuilder::on(area);
    builder.margin(10).x_label_area_size(40).y_label_area_size(60);

    if panel.log_x {
        let chart = builder
            .build_cartesian_2d((x0..x1).log_scale(), y0..y1)
            .map_err(PlotError::render)?;
        finish_panel(chart, panel, &lines)
    } else {
        let chart = builder
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(PlotError::render)?;
        finish_panel(chart, panel, &lines)
    }
}

fn finish_panel<'a, DB, X>(
    mut chart: ChartContext<'a, DB, Cartesian2d<X, RangedCoordf64>>,
    panel: &Panel,
    lines: &[(&Line, Vec<(f64, f64)>)],
) -> Result<()>
where
    DB: DrawingBackend + 'a,
    X: Ranged<ValueType = f64> + ValueFormatter<f64>,
{
    {
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(panel.x_label.as_str()).y_desc(panel.y_label.as_str());
        if panel.integer_x_ticks {
            mesh.x_label_formatter(&integer_label);
        }
        mesh.draw().map_err(PlotError::render)?;
    }

    for (line, points) in lines {
        let color = RGBColor(line.color.0, line.color.1, line.color.2);
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
            .map_err(PlotError::render)?
            .label(line.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(PlotError::render)?;
    Ok(())
}

// tick label that only shows whole epochs
fn integer_label(x: &f64) -> String {
    if (x - x.round()).abs() < 1e-9 {
        format!("{:.0}", x)
    } else {
        String::new()
    }
}
