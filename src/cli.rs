use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::config::{ChartConfig, Layout};
use crate::csv_plot::ImageFormat;
use crate::display::{ImageViewer, TerminalViewer, Viewer};
use crate::error::Result;
use crate::metrics::{Metric, Schema};
use crate::plot_metrics;

#[derive(Parser, Debug)]
#[command(name = "lossplot", version, about = "Plot training metrics from a CSV file.")]
pub struct Cli {
    /// Path to the CSV file containing training metrics
    pub csv_file: PathBuf,

    /// Use a logarithmic x-axis
    #[arg(long)]
    pub logx: bool,

    /// Let the x-axis show fractional epochs
    #[arg(long)]
    pub no_integer_ticks: bool,

    /// Column layout of the file
    #[arg(long, value_enum)]
    pub schema: Option<Schema>,

    /// Comma separated columns to plot, default is every column of the schema
    #[arg(long, value_enum, value_delimiter = ',')]
    pub metrics: Vec<Metric>,

    #[arg(long, value_enum)]
    pub layout: Option<Layout>,

    /// Only plot the rows written by the last training run
    #[arg(long)]
    pub last_run: bool,

    /// Render images into this directory instead of drawing in the terminal
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Image format for --output
    #[arg(long, value_enum, default_value = "png", requires = "output")]
    pub format: ImageFormat,

    /// JSON file with chart settings; flags given here win
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Terminal chart size in braille cells
    #[arg(long, default_value_t = 120)]
    pub width: u32,

    #[arg(long, default_value_t = 40)]
    pub height: u32,
}

impl Cli {
    pub fn chart_config(&self) -> Result<ChartConfig> {
        let mut config = match &self.config {
            Some(path) => ChartConfig::from_json(path)?,
            None => ChartConfig::default(),
        };

        if let Some(schema) = self.schema {
            config.schema = schema;
        }
        if !self.metrics.is_empty() {
            config.metrics = self.metrics.clone();
        }
        if let Some(layout) = self.layout {
            config.layout = layout;
        }
        config.log_x |= self.logx;
        config.last_run_only |= self.last_run;
        if self.no_integer_ticks {
            config.integer_ticks = false;
        }
        Ok(config)
    }

    pub fn run(self) -> Result<()> {
        let config = self.chart_config()?;
        info!(file = %self.csv_file.display(), ?config, "plotting");

        let viewer: Box<dyn Viewer> = match &self.output {
            Some(dir) => Box::new(ImageViewer::new(dir, &self.csv_file, self.format)),
            None => Box::new(TerminalViewer::new(self.width, self.height)),
        };
        plot_metrics(&self.csv_file, &config, viewer.as_ref())?;
        Ok(())
    }
}
