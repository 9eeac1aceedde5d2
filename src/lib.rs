pub mod chart;
pub mod cli;
pub mod config;
pub mod csv_plot;
pub mod data_loader;
pub mod display;
pub mod error;
pub mod metrics;

use std::path::Path;

use tracing::info;

pub use chart::{build_figures, Figure, Line, Panel};
pub use config::{ChartConfig, Layout};
pub use csv_plot::ImageFormat;
pub use data_loader::{load_metrics, DataLoader};
pub use display::{ImageViewer, TerminalViewer, Viewer};
pub use error::{PlotError, Result};
pub use metrics::{Metric, MetricsRow, MetricsSeries, Schema};

/// Load `csv_file`, build its figures and hand them to `viewer`.
pub fn plot_metrics(csv_file: &Path, config: &ChartConfig, viewer: &dyn Viewer) -> Result<Vec<Figure>> {
    let mut series = DataLoader::new(csv_file, config).load_data()?;
    if config.last_run_only && series.run_count() > 1 {
        info!(runs = series.run_count(), "keeping the last run only");
        series = series.last_run();
    }

    let figures = build_figures(&series, config)?;
    viewer.present(&figures)?;
    Ok(figures)
}
