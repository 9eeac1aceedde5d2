use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use clap::ValueEnum;
use serde::Deserialize;
use serde_json::from_reader;
use tracing::debug;

use crate::error::{PlotError, Result};
use crate::metrics::{Metric, Schema};

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// train and validation error in side-by-side panels
    Split,
    /// every error metric in one panel
    Overlay,
}

/// Rendering toggles for one invocation. Loaded from json and/or set from the
/// command line, then left alone.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ChartConfig {
    #[serde(default = "default_schema")]
    pub schema: Schema,

    // empty means every metric of the schema
    #[serde(default)]
    pub metrics: Vec<Metric>,

    #[serde(default = "default_layout")]
    pub layout: Layout,

    #[serde(default)]
    pub log_x: bool,

    #[serde(default = "default_integer_ticks")]
    pub integer_ticks: bool,

    // overrides the per-figure default size, in pixels
    #[serde(default)]
    pub figure_size: Option<(u32, u32)>,

    #[serde(default)]
    pub last_run_only: bool,
}

fn default_schema() -> Schema {
    Schema::Auto
}

fn default_layout() -> Layout {
    Layout::Split
}

fn default_integer_ticks() -> bool {
    true
}

pub const WIDE_FIGURE: (u32, u32) = (1400, 600);
pub const SINGLE_FIGURE: (u32, u32) = (800, 600);

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            schema: default_schema(),
            metrics: Vec::new(),
            layout: default_layout(),
            log_x: false,
            integer_ticks: default_integer_ticks(),
            figure_size: None,
            last_run_only: false,
        }
    }
}

impl ChartConfig {
    // get config from the json file
    pub fn from_json(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => PlotError::FileNotFound(path.to_path_buf()),
            _ => PlotError::Io(e),
        })?;
        let config: ChartConfig = from_reader(BufReader::new(file))?;
        debug!(?config, "loaded chart settings from {}", path.display());
        Ok(config)
    }

    /// Metrics to plot for a resolved schema, in the schema's column order.
    pub fn requested_metrics(&self, schema: Schema) -> Result<Vec<Metric>> {
        if let Some(foreign) = self.metrics.iter().find(|m| m.schema() != schema) {
            return Err(PlotError::Config(format!(
                "metric '{}' is not part of the {} schema",
                foreign, schema
            )));
        }
        if self.metrics.is_empty() {
            return Ok(schema.metrics().to_vec());
        }
        Ok(schema
            .metrics()
            .iter()
            .copied()
            .filter(|m| self.metrics.contains(m))
            .collect())
    }

    pub fn figure_size(&self, panels: usize) -> (u32, u32) {
        match self.figure_size {
            Some(size) => size,
            None if panels > 1 => WIDE_FIGURE,
            None => SINGLE_FIGURE,
        }
    }
}
