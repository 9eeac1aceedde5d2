use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info};

use crate::config::ChartConfig;
use crate::error::{PlotError, Result};
use crate::metrics::{Metric, MetricsSeries, Schema, EPOCH_COLUMN};

/// Reads a metrics csv into parallel columns.
pub struct DataLoader {
    pub data_location: PathBuf,
    pub config: ChartConfig,
}

/// Load `path` with the given schema, keeping only `metrics` (all of the schema's when empty).
pub fn load_metrics(path: &Path, schema: Schema, metrics: &[Metric]) -> Result<MetricsSeries> {
    let config = ChartConfig {
        schema,
        metrics: metrics.to_vec(),
        ..ChartConfig::default()
    };
    DataLoader::new(path, &config).load_data()
}

impl DataLoader {
    pub fn new(path: impl Into<PathBuf>, config: &ChartConfig) -> Self {
        Self {
            data_location: path.into(),
            config: config.clone(),
        }
    }

    pub fn load_data(&self) -> Result<MetricsSeries> {
        let file = File::open(&self.data_location).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => PlotError::FileNotFound(self.data_location.clone()),
            _ => PlotError::Io(e),
        })?;
        self.load_from_reader(file)
    }

    pub fn load_from_reader<R: Read>(&self, source: R) -> Result<MetricsSeries> {
        let start_time = Instant::now();
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);

        let headers = reader.headers()?.clone();
        let schema = self.resolve_schema(&headers)?;
        let metrics = self.config.requested_metrics(schema)?;

        let epoch_index = self.column_index(&headers, EPOCH_COLUMN)?;
        let metric_indices = metrics
            .iter()
            .map(|metric| Ok((*metric, self.column_index(&headers, metric.column())?)))
            .collect::<Result<Vec<(Metric, usize)>>>()?;

        let mut epochs = Vec::new();
        let mut columns: Vec<(Metric, Vec<f64>)> =
            metrics.iter().map(|metric| (*metric, Vec::new())).collect();
        let mut run_starts = Vec::new();
        let mut repeated_headers = 0;

        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            // the trainer appends its header at the start of every run
            if record.iter().eq(headers.iter()) {
                debug!(line, "repeated header, starting a new run");
                repeated_headers += 1;
                run_starts.push(epochs.len());
                continue;
            }
            if run_starts.is_empty() {
                run_starts.push(0);
            }

            let epoch = parse_field::<u64>(&record, epoch_index, EPOCH_COLUMN, line)?;
            epochs.push(epoch);
            for ((metric, index), (_, values)) in metric_indices.iter().zip(columns.iter_mut()) {
                values.push(parse_field::<f64>(&record, *index, metric.column(), line)?);
            }
        }

        // a header with nothing after it does not start a run
        run_starts.dedup();
        if run_starts.last() == Some(&epochs.len()) {
            run_starts.pop();
        }

        info!(
            rows = epochs.len(),
            runs = run_starts.len(),
            repeated_headers,
            %schema,
            "loaded {} in {:.2?}",
            self.data_location.display(),
            start_time.elapsed()
        );

        Ok(MetricsSeries {
            source: self.data_location.clone(),
            schema,
            epochs,
            columns,
            run_starts,
        })
    }

    fn resolve_schema(&self, headers: &StringRecord) -> Result<Schema> {
        let has = |name: &str| headers.iter().any(|h| h == name);
        match self.config.schema {
            // requested columns decide before the header does
            Schema::Auto if !self.config.metrics.is_empty() => Ok(self.config.metrics[0].schema()),
            Schema::Auto if has(Metric::TrainError.column()) => Ok(Schema::PerEpoch),
            Schema::Auto if has(Metric::AvgEpochError.column()) => Ok(Schema::Aggregate),
            Schema::Auto => Err(PlotError::MissingColumn {
                column: Metric::TrainError.column().to_string(),
                path: self.data_location.clone(),
            }),
            schema => Ok(schema),
        }
    }

    fn column_index(&self, headers: &StringRecord, name: &str) -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PlotError::MissingColumn {
                column: name.to_string(),
                path: self.data_location.clone(),
            })
    }
}

fn parse_field<T: std::str::FromStr>(
    record: &StringRecord,
    index: usize,
    column: &str,
    line: u64,
) -> Result<T> {
    let raw = record.get(index).unwrap_or("");
    raw.parse::<T>().map_err(|_| PlotError::Parse {
        line,
        column: column.to_string(),
        value: raw.to_string(),
    })
}
