use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::Deserialize;

/// Column layout of a metrics file. The two layouts are kept apart on purpose:
/// nothing in a file says one can stand in for the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Schema {
    /// Pick from the header: `train_error` means per-epoch, `avg_epoch_error` means aggregate.
    Auto,
    /// `epoch,train_error,val_error,learning_rate`
    PerEpoch,
    /// `epoch,avg_epoch_error`, as appended by the trainer
    Aggregate,
}

impl Schema {
    pub fn metrics(self) -> &'static [Metric] {
        match self {
            Schema::Auto => &[],
            Schema::PerEpoch => &[Metric::TrainError, Metric::ValError, Metric::LearningRate],
            Schema::Aggregate => &[Metric::AvgEpochError],
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Schema::Auto => "auto",
            Schema::PerEpoch => "per-epoch",
            Schema::Aggregate => "aggregate",
        };
        write!(f, "{}", name)
    }
}

pub const EPOCH_COLUMN: &str = "epoch";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[value(name = "train_error")]
    TrainError,
    #[value(name = "val_error")]
    ValError,
    #[value(name = "learning_rate")]
    LearningRate,
    #[value(name = "avg_epoch_error")]
    AvgEpochError,
}

impl Metric {
    /// Header name in the csv file.
    pub fn column(self) -> &'static str {
        match self {
            Metric::TrainError => "train_error",
            Metric::ValError => "val_error",
            Metric::LearningRate => "learning_rate",
            Metric::AvgEpochError => "avg_epoch_error",
        }
    }

    /// Human name used on the y-axis.
    pub fn axis_name(self) -> &'static str {
        match self {
            Metric::TrainError | Metric::ValError => "Error",
            Metric::LearningRate => "Learning Rate",
            Metric::AvgEpochError => "Average Epoch Error",
        }
    }

    /// Legend label of the plotted line.
    pub fn label(self) -> &'static str {
        match self {
            Metric::TrainError => "Train Error",
            Metric::ValError => "Validation Error",
            Metric::LearningRate => "Learning Rate",
            Metric::AvgEpochError => "Avg Epoch Error",
        }
    }

    pub fn color(self) -> (u8, u8, u8) {
        match self {
            Metric::TrainError | Metric::AvgEpochError => (0, 0, 255),
            Metric::ValError => (255, 0, 0),
            Metric::LearningRate => (255, 165, 0),
        }
    }

    pub fn schema(self) -> Schema {
        match self {
            Metric::AvgEpochError => Schema::Aggregate,
            _ => Schema::PerEpoch,
        }
    }

    pub fn is_error(self) -> bool {
        self != Metric::LearningRate
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

/// One record of the file: the epoch and the value of every loaded metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRow {
    pub epoch: u64,
    pub values: Vec<(Metric, f64)>,
}

/// Parallel columns read from a metrics file, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSeries {
    pub source: PathBuf,
    pub schema: Schema,
    pub epochs: Vec<u64>,
    pub columns: Vec<(Metric, Vec<f64>)>,
    // row index where each training run begins; a repeated header opens a new run
    pub run_starts: Vec<usize>,
}

impl MetricsSeries {
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn metrics(&self) -> Vec<Metric> {
        self.columns.iter().map(|(metric, _)| *metric).collect()
    }

    pub fn column(&self, metric: Metric) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, values)| values.as_slice())
    }

    /// `(epoch, value)` pairs for one metric, in row order.
    pub fn points(&self, metric: Metric) -> Option<Vec<(f64, f64)>> {
        let values = self.column(metric)?;
        Some(
            self.epochs
                .iter()
                .zip(values)
                .map(|(&epoch, &value)| (epoch as f64, value))
                .collect(),
        )
    }

    pub fn row(&self, index: usize) -> Option<MetricsRow> {
        let epoch = *self.epochs.get(index)?;
        let values = self
            .columns
            .iter()
            .map(|(metric, values)| Some((*metric, *values.get(index)?)))
            .collect::<Option<Vec<_>>>()?;
        Some(MetricsRow { epoch, values })
    }

    pub fn rows(&self) -> impl Iterator<Item = MetricsRow> + '_ {
        (0..self.len()).filter_map(|i| self.row(i))
    }

    pub fn run_count(&self) -> usize {
        self.run_starts.len()
    }

    /// The rows written by the most recent training run.
    pub fn last_run(&self) -> MetricsSeries {
        let start = self.run_starts.last().copied().unwrap_or(0);
        MetricsSeries {
            source: self.source.clone(),
            schema: self.schema,
            epochs: self.epochs[start..].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|(metric, values)| (*metric, values[start..].to_vec()))
                .collect(),
            run_starts: if start < self.len() { vec![0] } else { vec![] },
        }
    }
}
