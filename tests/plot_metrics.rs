use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use lossplot::{
    load_metrics, plot_metrics, ChartConfig, Figure, ImageFormat, ImageViewer, Metric, PlotError,
    Result, Schema, TerminalViewer, Viewer,
};
use tempfile::TempDir;

#[derive(Default)]
struct RecordingViewer {
    figures: RefCell<Vec<Figure>>,
}

impl Viewer for RecordingViewer {
    fn present(&self, figures: &[Figure]) -> Result<()> {
        self.figures.borrow_mut().extend_from_slice(figures);
        Ok(())
    }
}

fn write_csv(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

const PER_EPOCH: &str = "epoch,train_error,val_error,learning_rate\n1,0.9,1.0,0.01\n2,0.5,0.6,0.01\n";

#[test]
fn per_epoch_file_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "metrics.csv", PER_EPOCH);

    let series = load_metrics(&path, Schema::Auto, &[]).unwrap();
    assert_eq!(series.epochs, vec![1, 2]);
    assert_eq!(series.column(Metric::TrainError).unwrap(), &[0.9, 0.5]);
    assert_eq!(series.column(Metric::ValError).unwrap(), &[1.0, 0.6]);
    assert_eq!(series.column(Metric::LearningRate).unwrap(), &[0.01, 0.01]);

    let viewer = RecordingViewer::default();
    plot_metrics(&path, &ChartConfig::default(), &viewer).unwrap();
    let figures = viewer.figures.borrow();

    let labelled: Vec<&str> = figures
        .iter()
        .flat_map(|f| f.panels.iter())
        .flat_map(|p| p.lines.iter())
        .map(|l| l.label.as_str())
        .collect();
    assert!(labelled.len() >= 2);
    assert!(labelled.contains(&"Train Error"));
    assert!(labelled.contains(&"Validation Error"));
    assert!(figures
        .iter()
        .flat_map(|f| f.panels.iter())
        .all(|p| p.x_label == "Epoch"));
}

#[test]
fn loading_twice_gives_the_same_series() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "metrics.csv", PER_EPOCH);

    let first = load_metrics(&path, Schema::PerEpoch, &[]).unwrap();
    let second = load_metrics(&path, Schema::PerEpoch, &[]).unwrap();
    assert_eq!(first, second);
}

#[test]
fn row_count_and_order_are_preserved() {
    let dir = TempDir::new().unwrap();
    let mut contents = String::from("epoch,avg_epoch_error\n");
    for epoch in (1..=50).rev() {
        contents.push_str(&format!("{},{}\n", epoch, epoch as f64 / 100.0));
    }
    let path = write_csv(&dir, "loss.csv", &contents);

    let series = load_metrics(&path, Schema::Auto, &[]).unwrap();
    assert_eq!(series.schema, Schema::Aggregate);
    assert_eq!(series.len(), 50);
    assert_eq!(series.epochs.first(), Some(&50));
    assert_eq!(series.epochs.last(), Some(&1));
}

#[test]
fn missing_column_fails_instead_of_plotting_nothing() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "metrics.csv", "epoch,train_error\n1,0.9\n");

    let viewer = RecordingViewer::default();
    let config = ChartConfig {
        schema: Schema::PerEpoch,
        ..ChartConfig::default()
    };
    let err = plot_metrics(&path, &config, &viewer).unwrap_err();
    assert!(matches!(err, PlotError::MissingColumn { ref column, .. } if column == "val_error"));
    assert!(viewer.figures.borrow().is_empty());
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let viewer = RecordingViewer::default();
    let err = plot_metrics(&dir.path().join("absent.csv"), &ChartConfig::default(), &viewer)
        .unwrap_err();
    assert!(matches!(err, PlotError::FileNotFound(_)));
    assert!(err.to_string().starts_with("file not found"));
}

#[test]
fn header_only_file_is_an_empty_series() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "loss.csv", "epoch,avg_epoch_error\n");
    let err = plot_metrics(&path, &ChartConfig::default(), &RecordingViewer::default()).unwrap_err();
    assert!(matches!(err, PlotError::EmptySeries(_)));
}

#[test]
fn last_run_only_plots_rows_after_the_final_header() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "loss.csv",
        "epoch,avg_epoch_error\n1,0.9\n2,0.8\nepoch,avg_epoch_error\n1,0.4\n2,0.3\n3,0.2\n",
    );

    let viewer = RecordingViewer::default();
    let config = ChartConfig {
        last_run_only: true,
        ..ChartConfig::default()
    };
    plot_metrics(&path, &config, &viewer).unwrap();

    let figures = viewer.figures.borrow();
    assert_eq!(figures.len(), 1);
    assert_eq!(
        figures[0].panels[0].lines[0].points,
        vec![(1.0, 0.4), (2.0, 0.3), (3.0, 0.2)]
    );
}

#[test]
fn log_scale_leaves_points_untouched() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "metrics.csv", PER_EPOCH);

    let linear = RecordingViewer::default();
    plot_metrics(&path, &ChartConfig::default(), &linear).unwrap();
    let log = RecordingViewer::default();
    let config = ChartConfig {
        log_x: true,
        ..ChartConfig::default()
    };
    plot_metrics(&path, &config, &log).unwrap();

    let linear = linear.figures.borrow();
    let log = log.figures.borrow();
    assert_eq!(linear.len(), log.len());
    for (a, b) in linear.iter().zip(log.iter()) {
        for (pa, pb) in a.panels.iter().zip(&b.panels) {
            assert_eq!(pa.lines, pb.lines);
            assert!(pb.log_x);
        }
    }
}

fn render_images(format: ImageFormat, log_x: bool) {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "metrics.csv", PER_EPOCH);
    let out = dir.path().join("plots");

    let config = ChartConfig {
        log_x,
        ..ChartConfig::default()
    };
    let figures = plot_metrics(&path, &config, &ImageViewer::new(&out, &path, format)).unwrap();
    assert_eq!(figures.len(), 2);

    for name in ["metrics_training_errors", "metrics_learning_rate"] {
        let file = out.join(format!("{}.{}", name, format.extension()));
        let size = fs::metadata(&file).unwrap().len();
        assert!(size > 0, "{} is empty", file.display());
    }
}

#[test]
fn svg_images_are_written_per_figure() {
    render_images(ImageFormat::Svg, false);
}

#[test]
fn svg_images_with_log_axis() {
    render_images(ImageFormat::Svg, true);
}

#[test]
fn png_images_are_written_per_figure() {
    render_images(ImageFormat::Png, false);
}

#[test]
fn png_images_with_log_axis() {
    render_images(ImageFormat::Png, true);
}

#[test]
fn terminal_viewer_handles_a_flat_learning_rate() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "metrics.csv", PER_EPOCH);

    let figures = plot_metrics(&path, &ChartConfig::default(), &TerminalViewer::default()).unwrap();
    let rate = figures.iter().find(|f| f.title == "Learning Rate").unwrap();
    assert_eq!(rate.panels[0].lines[0].points, vec![(1.0, 0.01), (2.0, 0.01)]);
}
