use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::{EpochMetrics, EpochObserver, ObserverError};

/// An observer that streams training metrics to a dashboard log directory.
///
/// Each epoch appends one timestamped line per metric (sorted by key, so files are
/// deterministic) to `scalars.log` in the configured directory. When the file is
/// first created it gets a header line recording the exporter's two cadence knobs,
/// so the dashboard tool reading the directory can honor them:
/// * `update_freq` - how often, in training steps, the tool should flush scalar
///   updates to its display. Passed through verbatim; this observer only sees epoch
///   boundaries, never individual steps.
/// * `histogram_freq` - how often, in epochs, a distribution summary of the epoch's
///   metric values is appended to `histograms.log`.
///
/// The log directory is created on first use. The internal layout beyond these two
/// files is the dashboard tool's responsibility.
pub struct DashboardObserver {
    log_dir: PathBuf,
    histogram_freq: usize,
    update_freq: usize,
}

impl DashboardObserver {
    /// Create an exporter writing under `log_dir`, sampling a histogram every
    /// `histogram_freq` epochs (0 disables histograms) and advertising a scalar
    /// flush cadence of `update_freq` steps.
    pub fn new(log_dir: PathBuf, histogram_freq: usize, update_freq: usize) -> Self {
        DashboardObserver {
            log_dir,
            histogram_freq,
            update_freq,
        }
    }

    /// The directory this exporter logs under.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Epochs between histogram summaries.
    pub fn histogram_freq(&self) -> usize {
        self.histogram_freq
    }

    /// Advertised scalar flush cadence, in training steps.
    pub fn update_freq(&self) -> usize {
        self.update_freq
    }

    fn append(&self, file_name: &str, lines: &[String]) -> Result<(), ObserverError> {
        let wrap = |path: &Path, e: std::io::Error| ObserverError::Dashboard {
            path: path.to_path_buf(),
            source: e,
        };
        fs::create_dir_all(&self.log_dir).map_err(|e| wrap(&self.log_dir, e))?;
        let path = self.log_dir.join(file_name);
        let fresh = !path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| wrap(&path, e))?;
        if fresh {
            writeln!(
                file,
                "# update_freq={} histogram_freq={}",
                self.update_freq, self.histogram_freq
            )
            .map_err(|e| wrap(&path, e))?;
        }
        for line in lines {
            writeln!(file, "{}", line).map_err(|e| wrap(&path, e))?;
        }
        Ok(())
    }
}

impl EpochObserver for DashboardObserver {
    fn on_epoch_end(&self, epoch: usize, metrics: &EpochMetrics) -> Result<(), ObserverError> {
        let stamp = chrono::Local::now().to_rfc3339();

        let mut keys: Vec<&String> = metrics.keys().collect();
        keys.sort();
        let scalar_lines: Vec<String> = keys
            .iter()
            .map(|key| format!("{} epoch={} {}={}", stamp, epoch, key, metrics[*key]))
            .collect();
        self.append("scalars.log", &scalar_lines)?;

        if self.histogram_freq > 0 && epoch % self.histogram_freq == 0 && !metrics.is_empty() {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            let mut sum = 0.0;
            for &value in metrics.values() {
                min = min.min(value);
                max = max.max(value);
                sum += value;
            }
            let summary = format!(
                "{} epoch={} count={} min={} max={} mean={}",
                stamp,
                epoch,
                metrics.len(),
                min,
                max,
                sum / metrics.len() as f64
            );
            self.append("histograms.log", &[summary])?;
        }
        log::debug!(
            "epoch {}: exported {} scalar(s) to {:?}",
            epoch,
            metrics.len(),
            self.log_dir
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "dashboard"
    }
}
