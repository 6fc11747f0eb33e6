use std::error::Error;

use crate::{EpochMetrics, EpochObserver, ObserverError};

/// The metric key under which the tracker observer logs the epoch loss.
pub const TRAIN_LOSS_KEY: &str = "train_loss";

/// An external run-logging sink, such as an experiment-tracking service's run handle.
///
/// The sink is owned by the caller; observers hold it by reference and use exactly one
/// operation on it.
pub trait MetricSink {
    /// Record a single named scalar against the current run.
    fn log(&self, key: &str, value: f64) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// An observer that forwards the epoch's training loss to an external run-logging
/// sink under the fixed key [`TRAIN_LOSS_KEY`].
///
/// Reads the `"loss"` entry of the epoch metrics and fails if it is absent - a
/// missing loss means the training loop is misconfigured, and that should never be
/// silently swallowed. Sink failures propagate unhandled. No other side effects.
pub struct TrackerObserver<'a, S: MetricSink> {
    sink: &'a S,
}

impl<'a, S: MetricSink> TrackerObserver<'a, S> {
    /// Create an observer logging through the given sink.
    pub fn new(sink: &'a S) -> Self {
        TrackerObserver { sink }
    }
}

impl<S: MetricSink> EpochObserver for TrackerObserver<'_, S> {
    fn on_epoch_end(&self, _epoch: usize, metrics: &EpochMetrics) -> Result<(), ObserverError> {
        let loss = metrics
            .get("loss")
            .copied()
            .ok_or(ObserverError::MissingMetric { key: "loss" })?;
        self.sink
            .log(TRAIN_LOSS_KEY, loss)
            .map_err(ObserverError::Sink)
    }

    fn name(&self) -> &'static str {
        "tracker"
    }
}
