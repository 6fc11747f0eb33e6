#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! A library of epoch-boundary observers for neural-network training loops.
//!
//! The `runwatch` crate contains the observers a training loop invokes at the end of
//! each epoch: a [checkpoint writer](checkpoint_observer::CheckpointObserver) that
//! persists model weights, a [dashboard exporter](dashboard_observer::DashboardObserver)
//! that streams scalar metrics to a log directory, an
//! [accuracy sampler](accuracy_observer::AccuracySampler) that prints per-output
//! average positive-prediction rates over a held-out evaluation set, and a
//! [tracker logger](tracker_observer::TrackerObserver) that forwards the epoch loss
//! to an external run-logging sink.
//!
//! The [`build_observers`] function assembles the full observer list for a run from a
//! [`RunConfig`](run_config::RunConfig). The training loop owns invocation timing: it
//! calls [`EpochObserver::on_epoch_end`] on each observer in list order, synchronously,
//! on its own thread. No observer recovers from errors locally; any failure surfaces
//! to the training loop's caller.
//!
//! # Examples
//! Build the observer list for a run and drive it through one epoch:
//! ```
//! use nalgebra::DMatrix;
//! use runwatch::run_config::RunConfig;
//! use runwatch::tracker_observer::MetricSink;
//! use runwatch::{build_observers, Batch, EpochMetrics, EvalModel};
//! use serde::Serialize;
//! use std::error::Error;
//!
//! // a model that predicts "positive" for inputs greater than zero
//! #[derive(Serialize)]
//! struct ThresholdModel;
//! impl EvalModel for ThresholdModel {
//!     fn predict(&self, batch: &Batch) -> Result<DMatrix<f64>, Box<dyn Error + Send + Sync>> {
//!         Ok(batch.map(|x| if x > 0.0 { 1.0 } else { 0.0 }))
//!     }
//! }
//!
//! struct StdoutSink;
//! impl MetricSink for StdoutSink {
//!     fn log(&self, key: &str, value: f64) -> Result<(), Box<dyn Error + Send + Sync>> {
//!         println!("{}: {}", key, value);
//!         Ok(())
//!     }
//! }
//!
//! let run_dir = tempfile::tempdir()?;
//! let mut config = RunConfig::new();
//! config.insert("ckpt_path", run_dir.path().join("ckpts").to_str().unwrap());
//! config.insert("tblog_path", run_dir.path().join("tblogs").to_str().unwrap());
//! config.insert("azure_ml", false);
//!
//! let model = ThresholdModel;
//! let sink = StdoutSink;
//! let eval_data: Vec<Batch> = vec![
//!     DMatrix::from_row_slice(2, 2, &[0.3, -0.1, 0.8, 0.2]),
//!     DMatrix::from_row_slice(1, 2, &[-0.5, 0.6]), // possibly-partial final batch
//! ];
//!
//! let observers = build_observers(&config, &sink, &model, &eval_data)?;
//!
//! let mut metrics = EpochMetrics::default();
//! metrics.insert("loss".to_string(), 0.42);
//! for observer in &observers {
//!     observer.on_epoch_end(1, &metrics)?;
//! }
//! # Ok::<(), Box<dyn Error>>(())
//! ```

/// Contains the [`AccuracySampler`](accuracy_observer::AccuracySampler) observer.
pub mod accuracy_observer;
/// Contains the [`CheckpointObserver`](checkpoint_observer::CheckpointObserver) observer.
pub mod checkpoint_observer;
/// Contains the [`DashboardObserver`](dashboard_observer::DashboardObserver) observer.
pub mod dashboard_observer;
/// Provides the trait through which the training loop drives observers at epoch boundaries.
pub mod observer;
/// Errors raised by observers during epoch-end processing.
pub mod observer_error;
/// The run configuration mapping consumed by [`build_observers`].
pub mod run_config;
/// Contains the [`TrackerObserver`](tracker_observer::TrackerObserver) observer and the
/// [`MetricSink`](tracker_observer::MetricSink) trait it logs through.
pub mod tracker_observer;

use nalgebra::DMatrix;
use serde::Serialize;
use std::error::Error;

use accuracy_observer::AccuracySampler;
use checkpoint_observer::CheckpointObserver;
use dashboard_observer::DashboardObserver;
pub use observer::{EmptyObserver, EpochObserver};
pub use observer_error::ObserverError;
use run_config::{ConfigError, RunConfig};
use tracker_observer::{MetricSink, TrackerObserver};

/// One unit of input data consumed by a model in a single forward pass.
/// Rows are examples, columns are features.
pub type Batch = DMatrix<f64>;

/// The scalar metrics a training loop hands to observers at the end of an epoch,
/// keyed by metric name (e.g. `"loss"`).
pub type EpochMetrics = rustc_hash::FxHashMap<String, f64>;

/// A model that maps a batch to a per-example prediction tensor.
///
/// The returned matrix must have one row per example in the batch, and the same number
/// of columns (one per output/class) for every batch of a given evaluation set.
/// Observers hold the model by reference; ownership stays with the caller.
pub trait EvalModel {
    /// Run the model forward on `batch`. Failures propagate to the training loop
    /// unhandled; observers perform no fault isolation around this call.
    fn predict(&self, batch: &Batch) -> Result<DMatrix<f64>, Box<dyn Error + Send + Sync>>;
}

/// How often the dashboard exporter samples a histogram summary, in epochs.
pub const DASHBOARD_HISTOGRAM_FREQ: usize = 1;
/// The scalar flush cadence handed to the dashboard exporter, in training steps.
pub const DASHBOARD_UPDATE_FREQ: usize = 500;

/// Build the ordered list of observers to attach to a training run.
///
/// The returned list is always, in order:
/// 1. a [`CheckpointObserver`] writing weights-only checkpoints under the `ckpt_path`
///    configuration key,
/// 2. a [`DashboardObserver`] logging under the `tblog_path` key, with a histogram
///    sampled every epoch and scalars flushed every [`DASHBOARD_UPDATE_FREQ`] steps,
/// 3. an [`AccuracySampler`] over the provided evaluation model and data,
/// 4. iff the `azure_ml` key is true, a [`TrackerObserver`] over the provided sink.
///
/// The training loop invokes observers in exactly this order at each epoch boundary.
/// Calling this function twice with the same inputs yields two independent lists with
/// identical parameterization; observers share no state.
///
/// # Errors
/// Returns a [`ConfigError`] if any required configuration key (`ckpt_path`,
/// `tblog_path`, `azure_ml`) is absent or has the wrong type. Configuration problems
/// surface here, at construction time, never at epoch-end.
pub fn build_observers<'a, M, S>(
    config: &RunConfig,
    sink: &'a S,
    model: &'a M,
    eval_data: &'a [Batch],
) -> Result<Vec<Box<dyn EpochObserver + 'a>>, ConfigError>
where
    M: EvalModel + Serialize,
    S: MetricSink,
{
    let ckpt_dir = config.path("ckpt_path")?;
    let dashboard_dir = config.path("tblog_path")?;
    let track_run = config.flag("azure_ml")?;

    let mut observers: Vec<Box<dyn EpochObserver + 'a>> = Vec::with_capacity(4);
    observers.push(Box::new(CheckpointObserver::new(ckpt_dir, model)));
    observers.push(Box::new(DashboardObserver::new(
        dashboard_dir,
        DASHBOARD_HISTOGRAM_FREQ,
        DASHBOARD_UPDATE_FREQ,
    )));
    observers.push(Box::new(AccuracySampler::new(model, eval_data)));
    if track_run {
        observers.push(Box::new(TrackerObserver::new(sink)));
    }
    Ok(observers)
}
