use nalgebra::DMatrix;
use runwatch::tracker_observer::MetricSink;
use runwatch::{Batch, EvalModel};
use serde::Serialize;
use std::cell::RefCell;
use std::error::Error;

/// Predicts "positive" for every input greater than zero. One output per feature.
#[derive(Serialize)]
pub struct ThresholdModel {
    pub weights: Vec<f64>,
}

impl ThresholdModel {
    pub fn new() -> Self {
        ThresholdModel {
            weights: vec![0.5, -0.5],
        }
    }
}

impl EvalModel for ThresholdModel {
    fn predict(&self, batch: &Batch) -> Result<DMatrix<f64>, Box<dyn Error + Send + Sync>> {
        Ok(batch.map(|x| if x > 0.0 { 1.0 } else { 0.0 }))
    }
}

/// Records every log call so tests can assert on what an external tracker received.
pub struct RecordingSink {
    pub calls: RefCell<Vec<(String, f64)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        RecordingSink {
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl MetricSink for RecordingSink {
    fn log(&self, key: &str, value: f64) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.calls.borrow_mut().push((key.to_string(), value));
        Ok(())
    }
}
