use crate::{Batch, EpochMetrics, EpochObserver, EvalModel, ObserverError};

/// An observer that prints the per-output average positive-prediction rate over a
/// fixed held-out evaluation set at the end of every epoch.
///
/// The observer runs the evaluation model over every batch in the set, then discards
/// the prediction from the final batch before averaging. The batching that produced
/// the set may leave a short final batch, and dropping it unconditionally is the
/// simplest way to keep the average unskewed - at the cost of silently throwing away
/// a full batch of valid predictions whenever the set divides evenly. See
/// [`sampled_means`](AccuracySampler::sampled_means) for the exact aggregation.
///
/// Purely a side-effecting reporter: no state persists between epochs, and the epoch
/// number and metrics are ignored.
pub struct AccuracySampler<'a, M: EvalModel> {
    model: &'a M,
    eval_data: &'a [Batch],
}

impl<'a, M: EvalModel> AccuracySampler<'a, M> {
    /// Create a sampler over the given evaluation model and batched evaluation set.
    pub fn new(model: &'a M, eval_data: &'a [Batch]) -> Self {
        AccuracySampler { model, eval_data }
    }

    /// Compute the per-column mean over the concatenation of the model's predictions
    /// for batches `0..N-2`; the final batch is always excluded.
    ///
    /// The returned vector has one entry per model output.
    ///
    /// # Errors
    /// * [`ObserverError::EmptyAggregation`] if the evaluation set holds fewer than
    ///   two batches, since nothing would remain after the final batch is dropped.
    /// * [`ObserverError::Model`] carrying any failure raised by the model itself.
    pub fn sampled_means(&self) -> Result<Vec<f64>, ObserverError> {
        if self.eval_data.len() < 2 {
            return Err(ObserverError::EmptyAggregation {
                batches: self.eval_data.len(),
            });
        }
        let mut predictions = Vec::with_capacity(self.eval_data.len());
        for batch in self.eval_data {
            predictions.push(self.model.predict(batch).map_err(ObserverError::Model)?);
        }
        predictions.pop(); // stats from the last batch are always dropped - it may be partial

        let width = predictions[0].ncols();
        let mut sums = vec![0.0; width];
        let mut rows = 0;
        for prediction in &predictions {
            debug_assert_eq!(
                prediction.ncols(),
                width,
                "evaluation model must produce the same number of outputs for every batch"
            );
            for r in 0..prediction.nrows() {
                for c in 0..width {
                    sums[c] += prediction[(r, c)];
                }
            }
            rows += prediction.nrows();
        }
        Ok(sums.into_iter().map(|sum| sum / rows as f64).collect())
    }
}

impl<M: EvalModel> EpochObserver for AccuracySampler<'_, M> {
    fn on_epoch_end(&self, _epoch: usize, _metrics: &EpochMetrics) -> Result<(), ObserverError> {
        let means = self.sampled_means()?;
        println!("{:?}", means);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "accuracy"
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::DMatrix;
    use std::error::Error;

    /// predicts "positive" for inputs greater than zero
    struct ThresholdModel;
    impl EvalModel for ThresholdModel {
        fn predict(&self, batch: &Batch) -> Result<DMatrix<f64>, Box<dyn Error + Send + Sync>> {
            Ok(batch.map(|x| if x > 0.0 { 1.0 } else { 0.0 }))
        }
    }

    struct FailingModel;
    impl EvalModel for FailingModel {
        fn predict(&self, _batch: &Batch) -> Result<DMatrix<f64>, Box<dyn Error + Send + Sync>> {
            Err("device lost".into())
        }
    }

    #[test]
    fn averages_all_batches_but_the_last() {
        // two kept batches of two examples each, two output columns
        let eval_data = vec![
            DMatrix::from_row_slice(2, 2, &[1.0, -1.0, 2.0, 3.0]),
            DMatrix::from_row_slice(2, 2, &[-1.0, -2.0, 4.0, -3.0]),
            DMatrix::from_row_slice(1, 2, &[9.0, 9.0]), // excluded from the average
        ];
        let model = ThresholdModel;
        let sampler = AccuracySampler::new(&model, &eval_data);
        let means = sampler.sampled_means().unwrap();
        // column 0: predictions 1, 1, 0, 1 -> 0.75; column 1: 0, 1, 0, 0 -> 0.25
        assert_eq!(means, vec![0.75, 0.25]);
    }

    #[test]
    fn single_batch_fails_with_empty_aggregation() {
        let eval_data = vec![DMatrix::from_row_slice(2, 1, &[1.0, -1.0])];
        let model = ThresholdModel;
        let sampler = AccuracySampler::new(&model, &eval_data);
        let err = sampler.sampled_means().unwrap_err();
        assert!(matches!(
            err,
            ObserverError::EmptyAggregation { batches: 1 }
        ));
    }

    #[test]
    fn empty_dataset_fails_with_empty_aggregation() {
        let eval_data: Vec<Batch> = vec![];
        let model = ThresholdModel;
        let sampler = AccuracySampler::new(&model, &eval_data);
        let err = sampler.sampled_means().unwrap_err();
        assert!(matches!(
            err,
            ObserverError::EmptyAggregation { batches: 0 }
        ));
    }

    // Pins the blunt partial-batch heuristic: the final batch is dropped even when it
    // is a full batch of valid predictions.
    #[test]
    fn full_final_batch_is_still_dropped() {
        let eval_data = vec![
            DMatrix::from_row_slice(2, 1, &[1.0, 2.0]),
            DMatrix::from_row_slice(2, 1, &[-1.0, -2.0]), // same size, still excluded
        ];
        let model = ThresholdModel;
        let sampler = AccuracySampler::new(&model, &eval_data);
        let means = sampler.sampled_means().unwrap();
        assert_eq!(means, vec![1.0]);
    }

    #[test]
    fn model_failure_propagates() {
        let eval_data = vec![
            DMatrix::from_row_slice(1, 1, &[1.0]),
            DMatrix::from_row_slice(1, 1, &[2.0]),
        ];
        let model = FailingModel;
        let sampler = AccuracySampler::new(&model, &eval_data);
        let err = sampler.sampled_means().unwrap_err();
        match err {
            ObserverError::Model(source) => assert_eq!(source.to_string(), "device lost"),
            other => panic!("expected a model error, got {:?}", other),
        }
    }

    #[test]
    fn on_epoch_end_ignores_epoch_and_metrics() {
        let eval_data = vec![
            DMatrix::from_row_slice(1, 1, &[1.0]),
            DMatrix::from_row_slice(1, 1, &[-1.0]),
        ];
        let model = ThresholdModel;
        let sampler = AccuracySampler::new(&model, &eval_data);
        assert!(sampler.on_epoch_end(99, &EpochMetrics::default()).is_ok());
    }
}
