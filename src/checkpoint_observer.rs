use serde::Serialize;
use std::fs::{self, File};
use std::path::PathBuf;

use crate::{EpochMetrics, EpochObserver, ObserverError};

/// An observer that persists a snapshot of model parameters at the end of every epoch.
///
/// Checkpoints are weights-only: the model itself is serialized, and optimizer state
/// never enters the file. Files are written in CBOR under the configured checkpoint
/// directory, one per epoch, named by the template `cp-{epoch:04}.ckpt` (epoch number
/// zero-padded to 4 digits). The directory is created on first use.
///
/// The observer holds the model by reference; the training loop retains ownership and
/// keeps updating the weights between epochs.
pub struct CheckpointObserver<'a, M: Serialize> {
    ckpt_dir: PathBuf,
    model: &'a M,
}

impl<'a, M: Serialize> CheckpointObserver<'a, M> {
    /// Create an observer that writes checkpoints for `model` under `ckpt_dir`.
    pub fn new(ckpt_dir: PathBuf, model: &'a M) -> Self {
        CheckpointObserver { ckpt_dir, model }
    }

    /// The file a checkpoint for the given epoch is written to, e.g.
    /// `<ckpt_dir>/cp-0007.ckpt` for epoch 7.
    pub fn checkpoint_path(&self, epoch: usize) -> PathBuf {
        self.ckpt_dir.join(format!("cp-{:04}.ckpt", epoch))
    }
}

impl<M: Serialize> EpochObserver for CheckpointObserver<'_, M> {
    fn on_epoch_end(&self, epoch: usize, _metrics: &EpochMetrics) -> Result<(), ObserverError> {
        let path = self.checkpoint_path(epoch);
        fs::create_dir_all(&self.ckpt_dir).map_err(|e| ObserverError::Checkpoint {
            path: path.clone(),
            source: Box::new(e),
        })?;
        let mut file = File::create(&path).map_err(|e| ObserverError::Checkpoint {
            path: path.clone(),
            source: Box::new(e),
        })?;
        ciborium::into_writer(self.model, &mut file).map_err(|e| ObserverError::Checkpoint {
            path: path.clone(),
            source: Box::new(e),
        })?;
        log::info!("epoch {}: saved checkpoint to {:?}", epoch, path);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "checkpoint"
    }
}
