use crate::{EpochMetrics, ObserverError};

/// Structs implementing this trait can be attached to a training run and invoked at
/// epoch boundaries.
///
/// The training loop calls [`on_epoch_end`](EpochObserver::on_epoch_end) on each
/// attached observer in sequence order, strictly one at a time, on its own thread.
/// Observers share no state with each other; each reacts to the epoch independently.
pub trait EpochObserver {
    /// Called by the training loop at the end of each epoch, with the one-indexed
    /// epoch number and the scalar metrics accumulated over that epoch.
    ///
    /// An `Err` return aborts the current epoch-end pass; no observer retries or
    /// recovers locally, and whether later observers in the list still run is owned
    /// by the training loop.
    fn on_epoch_end(&self, epoch: usize, metrics: &EpochMetrics) -> Result<(), ObserverError>;

    /// A short stable identifier for this observer, used in log lines and for
    /// asserting on the composition of an observer list.
    fn name(&self) -> &'static str;
}

impl<'a> std::fmt::Debug for dyn EpochObserver + 'a {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EpochObserver").field(&self.name()).finish()
    }
}

/// An observer that does nothing when called.
/// Used as a placeholder when a training loop requires an observer but the run has
/// nothing to report.
#[derive(Default)]
pub struct EmptyObserver {}

impl EmptyObserver {
    /// Create a new instance of the EmptyObserver
    pub fn new() -> Self {
        EmptyObserver {}
    }
}

impl EpochObserver for EmptyObserver {
    fn on_epoch_end(&self, _epoch: usize, _metrics: &EpochMetrics) -> Result<(), ObserverError> {
        // do nothing
        Ok(())
    }

    fn name(&self) -> &'static str {
        "empty"
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_observer_ignores_everything() {
        let observer = EmptyObserver::new();
        let metrics = EpochMetrics::default();
        assert!(observer.on_epoch_end(1, &metrics).is_ok());
        assert_eq!(observer.name(), "empty");
    }
}
