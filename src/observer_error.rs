use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Indicates that an observer failed during epoch-end processing.
///
/// No observer recovers from any of these locally; the error aborts the current
/// epoch-end call and surfaces to the training loop's caller. Epoch-end reporting is
/// not on the critical path of training, but it is not protected from crashing the
/// run either - that fragility is deliberate and documented rather than papered over
/// with retries.
#[derive(Debug)]
pub enum ObserverError {
    /// The epoch metrics mapping lacked a key an observer requires. Absence indicates
    /// a misconfigured training loop and is never silently swallowed.
    MissingMetric {
        /// the metric key that was absent
        key: &'static str,
    },
    /// The evaluation dataset had no batches left to aggregate after the final batch
    /// was discarded. Raised the first time the accuracy sampler executes on a
    /// dataset of fewer than two batches.
    EmptyAggregation {
        /// the number of batches in the evaluation dataset
        batches: usize,
    },
    /// A checkpoint could not be written.
    Checkpoint {
        /// the checkpoint file that failed
        path: PathBuf,
        /// the underlying I/O or serialization failure
        source: Box<dyn Error + Send + Sync>,
    },
    /// A dashboard log file could not be written.
    Dashboard {
        /// the dashboard log directory or file that failed
        path: PathBuf,
        /// the underlying I/O failure
        source: std::io::Error,
    },
    /// The evaluation model failed during a forward pass. Propagated as-is; the
    /// observer performs no fault isolation around model invocation.
    Model(Box<dyn Error + Send + Sync>),
    /// The external run-logging sink rejected a log call. Propagated as-is.
    Sink(Box<dyn Error + Send + Sync>),
}

impl fmt::Display for ObserverError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ObserverError::MissingMetric { key } => {
                write!(f, "epoch metrics are missing required key '{}'", key)
            }
            ObserverError::EmptyAggregation { batches } => write!(
                f,
                "evaluation dataset holds {} batch(es), but at least 2 are required because the final batch is always discarded",
                batches
            ),
            ObserverError::Checkpoint { path, source } => {
                write!(f, "failed to write checkpoint {:?}: {}", path, source)
            }
            ObserverError::Dashboard { path, source } => {
                write!(f, "failed to write dashboard log {:?}: {}", path, source)
            }
            ObserverError::Model(source) => write!(f, "evaluation model failed: {}", source),
            ObserverError::Sink(source) => write!(f, "run-logging sink failed: {}", source),
        }
    }
}

impl Error for ObserverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ObserverError::MissingMetric { .. } | ObserverError::EmptyAggregation { .. } => None,
            ObserverError::Checkpoint { source, .. } => Some(source.as_ref()),
            ObserverError::Dashboard { source, .. } => Some(source),
            ObserverError::Model(source) | ObserverError::Sink(source) => Some(source.as_ref()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_error_send() {
        fn assert_send<T: Send>() {}
        assert_send::<ObserverError>();
    }

    #[test]
    fn test_error_sync() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<ObserverError>();
    }

    #[test]
    fn display_names_the_missing_metric() {
        let err = ObserverError::MissingMetric { key: "loss" };
        assert!(err.to_string().contains("loss"));
    }

    #[test]
    fn display_reports_the_batch_count() {
        let err = ObserverError::EmptyAggregation { batches: 1 };
        assert!(err.to_string().contains("1 batch(es)"));
    }
}
