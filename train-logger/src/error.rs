use std::path::PathBuf;

use thiserror::Error;

use crate::metric::Metric;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse log {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unknown metric '{0}'")]
    UnknownMetric(String),

    #[error("metric '{0}' has no classwise log")]
    NotClasswise(Metric),

    #[error("epoch {epoch} of '{metric}' has scores for {found} of {expected} classes")]
    IncompleteEpoch {
        metric: Metric,
        epoch: usize,
        found: usize,
        expected: usize,
    },
}

impl LoggerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoggerError::Io {
            path: path.into(),
            source,
        }
    }
}
