use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::error::LoggerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Loss,
    Iou,
    Acc,
    Fscore,
}

/// Metrics logged as one averaged value per epoch.
pub const SCALAR_METRICS: [Metric; 4] = [Metric::Loss, Metric::Iou, Metric::Acc, Metric::Fscore];

/// Metrics logged as one value per class per epoch.
pub const CLASSWISE_METRICS: [Metric; 3] = [Metric::Iou, Metric::Acc, Metric::Fscore];

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Loss => "loss",
            Metric::Iou => "iou",
            Metric::Acc => "acc",
            Metric::Fscore => "fscore",
        }
    }

    pub fn is_classwise(self) -> bool {
        CLASSWISE_METRICS.contains(&self)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loss" => Ok(Metric::Loss),
            "iou" => Ok(Metric::Iou),
            "acc" => Ok(Metric::Acc),
            "fscore" => Ok(Metric::Fscore),
            other => Err(LoggerError::UnknownMetric(other.to_string())),
        }
    }
}

/// `metric_{mode}_{metric}.log`
pub fn metric_log_path(log_folder: &Path, mode: &str, metric: Metric) -> PathBuf {
    log_folder.join(format!("metric_{}_{}.log", mode, metric))
}

/// `metric_classwise_{mode}_{metric}.log`
pub fn classwise_log_path(log_folder: &Path, mode: &str, metric: Metric) -> PathBuf {
    log_folder.join(format!("metric_classwise_{}_{}.log", mode, metric))
}
