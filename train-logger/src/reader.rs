//! Reads back the tab-separated metric logs written by
//! [`InformationLogger`](crate::logger::InformationLogger).

use std::path::Path;

use csv::ReaderBuilder;
use pcd_core::classes::NUM_CLASSES;
use serde::de::DeserializeOwned;

use crate::{
    error::LoggerError,
    metric::{classwise_log_path, metric_log_path, Metric},
};

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LoggerError> {
    let parse_error = |source| LoggerError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(path)
        .map_err(parse_error)?;

    rdr.deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(parse_error)
}

/// `(epoch, value)` rows of an averaged metric log.
pub fn read_metric_log(path: &Path) -> Result<Vec<(usize, f64)>, LoggerError> {
    read_rows(path)
}

/// `(epoch, class_index, value)` rows of a classwise metric log.
pub fn read_classwise_log(path: &Path) -> Result<Vec<(usize, usize, f64)>, LoggerError> {
    read_rows(path)
}

/// The last epoch logged for `metric`, with its overall value and its
/// per-class scores. Returns `None` if nothing has been logged yet.
///
/// If an epoch was logged more than once (a resumed run) the latest rows win.
pub fn last_epoch_summary(
    log_folder: &Path,
    mode: &str,
    metric: Metric,
) -> Result<Option<(usize, (f64, [f64; NUM_CLASSES]))>, LoggerError> {
    if !metric.is_classwise() {
        return Err(LoggerError::NotClasswise(metric));
    }

    let rows = read_metric_log(&metric_log_path(log_folder, mode, metric))?;
    let Some(&(epoch, overall)) = rows.last() else {
        return Ok(None);
    };

    let mut classwise = [None; NUM_CLASSES];
    for (row_epoch, class_index, value) in
        read_classwise_log(&classwise_log_path(log_folder, mode, metric))?
    {
        if row_epoch == epoch && class_index < NUM_CLASSES {
            classwise[class_index] = Some(value);
        }
    }

    let found = classwise.iter().filter(|v| v.is_some()).count();
    if found < NUM_CLASSES {
        return Err(LoggerError::IncompleteEpoch {
            metric,
            epoch,
            found,
            expected: NUM_CLASSES,
        });
    }

    Ok(Some((epoch, (overall, classwise.map(|v| v.unwrap_or_default())))))
}
