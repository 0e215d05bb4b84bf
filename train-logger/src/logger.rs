use std::{
    borrow::Borrow,
    collections::HashMap,
    fmt,
    fs::{File, OpenOptions},
    io::{LineWriter, Write},
    path::{Path, PathBuf},
};

use crate::{
    error::LoggerError,
    metric::{classwise_log_path, metric_log_path, Metric, CLASSWISE_METRICS, SCALAR_METRICS},
};

/// A metric name the logger has no log file for. The values under that name
/// were skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMetric {
    pub name: String,
    pub classwise: bool,
}

impl fmt::Display for UnknownMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown metric {}", self.name)
    }
}

// `Debug` keeps the fractional part of integral floats (`2.0`, not `2`)
fn format_value(value: f64) -> String {
    format!("{:?}", value)
}

fn tsv_line(fields: &[&dyn fmt::Display]) -> String {
    let mut line = fields
        .iter()
        .map(|field| field.to_string())
        .collect::<Vec<_>>()
        .join("\t");
    line.push('\n');
    line
}

struct LogFile {
    path: PathBuf,
    writer: LineWriter<File>,
}

impl LogFile {
    fn open(path: PathBuf) -> Result<Self, LoggerError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LoggerError::io(&path, e))?;
        Ok(Self {
            path,
            writer: LineWriter::new(file),
        })
    }

    fn write_line(&mut self, line: &str) -> Result<(), LoggerError> {
        self.writer
            .write_all(line.as_bytes())
            .map_err(|e| LoggerError::io(&self.path, e))
    }
}

/// Append-only metric logs of one run mode.
///
/// Every log is opened on construction and stays open until the logger is
/// dropped. Lines are flushed as soon as they are complete.
pub struct InformationLogger {
    metric_values: HashMap<Metric, LogFile>,
    class_scores: HashMap<Metric, LogFile>,
}

impl InformationLogger {
    pub fn new(log_folder: impl AsRef<Path>, mode: &str) -> Result<Self, LoggerError> {
        let log_folder = log_folder.as_ref().to_path_buf();

        let mut metric_values = HashMap::new();
        for metric in SCALAR_METRICS {
            let log = LogFile::open(metric_log_path(&log_folder, mode, metric))?;
            metric_values.insert(metric, log);
        }
        let mut class_scores = HashMap::new();
        for metric in CLASSWISE_METRICS {
            let log = LogFile::open(classwise_log_path(&log_folder, mode, metric))?;
            class_scores.insert(metric, log);
        }

        log::debug!("opened metric logs for mode '{}' in {:?}", mode, log_folder);

        Ok(Self {
            metric_values,
            class_scores,
        })
    }

    /// Appends `epoch\tvalue` to the averaged log of every known metric in
    /// `values`, in the order given. Values keep their float spelling, so
    /// `2.0` is written as `2.0`.
    ///
    /// Unknown names are skipped with a warning and returned to the caller.
    pub fn add_metric_values<I, K, V>(
        &mut self,
        values: I,
        epoch: usize,
    ) -> Result<Vec<UnknownMetric>, LoggerError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Borrow<f64>,
    {
        let mut unknown = Vec::new();
        for (key, value) in values {
            let key = key.as_ref();
            match lookup(&mut self.metric_values, key) {
                Some(log) => {
                    let value = format_value(*value.borrow());
                    log.write_line(&tsv_line(&[&epoch, &value]))?
                }
                None => unknown.push(warn_unknown(key, false)),
            }
        }
        Ok(unknown)
    }

    /// Appends `epoch\tclass\tvalue` for every entry of every known metric in
    /// `values`. Class indices count up from 0 in sequence order.
    pub fn add_class_scores<I, K, S, V>(
        &mut self,
        values: I,
        epoch: usize,
    ) -> Result<Vec<UnknownMetric>, LoggerError>
    where
        I: IntoIterator<Item = (K, S)>,
        K: AsRef<str>,
        S: IntoIterator<Item = V>,
        V: Borrow<f64>,
    {
        let mut unknown = Vec::new();
        for (key, scores) in values {
            let key = key.as_ref();
            match lookup(&mut self.class_scores, key) {
                Some(log) => {
                    for (class_index, score) in scores.into_iter().enumerate() {
                        let score = format_value(*score.borrow());
                        log.write_line(&tsv_line(&[&epoch, &class_index, &score]))?;
                    }
                }
                None => unknown.push(warn_unknown(key, true)),
            }
        }
        Ok(unknown)
    }
}

fn lookup<'a>(logs: &'a mut HashMap<Metric, LogFile>, key: &str) -> Option<&'a mut LogFile> {
    let metric = key.parse::<Metric>().ok()?;
    logs.get_mut(&metric)
}

fn warn_unknown(key: &str, classwise: bool) -> UnknownMetric {
    let unknown = UnknownMetric {
        name: key.to_string(),
        classwise,
    };
    log::warn!("{}", unknown);
    unknown
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, fs};

    use super::*;

    fn log_files(dir: &Path) -> BTreeMap<String, String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|entry| {
                let path = entry.unwrap().path();
                let name = path.file_name().unwrap().to_string_lossy().into_owned();
                (name, fs::read_to_string(&path).unwrap())
            })
            .collect()
    }

    #[test]
    fn creates_all_log_files() {
        let dir = tempfile::tempdir().unwrap();
        let _logger = InformationLogger::new(dir.path(), "train").unwrap();

        let names: Vec<String> = log_files(dir.path()).into_keys().collect();
        assert_eq!(
            names,
            vec![
                "metric_classwise_train_acc.log",
                "metric_classwise_train_fscore.log",
                "metric_classwise_train_iou.log",
                "metric_train_acc.log",
                "metric_train_fscore.log",
                "metric_train_iou.log",
                "metric_train_loss.log",
            ]
        );
    }

    #[test]
    fn appends_scalar_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = InformationLogger::new(dir.path(), "val").unwrap();

        let unknown = logger
            .add_metric_values([("loss", 0.25), ("iou", 0.5)], 1)
            .unwrap();
        assert!(unknown.is_empty());
        logger.add_metric_values([("loss", 0.125)], 2).unwrap();

        let loss = fs::read_to_string(dir.path().join("metric_val_loss.log")).unwrap();
        assert_eq!(loss, "1\t0.25\n2\t0.125\n");
        let iou = fs::read_to_string(dir.path().join("metric_val_iou.log")).unwrap();
        assert_eq!(iou, "1\t0.5\n");
    }

    #[test]
    fn lines_are_visible_before_drop() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = InformationLogger::new(dir.path(), "train").unwrap();

        logger.add_metric_values([("acc", 0.75)], 3).unwrap();
        let acc = fs::read_to_string(dir.path().join("metric_train_acc.log")).unwrap();
        assert_eq!(acc, "3\t0.75\n");
    }

    #[test]
    fn appends_to_existing_logs() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut logger = InformationLogger::new(dir.path(), "train").unwrap();
            logger.add_metric_values([("fscore", 0.5)], 0).unwrap();
        }
        let mut logger = InformationLogger::new(dir.path(), "train").unwrap();
        logger.add_metric_values([("fscore", 0.625)], 1).unwrap();

        let fscore = fs::read_to_string(dir.path().join("metric_train_fscore.log")).unwrap();
        assert_eq!(fscore, "0\t0.5\n1\t0.625\n");
    }

    #[test]
    fn appends_class_scores() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = InformationLogger::new(dir.path(), "train").unwrap();

        let scores = vec![
            ("iou".to_string(), vec![0.9, 0.7, 0.6, 0.85]),
            ("acc".to_string(), vec![0.5, 0.25]),
        ];
        let unknown = logger.add_class_scores(scores, 4).unwrap();
        assert!(unknown.is_empty());

        let iou = fs::read_to_string(dir.path().join("metric_classwise_train_iou.log")).unwrap();
        assert_eq!(iou, "4\t0\t0.9\n4\t1\t0.7\n4\t2\t0.6\n4\t3\t0.85\n");
        let acc = fs::read_to_string(dir.path().join("metric_classwise_train_acc.log")).unwrap();
        assert_eq!(acc.lines().count(), 2);
        assert_eq!(acc, "4\t0\t0.5\n4\t1\t0.25\n");
    }

    #[test]
    fn unknown_scalar_metric_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = InformationLogger::new(dir.path(), "train").unwrap();
        let before = log_files(dir.path());

        let unknown = logger.add_metric_values([("precision", 0.3)], 1).unwrap();

        assert_eq!(
            unknown,
            vec![UnknownMetric {
                name: "precision".to_string(),
                classwise: false
            }]
        );
        assert_eq!(log_files(dir.path()), before);
    }

    #[test]
    fn loss_has_no_classwise_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = InformationLogger::new(dir.path(), "train").unwrap();
        let before = log_files(dir.path());

        let unknown = logger
            .add_class_scores([("loss", vec![0.1, 0.2])], 1)
            .unwrap();

        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].name, "loss");
        assert!(unknown[0].classwise);
        assert_eq!(unknown[0].to_string(), "Unknown metric loss");
        assert_eq!(log_files(dir.path()), before);
    }

    #[test]
    fn known_metrics_are_written_around_unknown_ones() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = InformationLogger::new(dir.path(), "train").unwrap();

        let unknown = logger
            .add_metric_values([("loss", 1.5), ("recall", 0.2), ("iou", 0.4)], 7)
            .unwrap();

        assert_eq!(unknown.len(), 1);
        let loss = fs::read_to_string(dir.path().join("metric_train_loss.log")).unwrap();
        assert_eq!(loss, "7\t1.5\n");
        let iou = fs::read_to_string(dir.path().join("metric_train_iou.log")).unwrap();
        assert_eq!(iou, "7\t0.4\n");
    }

    #[test]
    fn modes_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let mut train = InformationLogger::new(dir.path(), "train").unwrap();
        let mut val = InformationLogger::new(dir.path(), "val").unwrap();

        train.add_metric_values([("loss", 2.0)], 1).unwrap();
        val.add_metric_values([("loss", 3.5)], 1).unwrap();

        let train_loss = fs::read_to_string(dir.path().join("metric_train_loss.log")).unwrap();
        let val_loss = fs::read_to_string(dir.path().join("metric_val_loss.log")).unwrap();
        assert_eq!(train_loss, "1\t2.0\n");
        assert_eq!(val_loss, "1\t3.5\n");
    }

    #[test]
    fn integral_floats_keep_their_fraction() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = InformationLogger::new(dir.path(), "train").unwrap();

        logger
            .add_metric_values([("loss", 2.0), ("iou", 1e-5)], 1)
            .unwrap();
        logger
            .add_class_scores([("acc", vec![1.0, 0.5, 0.0])], 1)
            .unwrap();

        let loss = fs::read_to_string(dir.path().join("metric_train_loss.log")).unwrap();
        assert_eq!(loss, "1\t2.0\n");
        let iou = fs::read_to_string(dir.path().join("metric_train_iou.log")).unwrap();
        let (epoch, value) = iou.trim_end().split_once('\t').unwrap();
        assert_eq!(epoch, "1");
        assert_eq!(value.parse::<f64>().unwrap(), 1e-5);
        let acc = fs::read_to_string(dir.path().join("metric_classwise_train_acc.log")).unwrap();
        assert_eq!(acc, "1\t0\t1.0\n1\t1\t0.5\n1\t2\t0.0\n");
    }

    #[test]
    fn accepts_borrowed_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = InformationLogger::new(dir.path(), "val").unwrap();

        let values: BTreeMap<String, f64> = [("loss".to_string(), 3.0)].into_iter().collect();
        logger.add_metric_values(&values, 2).unwrap();
        let scores = vec![0.25, 1.0];
        logger.add_class_scores([("fscore", &scores)], 2).unwrap();

        let loss = fs::read_to_string(dir.path().join("metric_val_loss.log")).unwrap();
        assert_eq!(loss, "2\t3.0\n");
        let fscore =
            fs::read_to_string(dir.path().join("metric_classwise_val_fscore.log")).unwrap();
        assert_eq!(fscore, "2\t0\t0.25\n2\t1\t1.0\n");
    }

    #[test]
    fn missing_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = InformationLogger::new(dir.path().join("missing"), "train");
        assert!(matches!(result, Err(LoggerError::Io { .. })));
    }
}
