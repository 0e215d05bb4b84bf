pub mod config;
pub mod error;
pub mod logger;
pub mod metric;
pub mod reader;
pub mod summary;

pub use config::{read_config, write_config};
pub use error::LoggerError;
pub use logger::{InformationLogger, UnknownMetric};
pub use metric::Metric;
pub use summary::{format_metric, print_metric};
