use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PointCloudError {
    #[error("point count mismatch: {points} points but {labels} labels")]
    LengthMismatch { points: usize, labels: usize },
}
