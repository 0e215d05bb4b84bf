use pcd_core::PointCloudError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    PointCloud(#[from] PointCloudError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    #[error("dataset '{dataset}' has shape {shape:?}, expected {expected}")]
    InvalidShape {
        dataset: &'static str,
        shape: Vec<usize>,
        expected: &'static str,
    },
}
