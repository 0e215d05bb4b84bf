//! HDF5 tiles: an `xyzni` dataset (N x 4, f16) holding x, y, z and intensity,
//! and a `labels` dataset (N, u8).

use std::{fs, path::Path};

use half::f16;
use pcd_core::{pointcloud::point::LabeledPointCloud, PointCloudError};

use crate::error::ExportError;

pub const XYZNI_DATASET: &str = "xyzni";
pub const LABELS_DATASET: &str = "labels";

/// Writes the features and labels of one tile, replacing any existing file.
pub fn write_features(
    file_name: &Path,
    xyzni: &[[f32; 4]],
    labels: &[u8],
) -> Result<(), ExportError> {
    if xyzni.len() != labels.len() {
        return Err(PointCloudError::LengthMismatch {
            points: xyzni.len(),
            labels: labels.len(),
        }
        .into());
    }

    if file_name.is_file() {
        log::debug!("removing existing file: {:?}", file_name);
        fs::remove_file(file_name)?;
    }

    let n = labels.len();
    let data: Vec<f16> = xyzni
        .iter()
        .flat_map(|row| row.iter().map(|&v| f16::from_f32(v)))
        .collect();

    let file = hdf5::File::create(file_name)?;
    let xyzni_ds = file
        .new_dataset::<f16>()
        .shape((n, 4))
        .create(XYZNI_DATASET)?;
    let labels_ds = file.new_dataset::<u8>().shape(n).create(LABELS_DATASET)?;
    // empty tiles keep both datasets with a zero-length first dimension
    if n > 0 {
        xyzni_ds.write_raw(data.as_slice())?;
        labels_ds.write_raw(labels)?;
    }
    drop(xyzni_ds);
    drop(labels_ds);
    file.close()?;

    log::debug!("wrote {} points to {:?}", n, file_name);
    Ok(())
}

pub fn write_point_cloud(file_name: &Path, cloud: &LabeledPointCloud) -> Result<(), ExportError> {
    write_features(file_name, cloud.xyzni(), cloud.labels())
}

/// Reads a tile written by [`write_features`]. Half floats are widened to f32.
pub fn read_features(file_name: &Path) -> Result<LabeledPointCloud, ExportError> {
    let file = hdf5::File::open(file_name)?;

    let xyzni_ds = file.dataset(XYZNI_DATASET)?;
    let shape = xyzni_ds.shape();
    if shape.len() != 2 || shape[1] != 4 {
        return Err(ExportError::InvalidShape {
            dataset: XYZNI_DATASET,
            shape,
            expected: "N x 4",
        });
    }
    let raw: Vec<f16> = if shape[0] > 0 {
        xyzni_ds.read_raw()?
    } else {
        Vec::new()
    };
    let xyzni = raw
        .chunks_exact(4)
        .map(|row| [row[0].to_f32(), row[1].to_f32(), row[2].to_f32(), row[3].to_f32()])
        .collect();

    let labels_ds = file.dataset(LABELS_DATASET)?;
    let shape = labels_ds.shape();
    if shape.len() != 1 {
        return Err(ExportError::InvalidShape {
            dataset: LABELS_DATASET,
            shape,
            expected: "N",
        });
    }
    let labels: Vec<u8> = if shape[0] > 0 {
        labels_ds.read_raw()?
    } else {
        Vec::new()
    };

    Ok(LabeledPointCloud::new(xyzni, labels)?)
}
