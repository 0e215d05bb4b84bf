use std::{
    fs::File,
    io::{BufReader, BufWriter, Write as _},
    path::Path,
};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::LoggerError;

pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Dumps a run configuration as block-style YAML to `folder/config.yaml`,
/// replacing any previous file.
pub fn write_config<T: Serialize + ?Sized>(folder: &Path, args: &T) -> Result<(), LoggerError> {
    let path = folder.join(CONFIG_FILE_NAME);
    let file = File::create(&path).map_err(|e| LoggerError::io(&path, e))?;
    let mut writer = BufWriter::new(file);
    serde_yaml::to_writer(&mut writer, args)?;
    writer.flush().map_err(|e| LoggerError::io(&path, e))?;
    log::debug!("wrote run configuration to {:?}", path);
    Ok(())
}

pub fn read_config<T: DeserializeOwned>(folder: &Path) -> Result<T, LoggerError> {
    let path = folder.join(CONFIG_FILE_NAME);
    let file = File::open(&path).map_err(|e| LoggerError::io(&path, e))?;
    Ok(serde_yaml::from_reader(BufReader::new(file))?)
}
