use std::{io, path::PathBuf};

use las::Reader;
use pcd_core::pointcloud::point::Point;

use super::PointReader;

/// Streams points from a list of LAS/LAZ files, one file after another.
pub struct LasPointReader {
    pub files: Vec<PathBuf>,
    pub current_file_index: usize,
    pub current_reader: Option<Reader>,
}

impl LasPointReader {
    pub fn new(files: Vec<PathBuf>) -> io::Result<Self> {
        Ok(Self {
            files,
            current_file_index: 0,
            current_reader: None,
        })
    }

    fn open_next_file(&mut self) -> io::Result<()> {
        if self.current_file_index < self.files.len() {
            let file = &self.files[self.current_file_index];
            log::debug!("opening LAS file: {:?}", file);
            let reader = Reader::from_path(file).map_err(io::Error::other)?;
            self.current_reader = Some(reader);
            self.current_file_index += 1;
        } else {
            self.current_reader = None;
        }
        Ok(())
    }

    fn convert_las_point(las_point: las::Point) -> Point {
        Point {
            x: las_point.x,
            y: las_point.y,
            z: las_point.z,
            intensity: Some(las_point.intensity),
            classification: Some(u8::from(las_point.classification)),
        }
    }
}

impl PointReader for LasPointReader {
    fn next_point(&mut self) -> io::Result<Option<Point>> {
        loop {
            if self.current_reader.is_none() {
                self.open_next_file()?;
            }
            let Some(reader) = self.current_reader.as_mut() else {
                return Ok(None);
            };

            match reader.points().next() {
                Some(Ok(las_point)) => return Ok(Some(Self::convert_las_point(las_point))),
                Some(Err(e)) => {
                    log::error!("Error reading LAS point: {}", e);
                    return Err(io::Error::other(e));
                }
                None => {
                    self.current_reader = None;
                }
            }
        }
    }
}
