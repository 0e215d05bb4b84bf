pub mod csv;
pub mod las;

use std::{
    ffi::OsStr,
    io,
    path::{Path, PathBuf},
};

use pcd_core::pointcloud::point::Point;

use self::{csv::CsvPointReader, las::LasPointReader};

pub trait PointReader {
    fn next_point(&mut self) -> io::Result<Option<Point>>;
}

impl<R: PointReader + ?Sized> PointReader for Box<R> {
    fn next_point(&mut self) -> io::Result<Option<Point>> {
        (**self).next_point()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Las,
    Laz,
    Csv,
    Txt,
}

pub fn get_extension(path: &Path) -> io::Result<Extension> {
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("las") => Ok(Extension::Las),
        Some("laz") => Ok(Extension::Laz),
        Some("csv") => Ok(Extension::Csv),
        Some("txt") => Ok(Extension::Txt),
        Some(other) => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unsupported extension '{}': {}", other, path.display()),
        )),
        None => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("file extension is not found: {}", path.display()),
        )),
    }
}

/// Opens the reader matching the extension of `path`.
pub fn open_reader(path: &Path) -> io::Result<Box<dyn PointReader>> {
    let files = vec![PathBuf::from(path)];
    match get_extension(path)? {
        Extension::Las | Extension::Laz => Ok(Box::new(LasPointReader::new(files)?)),
        Extension::Csv | Extension::Txt => Ok(Box::new(CsvPointReader::new(files)?)),
    }
}

pub struct PointIterator<R: PointReader> {
    reader: R,
    chunk_size: usize,
    error: Option<io::Error>,
}

impl<R: PointReader> PointIterator<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
            error: None,
        }
    }

    /// The error that ended iteration early, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }
}

impl<R: PointReader> Iterator for PointIterator<R> {
    type Item = Vec<Point>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.error.is_some() {
            return None;
        }

        let mut buffer = Vec::with_capacity(self.chunk_size);

        for _ in 0..self.chunk_size {
            match self.reader.next_point() {
                Ok(Some(p)) => buffer.push(p),
                Ok(None) => break,
                Err(e) => {
                    log::error!("Error reading point: {}", e);
                    self.error = Some(e);
                    break;
                }
            }
        }

        if buffer.is_empty() {
            None
        } else {
            Some(buffer)
        }
    }
}
