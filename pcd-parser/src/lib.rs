pub mod reader;

pub use reader::{get_extension, open_reader, Extension, PointIterator, PointReader};
