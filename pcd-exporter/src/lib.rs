pub mod error;
pub mod h5;

pub use error::ExportError;
