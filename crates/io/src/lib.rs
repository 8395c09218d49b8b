// File I/O operations: client discovery, raw CSV and domain workbook
// loading, summary workbook and detail file writing.

pub mod csv;
pub mod discover;
pub mod error;
pub mod xlsx;

pub use discover::{ClientDir, ClientFiles, Located};
pub use error::IoError;
