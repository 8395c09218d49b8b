use std::path::PathBuf;

use distress_recon::ReconError;
use thiserror::Error;

/// Filesystem, CSV and spreadsheet failures, always carrying the path.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot list {}: {source}", path.display())]
    ListDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid file pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
    #[error("{}: {source}", path.display())]
    Parse { path: PathBuf, source: ReconError },
    #[error("{}: {message}", path.display())]
    Spreadsheet { path: PathBuf, message: String },
    #[error("cannot write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },
}

impl IoError {
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            IoError::Read { path, .. }
            | IoError::ListDir { path, .. }
            | IoError::Parse { path, .. }
            | IoError::Spreadsheet { path, .. }
            | IoError::Write { path, .. } => Some(path),
            IoError::Pattern { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_path() {
        let err = IoError::Spreadsheet {
            path: PathBuf::from("Clients/acme/domain data/d.xlsx"),
            message: "workbook contains no sheets".into(),
        };
        assert_eq!(
            err.to_string(),
            "Clients/acme/domain data/d.xlsx: workbook contains no sheets"
        );
        assert!(err.path().is_some());
    }

    #[test]
    fn read_error_keeps_source() {
        let err = IoError::Read {
            path: PathBuf::from("missing.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().starts_with("cannot read missing.csv"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
