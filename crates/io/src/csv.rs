// Raw CSV import, detail CSV export

use std::io::Read;
use std::path::{Path, PathBuf};

use distress_recon::detail::DetailTable;
use distress_recon::Table;

use crate::error::IoError;

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let read_err = |source| IoError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    let mut text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            log::debug!("{}: not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    if text.starts_with('\u{feff}') {
        text.drain(..'\u{feff}'.len_utf8());
    }
    Ok(text)
}

/// One raw export file, first row as headers.
pub fn read_raw_csv(path: &Path) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    let table = Table::from_csv_str(&content).map_err(|source| IoError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("{}: {} rows, {} columns", path.display(), table.len(), table.headers().len());
    Ok(table)
}

/// Every raw file for a client, stacked in the given order.
pub fn load_raw_files(paths: &[PathBuf]) -> Result<Table, IoError> {
    let tables = paths
        .iter()
        .map(|p| read_raw_csv(p))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Table::concat(tables))
}

/// Write the flattened per-property table with a header row.
pub fn write_detail(path: &Path, detail: &DetailTable) -> Result<(), IoError> {
    let write_err = |e: csv::Error| IoError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut writer = csv::WriterBuilder::new().from_path(path).map_err(write_err)?;
    writer.write_record(&detail.headers).map_err(write_err)?;
    for row in &detail.rows {
        writer.write_record(row).map_err(write_err)?;
    }
    writer.flush().map_err(|e| IoError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(())
}
