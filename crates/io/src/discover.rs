// Client directory discovery
//
// Layout under the clients root:
//
//   <root>/<client>/domain data/*.xlsx   first non-"editable" file wins
//   <root>/<client>/raw data/*.csv       all files, name order

use std::path::{Path, PathBuf};

use distress_recon::config::LayoutConfig;
use glob::Pattern;

use crate::error::IoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientDir {
    pub name: String,
    pub path: PathBuf,
}

/// Inputs found for one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientFiles {
    pub domain: PathBuf,
    pub raw: Vec<PathBuf>,
}

/// Outcome of looking for a client's inputs. A missing input is not an
/// error; the client is skipped with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    Ready(ClientFiles),
    Skip(String),
}

/// Immediate subdirectories of `root`, sorted by name. Plain files are ignored.
pub fn list_clients(root: &Path) -> Result<Vec<ClientDir>, IoError> {
    let entries = std::fs::read_dir(root).map_err(|source| IoError::ListDir {
        path: root.to_path_buf(),
        source,
    })?;

    let mut clients = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| IoError::ListDir {
            path: root.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        clients.push(ClientDir { name, path });
    }

    clients.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(clients)
}

/// First domain workbook in name order whose file name does not contain the
/// exclude marker.
pub fn find_domain_file(client_dir: &Path, layout: &LayoutConfig) -> Result<Option<PathBuf>, IoError> {
    let candidates = glob_files(&client_dir.join(&layout.domain_dir), &layout.domain_extension)?;
    Ok(candidates.into_iter().find(|p| {
        let name = p.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        layout.exclude_marker.is_empty() || !name.contains(layout.exclude_marker.as_str())
    }))
}

pub fn find_raw_files(client_dir: &Path, layout: &LayoutConfig) -> Result<Vec<PathBuf>, IoError> {
    glob_files(&client_dir.join(&layout.raw_dir), &layout.raw_extension)
}

/// Resolve both inputs for a client, or the reason it should be skipped.
pub fn locate_inputs(client_dir: &Path, layout: &LayoutConfig) -> Result<Located, IoError> {
    let Some(domain) = find_domain_file(client_dir, layout)? else {
        return Ok(Located::Skip(format!(
            "no domain workbook (*.{}) in '{}'",
            layout.domain_extension, layout.domain_dir
        )));
    };

    let raw = find_raw_files(client_dir, layout)?;
    if raw.is_empty() {
        return Ok(Located::Skip(format!(
            "no raw files (*.{}) in '{}'",
            layout.raw_extension, layout.raw_dir
        )));
    }

    Ok(Located::Ready(ClientFiles { domain, raw }))
}

/// Files in `dir` with the given extension, sorted. A missing directory
/// yields no files.
fn glob_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, IoError> {
    let pattern = format!(
        "{}/*.{}",
        Pattern::escape(&dir.to_string_lossy()),
        Pattern::escape(extension)
    );

    let paths = glob::glob(&pattern).map_err(|e| IoError::Pattern {
        pattern: pattern.clone(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => {
                log::debug!("skipping unreadable entry {}: {}", e.path().display(), e.error());
            }
        }
    }

    files.sort();
    Ok(files)
}
