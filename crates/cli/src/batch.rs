//! Per-client batch driver.
//!
//! Every client directory under the root is processed independently: a
//! skip or failure is recorded and the next client still runs.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use distress_io::discover::{list_clients, locate_inputs};
use distress_io::{ClientDir, ClientFiles, IoError, Located};
use distress_recon::{ClientInput, ClientReport, DistressConfig, ReconError};

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory whose subdirectories are clients.
    pub root: PathBuf,
    /// Where summary workbooks are written.
    pub output_dir: PathBuf,
    /// Restrict the run to these client names. Empty means all.
    pub clients: Vec<String>,
}

/// Why a client could not be processed.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    Recon(#[from] ReconError),
}

/// Errors that stop the whole batch before any client runs.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Root(IoError),
    #[error("no client named '{name}' under {}", root.display())]
    UnknownClient { name: String, root: PathBuf },
    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClientStatus {
    Processed {
        workbook: PathBuf,
        detail: PathBuf,
        report: ClientReport,
    },
    Skipped {
        reason: String,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Serialize)]
pub struct ClientOutcome {
    pub client: String,
    #[serde(flatten)]
    pub status: ClientStatus,
}

#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub root: PathBuf,
    pub engine_version: String,
    pub run_at: String,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub clients: Vec<ClientOutcome>,
}

impl BatchSummary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Process every selected client in name order.
pub fn run_batch(config: &DistressConfig, options: &BatchOptions) -> Result<BatchSummary, BatchError> {
    let run_at = chrono::Utc::now().to_rfc3339();
    let clients = select_clients(list_clients(&options.root).map_err(BatchError::Root)?, options)?;

    std::fs::create_dir_all(&options.output_dir).map_err(|source| BatchError::OutputDir {
        path: options.output_dir.clone(),
        source,
    })?;

    log::info!("{} client(s) under {}", clients.len(), options.root.display());

    let mut outcomes = Vec::with_capacity(clients.len());
    for client in &clients {
        let status = process_client(config, client, &options.output_dir);
        match &status {
            ClientStatus::Processed { report, .. } => log::info!(
                "{}: {} record(s), {} matched, {} unmatched",
                client.name,
                report.total_records,
                report.matched_records,
                report.unmatched_records()
            ),
            ClientStatus::Skipped { reason } => log::warn!("{}: skipped, {}", client.name, reason),
            ClientStatus::Failed { error } => log::error!("{}: failed, {}", client.name, error),
        }
        outcomes.push(ClientOutcome {
            client: client.name.clone(),
            status,
        });
    }

    let count = |pred: fn(&ClientStatus) -> bool| outcomes.iter().filter(|o| pred(&o.status)).count();
    let summary = BatchSummary {
        root: options.root.clone(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        run_at,
        processed: count(|s| matches!(s, ClientStatus::Processed { .. })),
        skipped: count(|s| matches!(s, ClientStatus::Skipped { .. })),
        failed: count(|s| matches!(s, ClientStatus::Failed { .. })),
        clients: outcomes,
    };

    log::info!(
        "batch done: {} processed, {} skipped, {} failed",
        summary.processed,
        summary.skipped,
        summary.failed
    );
    Ok(summary)
}

fn select_clients(all: Vec<ClientDir>, options: &BatchOptions) -> Result<Vec<ClientDir>, BatchError> {
    if options.clients.is_empty() {
        return Ok(all);
    }
    for name in &options.clients {
        if !all.iter().any(|c| &c.name == name) {
            return Err(BatchError::UnknownClient {
                name: name.clone(),
                root: options.root.clone(),
            });
        }
    }
    Ok(all.into_iter().filter(|c| options.clients.contains(&c.name)).collect())
}

/// Locate, load, reconcile and write reports for one client.
pub fn process_client(config: &DistressConfig, client: &ClientDir, output_dir: &Path) -> ClientStatus {
    let files = match locate_inputs(&client.path, &config.layout) {
        Ok(Located::Ready(files)) => files,
        Ok(Located::Skip(reason)) => return ClientStatus::Skipped { reason },
        Err(e) => return ClientStatus::Failed { error: e.to_string() },
    };

    match reconcile(config, client, &files, output_dir) {
        Ok((report, workbook, detail)) => ClientStatus::Processed {
            workbook,
            detail,
            report,
        },
        Err(e) => ClientStatus::Failed { error: e.to_string() },
    }
}

fn reconcile(
    config: &DistressConfig,
    client: &ClientDir,
    files: &ClientFiles,
    output_dir: &Path,
) -> Result<(ClientReport, PathBuf, PathBuf), ClientError> {
    log::debug!(
        "{}: domain {}, {} raw file(s)",
        client.name,
        files.domain.display(),
        files.raw.len()
    );

    let input = ClientInput {
        client: client.name.clone(),
        raw: distress_io::csv::load_raw_files(&files.raw)?,
        domain: distress_io::xlsx::read_domain_workbook(&files.domain)?,
    };
    let report = distress_recon::run(config, input)?;

    let workbook = output_dir.join(config.output.workbook_name(&client.name));
    distress_io::xlsx::write_summary_workbook(&workbook, &report.discrepancies, &report.mismatches)?;

    let detail = client.path.join(config.output.detail_name(&client.name));
    distress_io::csv::write_detail(&detail, &report.detail)?;

    log::debug!("{}: wrote {} and {}", client.name, workbook.display(), detail.display());
    Ok((report, workbook, detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn client(root: &Path, name: &str) -> ClientDir {
        let path = root.join(name);
        fs::create_dir_all(&path).unwrap();
        ClientDir {
            name: name.into(),
            path,
        }
    }

    #[test]
    fn client_without_domain_file_is_skipped() {
        let dir = tempdir().unwrap();
        let c = client(dir.path(), "acme");
        fs::create_dir_all(c.path.join("raw data")).unwrap();
        fs::write(c.path.join("raw data/r.csv"), "PropertyID\n1\n").unwrap();

        let status = process_client(&DistressConfig::default(), &c, dir.path());
        assert!(matches!(status, ClientStatus::Skipped { ref reason } if reason.contains("domain")));
    }

    #[test]
    fn unreadable_domain_workbook_fails_client() {
        let dir = tempdir().unwrap();
        let c = client(dir.path(), "acme");
        fs::create_dir_all(c.path.join("raw data")).unwrap();
        fs::create_dir_all(c.path.join("domain data")).unwrap();
        fs::write(c.path.join("raw data/r.csv"), "PropertyID\n1\n").unwrap();
        fs::write(c.path.join("domain data/d.xlsx"), "garbage").unwrap();

        let status = process_client(&DistressConfig::default(), &c, dir.path());
        assert!(matches!(status, ClientStatus::Failed { ref error } if error.contains("d.xlsx")));
    }

    #[test]
    fn unknown_client_filter_is_rejected() {
        let dir = tempdir().unwrap();
        client(dir.path(), "acme");
        let options = BatchOptions {
            root: dir.path().to_path_buf(),
            output_dir: dir.path().join("out"),
            clients: vec!["globex".into()],
        };

        let err = run_batch(&DistressConfig::default(), &options).unwrap_err();
        assert!(matches!(err, BatchError::UnknownClient { ref name, .. } if name == "globex"));
    }

    #[test]
    fn missing_root_is_root_error() {
        let dir = tempdir().unwrap();
        let options = BatchOptions {
            root: dir.path().join("Clients"),
            output_dir: dir.path().to_path_buf(),
            clients: vec![],
        };

        let err = run_batch(&DistressConfig::default(), &options).unwrap_err();
        assert!(matches!(err, BatchError::Root(_)));
    }

    #[test]
    fn skipped_clients_do_not_fail_the_batch() {
        let dir = tempdir().unwrap();
        client(dir.path(), "acme");
        client(dir.path(), "globex");
        let options = BatchOptions {
            root: dir.path().to_path_buf(),
            output_dir: dir.path().join("out"),
            clients: vec![],
        };

        let summary = run_batch(&DistressConfig::default(), &options).unwrap();
        assert_eq!(summary.skipped, 2);
        assert!(!summary.has_failures());

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["clients"][0]["client"], "acme");
        assert_eq!(json["clients"][0]["status"], "skipped");
    }
}
