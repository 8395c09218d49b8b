//! `distress run`: batch reconciliation over a clients root.

use std::path::PathBuf;

use distress_cli::batch::{run_batch, BatchError, BatchOptions, BatchSummary, ClientStatus};
use distress_recon::SummaryEntry;

use crate::exit_codes::{EXIT_CLIENT_FAILED, EXIT_ROOT_UNREADABLE};
use crate::{load_config, CliError};

pub fn cmd_run(
    root: PathBuf,
    config_path: Option<PathBuf>,
    output_dir: PathBuf,
    clients: Vec<String>,
    json_output: bool,
) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;
    let options = BatchOptions {
        root,
        output_dir,
        clients,
    };

    let summary = run_batch(&config, &options).map_err(|e| match e {
        BatchError::Root(_) => CliError::new(EXIT_ROOT_UNREADABLE, e.to_string())
            .with_hint("pass --root or run from the directory that contains 'Clients'"),
        BatchError::UnknownClient { .. } => CliError::usage(e.to_string()),
        BatchError::OutputDir { .. } => CliError::general(e.to_string()),
    })?;

    if json_output {
        let json_str = serde_json::to_string_pretty(&summary)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    } else {
        print_human(&summary);
    }

    if summary.has_failures() {
        return Err(CliError::new(
            EXIT_CLIENT_FAILED,
            format!("{} of {} client(s) failed", summary.failed, summary.clients.len()),
        ));
    }
    Ok(())
}

/// Both summary tables per processed client, then a one-line tally.
fn print_human(summary: &BatchSummary) {
    for outcome in &summary.clients {
        match &outcome.status {
            ClientStatus::Processed { report, workbook, detail } => {
                println!("== {} ==", outcome.client);
                println!(
                    "{} merged record(s): {} matched, {} unmatched",
                    report.total_records,
                    report.matched_records,
                    report.unmatched_records()
                );
                println!();
                print_table("Discrepancies", &report.discrepancies);
                println!();
                print_table("Mismatches (raw 1, domain 0)", &report.mismatches);
                println!();
                println!("wrote {}", workbook.display());
                println!("wrote {}", detail.display());
                println!();
            }
            ClientStatus::Skipped { reason } => println!("== {} == skipped: {}", outcome.client, reason),
            ClientStatus::Failed { error } => println!("== {} == failed: {}", outcome.client, error),
        }
    }
    println!(
        "{} processed, {} skipped, {} failed",
        summary.processed, summary.skipped, summary.failed
    );
}

fn print_table(title: &str, entries: &[SummaryEntry]) {
    let width = entries.iter().map(|e| e.category.len()).max().unwrap_or(0).max(13);
    println!("{title}");
    println!("  {:<width$}  {:>6}  {:>8}", "Distress Type", "Count", "Percent");
    for e in entries {
        println!("  {:<width$}  {:>6}  {:>8}", e.category, e.count, e.percentage_display());
    }
}
