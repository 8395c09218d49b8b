// Distress CLI - raw vs domain property-distress reconciliation, per client

mod exit_codes;
mod run;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::Env;

use distress_recon::DistressConfig;

use exit_codes::{EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "distress")]
#[command(about = "Reconcile raw vs domain property-distress data for each client")]
#[command(version)]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile every client directory under the clients root
    #[command(after_help = "\
Examples:
  distress run
  distress run --root /data/Clients --output-dir reports
  distress run --client acme --client globex --json
  distress run --config distress.toml -v

Each client needs '<client>/domain data/*.xlsx' and '<client>/raw data/*.csv'.
Writes '<client>_results.xlsx' to the output directory and
'<client>_distress_analysis.csv' into the client directory.")]
    Run {
        /// Directory whose subdirectories are clients
        #[arg(long, default_value = "Clients", env = "DISTRESS_ROOT")]
        root: PathBuf,

        /// TOML configuration (built-in defaults when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory for summary workbooks
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Only process this client (repeatable)
        #[arg(long = "client", value_name = "NAME")]
        clients: Vec<String>,

        /// Print the batch summary as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Parse and validate a configuration file without running
    #[command(after_help = "\
Examples:
  distress validate --config distress.toml")]
    Validate {
        #[arg(long)]
        config: PathBuf,
    },

    /// Print the effective category mapping
    #[command(after_help = "\
Examples:
  distress categories
  distress categories --config distress.toml --json")]
    Categories {
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let result = match cli.command {
        Commands::Run {
            root,
            config,
            output_dir,
            clients,
            json,
        } => run::cmd_run(root, config, output_dir, clients, json),
        Commands::Validate { config } => cmd_validate(&config),
        Commands::Categories { config, json } => cmd_categories(config.as_deref(), json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(EXIT_INVALID_CONFIG, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Built-in defaults, or the given file parsed and validated.
pub(crate) fn load_config(path: Option<&Path>) -> Result<DistressConfig, CliError> {
    let Some(path) = path else {
        return Ok(DistressConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::usage(format!("cannot read config {}: {e}", path.display())))?;
    let config = DistressConfig::from_toml(&text)
        .map_err(|e| CliError::config(format!("{}: {e}", path.display())))?;

    log::debug!("loaded {} ({} categories)", path.display(), config.categories.len());
    Ok(config)
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(path: &Path) -> Result<(), CliError> {
    let config = load_config(Some(path))?;
    eprintln!(
        "valid: {} categories, join '{}' = '{}', domain duplicates: {}",
        config.categories.len(),
        config.join.raw_key,
        config.join.domain_key,
        config.join.on_domain_duplicate.as_str(),
    );
    Ok(())
}

// ============================================================================
// categories
// ============================================================================

fn cmd_categories(path: Option<&Path>, json: bool) -> Result<(), CliError> {
    let config = load_config(path)?;

    if json {
        let rows: Vec<serde_json::Value> = config
            .categories
            .iter()
            .map(|c| {
                serde_json::json!({
                    "label": c.display_label(),
                    "raw": c.raw,
                    "domain": c.domain,
                })
            })
            .collect();
        let out = serde_json::to_string_pretty(&rows)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    let label_width = config.categories.iter().map(|c| c.display_label().len()).max().unwrap_or(0).max(5);
    let raw_width = config.categories.iter().map(|c| c.raw.len()).max().unwrap_or(0).max(3);
    println!("{:<label_width$}  {:<raw_width$}  DOMAIN", "LABEL", "RAW");
    for c in &config.categories {
        println!("{:<label_width$}  {:<raw_width$}  {}", c.display_label(), c.raw, c.domain);
    }
    Ok(())
}
