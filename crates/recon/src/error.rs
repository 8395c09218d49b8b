use thiserror::Error;

use crate::table::Side;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (empty join key, duplicate category, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// A required column (join key, descriptive column) is absent.
    #[error("{side} data: missing column '{column}'")]
    MissingColumn { side: Side, column: String },
    /// A detail column is absent from the merged view.
    #[error("merged data: missing column '{column}'")]
    MissingMergedColumn { column: String },
    /// A configured category field is absent from its side's schema.
    #[error("category '{category}': {side} field '{column}' not found")]
    CategoryNotFound {
        side: Side,
        category: String,
        column: String,
    },
    /// The domain table carries the same identifier more than once.
    #[error("domain data has duplicate identifiers: {}", format_keys(.keys))]
    DuplicateDomainKeys { keys: Vec<String> },
    /// A cell could not be read as an integer indicator.
    #[error("{side} column '{column}', property '{key}': cannot read '{value}' as an integer")]
    NotAnInteger {
        side: Side,
        column: String,
        key: String,
        value: String,
    },
    /// CSV read error.
    #[error("CSV error: {0}")]
    Csv(String),
}

const MAX_LISTED_KEYS: usize = 10;

fn format_keys(keys: &[String]) -> String {
    let shown: Vec<&str> = keys.iter().take(MAX_LISTED_KEYS).map(String::as_str).collect();
    if keys.len() > MAX_LISTED_KEYS {
        format!("{} (and {} more)", shown.join(", "), keys.len() - MAX_LISTED_KEYS)
    } else {
        shown.join(", ")
    }
}

impl From<csv::Error> for ReconError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}
