use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Everything a batch run needs. Every section defaults to the standard
/// client layout, so an empty TOML document is a valid config.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DistressConfig {
    #[serde(default)]
    pub join: JoinConfig,
    #[serde(default)]
    pub normalize: NormalizeConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub detail: DetailConfig,
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,
}

impl Default for DistressConfig {
    fn default() -> Self {
        Self {
            join: JoinConfig::default(),
            normalize: NormalizeConfig::default(),
            layout: LayoutConfig::default(),
            output: OutputConfig::default(),
            detail: DetailConfig::default(),
            categories: default_categories(),
        }
    }
}

// ---------------------------------------------------------------------------
// Join
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct JoinConfig {
    #[serde(default = "default_raw_key")]
    pub raw_key: String,
    #[serde(default = "default_domain_key")]
    pub domain_key: String,
    #[serde(default)]
    pub on_domain_duplicate: DuplicatePolicy,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            raw_key: default_raw_key(),
            domain_key: default_domain_key(),
            on_domain_duplicate: DuplicatePolicy::default(),
        }
    }
}

fn default_raw_key() -> String {
    "PropertyID".into()
}

fn default_domain_key() -> String {
    "PROPERTY ID (BUYBOX)".into()
}

/// What to do when the domain table repeats an identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    #[default]
    Error,
    KeepFirst,
}

impl DuplicatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicatePolicy::Error => "error",
            DuplicatePolicy::KeepFirst => "keep_first",
        }
    }
}

// ---------------------------------------------------------------------------
// Normalize
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NormalizeConfig {
    /// Text values replaced by integer 0 in both tables.
    #[serde(default = "default_sentinels")]
    pub sentinels: Vec<String>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self { sentinels: default_sentinels() }
    }
}

fn default_sentinels() -> Vec<String> {
    vec!["0".into(), "Unknown".into(), String::new()]
}

// ---------------------------------------------------------------------------
// Layout + Output
// ---------------------------------------------------------------------------

/// Per-client directory conventions.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    #[serde(default = "default_domain_dir")]
    pub domain_dir: String,
    #[serde(default = "default_raw_dir")]
    pub raw_dir: String,
    #[serde(default = "default_domain_extension")]
    pub domain_extension: String,
    #[serde(default = "default_raw_extension")]
    pub raw_extension: String,
    /// Domain files whose name contains this marker are ignored.
    #[serde(default = "default_exclude_marker")]
    pub exclude_marker: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            domain_dir: default_domain_dir(),
            raw_dir: default_raw_dir(),
            domain_extension: default_domain_extension(),
            raw_extension: default_raw_extension(),
            exclude_marker: default_exclude_marker(),
        }
    }
}

fn default_domain_dir() -> String {
    "domain data".into()
}

fn default_raw_dir() -> String {
    "raw data".into()
}

fn default_domain_extension() -> String {
    "xlsx".into()
}

fn default_raw_extension() -> String {
    "csv".into()
}

fn default_exclude_marker() -> String {
    "editable".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// `<client><workbook_suffix>`, written to the run's output directory.
    #[serde(default = "default_workbook_suffix")]
    pub workbook_suffix: String,
    /// `<client><detail_suffix>`, written into the client's directory.
    #[serde(default = "default_detail_suffix")]
    pub detail_suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            workbook_suffix: default_workbook_suffix(),
            detail_suffix: default_detail_suffix(),
        }
    }
}

impl OutputConfig {
    pub fn workbook_name(&self, client: &str) -> String {
        format!("{client}{}", self.workbook_suffix)
    }

    pub fn detail_name(&self, client: &str) -> String {
        format!("{client}{}", self.detail_suffix)
    }
}

fn default_workbook_suffix() -> String {
    "_results.xlsx".into()
}

fn default_detail_suffix() -> String {
    "_distress_analysis.csv".into()
}

// ---------------------------------------------------------------------------
// Detail
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DetailConfig {
    /// Descriptive columns, by merged column name, ahead of `Matched`.
    #[serde(default = "default_detail_columns")]
    pub columns: Vec<String>,
    /// Descriptive columns written as integers (missing → 0).
    #[serde(default = "default_integer_columns")]
    pub integer_columns: Vec<String>,
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self {
            columns: default_detail_columns(),
            integer_columns: default_integer_columns(),
        }
    }
}

fn default_detail_columns() -> Vec<String> {
    [
        "PropertyID",
        "ADDRESS",
        "ZIP",
        "COUNT OF DISTRESSES",
        "LIKELY DEAL SCORE",
        "BUYBOX SCORE",
        "SCORE",
        "LINK PROPERTIES",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_integer_columns() -> Vec<String> {
    vec!["BUYBOX SCORE".into()]
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// One distress category: the raw-side field, the domain-side field, and
/// the label used in summaries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Category {
    pub raw: String,
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Category {
    pub fn new(raw: impl Into<String>, domain: impl Into<String>) -> Self {
        Self { raw: raw.into(), domain: domain.into(), label: None }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Explicit label, else the first underscore-delimited token of the raw
    /// field name (`Tax_Delinquent_Distress` → `Tax`).
    pub fn display_label(&self) -> &str {
        match &self.label {
            Some(l) => l,
            None => self.raw.split('_').next().unwrap_or(&self.raw),
        }
    }

    /// Detail column holding the raw-side integer reading.
    pub fn raw_output_column(&self) -> String {
        format!("{}_raw", self.domain)
    }

    /// Detail column holding the domain-side integer reading.
    pub fn domain_output_column(&self) -> String {
        format!("{}_domain", self.domain)
    }
}

/// Built-in mapping, raw field → domain field, in report order.
pub fn default_categories() -> Vec<Category> {
    [
        ("Divorce_Distress", "DIVORCE"),
        ("Estate_Distress", "ESTATE"),
        ("Senior_Distress", "55+"),
        ("Preforeclosure_Distress", "PRE-FORECLOSURE"),
        ("Inter_Family_Distress", "INTER FAMILY TRANSFER"),
        ("Probate_Distress", "PROBATE"),
        ("Tax_Delinquent_Distress", "TAXES"),
        ("Low_income_Distress", "LOW CREDIT"),
        ("Prop_Vacant_Flag", "VACANT"),
        ("Absentee", "ABSENTEE"),
        ("Bankruptcy_Distress", "BANKRUPTCY"),
        ("Debt-Collection_Distress", "DEBT COLLECTION"),
        ("Eviction_Distress", "EVICTION"),
        ("Judgment_Distress", "JUDGEMENT"),
        ("Lien_Distress", "LIENS HOA"),
        ("Violation_Distress", "CODE VIOLATIONS"),
    ]
    .iter()
    .map(|(raw, domain)| Category::new(*raw, *domain))
    .collect()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl DistressConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: DistressConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.join.raw_key.is_empty() || self.join.domain_key.is_empty() {
            return Err(ReconError::ConfigValidation(
                "join.raw_key and join.domain_key must be non-empty".into(),
            ));
        }

        if self.categories.is_empty() {
            return Err(ReconError::ConfigValidation(
                "at least one category is required".into(),
            ));
        }

        let mut domain_fields = HashSet::new();
        let mut labels = HashSet::new();
        for (i, cat) in self.categories.iter().enumerate() {
            if cat.raw.is_empty() || cat.domain.is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "category #{}: raw and domain fields must be non-empty",
                    i + 1
                )));
            }
            // Output columns are keyed by the domain field
            if !domain_fields.insert(cat.domain.as_str()) {
                return Err(ReconError::ConfigValidation(format!(
                    "domain field '{}' is mapped more than once",
                    cat.domain
                )));
            }
            if !labels.insert(cat.display_label()) {
                return Err(ReconError::ConfigValidation(format!(
                    "category label '{}' is used more than once; set `label` on one of them",
                    cat.display_label()
                )));
            }
        }

        if self.output.workbook_suffix.is_empty() || self.output.detail_suffix.is_empty() {
            return Err(ReconError::ConfigValidation(
                "output suffixes must be non-empty".into(),
            ));
        }

        for col in &self.detail.integer_columns {
            if !self.detail.columns.contains(col) {
                return Err(ReconError::ConfigValidation(format!(
                    "detail.integer_columns: '{col}' is not listed in detail.columns"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
