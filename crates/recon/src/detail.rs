//! Flattened per-property table written next to the client's inputs.

use crate::compare::{read_ints, Comparison};
use crate::config::DetailConfig;
use crate::error::ReconError;
use crate::merge::{ColumnRef, MergedTable};

pub const MATCHED_COLUMN: &str = "Matched";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DetailTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.headers.iter().position(|h| h == name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }
}

enum DetailColumn {
    Text(ColumnRef),
    Ints(Vec<i64>),
}

/// Resolve the descriptive columns by merged name. Done before anything is
/// written so a missing column fails the client cleanly.
pub fn check_columns(merged: &MergedTable<'_>, config: &DetailConfig) -> Result<(), ReconError> {
    for name in &config.columns {
        resolve(merged, name)?;
    }
    Ok(())
}

fn resolve(merged: &MergedTable<'_>, name: &str) -> Result<ColumnRef, ReconError> {
    merged
        .column(name)
        .ok_or_else(|| ReconError::MissingMergedColumn { column: name.to_string() })
}

/// Descriptive columns, then `Matched`, then `<domain>_raw` /
/// `<domain>_domain` for every category in config order.
pub fn build_detail(
    merged: &MergedTable<'_>,
    cmp: &Comparison,
    config: &DetailConfig,
) -> Result<DetailTable, ReconError> {
    let mut headers: Vec<String> = config.columns.clone();
    headers.push(MATCHED_COLUMN.to_string());
    for pair in &cmp.pairs {
        headers.push(pair.category.raw_output_column());
        headers.push(pair.category.domain_output_column());
    }

    let mut columns = Vec::with_capacity(config.columns.len());
    for name in &config.columns {
        let col = resolve(merged, name)?;
        if config.integer_columns.contains(name) {
            columns.push(DetailColumn::Ints(read_ints(merged, col, name)?));
        } else {
            columns.push(DetailColumn::Text(col));
        }
    }

    let rows = merged
        .records()
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let mut row = Vec::with_capacity(headers.len());
            for col in &columns {
                row.push(match col {
                    DetailColumn::Text(c) => merged.value(record, *c).to_string(),
                    DetailColumn::Ints(values) => values[i].to_string(),
                });
            }
            row.push(if cmp.matched[i] { "True" } else { "False" }.to_string());
            for pair in &cmp.pairs {
                row.push(pair.raw[i].to_string());
                row.push(pair.domain[i].to_string());
            }
            row
        })
        .collect();

    Ok(DetailTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{compare, resolve_categories};
    use crate::config::{Category, DuplicatePolicy, JoinConfig};
    use crate::merge::merge;
    use crate::table::Table;

    fn join() -> JoinConfig {
        JoinConfig {
            raw_key: "PropertyID".into(),
            domain_key: "PID".into(),
            on_domain_duplicate: DuplicatePolicy::Error,
        }
    }

    #[test]
    fn flattens_in_config_order() {
        let raw = Table::from_csv_str("PropertyID,Divorce_Distress,Estate_Distress\n10,1,0\n11,0,0\n").unwrap();
        let domain = Table::from_csv_str(
            "PID,ADDRESS,BUYBOX SCORE,DIVORCE,ESTATE\n10,1 Main St,7.0,0,0\n11,2 Oak Ave,,0,0\n",
        )
        .unwrap();
        let cats = vec![
            Category::new("Divorce_Distress", "DIVORCE"),
            Category::new("Estate_Distress", "ESTATE"),
        ];
        let config = DetailConfig {
            columns: vec!["PropertyID".into(), "ADDRESS".into(), "BUYBOX SCORE".into()],
            integer_columns: vec!["BUYBOX SCORE".into()],
        };

        let merged = merge(&raw, &domain, &join()).unwrap();
        let accessors = resolve_categories(&raw, &domain, &cats).unwrap();
        let cmp = compare(&merged, &accessors).unwrap();
        let detail = build_detail(&merged, &cmp, &config).unwrap();

        assert_eq!(
            detail.headers,
            vec![
                "PropertyID",
                "ADDRESS",
                "BUYBOX SCORE",
                "Matched",
                "DIVORCE_raw",
                "DIVORCE_domain",
                "ESTATE_raw",
                "ESTATE_domain",
            ]
        );
        assert_eq!(detail.rows[0], vec!["10", "1 Main St", "7", "False", "1", "0", "0", "0"]);
        assert_eq!(detail.rows[1], vec!["11", "2 Oak Ave", "0", "True", "0", "0", "0", "0"]);
        assert_eq!(detail.column("Matched").unwrap(), vec!["False", "True"]);
    }

    #[test]
    fn missing_descriptive_column_is_reported() {
        let raw = Table::from_csv_str("PropertyID\n1\n").unwrap();
        let domain = Table::from_csv_str("PID\n1\n").unwrap();
        let merged = merge(&raw, &domain, &join()).unwrap();

        let config = DetailConfig {
            columns: vec!["PropertyID".into(), "ZIP".into()],
            integer_columns: vec![],
        };
        let err = check_columns(&merged, &config).unwrap_err();
        assert_eq!(err.to_string(), "merged data: missing column 'ZIP'");
    }
}
