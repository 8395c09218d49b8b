//! Inner join of the raw and domain tables on the property identifier.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::config::{DuplicatePolicy, JoinConfig};
use crate::error::ReconError;
use crate::table::{Side, Table, Value};

/// Counts describing how the two tables lined up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub raw_rows: usize,
    pub raw_duplicates_dropped: usize,
    pub domain_rows: usize,
    pub domain_duplicates_dropped: usize,
    pub merged: usize,
    pub raw_only: usize,
    pub domain_only: usize,
}

/// A column resolved to its side and position in that side's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef {
    pub side: Side,
    pub index: usize,
}

/// One merged property: the identifier plus row positions on each side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRecord {
    pub key: String,
    pub raw_row: usize,
    pub domain_row: usize,
}

/// Result of [`merge`]. Borrows both source tables; values are read
/// through [`ColumnRef`]s rather than copied.
#[derive(Debug)]
pub struct MergedTable<'a> {
    raw: &'a Table,
    domain: &'a Table,
    raw_key_col: usize,
    domain_key_col: usize,
    records: Vec<MergedRecord>,
    stats: MergeStats,
}

impl<'a> MergedTable<'a> {
    pub fn records(&self) -> &[MergedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> &MergeStats {
        &self.stats
    }

    pub fn table(&self, side: Side) -> &'a Table {
        match side {
            Side::Raw => self.raw,
            Side::Domain => self.domain,
        }
    }

    pub fn value(&self, record: &MergedRecord, col: ColumnRef) -> &'a Value {
        match col.side {
            Side::Raw => self.raw.cell(record.raw_row, col.index),
            Side::Domain => self.domain.cell(record.domain_row, col.index),
        }
    }

    /// Both join keys share one name and collapse into a single column.
    fn shared_key_name(&self) -> Option<&str> {
        let raw_key = &self.raw.headers()[self.raw_key_col];
        let domain_key = &self.domain.headers()[self.domain_key_col];
        (raw_key == domain_key).then_some(raw_key.as_str())
    }

    fn is_overlapping(&self, side: Side, index: usize) -> bool {
        let (this, other) = match side {
            Side::Raw => (self.raw, self.domain),
            Side::Domain => (self.domain, self.raw),
        };
        let name = &this.headers()[index];
        if self.shared_key_name() == Some(name.as_str()) {
            return false;
        }
        other.has_column(name)
    }

    /// Column names of the merged view, raw columns first. A name present on
    /// both sides gets the `_raw` / `_domain` suffix.
    pub fn column_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for side in [Side::Raw, Side::Domain] {
            let shared_key = self.shared_key_name();
            for (i, h) in self.table(side).headers().iter().enumerate() {
                if side == Side::Domain && shared_key == Some(h.as_str()) {
                    continue;
                }
                if self.is_overlapping(side, i) {
                    names.push(format!("{h}{}", side.suffix()));
                } else {
                    names.push(h.clone());
                }
            }
        }
        names
    }

    /// Look up a column by its merged name (suffixed where names overlap).
    pub fn column(&self, name: &str) -> Option<ColumnRef> {
        for side in [Side::Raw, Side::Domain] {
            for (i, h) in self.table(side).headers().iter().enumerate() {
                let matches = if self.is_overlapping(side, i) {
                    name.strip_suffix(side.suffix()) == Some(h.as_str())
                } else {
                    name == h
                };
                if matches {
                    return Some(ColumnRef { side, index: i });
                }
            }
        }
        None
    }

    pub fn raw_key_column(&self) -> ColumnRef {
        ColumnRef { side: Side::Raw, index: self.raw_key_col }
    }

    pub fn domain_key_column(&self) -> ColumnRef {
        ColumnRef { side: Side::Domain, index: self.domain_key_col }
    }
}

/// Inner-join `raw` and `domain` on the configured identifiers.
///
/// Raw duplicates keep the first occurrence. Domain duplicates follow
/// `join.on_domain_duplicate`. Output order follows the raw table.
pub fn merge<'a>(
    raw: &'a Table,
    domain: &'a Table,
    join: &JoinConfig,
) -> Result<MergedTable<'a>, ReconError> {
    let raw_key_col = raw.column_index(&join.raw_key).ok_or_else(|| ReconError::MissingColumn {
        side: Side::Raw,
        column: join.raw_key.clone(),
    })?;
    let domain_key_col =
        domain.column_index(&join.domain_key).ok_or_else(|| ReconError::MissingColumn {
            side: Side::Domain,
            column: join.domain_key.clone(),
        })?;

    let mut stats = MergeStats {
        raw_rows: raw.len(),
        domain_rows: domain.len(),
        ..MergeStats::default()
    };

    // Index domain side
    let mut domain_index: HashMap<String, usize> = HashMap::new();
    let mut duplicate_keys: Vec<String> = Vec::new();
    for row in 0..domain.len() {
        let Some(key) = domain.cell(row, domain_key_col).key_text() else {
            continue;
        };
        if domain_index.contains_key(&key) {
            stats.domain_duplicates_dropped += 1;
            if !duplicate_keys.contains(&key) {
                duplicate_keys.push(key);
            }
            continue;
        }
        domain_index.insert(key, row);
    }

    if !duplicate_keys.is_empty() && join.on_domain_duplicate == DuplicatePolicy::Error {
        return Err(ReconError::DuplicateDomainKeys { keys: duplicate_keys });
    }

    // Walk raw side, first occurrence wins
    let mut seen: HashSet<String> = HashSet::new();
    let mut records = Vec::new();
    for row in 0..raw.len() {
        let Some(key) = raw.cell(row, raw_key_col).key_text() else {
            continue;
        };
        if !seen.insert(key.clone()) {
            stats.raw_duplicates_dropped += 1;
            continue;
        }
        match domain_index.get(&key) {
            Some(&domain_row) => records.push(MergedRecord { key, raw_row: row, domain_row }),
            None => stats.raw_only += 1,
        }
    }

    stats.merged = records.len();
    stats.domain_only = domain_index.keys().filter(|k| !seen.contains(*k)).count();

    Ok(MergedTable {
        raw,
        domain,
        raw_key_col,
        domain_key_col,
        records,
        stats,
    })
}
