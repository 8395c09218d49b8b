//! Per-category equality between the raw and domain indicators.

use crate::config::Category;
use crate::error::ReconError;
use crate::merge::{ColumnRef, MergedTable};
use crate::table::{Side, Table};

/// A category whose raw and domain fields have been located in their
/// source schemas.
#[derive(Debug, Clone)]
pub struct CategoryAccessor {
    pub category: Category,
    pub raw: ColumnRef,
    pub domain: ColumnRef,
}

/// Resolve every category against the pre-merge schemas: the raw field in
/// the raw table, the domain field in the domain table. Exact and
/// case-sensitive; the first missing field aborts.
pub fn resolve_categories(
    raw: &Table,
    domain: &Table,
    categories: &[Category],
) -> Result<Vec<CategoryAccessor>, ReconError> {
    categories
        .iter()
        .map(|cat| {
            let lookup = |table: &Table, side: Side, column: &str| {
                table
                    .column_index(column)
                    .map(|index| ColumnRef { side, index })
                    .ok_or_else(|| ReconError::CategoryNotFound {
                        side,
                        category: cat.display_label().to_string(),
                        column: column.to_string(),
                    })
            };
            Ok(CategoryAccessor {
                category: cat.clone(),
                raw: lookup(raw, Side::Raw, &cat.raw)?,
                domain: lookup(domain, Side::Domain, &cat.domain)?,
            })
        })
        .collect()
}

/// Integer readings for one category across all merged records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairColumns {
    pub category: Category,
    pub raw: Vec<i64>,
    pub domain: Vec<i64>,
}

impl PairColumns {
    pub fn label(&self) -> &str {
        self.category.display_label()
    }

    pub fn is_equal(&self, record: usize) -> bool {
        self.raw[record] == self.domain[record]
    }

    /// Records where raw and domain disagree.
    pub fn discrepancies(&self) -> usize {
        (0..self.raw.len()).filter(|&i| !self.is_equal(i)).count()
    }

    /// Records where raw flags distress and domain does not.
    pub fn mismatches(&self) -> usize {
        self.raw
            .iter()
            .zip(&self.domain)
            .filter(|&(&r, &d)| r == 1 && d == 0)
            .count()
    }
}

/// Output of [`compare`]: one [`PairColumns`] per category in config order,
/// plus the per-record `Matched` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub keys: Vec<String>,
    pub pairs: Vec<PairColumns>,
    pub matched: Vec<bool>,
}

impl Comparison {
    pub fn total(&self) -> usize {
        self.matched.len()
    }

    pub fn matched_count(&self) -> usize {
        self.matched.iter().filter(|&&m| m).count()
    }
}

/// Coerce every category to integers and AND the equalities into
/// `Matched`, which starts out true for each record.
pub fn compare(
    merged: &MergedTable<'_>,
    accessors: &[CategoryAccessor],
) -> Result<Comparison, ReconError> {
    let records = merged.records();
    let mut matched = vec![true; records.len()];
    let mut pairs = Vec::with_capacity(accessors.len());

    for acc in accessors {
        let raw = read_ints(merged, acc.raw, &acc.category.raw)?;
        let domain = read_ints(merged, acc.domain, &acc.category.domain)?;

        for (i, flag) in matched.iter_mut().enumerate() {
            *flag &= raw[i] == domain[i];
        }

        pairs.push(PairColumns {
            category: acc.category.clone(),
            raw,
            domain,
        });
    }

    Ok(Comparison {
        keys: records.iter().map(|r| r.key.clone()).collect(),
        pairs,
        matched,
    })
}

pub(crate) fn read_ints(
    merged: &MergedTable<'_>,
    col: ColumnRef,
    column_name: &str,
) -> Result<Vec<i64>, ReconError> {
    merged
        .records()
        .iter()
        .map(|record| {
            let value = merged.value(record, col);
            value.as_int().ok_or_else(|| ReconError::NotAnInteger {
                side: col.side,
                column: column_name.to_string(),
                key: record.key.clone(),
                value: value.to_string(),
            })
        })
        .collect()
}
