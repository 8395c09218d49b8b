use serde::Serialize;

use crate::detail::DetailTable;
use crate::merge::MergeStats;
use crate::summary::SummaryEntry;
use crate::table::Table;

/// Pre-loaded tables for one client.
#[derive(Debug, Clone)]
pub struct ClientInput {
    pub client: String,
    pub raw: Table,
    pub domain: Table,
}

/// Everything one client run produces. The detail table is written to its
/// own file and left out of the JSON form.
#[derive(Debug, Clone, Serialize)]
pub struct ClientReport {
    pub meta: ReportMeta,
    pub merge: MergeStats,
    pub normalized_cells: usize,
    pub total_records: usize,
    pub matched_records: usize,
    pub discrepancies: Vec<SummaryEntry>,
    pub mismatches: Vec<SummaryEntry>,
    #[serde(skip)]
    pub detail: DetailTable,
}

impl ClientReport {
    /// Records with at least one category disagreement.
    pub fn unmatched_records(&self) -> usize {
        self.total_records - self.matched_records
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub client: String,
    pub categories: usize,
    pub engine_version: String,
    pub run_at: String,
}
