use serde::{Serialize, Serializer};

use crate::compare::{Comparison, PairColumns};

/// One summary row: category label, record count, share of merged records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    pub category: String,
    pub count: usize,
    #[serde(serialize_with = "serialize_percentage")]
    pub percentage: f64,
}

impl SummaryEntry {
    /// `"12.34%"`.
    pub fn percentage_display(&self) -> String {
        format_percentage(self.percentage)
    }
}

fn serialize_percentage<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_percentage(*value))
}

/// Two decimals and a trailing percent sign.
pub fn format_percentage(percentage: f64) -> String {
    format!("{percentage:.2}%")
}

/// `100 * count / total`. A zero total yields 0 rather than dividing.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

/// Per-category count of records where raw and domain disagree.
pub fn discrepancy_summary(cmp: &Comparison) -> Vec<SummaryEntry> {
    summarize(cmp, PairColumns::discrepancies)
}

/// Per-category count of records where raw is 1 and domain is 0.
pub fn mismatch_summary(cmp: &Comparison) -> Vec<SummaryEntry> {
    summarize(cmp, PairColumns::mismatches)
}

fn summarize(cmp: &Comparison, count: impl Fn(&PairColumns) -> usize) -> Vec<SummaryEntry> {
    let total = cmp.total();
    let mut entries: Vec<SummaryEntry> = cmp
        .pairs
        .iter()
        .map(|pair| {
            let n = count(pair);
            SummaryEntry {
                category: pair.label().to_string(),
                count: n,
                percentage: percentage(n, total),
            }
        })
        .collect();

    // Ordered by the displayed value; sort_by is stable so equal displays
    // keep config order.
    entries.sort_by(|a, b| displayed(b.percentage).total_cmp(&displayed(a.percentage)));
    entries
}

/// The value shown in `"xx.xx%"`. Must round exactly as the formatter does.
fn displayed(percentage: f64) -> f64 {
    let text = format_percentage(percentage);
    text.trim_end_matches('%').parse().unwrap_or(percentage)
}
