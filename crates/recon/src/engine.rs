use crate::compare::{compare, resolve_categories};
use crate::config::DistressConfig;
use crate::detail::{build_detail, check_columns};
use crate::error::ReconError;
use crate::merge::merge;
use crate::model::{ClientInput, ClientReport, ReportMeta};
use crate::normalize::normalize;
use crate::summary::{discrepancy_summary, mismatch_summary};

/// Run one client: normalize, resolve categories, merge, compare,
/// summarize, flatten. Schema problems surface before any counting.
pub fn run(config: &DistressConfig, input: ClientInput) -> Result<ClientReport, ReconError> {
    let ClientInput { client, mut raw, mut domain } = input;

    let sentinels = &config.normalize.sentinels;
    let normalized_cells = normalize(&mut raw, sentinels) + normalize(&mut domain, sentinels);

    let accessors = resolve_categories(&raw, &domain, &config.categories)?;
    let merged = merge(&raw, &domain, &config.join)?;
    check_columns(&merged, &config.detail)?;

    let cmp = compare(&merged, &accessors)?;
    let discrepancies = discrepancy_summary(&cmp);
    let mismatches = mismatch_summary(&cmp);
    let detail = build_detail(&merged, &cmp, &config.detail)?;

    Ok(ClientReport {
        meta: ReportMeta {
            client,
            categories: accessors.len(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        merge: merged.stats().clone(),
        normalized_cells,
        total_records: cmp.total(),
        matched_records: cmp.matched_count(),
        discrepancies,
        mismatches,
        detail,
    })
}
