// Excel import (domain workbook) and export (summary workbook)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use distress_recon::summary::SummaryEntry;
use distress_recon::{Table, Value};

use crate::error::IoError;

pub const DISCREPANCY_SHEET: &str = "Discrepancies Summary";
pub const MISMATCH_SHEET: &str = "Mismatched Distress Summary";

const DISCREPANCY_HEADERS: [&str; 3] = ["Distress Type", "Number of Discrepancies", "Percentage"];
const MISMATCH_HEADERS: [&str; 3] = ["Distress Type", "Number of Mismatches", "Percentage"];

// ============================================================================
// Import
// ============================================================================

/// Read the first worksheet of a domain workbook. The first row of the used
/// range is the header row.
pub fn read_domain_workbook(path: &Path) -> Result<Table, IoError> {
    let sheet_err = |message: String| IoError::Spreadsheet {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook: Sheets<_> =
        open_workbook_auto(path).map_err(|e| sheet_err(format!("failed to open workbook: {e}")))?;

    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Err(sheet_err("workbook contains no sheets".into()));
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| sheet_err(format!("failed to read sheet '{sheet_name}': {e}")))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(header_text).collect(),
        None => Vec::new(),
    };

    let mut table = Table::new(headers);
    for row in rows {
        table.push_row(row.iter().map(cell_value).collect());
    }

    log::debug!(
        "{} [{}]: {} rows, {} columns",
        path.display(),
        sheet_name,
        table.len(),
        table.headers().len()
    );
    Ok(table)
}

fn header_text(cell: &Data) -> String {
    match cell_value(cell) {
        Value::Empty => String::new(),
        other => other.to_string(),
    }
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Empty,
        Data::String(s) => Value::Text(s.clone()),
        Data::Float(n) => {
            // Integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                Value::Int(*n as i64)
            } else {
                Value::Float(*n)
            }
        }
        Data::Int(n) => Value::Int(*n),
        Data::Bool(b) => Value::Bool(*b),
        Data::Error(e) => Value::Text(format!("#{:?}", e)),
        // Serial number, 1900 date system
        Data::DateTime(dt) => Value::Float(dt.as_f64()),
        Data::DateTimeIso(s) => Value::Text(s.clone()),
        Data::DurationIso(s) => Value::Text(s.clone()),
    }
}

// ============================================================================
// Export
// ============================================================================

/// Write the two summary sheets: discrepancies first, then mismatches.
pub fn write_summary_workbook(
    path: &Path,
    discrepancies: &[SummaryEntry],
    mismatches: &[SummaryEntry],
) -> Result<(), IoError> {
    let write_err = |e: XlsxError| IoError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for (name, headers, entries) in [
        (DISCREPANCY_SHEET, DISCREPANCY_HEADERS, discrepancies),
        (MISMATCH_SHEET, MISMATCH_HEADERS, mismatches),
    ] {
        let worksheet = workbook.add_worksheet().set_name(name).map_err(write_err)?;
        write_summary_sheet(worksheet, &headers, entries, &header_format).map_err(write_err)?;
    }

    workbook.save(path).map_err(write_err)?;
    Ok(())
}

fn write_summary_sheet(
    worksheet: &mut Worksheet,
    headers: &[&str],
    entries: &[SummaryEntry],
    header_format: &Format,
) -> Result<(), XlsxError> {
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, header_format)?;
    }

    for (i, entry) in entries.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_string(row, 0, &entry.category)?;
        worksheet.write_number(row, 1, entry.count as f64)?;
        worksheet.write_string(row, 2, entry.percentage_display())?;
    }

    worksheet.set_column_width(0, 32)?;
    worksheet.set_column_width(1, 24)?;
    worksheet.set_column_width(2, 12)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry(category: &str, count: usize, percentage: f64) -> SummaryEntry {
        SummaryEntry {
            category: category.into(),
            count,
            percentage,
        }
    }

    #[test]
    fn domain_workbook_header_and_typed_cells() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("domain.xlsx");

        let mut wb = Workbook::new();
        let ws = wb.add_worksheet();
        ws.write_string(0, 0, "PROPERTY ID (BUYBOX)").unwrap();
        ws.write_string(0, 1, "ADDRESS").unwrap();
        ws.write_string(0, 2, "BUYBOX SCORE").unwrap();
        ws.write_string(0, 3, "DIVORCE").unwrap();
        ws.write_number(1, 0, 1001.0).unwrap();
        ws.write_string(1, 1, "12 Elm St").unwrap();
        ws.write_number(1, 2, 7.5).unwrap();
        ws.write_string(1, 3, "Unknown").unwrap();
        ws.write_number(2, 0, 1002.0).unwrap();
        ws.write_number(2, 3, 1.0).unwrap();
        wb.save(&path).unwrap();

        let table = read_domain_workbook(&path).unwrap();
        assert_eq!(
            table.headers(),
            ["PROPERTY ID (BUYBOX)", "ADDRESS", "BUYBOX SCORE", "DIVORCE"]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 0), &Value::Int(1001));
        assert_eq!(table.cell(0, 1), &Value::Text("12 Elm St".into()));
        assert_eq!(table.cell(0, 2), &Value::Float(7.5));
        assert_eq!(table.cell(0, 3), &Value::Text("Unknown".into()));
        assert_eq!(table.cell(1, 2), &Value::Empty);
        assert_eq!(table.cell(1, 3), &Value::Int(1));
    }

    #[test]
    fn only_first_sheet_is_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("domain.xlsx");

        let mut wb = Workbook::new();
        wb.add_worksheet().set_name("Data").unwrap().write_string(0, 0, "ID").unwrap();
        wb.add_worksheet().set_name("Notes").unwrap().write_string(0, 0, "ignored").unwrap();
        wb.save(&path).unwrap();

        let table = read_domain_workbook(&path).unwrap();
        assert_eq!(table.headers(), ["ID"]);
        assert!(table.is_empty());
    }

    #[test]
    fn repeated_domain_headers_stay_addressable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("domain.xlsx");

        let mut wb = Workbook::new();
        let ws = wb.add_worksheet();
        for (c, h) in ["PROPERTY ID (BUYBOX)", "TAXES", "TAXES"].iter().enumerate() {
            ws.write_string(0, c as u16, *h).unwrap();
        }
        ws.write_number(1, 0, 1.0).unwrap();
        ws.write_number(1, 1, 0.0).unwrap();
        ws.write_number(1, 2, 1.0).unwrap();
        wb.save(&path).unwrap();

        let table = read_domain_workbook(&path).unwrap();
        assert_eq!(table.headers(), ["PROPERTY ID (BUYBOX)", "TAXES", "TAXES.1"]);
        assert_eq!(table.cell(0, table.column_index("TAXES").unwrap()), &Value::Int(0));
        assert_eq!(table.cell(0, table.column_index("TAXES.1").unwrap()), &Value::Int(1));
    }

    #[test]
    fn unreadable_workbook_is_spreadsheet_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();

        let err = read_domain_workbook(&path).unwrap_err();
        assert!(matches!(err, IoError::Spreadsheet { .. }));
        assert!(err.to_string().contains("broken.xlsx"));
    }

    #[test]
    fn summary_workbook_has_both_sheets() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("acme_results.xlsx");

        let discrepancies = vec![entry("Divorce", 1, 100.0), entry("Taxes", 0, 0.0)];
        let mismatches = vec![entry("Divorce", 1, 100.0), entry("Taxes", 0, 0.0)];
        write_summary_workbook(&path, &discrepancies, &mismatches).unwrap();

        let mut wb: Sheets<_> = open_workbook_auto(&path).unwrap();
        assert_eq!(wb.sheet_names(), vec![DISCREPANCY_SHEET.to_string(), MISMATCH_SHEET.to_string()]);

        let range = wb.worksheet_range(DISCREPANCY_SHEET).unwrap();
        assert_eq!(range.get_size(), (3, 3));
        assert_eq!(range.get((0, 1)), Some(&Data::String("Number of Discrepancies".into())));
        assert_eq!(range.get((1, 0)), Some(&Data::String("Divorce".into())));
        assert_eq!(range.get((1, 1)), Some(&Data::Float(1.0)));
        assert_eq!(range.get((1, 2)), Some(&Data::String("100.00%".into())));
        assert_eq!(range.get((2, 2)), Some(&Data::String("0.00%".into())));

        let range = wb.worksheet_range(MISMATCH_SHEET).unwrap();
        assert_eq!(range.get((0, 1)), Some(&Data::String("Number of Mismatches".into())));
    }

    #[test]
    fn empty_summaries_still_write_headers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty_results.xlsx");
        write_summary_workbook(&path, &[], &[]).unwrap();

        let mut wb: Sheets<_> = open_workbook_auto(&path).unwrap();
        let range = wb.worksheet_range(MISMATCH_SHEET).unwrap();
        assert_eq!(range.get_size(), (1, 3));
    }
}
