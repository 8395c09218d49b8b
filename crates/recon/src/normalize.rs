use crate::table::{Table, Value};

/// Replace sentinel text cells (`"0"`, `"Unknown"`, `""` by default) with
/// integer 0 across every column. Returns the number of cells replaced.
pub fn normalize(table: &mut Table, sentinels: &[String]) -> usize {
    let mut replaced = 0;
    for row in table.rows_mut() {
        for cell in row.iter_mut() {
            if let Value::Text(s) = cell {
                if sentinels.iter().any(|sentinel| sentinel == s) {
                    *cell = Value::Int(0);
                    replaced += 1;
                }
            }
        }
    }
    replaced
}
