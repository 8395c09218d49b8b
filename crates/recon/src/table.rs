//! In-memory tabular data shared by every stage.
//!
//! A [`Table`] is a header list plus rows of typed [`Value`]s. Rows may be
//! shorter than the header list; missing trailing cells read as
//! [`Value::Empty`].

use std::fmt;

use serde::Serialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Which dataset a column or record comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Raw,
    Domain,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Raw => "raw",
            Side::Domain => "domain",
        }
    }

    /// Suffix appended to a column name present on both sides after a merge.
    pub fn suffix(&self) -> &'static str {
        match self {
            Side::Raw => "_raw",
            Side::Domain => "_domain",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

static EMPTY: Value = Value::Empty;

impl Value {
    /// Type a raw text field: integer, then float, then boolean, else text.
    pub fn infer(field: &str) -> Self {
        if field.is_empty() {
            return Value::Empty;
        }
        if let Ok(i) = field.parse::<i64>() {
            return Value::Int(i);
        }
        if let Ok(f) = field.parse::<f64>() {
            return Value::Float(f);
        }
        match field {
            "True" | "TRUE" | "true" => Value::Bool(true),
            "False" | "FALSE" | "false" => Value::Bool(false),
            _ => Value::Text(field.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Canonical join-key text. Integral floats render without decimals so
    /// `123` and `123.0` land on the same key. `None` for empty cells.
    pub fn key_text(&self) -> Option<String> {
        match self {
            Value::Empty => None,
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) if f.is_nan() => None,
            Value::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
            Value::Float(f) => Some(f.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        }
    }

    /// Integer reading of an indicator cell. Missing → 0, booleans → 0/1,
    /// floats truncate toward zero. `None` when the text is not numeric.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Empty => Some(0),
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.is_nan() => Some(0),
            Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Value::Float(_) => None,
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    return Some(0);
                }
                t.parse::<i64>()
                    .ok()
                    .or_else(|| t.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
        }
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Repeated header names are renamed `X.1`, `X.2`, ... so every column
    /// is addressable by name.
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers: unique_headers(headers), rows: Vec::new() }
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Vec<Value>] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Exact, case-sensitive header lookup. First match wins.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn cell(&self, row: usize, col: usize) -> &Value {
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(&EMPTY)
    }

    /// Stack tables by header name. Columns are the union in first-seen
    /// order; cells a source table lacks are `Empty`.
    pub fn concat(tables: Vec<Table>) -> Table {
        let mut headers: Vec<String> = Vec::new();
        for t in &tables {
            for h in &t.headers {
                if !headers.contains(h) {
                    headers.push(h.clone());
                }
            }
        }

        let mut out = Table::new(headers);
        for t in tables {
            let mapping: Vec<Option<usize>> = out
                .headers
                .iter()
                .map(|h| t.column_index(h))
                .collect();
            for row in t.rows {
                let mapped = mapping
                    .iter()
                    .map(|idx| idx.and_then(|i| row.get(i).cloned()).unwrap_or(Value::Empty))
                    .collect();
                out.rows.push(mapped);
            }
        }
        out
    }

    /// Parse CSV text with a header row, typing each field via [`Value::infer`].
    pub fn from_csv_str(data: &str) -> Result<Table, ReconError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let mut table = Table::new(headers);

        for record in reader.records() {
            let record = record?;
            table.rows.push(record.iter().map(Value::infer).collect());
        }

        Ok(table)
    }
}

fn unique_headers(headers: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(headers.len());
    for h in headers {
        if !out.contains(&h) {
            out.push(h);
            continue;
        }
        let mut n = 1;
        let mut name = format!("{h}.{n}");
        while out.contains(&name) {
            n += 1;
            name = format!("{h}.{n}");
        }
        out.push(name);
    }
    out
}
