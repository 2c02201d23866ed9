//! Tabular report model and CSV writer.

use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

/// Rendered in place of a silence RMS level.
pub const NEG_INFINITY_TEXT: &str = "-inf";

/// Rendered in place of a measurement whose tool invocation failed.
pub const FAILED_TEXT: &str = "FAILED";

/// One report cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Integer(u64),
    Float(f64),
    Failed,
}

impl Cell {
    fn render(&self) -> String {
        match self {
            Cell::Integer(v) => v.to_string(),
            Cell::Float(v) if v.is_nan() => "nan".to_string(),
            Cell::Float(v) if v.is_infinite() => {
                if *v < 0.0 {
                    NEG_INFINITY_TEXT.to_string()
                } else {
                    "inf".to_string()
                }
            }
            Cell::Float(v) => v.to_string(),
            Cell::Failed => FAILED_TEXT.to_string(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            Cell::Failed => None,
        }
    }
}

/// A labelled row: the label is the input file's base name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub label: String,
    pub cells: Vec<Cell>,
}

/// A header plus rows, all rows as wide as the header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub header: Vec<String>,
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn new<S: Into<String>>(header: impl IntoIterator<Item = S>) -> Self {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, cells: Vec<Cell>) {
        debug_assert_eq!(cells.len() + 1, self.header.len());
        self.rows.push(ReportRow {
            label: label.into(),
            cells,
        });
    }

    /// Render as CSV text.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        write_record(&mut out, self.header.iter().map(String::as_str));
        for row in &self.rows {
            let rendered: Vec<String> = row.cells.iter().map(Cell::render).collect();
            write_record(
                &mut out,
                std::iter::once(row.label.as_str()).chain(rendered.iter().map(String::as_str)),
            );
        }
        out
    }

    /// Write the report to `path` as CSV.
    pub fn write_csv(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_csv())
    }
}

fn write_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        if field.contains(&[',', '"', '\n', '\r'][..]) {
            let _ = write!(out, "\"{}\"", field.replace('"', "\"\""));
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}
