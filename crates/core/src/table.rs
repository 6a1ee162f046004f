use chrono::{NaiveDate, NaiveDateTime};

use crate::error::PipelineError;

/// A single spreadsheet cell, already past the Excel-serial boundary:
/// datetimes arrive as `NaiveDateTime`, never as raw serial numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render as text, preserving identifier semantics: integral numbers
    /// print without a decimal point so numeric ids compare exactly.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Cell::Bool(b) => if *b { "TRUE".into() } else { "FALSE".into() },
            Cell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().replace(',', "").parse().ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64().map(|n| n as i64)
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::DateTime(dt) => Some(*dt),
            Cell::Text(s) => {
                let s = s.trim();
                NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .or_else(|| {
                        NaiveDate::parse_from_str(s, "%Y-%m-%d")
                            .ok()
                            .and_then(|d| d.and_hms_opt(0, 0, 0))
                    })
            }
            _ => None,
        }
    }
}

/// A named sheet in memory: header row plus data rows.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self { name: name.into(), headers, rows: Vec::new() }
    }

    pub fn col(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    pub fn require_col(&self, header: &str) -> Result<usize, PipelineError> {
        self.col(header).ok_or_else(|| PipelineError::MissingColumn {
            sheet: self.name.clone(),
            column: header.to_string(),
        })
    }

    /// Cell at (row, col); positions past the row's width read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(&EMPTY)
    }

    /// Money value at (row, col). Blank cells read as 0; a non-blank cell
    /// that cannot be coerced is a `Value` error, never a silent zero.
    pub fn require_f64(&self, row: usize, col: usize) -> Result<f64, PipelineError> {
        let cell = self.cell(row, col);
        if cell.is_empty() {
            return Ok(0.0);
        }
        cell.as_f64().ok_or_else(|| self.value_error(row, col))
    }

    /// Quantity value at (row, col), with the same blank-as-zero rule.
    pub fn require_i64(&self, row: usize, col: usize) -> Result<i64, PipelineError> {
        let cell = self.cell(row, col);
        if cell.is_empty() {
            return Ok(0);
        }
        cell.as_i64().ok_or_else(|| self.value_error(row, col))
    }

    fn value_error(&self, row: usize, col: usize) -> PipelineError {
        PipelineError::Value {
            sheet: self.name.clone(),
            row,
            column: self.headers.get(col).cloned().unwrap_or_default(),
            value: self.cell(row, col).as_text(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// New table containing only the named columns, in the given order.
    /// Unknown headers are skipped (callers validate required columns
    /// separately via `require_col`).
    pub fn project(&self, headers: &[&str]) -> Table {
        let cols: Vec<usize> = headers.iter().filter_map(|h| self.col(h)).collect();
        let mut out = Table::new(
            self.name.clone(),
            cols.iter().map(|&c| self.headers[c].clone()).collect(),
        );
        for row in &self.rows {
            out.push_row(
                cols.iter()
                    .map(|&c| row.get(c).cloned().unwrap_or(Cell::Empty))
                    .collect(),
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_render_without_decimal_point() {
        assert_eq!(Cell::Number(2504170001.0).as_text(), "2504170001");
        assert_eq!(Cell::Number(12.5).as_text(), "12.5");
    }

    #[test]
    fn empty_detection_includes_blank_text() {
        assert!(Cell::Empty.is_empty());
        assert!(Cell::Text("  ".into()).is_empty());
        assert!(!Cell::Number(0.0).is_empty());
    }

    #[test]
    fn project_keeps_declared_columns_only() {
        let mut t = Table::new("orders", vec!["a".into(), "b".into(), "c".into()]);
        t.push_row(vec![Cell::Number(1.0), Cell::Number(2.0), Cell::Number(3.0)]);
        let p = t.project(&["c", "a"]);
        assert_eq!(p.headers, vec!["c", "a"]);
        assert_eq!(p.rows[0], vec![Cell::Number(3.0), Cell::Number(1.0)]);
    }

    #[test]
    fn blank_cells_coerce_to_zero_but_garbage_fails() {
        let mut t = Table::new("orders", vec!["qty".into()]);
        t.push_row(vec![Cell::Empty]);
        t.push_row(vec![Cell::Text("two".into())]);
        assert_eq!(t.require_i64(0, 0).unwrap(), 0);
        assert_eq!(t.require_f64(0, 0).unwrap(), 0.0);
        let err = t.require_f64(1, 0).unwrap_err();
        assert!(err.to_string().contains("'two'"));
        assert!(err.to_string().contains("'qty'"));
    }

    #[test]
    fn missing_required_column_names_sheet_and_column() {
        let t = Table::new("orders", vec!["a".into()]);
        let err = t.require_col("b").unwrap_err();
        assert!(err.to_string().contains("orders"));
        assert!(err.to_string().contains("'b'"));
    }
}
