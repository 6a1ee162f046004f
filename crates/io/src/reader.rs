// Excel workbook import (xlsx, xls, xlsb, ods)
//
// One-way conversion into the in-memory `Table` model. Dates cross the
// Excel-serial boundary here; downstream code only ever sees datetimes.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use shoptally_core::{Cell, Table};

use crate::error::IoError;

/// Serial 0 in the 1900 date system (with the Lotus leap-year bug baked in).
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// An open workbook plus the path it came from, for error context.
pub struct ExcelBook {
    sheets: Sheets<BufReader<File>>,
    path: PathBuf,
}

impl ExcelBook {
    pub fn open(path: &Path) -> Result<Self, IoError> {
        let sheets = open_workbook_auto(path)
            .map_err(|source| IoError::Open { path: path.to_path_buf(), source })?;
        Ok(Self { sheets, path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    /// Read one sheet into a `Table`. Returns `Ok(None)` when the workbook
    /// has no sheet by that name; missing sheets are a caller decision,
    /// not an I/O failure.
    ///
    /// `header_row` is the zero-based absolute row of the header; rows
    /// above it are discarded.
    pub fn read_sheet(&mut self, name: &str, header_row: usize) -> Result<Option<Table>, IoError> {
        if !self.sheets.sheet_names().iter().any(|n| n == name) {
            return Ok(None);
        }
        let range = self
            .sheets
            .worksheet_range(name)
            .map_err(|source| IoError::Open { path: self.path.clone(), source })?;

        // The range starts at the first used row, not necessarily row 0.
        let start_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);
        let skip = header_row.saturating_sub(start_row);

        let mut rows = range.rows().skip(skip);
        let mut headers: Vec<String> = match rows.next() {
            Some(row) => row.iter().map(|d| data_to_cell(d).as_text().trim().to_string()).collect(),
            None => Vec::new(),
        };
        while headers.last().is_some_and(|h| h.is_empty()) {
            headers.pop();
        }

        let mut table = Table::new(name, headers);
        for row in rows {
            table.push_row(row.iter().map(data_to_cell).collect());
        }
        Ok(Some(table))
    }

    /// Read whichever sheet comes first in the workbook.
    pub fn read_first_sheet(&mut self, header_row: usize) -> Result<Option<Table>, IoError> {
        match self.sheets.sheet_names().first().cloned() {
            Some(name) => self.read_sheet(&name, header_row),
            None => Ok(None),
        }
    }
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::Error(e) => Cell::Text(format!("#{e:?}")),
        Data::DateTime(dt) => match serial_to_datetime(dt.as_f64()) {
            Some(naive) => Cell::DateTime(naive),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let (y, m, d) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?.and_hms_opt(0, 0, 0)?;
    let days = serial.floor() as i64;
    let secs = (serial.fract() * 86_400.0).round() as i64;
    epoch.checked_add_signed(Duration::days(days) + Duration::seconds(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_conversion_matches_known_dates() {
        // 2025-04-17 00:00 is serial 45764 in the 1900 system
        let dt = serial_to_datetime(45764.0).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2025, 4, 17).unwrap());
        assert_eq!(dt.time().format("%H:%M:%S").to_string(), "00:00:00");

        // noon lands on the same day
        let noon = serial_to_datetime(45764.5).unwrap();
        assert_eq!(noon.time().format("%H:%M").to_string(), "12:00");
    }

    #[test]
    fn negative_serials_are_rejected() {
        assert!(serial_to_datetime(-1.0).is_none());
    }
}
