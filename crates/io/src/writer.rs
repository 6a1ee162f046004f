// Excel workbook export (xlsx only)
//
// Report sheets carry the house style: bold white 16pt header on a blue
// fill, 14pt body rows at height 24, and the TOTAL trailer styled like
// the header.

use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet, XlsxError};
use shoptally_core::model::TOTAL_ROW_ID;
use shoptally_core::{Cell, Table};

use crate::error::IoError;

const HEADER_FILL: Color = Color::RGB(0x4472C4);

/// Formats applied to one exported sheet.
#[derive(Default)]
pub struct SheetStyle {
    header: Option<Format>,
    body: Option<Format>,
    footer: Option<Format>,
    body_row_height: Option<f64>,
}

impl SheetStyle {
    /// The styled report look used for invoice and summary sheets.
    pub fn report() -> Self {
        let banner = Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_font_size(16.0)
            .set_background_color(HEADER_FILL)
            .set_align(FormatAlign::Center)
            .set_text_wrap();
        Self {
            header: Some(banner.clone()),
            body: Some(Format::new().set_font_size(14.0)),
            footer: Some(banner),
            body_row_height: Some(24.0),
        }
    }

    /// No formatting at all, for data echo sheets.
    pub fn plain() -> Self {
        Self::default()
    }
}

/// Accumulates sheets, then saves the whole workbook in one pass.
pub struct WorkbookWriter {
    workbook: Workbook,
}

impl Default for WorkbookWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkbookWriter {
    pub fn new() -> Self {
        Self { workbook: Workbook::new() }
    }

    pub fn add_sheet(&mut self, table: &Table, style: &SheetStyle) -> Result<(), IoError> {
        let name = sanitize_sheet_name(&table.name);
        let fail = |source: XlsxError| IoError::Sheet { sheet: name.clone(), source };

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&name).map_err(fail)?;

        for (c, header) in table.headers.iter().enumerate() {
            write_cell(worksheet, 0, c as u16, &Cell::Text(header.clone()), style.header.as_ref())
                .map_err(fail)?;
        }

        let footer_row = match &style.footer {
            Some(_) if is_total_row(table) => Some(table.rows.len() - 1),
            _ => None,
        };
        for (r, row) in table.rows.iter().enumerate() {
            let format = if footer_row == Some(r) {
                style.footer.as_ref()
            } else {
                style.body.as_ref()
            };
            let out_row = (r + 1) as u32;
            if let Some(height) = style.body_row_height {
                worksheet.set_row_height(out_row, height).map_err(fail)?;
            }
            for (c, cell) in row.iter().enumerate() {
                write_cell(worksheet, out_row, c as u16, cell, format).map_err(fail)?;
            }
        }

        worksheet.autofit();
        Ok(())
    }

    pub fn save(&mut self, path: &Path) -> Result<(), IoError> {
        self.workbook
            .save(path)
            .map_err(|source| IoError::Write { path: path.to_path_buf(), source })
    }
}

fn is_total_row(table: &Table) -> bool {
    table
        .rows
        .last()
        .is_some_and(|row| row.first().is_some_and(|cell| cell.as_text() == TOTAL_ROW_ID))
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    format: Option<&Format>,
) -> Result<(), XlsxError> {
    match (cell, format) {
        (Cell::Empty, _) => Ok(()),
        (Cell::Number(n), Some(f)) => worksheet.write_number_with_format(row, col, *n, f).map(|_| ()),
        (Cell::Number(n), None) => worksheet.write_number(row, col, *n).map(|_| ()),
        (Cell::Bool(b), Some(f)) => worksheet.write_boolean_with_format(row, col, *b, f).map(|_| ()),
        (Cell::Bool(b), None) => worksheet.write_boolean(row, col, *b).map(|_| ()),
        // text and datetimes share the text path; dates render canonically
        (other, Some(f)) => {
            worksheet.write_string_with_format(row, col, other.as_text(), f).map(|_| ())
        }
        (other, None) => worksheet.write_string(row, col, other.as_text()).map(|_| ()),
    }
}

/// Excel sheet names cap at 31 characters and reject `[ ] : * ? / \`.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .take(31)
        .collect();
    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_names_are_sanitized_and_capped() {
        assert_eq!(sanitize_sheet_name("a/b:c"), "a_b_c");
        assert_eq!(sanitize_sheet_name(""), "Sheet1");
        let long = "x".repeat(40);
        assert_eq!(sanitize_sheet_name(&long).chars().count(), 31);
    }

    #[test]
    fn total_trailer_is_detected() {
        let mut t = Table::new("s", vec!["id".into()]);
        t.push_row(vec![Cell::Text("row".into())]);
        assert!(!is_total_row(&t));
        t.push_row(vec![Cell::Text(TOTAL_ROW_ID.into())]);
        assert!(is_total_row(&t));
    }
}
