use std::path::Path;

use shoptally_core::{Cell, Table};

use crate::error::IoError;

/// Read a CSV file into a `Table`. Every field stays text; numeric
/// coercion is the caller's call, same as with worksheet cells.
pub fn read_csv(path: &Path) -> Result<Table, IoError> {
    let fail = |source: ::csv::Error| IoError::Csv { path: path.to_path_buf(), source };
    let mut reader = ::csv::ReaderBuilder::new().flexible(true).from_path(path).map_err(fail)?;

    let headers: Vec<String> =
        reader.headers().map_err(fail)?.iter().map(|h| h.trim().to_string()).collect();
    let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("csv").to_string();

    let mut table = Table::new(name, headers);
    for record in reader.records() {
        let record = record.map_err(fail)?;
        table.push_row(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(table)
}
