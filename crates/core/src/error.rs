use std::fmt;

/// A merged row that found no mapping entry, reported by `IncompleteMapping`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnmappedLine {
    pub order_id: String,
    pub platform_sku: String,
    pub item_name: String,
}

#[derive(Debug)]
pub enum PipelineError {
    /// A required sheet is absent from the source workbook.
    MissingSheet(String),
    /// A required column is absent from a sheet.
    MissingColumn { sheet: String, column: String },
    /// Post-join rows without a mapping entry. Hard stop: downstream
    /// aggregation assumes total coverage.
    IncompleteMapping { lines: Vec<UnmappedLine> },
    /// A cell could not be coerced to the declared column type.
    Value { sheet: String, row: usize, column: String, value: String },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSheet(name) => write!(f, "sheet '{name}' not found"),
            Self::MissingColumn { sheet, column } => {
                write!(f, "sheet '{sheet}': missing column '{column}'")
            }
            Self::IncompleteMapping { lines } => {
                writeln!(f, "{} order line(s) have no mapping entry:", lines.len())?;
                for line in lines {
                    writeln!(
                        f,
                        "  order {} sku '{}' ({})",
                        line.order_id, line.platform_sku, line.item_name
                    )?;
                }
                write!(f, "add the missing entries to the mapping file and re-run")
            }
            Self::Value { sheet, row, column, value } => {
                write!(
                    f,
                    "sheet '{sheet}' row {row}: cannot parse '{value}' in column '{column}'"
                )
            }
        }
    }
}

impl std::error::Error for PipelineError {}
