use std::fmt;

fn sample_list(ids: &[String]) -> String {
    let shown: Vec<&str> = ids.iter().take(5).map(String::as_str).collect();
    if ids.len() > 5 {
        format!("{shown:?}...")
    } else {
        format!("{shown:?}")
    }
}

#[derive(Debug)]
pub enum ReconError {
    /// Missing required column in one of the input tables.
    MissingColumn { table: String, column: String },
    /// Admin file contains order IDs already claimed on the ledger side.
    DuplicateClaim { admin_file: String, order_ids: Vec<String> },
    /// Admin rows already carry provenance from a different ledger file.
    ReverseMarkConflict { reported_file: String, order_ids: Vec<String> },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumn { table, column } => {
                write!(f, "table '{table}': missing column '{column}'")
            }
            Self::DuplicateClaim { admin_file, order_ids } => {
                write!(
                    f,
                    "found {} order IDs in '{admin_file}' that were already matched: {}",
                    order_ids.len(),
                    sample_list(order_ids)
                )
            }
            Self::ReverseMarkConflict { reported_file, order_ids } => {
                write!(
                    f,
                    "{} admin rows already reconciled against a file other than '{reported_file}': {}",
                    order_ids.len(),
                    sample_list(order_ids)
                )
            }
        }
    }
}

impl std::error::Error for ReconError {}
