use std::path::PathBuf;

#[derive(Debug)]
pub enum IoError {
    /// A workbook could not be opened or a sheet could not be read.
    Open { path: PathBuf, source: calamine::Error },
    /// A worksheet could not be populated.
    Sheet { sheet: String, source: rust_xlsxwriter::XlsxError },
    /// A finished workbook could not be saved.
    Write { path: PathBuf, source: rust_xlsxwriter::XlsxError },
    Csv { path: PathBuf, source: ::csv::Error },
    Json { path: PathBuf, source: serde_json::Error },
    Io { path: PathBuf, source: std::io::Error },
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoError::Open { path, source } => {
                write!(f, "cannot read workbook '{}': {source}", path.display())
            }
            IoError::Sheet { sheet, source } => {
                write!(f, "cannot build sheet '{sheet}': {source}")
            }
            IoError::Write { path, source } => {
                write!(f, "cannot write workbook '{}': {source}", path.display())
            }
            IoError::Csv { path, source } => {
                write!(f, "cannot read CSV '{}': {source}", path.display())
            }
            IoError::Json { path, source } => {
                write!(f, "cannot parse JSON '{}': {source}", path.display())
            }
            IoError::Io { path, source } => {
                write!(f, "'{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IoError::Open { source, .. } => Some(source),
            IoError::Sheet { source, .. } | IoError::Write { source, .. } => Some(source),
            IoError::Csv { source, .. } => Some(source),
            IoError::Json { source, .. } => Some(source),
            IoError::Io { source, .. } => Some(source),
        }
    }
}
