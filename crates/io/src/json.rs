use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::IoError;

/// Parse a JSON file into a dynamic value. Shape validation happens at
/// the call site, where the expected structure is known.
pub fn read_json(path: &Path) -> Result<serde_json::Value, IoError> {
    let file = File::open(path).map_err(|source| IoError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|source| IoError::Json { path: path.to_path_buf(), source })
}
