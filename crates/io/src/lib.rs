// File I/O operations

pub mod csv;
pub mod error;
pub mod json;
pub mod reader;
pub mod writer;

pub use error::IoError;
pub use reader::ExcelBook;
pub use writer::{sanitize_sheet_name, SheetStyle, WorkbookWriter};
