//! CLI Exit Code Registry
//!
//! Single source of truth for all CLI exit codes. Exit codes are part of
//! the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Code | Description                                          |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | CLI usage error (bad args)                           |
//! | 3    | Schema error (required sheet or column absent)       |
//! | 4    | Incomplete mapping (order rows without a stock item) |
//! | 5    | Duplicate reconciliation claim                       |
//! | 6    | Missing resource (file or directory not found)       |
//! | 7    | Value error (unparseable cell)                       |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// A required sheet or column is absent from an input workbook.
pub const EXIT_SCHEMA: u8 = 3;

/// Order rows survived the mapping join without a stock item.
/// No output is written; the mapping file must be completed first.
pub const EXIT_MAPPING: u8 = 4;

/// Reconciliation would claim rows already claimed by another file.
pub const EXIT_RECON_DUPLICATE: u8 = 5;

/// An input file or admin directory does not exist.
pub const EXIT_MISSING_RESOURCE: u8 = 6;

/// A cell held a value that cannot be coerced to the expected type.
pub const EXIT_VALUE: u8 = 7;
