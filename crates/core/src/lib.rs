//! `shoptally-core`: marketplace order pipeline engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns computed
//! artifacts (invoice groups, stock deduction, finance summary).
//! No CLI or file-IO dependencies.

pub mod error;
pub mod finance;
pub mod invoice;
pub mod mapping;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod platform;
pub mod stock;
pub mod table;

pub use error::PipelineError;
pub use model::{CanceledOrderSet, MappingEntry, MappingKey, MergedLine, OrderLine};
pub use pipeline::{run, PipelineInput, PlatformRun};
pub use platform::Platform;
pub use table::{Cell, Table};
