//! Batch reconciliation pipeline
//!
//! Spreadsheet rows are reduced to an ordered list of identifiers, each identifier is
//! provisioned through two independent remote steps, and the outcome of every row is
//! accumulated into a run report that can be exported back to a spreadsheet.

pub mod error;
pub mod export;
pub mod extract;
pub mod orchestrator;
pub mod outcome;
pub mod report;
pub mod types;

pub use error::InputError;
pub use export::{ExportFormat, default_file_name, export_failures};
pub use extract::{RowSource, extract};
pub use orchestrator::RecordOrchestrator;
pub use report::RunReport;
pub use types::Locale;
