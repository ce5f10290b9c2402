//! Spreadsheet ingestion
//!
//! Decodes the first worksheet of a workbook into loosely-typed rows. Two views are
//! exposed: header-keyed rows and raw positional rows, together with the declared row
//! range of the sheet so callers can notice a decode that silently dropped rows.

mod decoder;
mod row;

pub use decoder::{SheetDecoder, read_workbook};
pub use row::RawRow;
