use thiserror::Error;

/// Problems with the input spreadsheet. Fatal to a run; nothing is provisioned.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("the spreadsheet has no data")]
    EmptyInput,

    #[error("no identifier column found in the spreadsheet")]
    NoIdentifierColumn,

    #[error("no identifiers found in column '{column}'")]
    NoIdentifiers { column: String },

    #[error("failed to read spreadsheet: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode spreadsheet: {0}")]
    Unreadable(#[from] calamine::Error),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("there are no failures to export")]
    NothingToExport,

    #[error("failed to build workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}
