//! `import` command

mod handler;
mod interrupt;
mod progress;

pub use handler::handle_import_command;

use std::path::PathBuf;

use clap::Args;

use crate::pipeline::{ExportFormat, Locale};

#[derive(Args, Debug)]
pub struct ImportCommands {
    /// Spreadsheet with one identifier per row (.xlsx, .xls, .xlsb, .ods)
    pub file: PathBuf,

    /// Where to write the failure list (defaults to a date-stamped name)
    #[arg(long, value_name = "PATH")]
    pub errors_out: Option<PathBuf>,

    /// Format of the failure list
    #[arg(long, value_enum, default_value_t = ExportFormat::Xlsx)]
    pub format: ExportFormat,

    /// Language of the failure list and summary (defaults to the configured one)
    #[arg(long, value_enum)]
    pub locale: Option<Locale>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
