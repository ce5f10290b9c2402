//! `extract` command: dry run of identifier extraction

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;

use crate::pipeline::{RowSource, extract};
use crate::sheet::read_workbook;

#[derive(Args, Debug)]
pub struct ExtractCommands {
    /// Spreadsheet to inspect
    pub file: PathBuf,

    /// Only print the first N identifiers
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,
}

pub fn handle_extract_command(args: ExtractCommands) -> Result<()> {
    let sheet = read_workbook(&args.file)
        .with_context(|| format!("Failed to read spreadsheet: {}", args.file.display()))?;
    let extraction = extract(&sheet).context("Failed to extract identifiers")?;

    println!("Sheet:      {}", sheet.name().cyan());
    println!("Column:     {}", extraction.column.cyan());
    println!(
        "Decode:     {}",
        match extraction.source {
            RowSource::Primary => "primary",
            RowSource::Positional => "positional (primary decode looked truncated)",
        }
    );
    println!("Skipped:    {} rows", extraction.skipped_rows);
    println!(
        "Identifiers: {}",
        extraction.identifiers.len().to_string().bold()
    );
    println!();

    let limit = args.limit.unwrap_or(usize::MAX);
    for (idx, identifier) in extraction.identifiers.iter().take(limit).enumerate() {
        let marker = if identifier.is_valid() {
            String::new()
        } else {
            " (invalid)".red().to_string()
        };
        println!("{:>5}  {}{}", idx + 1, identifier, marker);
    }

    if extraction.identifiers.len() > limit {
        println!("  ... {} more", extraction.identifiers.len() - limit);
    }

    Ok(())
}
