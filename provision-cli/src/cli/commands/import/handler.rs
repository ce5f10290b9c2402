//! Import command handler

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use colored::*;

use super::ImportCommands;
use super::interrupt::{FORCE_QUIT_EXIT_CODE, Interrupt, watch_interrupts};
use super::progress::ProgressLine;
use crate::api::ProvisioningClient;
use crate::config::Config;
use crate::pipeline::{
    Locale, RecordOrchestrator, RunReport, default_file_name, export_failures, extract,
};
use crate::sheet::read_workbook;

/// Extract identifiers, provision them, print the outcome and export failures
pub async fn handle_import_command(args: ImportCommands, config: Config) -> Result<()> {
    if args.no_color {
        colored::control::set_override(false);
    }

    let locale = args.locale.unwrap_or(config.report.locale);
    config.validate()?;

    if !args.file.exists() {
        anyhow::bail!("Spreadsheet does not exist: {}", args.file.display());
    }

    let sheet = read_workbook(&args.file)
        .with_context(|| format!("Failed to read spreadsheet: {}", args.file.display()))?;
    let extraction = extract(&sheet).context("Failed to extract identifiers")?;

    println!(
        "Found {} identifiers in column '{}' of {}",
        extraction.identifiers.len().to_string().bold(),
        extraction.column.cyan(),
        args.file.display()
    );

    let client = ProvisioningClient::new(&config)?;

    let cancel_flag = Arc::new(AtomicBool::new(false));
    let signal_flag = cancel_flag.clone();
    let signal_task = tokio::spawn(async move {
        if watch_interrupts(tokio::signal::ctrl_c, signal_flag).await == Interrupt::ForceQuit {
            eprintln!("Aborted");
            std::process::exit(FORCE_QUIT_EXIT_CODE);
        }
    });

    let orchestrator = RecordOrchestrator::new(client).with_cancel_flag(cancel_flag);
    let report = {
        let mut progress = ProgressLine::new(extraction.identifiers.len());
        orchestrator
            .run(&extraction.identifiers, |current, total| {
                progress.update(current, total)
            })
            .await
    };
    signal_task.abort();

    print_summary(&report);
    print_partial_successes(&report);
    print_failures(&report, locale);

    if report.failures().is_empty() {
        let all_complete = report.partial_successes().next().is_none();
        if report.summary().success_count > 0 && report.is_complete() && all_complete {
            println!("{}", "All identifiers were provisioned successfully.".green());
        }
    } else {
        write_failure_list(&report, &args, locale)?;
    }

    ensure_not_cancelled(&report)
}

fn write_failure_list(report: &RunReport, args: &ImportCommands, locale: Locale) -> Result<()> {
    let bytes = export_failures(report.failures(), args.format, locale)
        .context("Failed to export failures")?;
    let path = args.errors_out.clone().unwrap_or_else(|| {
        PathBuf::from(default_file_name(
            chrono::Local::now().date_naive(),
            args.format,
            locale,
        ))
    });
    fs::write(&path, bytes)
        .with_context(|| format!("Failed to write failure list: {}", path.display()))?;
    println!("Failure list written to {}", path.display().to_string().cyan());

    Ok(())
}

fn print_summary(report: &RunReport) {
    let summary = report.summary();

    println!();
    if summary.cancelled {
        println!(
            "{} after {}/{} identifiers",
            "Cancelled".yellow().bold(),
            summary.processed,
            summary.total
        );
    }
    println!("Total:     {}", summary.total);
    println!("Succeeded: {}", summary.success_count.to_string().green());
    println!(
        "Failed:    {} ({} identifiers)",
        summary.failed_count.to_string().red(),
        summary.failed_rows
    );
}

/// A cancelled run exits non-zero once its partial report has been written
fn ensure_not_cancelled(report: &RunReport) -> Result<()> {
    if report.is_cancelled() {
        anyhow::bail!(
            "Run cancelled after {}/{} identifiers",
            report.processed(),
            report.total()
        );
    }
    Ok(())
}

/// Identifier and message of each success whose customer record was not created
fn partial_success_lines(report: &RunReport) -> Vec<String> {
    report
        .partial_successes()
        .map(|entry| format!("{:<20} {}", entry.identifier.as_str(), entry.message))
        .collect()
}

fn print_partial_successes(report: &RunReport) {
    let lines = partial_success_lines(report);
    if lines.is_empty() {
        return;
    }

    println!();
    println!("{}", "Lookup user created, customer record not created".yellow().bold());
    for (idx, line) in lines.iter().enumerate() {
        println!("{:>4}  {}", idx + 1, line);
    }
}

fn print_failures(report: &RunReport, locale: Locale) {
    if report.failures().is_empty() {
        return;
    }

    println!();
    println!("{}", "Failures".red().bold());
    for (idx, failure) in report.failures().iter().enumerate() {
        println!(
            "{:>4}  {:<20} {:<26} {}",
            idx + 1,
            failure.identifier.as_str(),
            failure.step.label(locale).yellow(),
            failure.reason.dimmed()
        );
    }
}
