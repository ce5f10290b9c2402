//! Export failure entries as a spreadsheet
//!
//! Columns are fixed: row number (assigned here, 1-based), identifier, step, reason.

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook};

use super::error::ExportError;
use super::types::{FailureEntry, Locale};

/// Output format of the failure export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

fn headers(locale: Locale) -> [&'static str; 4] {
    match locale {
        Locale::Vi => ["STT", "Mã đối tượng", "Bước lỗi", "Lý do"],
        Locale::En => ["No.", "Identifier", "Step", "Reason"],
    }
}

fn sheet_name(locale: Locale) -> &'static str {
    match locale {
        Locale::Vi => "Danh sách lỗi",
        Locale::En => "Errors",
    }
}

/// Date-stamped file name, e.g. `Danh_sach_loi_2026-10-16.xlsx`
pub fn default_file_name(date: NaiveDate, format: ExportFormat, locale: Locale) -> String {
    let stem = match locale {
        Locale::Vi => "Danh_sach_loi",
        Locale::En => "errors",
    };
    format!("{}_{}.{}", stem, date.format("%Y-%m-%d"), format.extension())
}

pub fn export_failures(
    failures: &[FailureEntry],
    format: ExportFormat,
    locale: Locale,
) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Xlsx => export_failures_xlsx(failures, locale),
        ExportFormat::Csv => export_failures_csv(failures, locale),
    }
}

pub fn export_failures_xlsx(
    failures: &[FailureEntry],
    locale: Locale,
) -> Result<Vec<u8>, ExportError> {
    if failures.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name(locale))?;

    let header_format = Format::new().set_bold();
    for (col, title) in headers(locale).iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &header_format)?;
    }

    for (idx, failure) in failures.iter().enumerate() {
        let row = (idx + 1) as u32;
        worksheet.write_number(row, 0, (idx + 1) as f64)?;
        worksheet.write_string(row, 1, failure.identifier.as_str())?;
        worksheet.write_string(row, 2, failure.step.label(locale))?;
        worksheet.write_string(row, 3, &failure.reason)?;
    }

    worksheet.set_column_width(0, 6)?;
    worksheet.set_column_width(1, 20)?;
    worksheet.set_column_width(2, 26)?;
    worksheet.set_column_width(3, 60)?;

    Ok(workbook.save_to_buffer()?)
}

pub fn export_failures_csv(
    failures: &[FailureEntry],
    locale: Locale,
) -> Result<Vec<u8>, ExportError> {
    if failures.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers(locale))?;

    for (idx, failure) in failures.iter().enumerate() {
        writer.write_record([
            (idx + 1).to_string().as_str(),
            failure.identifier.as_str(),
            failure.step.label(locale),
            failure.reason.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{Identifier, StepName};
    use calamine::{Data, Reader, Xlsx};
    use std::io::Cursor;

    fn timeout_failure() -> FailureEntry {
        FailureEntry::new(Identifier::from("KH01"), StepName::CreateRecord, "timeout")
    }

    #[test]
    fn test_nothing_to_export() {
        assert!(matches!(
            export_failures(&[], ExportFormat::Xlsx, Locale::En),
            Err(ExportError::NothingToExport)
        ));
        assert!(matches!(
            export_failures(&[], ExportFormat::Csv, Locale::Vi),
            Err(ExportError::NothingToExport)
        ));
    }

    #[test]
    fn test_xlsx_single_failure() {
        let bytes = export_failures_xlsx(&[timeout_failure()], Locale::En).unwrap();

        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range("Errors").unwrap();
        let rows: Vec<_> = range.rows().collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], Data::String("No.".into()));
        assert_eq!(rows[0][3], Data::String("Reason".into()));
        assert_eq!(rows[1][0], Data::Float(1.0));
        assert_eq!(rows[1][1], Data::String("KH01".into()));
        assert_eq!(rows[1][2], Data::String("create-record".into()));
        assert_eq!(rows[1][3], Data::String("timeout".into()));
    }

    #[test]
    fn test_xlsx_vietnamese_headers() {
        let failures = vec![
            timeout_failure(),
            FailureEntry::new(Identifier::from("KH01"), StepName::CreateLookupUser, "dup"),
        ];
        let bytes = export_failures_xlsx(&failures, Locale::Vi).unwrap();

        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range("Danh sách lỗi").unwrap();
        let rows: Vec<_> = range.rows().collect();

        assert_eq!(rows[0][1], Data::String("Mã đối tượng".into()));
        assert_eq!(rows[2][0], Data::Float(2.0));
        assert_eq!(rows[2][2], Data::String("Tạo user tra cứu".into()));
    }

    #[test]
    fn test_csv_export() {
        let bytes = export_failures_csv(&[timeout_failure()], Locale::En).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "No.,Identifier,Step,Reason\n1,KH01,create-record,timeout\n");
    }

    #[test]
    fn test_default_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(
            default_file_name(date, ExportFormat::Xlsx, Locale::Vi),
            "Danh_sach_loi_2026-10-16.xlsx"
        );
        assert_eq!(
            default_file_name(date, ExportFormat::Csv, Locale::En),
            "errors_2026-10-16.csv"
        );
    }
}
