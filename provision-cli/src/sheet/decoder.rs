//! Decode the first worksheet of a workbook with calamine

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use log::{debug, info};
use serde_json::{Value, json};

use super::RawRow;
use crate::pipeline::InputError;

/// Label given to header cells that are blank in the primary decode
const EMPTY_HEADER: &str = "__EMPTY";

/// The three views of a worksheet the identifier extractor works from
pub trait SheetDecoder {
    /// Header-keyed rows. The first row of the used range is the header; blank rows are
    /// dropped and blank cells decode as null.
    fn primary_rows(&self) -> Vec<RawRow>;

    /// Raw positional rows including the header row, blank rows dropped
    fn positional_rows(&self) -> Vec<Vec<Value>>;

    /// Number of rows the sheet declares (last used row index + 1)
    fn declared_row_count(&self) -> usize;
}

/// First worksheet of a workbook decoded by calamine
#[derive(Debug, Clone)]
pub struct CalamineSheet {
    name: String,
    range: Range<Data>,
}

impl CalamineSheet {
    pub fn new(name: impl Into<String>, range: Range<Data>) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Read a spreadsheet file from disk
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<CalamineSheet, InputError> {
    let path = path.as_ref();
    debug!("Reading spreadsheet {}", path.display());
    let bytes = std::fs::read(path)?;
    read_workbook_bytes(bytes)
}

/// Decode an in-memory workbook of any format calamine recognises and take its first sheet
pub fn read_workbook_bytes(bytes: Vec<u8>) -> Result<CalamineSheet, InputError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(InputError::EmptyInput)?;

    let range = workbook.worksheet_range(&sheet_name)?;
    if range.is_empty() {
        return Err(InputError::EmptyInput);
    }

    info!(
        "Sheet '{}' declares {} rows ({}x{} used range)",
        sheet_name,
        range.end().map(|(row, _)| row as usize + 1).unwrap_or(0),
        range.height(),
        range.width()
    );

    Ok(CalamineSheet::new(sheet_name, range))
}

impl SheetDecoder for CalamineSheet {
    fn primary_rows(&self) -> Vec<RawRow> {
        let mut rows = self.range.rows();
        let Some(header) = rows.next() else {
            return Vec::new();
        };
        let labels = primary_labels(header);

        rows.filter_map(|cells| {
            let mut row = RawRow::new();
            for (idx, label) in labels.iter().enumerate() {
                let value = cells.get(idx).map(cell_to_value).unwrap_or(Value::Null);
                row.push(label.clone(), value);
            }
            row.has_content().then_some(row)
        })
        .collect()
    }

    fn positional_rows(&self) -> Vec<Vec<Value>> {
        self.range
            .rows()
            .map(|cells| cells.iter().map(cell_to_value).collect::<Vec<_>>())
            .filter(|cells| cells.iter().any(|value| !value.is_null()))
            .collect()
    }

    fn declared_row_count(&self) -> usize {
        self.range
            .end()
            .map(|(row, _)| row as usize + 1)
            .unwrap_or(0)
    }
}

/// Header labels for the primary decode: blanks become `__EMPTY`, repeats get `_1`, `_2`, ...
fn primary_labels(header: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();

    header
        .iter()
        .map(|cell| {
            let base = match cell_to_value(cell) {
                Value::Null => EMPTY_HEADER.to_string(),
                Value::String(s) => s,
                other => other.to_string(),
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let label = if *count == 0 {
                base
            } else {
                format!("{}_{}", base, count)
            };
            *count += 1;
            label
        })
        .collect()
}

/// Convert a calamine cell to a loosely-typed JSON value
pub fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => json!(*i),
        Data::Float(f) => {
            // Identifiers typed as numbers come back as floats
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                json!(*f as i64)
            } else {
                json!(*f)
            }
        }
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => Value::String(format!("{}", dt)),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn sample_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Mã ĐT").unwrap();
        sheet.write_string(0, 1, "Tên").unwrap();
        sheet.write_string(0, 2, "Tên").unwrap();
        sheet.write_string(1, 0, "KH01").unwrap();
        sheet.write_string(1, 1, "Alpha").unwrap();
        // row 2 left blank
        sheet.write_number(3, 0, 1002.0).unwrap();
        sheet.write_string(3, 2, "Gamma").unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_primary_rows_skip_blank_rows() {
        let sheet = read_workbook_bytes(sample_workbook()).unwrap();
        let rows = sheet.primary_rows();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Mã ĐT"), Some(&json!("KH01")));
        assert_eq!(rows[0].get("Tên"), Some(&json!("Alpha")));
        assert_eq!(rows[0].get("Tên_1"), Some(&Value::Null));
        assert_eq!(rows[1].get("Mã ĐT"), Some(&json!(1002)));
        assert_eq!(rows[1].get("Tên_1"), Some(&json!("Gamma")));
    }

    #[test]
    fn test_positional_rows_include_header() {
        let sheet = read_workbook_bytes(sample_workbook()).unwrap();
        let rows = sheet.positional_rows();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], json!("Mã ĐT"));
        assert_eq!(rows[2][0], json!(1002));
    }

    #[test]
    fn test_declared_row_count_counts_blank_rows() {
        let sheet = read_workbook_bytes(sample_workbook()).unwrap();
        assert_eq!(sheet.declared_row_count(), 4);
    }

    #[test]
    fn test_empty_sheet_is_empty_input() {
        let mut workbook = Workbook::new();
        workbook.add_worksheet();
        let bytes = workbook.save_to_buffer().unwrap();

        assert!(matches!(
            read_workbook_bytes(bytes),
            Err(InputError::EmptyInput)
        ));
    }

    #[test]
    fn test_garbage_bytes_are_unreadable() {
        let result = read_workbook_bytes(b"definitely not a spreadsheet".to_vec());
        assert!(matches!(result, Err(InputError::Unreadable(_))));
    }

    #[test]
    fn test_primary_labels() {
        let header = vec![
            Data::String("id".into()),
            Data::Empty,
            Data::String("id".into()),
            Data::Empty,
            Data::Int(7),
        ];
        assert_eq!(
            primary_labels(&header),
            vec!["id", "__EMPTY", "id_1", "__EMPTY_1", "7"]
        );
    }

    #[test]
    fn test_cell_to_value() {
        assert_eq!(cell_to_value(&Data::Empty), Value::Null);
        assert_eq!(cell_to_value(&Data::String(String::new())), Value::Null);
        assert_eq!(cell_to_value(&Data::Float(42.0)), json!(42));
        assert_eq!(cell_to_value(&Data::Float(4.5)), json!(4.5));
        assert_eq!(cell_to_value(&Data::Bool(true)), json!(true));
    }
}
