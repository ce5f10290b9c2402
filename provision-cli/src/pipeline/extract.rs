//! Identifier extraction from decoded spreadsheet rows
//!
//! Works from the primary header-keyed decode, falling back to the positional decode
//! when the primary one looks truncated against the sheet's declared range. The
//! identifier column is guessed from the header labels.

use log::{debug, info, warn};
use serde_json::Value;
use thiserror::Error;

use super::error::InputError;
use super::types::Identifier;
use crate::sheet::{RawRow, SheetDecoder};

/// Header substrings that mark the identifier column, tried in order per label
const IDENTIFIER_TOKENS: [&str; 4] = ["mã", "ma", "code", "id"];

/// Sheets declaring this many rows or fewer are never re-decoded
const RECONCILE_MIN_DECLARED_ROWS: usize = 100;

/// Primary decode is suspect below this share of the declared rows
const RECONCILE_RATIO: f64 = 0.9;

/// Which decode the rows came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSource {
    Primary,
    Positional,
}

/// Identifiers together with how they were found
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Header label of the identifier column
    pub column: String,
    pub identifiers: Vec<Identifier>,
    pub source: RowSource,
    /// Rows without a usable identifier value
    pub skipped_rows: usize,
}

#[derive(Debug, Error)]
#[error("cannot convert {kind} cell to text")]
pub struct CellConversionError {
    kind: &'static str,
}

/// Extract the ordered identifier list, with the detected column and decode used
pub fn extract<D: SheetDecoder + ?Sized>(decoder: &D) -> Result<Extraction, InputError> {
    let (rows, source) = reconcile_rows(decoder);

    let first_row = rows.first().ok_or(InputError::EmptyInput)?;
    let column = detect_identifier_column(first_row).ok_or(InputError::NoIdentifierColumn)?;
    info!("Using '{}' as the identifier column", column);

    let mut identifiers = Vec::with_capacity(rows.len());
    let mut skipped_rows = 0;

    for (index, row) in rows.iter().enumerate() {
        let Some(value) = row.get(&column) else {
            debug!("Row {} has no '{}' column", index + 1, column);
            skipped_rows += 1;
            continue;
        };

        match coerce_cell(value) {
            Ok(Some(text)) => identifiers.push(Identifier::new(text)),
            Ok(None) => skipped_rows += 1,
            Err(e) => {
                warn!("Row {}: {}", index + 1, e);
                skipped_rows += 1;
            }
        }
    }

    if identifiers.is_empty() {
        return Err(InputError::NoIdentifiers { column });
    }

    info!(
        "Extracted {} identifiers from {} rows ({} skipped)",
        identifiers.len(),
        rows.len(),
        skipped_rows
    );

    Ok(Extraction {
        column,
        identifiers,
        source,
        skipped_rows,
    })
}

/// Pick between the primary and positional decodes
///
/// The positional decode is only consulted when the primary decode returned fewer than
/// 90% of the declared rows of a sheet declaring more than 100 rows. It wins when it has
/// strictly more non-empty rows, or on a tie when its raw row count exceeds the primary
/// count by more than the header row.
pub fn reconcile_rows<D: SheetDecoder + ?Sized>(decoder: &D) -> (Vec<RawRow>, RowSource) {
    let primary = decoder.primary_rows();
    let declared = decoder.declared_row_count();

    if !looks_truncated(primary.len(), declared) {
        return (primary, RowSource::Primary);
    }

    warn!(
        "Primary decode returned {} rows for {} declared rows, re-decoding positionally",
        primary.len(),
        declared
    );

    let positional = decoder.positional_rows();
    let converted = rows_from_positional(&positional);

    let primary_filled = primary.iter().filter(|row| row.has_content()).count();
    let converted_filled = converted.iter().filter(|row| row.has_content()).count();

    let use_positional = if converted_filled != primary_filled {
        converted_filled > primary_filled
    } else {
        positional.len() > primary.len() + 1
    };

    debug!(
        "Reconciliation: primary {} rows ({} filled), positional {} rows ({} filled)",
        primary.len(),
        primary_filled,
        positional.len(),
        converted_filled
    );

    if use_positional {
        info!("Using positional decode ({} rows)", converted.len());
        (converted, RowSource::Positional)
    } else {
        (primary, RowSource::Primary)
    }
}

fn looks_truncated(decoded: usize, declared: usize) -> bool {
    declared > RECONCILE_MIN_DECLARED_ROWS && (decoded as f64) < declared as f64 * RECONCILE_RATIO
}

/// Turn header + positional rows into keyed rows, dropping rows with no content
pub fn rows_from_positional(positional: &[Vec<Value>]) -> Vec<RawRow> {
    let Some((header, body)) = positional.split_first() else {
        return Vec::new();
    };

    let labels: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| positional_label(idx, cell))
        .collect();

    body.iter()
        .filter_map(|cells| {
            let row = RawRow::from_pairs(labels.iter().enumerate().map(|(idx, label)| {
                (
                    label.clone(),
                    cells.get(idx).cloned().unwrap_or(Value::Null),
                )
            }));
            row.has_content().then_some(row)
        })
        .collect()
}

fn positional_label(idx: usize, cell: &Value) -> String {
    let label = match cell {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };

    if label.is_empty() {
        format!("Column_{}", idx + 1)
    } else {
        label
    }
}

/// Identifier column of a row: first label containing an identifier token
/// (case-insensitive), else the first label
pub fn detect_identifier_column(row: &RawRow) -> Option<String> {
    row.keys()
        .find(|key| {
            let lower = key.to_lowercase();
            IDENTIFIER_TOKENS.iter().any(|token| lower.contains(token))
        })
        .or_else(|| row.keys().next())
        .map(str::to_string)
}

/// Trimmed text form of a cell; `None` for null or blank cells
pub fn coerce_cell(value: &Value) -> Result<Option<String>, CellConversionError> {
    let text = match value {
        Value::Null => return Ok(None),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) => return Err(CellConversionError { kind: "array" }),
        Value::Object(_) => return Err(CellConversionError { kind: "object" }),
    };

    Ok((!text.is_empty()).then_some(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    /// In-memory decoder that records whether the positional decode was requested
    struct FakeSheet {
        primary: Vec<RawRow>,
        positional: Vec<Vec<Value>>,
        declared: usize,
        positional_used: Cell<bool>,
    }

    impl FakeSheet {
        fn new(primary: Vec<RawRow>, positional: Vec<Vec<Value>>, declared: usize) -> Self {
            Self {
                primary,
                positional,
                declared,
                positional_used: Cell::new(false),
            }
        }

        fn keyed(header: &str, values: &[Value]) -> Self {
            let primary: Vec<RawRow> = values
                .iter()
                .map(|v| RawRow::from_pairs([(header, v.clone())]))
                .collect();
            let declared = primary.len() + 1;
            Self::new(primary, Vec::new(), declared)
        }
    }

    impl SheetDecoder for FakeSheet {
        fn primary_rows(&self) -> Vec<RawRow> {
            self.primary.clone()
        }

        fn positional_rows(&self) -> Vec<Vec<Value>> {
            self.positional_used.set(true);
            self.positional.clone()
        }

        fn declared_row_count(&self) -> usize {
            self.declared
        }
    }

    fn codes(n: usize, prefix: &str) -> Vec<RawRow> {
        (0..n)
            .map(|i| RawRow::from_pairs([("Mã", json!(format!("{}{}", prefix, i)))]))
            .collect()
    }

    fn positional_codes(n: usize) -> Vec<Vec<Value>> {
        let mut rows = vec![vec![json!("Mã")]];
        rows.extend((0..n).map(|i| vec![json!(format!("P{}", i))]));
        rows
    }

    #[test]
    fn test_detects_vietnamese_code_column() {
        let row = RawRow::from_pairs([("Mã ĐT", json!("KH01")), ("Tên", json!("A"))]);
        assert_eq!(detect_identifier_column(&row).as_deref(), Some("Mã ĐT"));
    }

    #[test]
    fn test_falls_back_to_first_column() {
        let row = RawRow::from_pairs([("Foo", json!("1")), ("Bar", json!("2"))]);
        assert_eq!(detect_identifier_column(&row).as_deref(), Some("Foo"));
    }

    #[test]
    fn test_detection_is_case_insensitive_and_ordered() {
        let row = RawRow::from_pairs([("Tên", json!("x")), ("CUSTOMER_ID", json!("1")), ("Code", json!("2"))]);
        assert_eq!(detect_identifier_column(&row).as_deref(), Some("CUSTOMER_ID"));
    }

    #[test]
    fn test_no_columns() {
        assert_eq!(detect_identifier_column(&RawRow::new()), None);
    }

    #[test]
    fn test_extracts_in_row_order_without_dedup() {
        let sheet = FakeSheet::keyed(
            "Mã",
            &[json!(" KH01 "), json!("KH02"), json!("KH01"), json!(1003)],
        );
        let ids = extract(&sheet).unwrap().identifiers;
        assert_eq!(
            ids,
            vec![
                Identifier::from("KH01"),
                Identifier::from("KH02"),
                Identifier::from("KH01"),
                Identifier::from("1003"),
            ]
        );
    }

    #[test]
    fn test_skips_missing_blank_and_unconvertible_cells() {
        let primary = vec![
            RawRow::from_pairs([("code", json!("A")), ("name", json!("x"))]),
            RawRow::from_pairs([("name", json!("no code"))]),
            RawRow::from_pairs([("code", Value::Null), ("name", json!("y"))]),
            RawRow::from_pairs([("code", json!("   ")), ("name", json!("z"))]),
            RawRow::from_pairs([("code", json!({"nested": 1})), ("name", json!("w"))]),
            RawRow::from_pairs([("code", json!(true)), ("name", json!("v"))]),
        ];
        let sheet = FakeSheet::new(primary, Vec::new(), 7);

        let extraction = extract(&sheet).unwrap();
        assert_eq!(extraction.column, "code");
        assert_eq!(
            extraction.identifiers,
            vec![Identifier::from("A"), Identifier::from("true")]
        );
        assert_eq!(extraction.skipped_rows, 4);
        assert_eq!(extraction.source, RowSource::Primary);
    }

    #[test]
    fn test_empty_input() {
        let sheet = FakeSheet::new(Vec::new(), Vec::new(), 0);
        assert!(matches!(extract(&sheet), Err(InputError::EmptyInput)));
    }

    #[test]
    fn test_no_identifier_column() {
        let sheet = FakeSheet::new(vec![RawRow::new()], Vec::new(), 2);
        assert!(matches!(
            extract(&sheet),
            Err(InputError::NoIdentifierColumn)
        ));
    }

    #[test]
    fn test_no_identifiers_after_filtering() {
        let sheet = FakeSheet::keyed("Mã", &[Value::Null, json!("")]);
        match extract(&sheet) {
            Err(InputError::NoIdentifiers { column }) => assert_eq!(column, "Mã"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_truncated_primary_uses_positional_decode() {
        let sheet = FakeSheet::new(codes(50, "K"), positional_codes(199), 200);

        let extraction = extract(&sheet).unwrap();
        assert!(sheet.positional_used.get());
        assert_eq!(extraction.source, RowSource::Positional);
        assert_eq!(extraction.identifiers.len(), 199);
        assert_eq!(extraction.identifiers[0], Identifier::from("P0"));
    }

    #[test]
    fn test_positional_with_fewer_rows_is_ignored() {
        let sheet = FakeSheet::new(codes(50, "K"), positional_codes(30), 200);

        let (rows, source) = reconcile_rows(&sheet);
        assert!(sheet.positional_used.get());
        assert_eq!(source, RowSource::Primary);
        assert_eq!(rows.len(), 50);
    }

    #[test]
    fn test_tie_prefers_positional_when_raw_count_exceeds() {
        // Equal filled rows, but the positional decode saw extra (blank) rows
        let mut positional = positional_codes(50);
        positional.push(vec![Value::Null]);
        positional.push(vec![Value::Null]);
        let sheet = FakeSheet::new(codes(50, "K"), positional, 200);

        let (_, source) = reconcile_rows(&sheet);
        assert_eq!(source, RowSource::Positional);
    }

    #[test]
    fn test_small_or_complete_sheets_skip_reconciliation() {
        let small = FakeSheet::new(codes(10, "K"), positional_codes(99), 100);
        assert_eq!(reconcile_rows(&small).1, RowSource::Primary);
        assert!(!small.positional_used.get());

        let complete = FakeSheet::new(codes(190, "K"), positional_codes(199), 200);
        assert_eq!(reconcile_rows(&complete).1, RowSource::Primary);
        assert!(!complete.positional_used.get());
    }

    #[test]
    fn test_rows_from_positional_labels() {
        let rows = rows_from_positional(&[
            vec![json!(" Mã "), Value::Null, json!("")],
            vec![json!("A"), json!("x")],
            vec![Value::Null, Value::Null, Value::Null],
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].keys().collect::<Vec<_>>(), vec!["Mã", "Column_2", "Column_3"]);
        assert_eq!(rows[0].get("Column_3"), Some(&Value::Null));
    }

    #[test]
    fn test_coerce_cell() {
        assert_eq!(coerce_cell(&json!(" KH01 ")).unwrap().as_deref(), Some("KH01"));
        assert_eq!(coerce_cell(&json!(42)).unwrap().as_deref(), Some("42"));
        assert_eq!(coerce_cell(&json!(4.5)).unwrap().as_deref(), Some("4.5"));
        assert_eq!(coerce_cell(&Value::Null).unwrap(), None);
        assert_eq!(coerce_cell(&json!("  ")).unwrap(), None);
        assert!(coerce_cell(&json!([1, 2])).is_err());
    }
}
