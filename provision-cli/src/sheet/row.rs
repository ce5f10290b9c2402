use serde_json::Value;

/// One decoded spreadsheet row: column label -> cell value, in column order.
///
/// Labels may be empty or repeated; lookups return the first matching column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: Vec<(String, Value)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(label, value)` pairs, keeping their order
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            cells: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Append a cell. Does not replace an existing cell with the same label.
    pub fn push(&mut self, label: impl Into<String>, value: Value) {
        self.cells.push((label.into(), value));
    }

    pub fn get(&self, label: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(key, _)| key == label)
            .map(|(_, value)| value)
    }

    /// Column labels in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(key, _)| key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.cells.iter().map(|(_, value)| value)
    }

    /// True when at least one cell is neither null nor an empty string
    pub fn has_content(&self) -> bool {
        self.values().any(|value| match value {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            _ => true,
        })
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
