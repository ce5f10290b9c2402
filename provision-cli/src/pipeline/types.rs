//! Row-level data carried through a run

use std::fmt;

use serde::{Deserialize, Serialize};

/// Literal placeholder values that end up in cells exported from other tools
const PLACEHOLDERS: [&str; 2] = ["undefined", "null"];

/// Business key read from the spreadsheet ("mã đối tượng")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier may be sent to the remote service
    pub fn is_valid(&self) -> bool {
        let value = self.0.trim();
        !value.is_empty() && !PLACEHOLDERS.contains(&value)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Language used for report headers and step labels
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Vi,
    En,
}

/// Step a failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepName {
    /// Validation or an unexpected error while handling the row
    Processing,
    CreateRecord,
    CreateLookupUser,
}

impl StepName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::Processing => "Processing",
            StepName::CreateRecord => "create-record",
            StepName::CreateLookupUser => "create-lookup-user",
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::En, step) => step.as_str(),
            (Locale::Vi, StepName::Processing) => "Xử lý",
            (Locale::Vi, StepName::CreateRecord) => "Tạo danh mục khách hàng",
            (Locale::Vi, StepName::CreateLookupUser) => "Tạo user tra cứu",
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one remote step for one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Success,
    Failure { step: StepName, reason: String },
}

impl StepOutcome {
    pub fn failure(step: StepName, reason: impl Into<String>) -> Self {
        StepOutcome::Failure {
            step,
            reason: reason.into(),
        }
    }

    #[cfg(test)]
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessEntry {
    pub identifier: Identifier,
    pub message: String,
    /// Set when the lookup user was created but the customer record was not
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_failure: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureEntry {
    pub identifier: Identifier,
    pub step: StepName,
    pub reason: String,
}

impl FailureEntry {
    pub fn new(identifier: Identifier, step: StepName, reason: impl Into<String>) -> Self {
        Self {
            identifier,
            step,
            reason: reason.into(),
        }
    }
}

/// Combined outcome of one identifier: a single success or at least one failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowResult {
    Success(SuccessEntry),
    Failed(Vec<FailureEntry>),
}

impl RowResult {
    pub fn failed(entry: FailureEntry) -> Self {
        RowResult::Failed(vec![entry])
    }
}
