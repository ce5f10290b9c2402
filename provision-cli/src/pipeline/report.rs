//! Run accounting

use serde::Serialize;

use super::types::{FailureEntry, RowResult, SuccessEntry};

/// Progress and outcomes of one run, filled in row by row
///
/// Append-only. One report belongs to exactly one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    total: usize,
    processed: usize,
    failed_rows: usize,
    cancelled: bool,
    successes: Vec<SuccessEntry>,
    failures: Vec<FailureEntry>,
}

/// Counters shown to the user at the end of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub processed: usize,
    pub success_count: usize,
    /// Number of failure entries; an identifier can contribute two
    pub failed_count: usize,
    /// Identifiers with at least one failure entry
    pub failed_rows: usize,
    pub cancelled: bool,
}

impl RunReport {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Append the result of the next identifier
    pub fn record(&mut self, result: RowResult) {
        self.processed += 1;
        match result {
            RowResult::Success(entry) => self.successes.push(entry),
            RowResult::Failed(entries) => {
                self.failed_rows += 1;
                self.failures.extend(entries);
            }
        }
    }

    pub(crate) fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total: self.total,
            processed: self.processed,
            success_count: self.successes.len(),
            failed_count: self.failures.len(),
            failed_rows: self.failed_rows,
            cancelled: self.cancelled,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn successes(&self) -> &[SuccessEntry] {
        &self.successes
    }

    /// Successes whose customer record step failed
    pub fn partial_successes(&self) -> impl Iterator<Item = &SuccessEntry> {
        self.successes()
            .iter()
            .filter(|entry| entry.record_failure.is_some())
    }

    pub fn failures(&self) -> &[FailureEntry] {
        &self.failures
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Every identifier has been processed
    pub fn is_complete(&self) -> bool {
        self.processed == self.total
    }
}
