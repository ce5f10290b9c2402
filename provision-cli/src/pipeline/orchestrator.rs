//! Sequential two-step provisioning of an identifier list
//!
//! Identifiers are handled strictly one after another: the create-record call is awaited
//! before the create-lookup-user call, and that one before the next identifier. The
//! order of progress callbacks and report entries therefore matches the input order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use log::{debug, error, info, warn};

use super::outcome::{classify_lookup_response, classify_record_response, combine};
use super::report::RunReport;
use super::types::{FailureEntry, Identifier, RowResult, StepName};
use crate::api::ProvisioningApi;

const INVALID_IDENTIFIER: &str = "invalid identifier";

pub struct RecordOrchestrator<A> {
    api: A,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl<A: ProvisioningApi> RecordOrchestrator<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            cancel_flag: None,
        }
    }

    /// Stop the run before the next identifier once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Provision every identifier in order
    ///
    /// `on_progress(current, total)` fires once per identifier after its entries are in
    /// the report. Per-row failures are recorded in the report, never returned. When
    /// cancelled, the report holds whole rows only and no further callbacks fire.
    pub async fn run<F>(&self, identifiers: &[Identifier], mut on_progress: F) -> RunReport
    where
        F: FnMut(usize, usize),
    {
        let total = identifiers.len();
        let mut report = RunReport::new(total);

        if total == 0 {
            warn!("Run started with no identifiers");
            return report;
        }

        info!("Provisioning {} identifiers", total);

        for (index, identifier) in identifiers.iter().enumerate() {
            if self.is_cancelled() {
                warn!("Run cancelled after {}/{} identifiers", index, total);
                report.mark_cancelled();
                break;
            }

            let result = self.process(index, identifier).await;
            report.record(result);
            on_progress(index + 1, total);
        }

        let summary = report.summary();
        info!(
            "Run finished: {} processed, {} succeeded, {} failure entries",
            summary.processed, summary.success_count, summary.failed_count
        );

        report
    }

    /// Handle one identifier, turning every error into failure entries
    pub async fn process(&self, index: usize, identifier: &Identifier) -> RowResult {
        if !identifier.is_valid() {
            warn!("Row {}: invalid identifier {:?}", index + 1, identifier.as_str());
            let shown = if identifier.as_str().trim().is_empty() {
                Identifier::new(format!("Row {}", index + 1))
            } else {
                identifier.clone()
            };
            return RowResult::failed(FailureEntry::new(
                shown,
                StepName::Processing,
                INVALID_IDENTIFIER,
            ));
        }

        match self.provision(identifier).await {
            Ok(result) => result,
            Err(e) => {
                error!("Row {} ({}): {:#}", index + 1, identifier, e);
                RowResult::failed(FailureEntry::new(
                    identifier.clone(),
                    StepName::Processing,
                    format!("{:#}", e),
                ))
            }
        }
    }

    /// Run both steps; the lookup-user step is attempted whatever the record step returned
    async fn provision(&self, identifier: &Identifier) -> Result<RowResult> {
        let record_response = self
            .api
            .create_record(identifier.as_str())
            .await
            .context("create-record call failed")?;
        let record = classify_record_response(&record_response);
        debug!("{}: create-record -> {:?}", identifier, record);

        let lookup_response = self
            .api
            .create_lookup_user(identifier.as_str())
            .await
            .context("create-lookup-user call failed")?;
        let lookup = classify_lookup_response(&lookup_response);
        debug!("{}: create-lookup-user -> {:?}", identifier, lookup);

        Ok(combine(identifier, record, lookup))
    }
}
