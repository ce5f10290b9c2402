//! Classification of remote responses into step outcomes
//!
//! The record endpoint answers with a predictable envelope. The lookup-user endpoint
//! does not: it has been seen to answer with no body, `{ "ok": true }`, an object with
//! `error` or `message`, or a bare string. Both are folded into [`StepOutcome`] here so
//! the orchestrator only deals with the four success/failure combinations.

use serde_json::{Map, Value};

use super::types::{FailureEntry, Identifier, RowResult, StepName, StepOutcome, SuccessEntry};
use crate::api::ApiResponse;

/// A lookup-user `message` containing this is a success notice, not an error
const SUCCESS_MARKER: &str = "thành công";

/// Case-insensitive markers of an error in a bare-string lookup-user body
const TEXT_ERROR_MARKERS: [&str; 2] = ["lỗi", "error"];

const UNKNOWN_ERROR: &str = "unknown error";

/// Shape of a lookup-user response body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LookupBody<'a> {
    /// No body, or a falsy one (`null`, `""`, `false`, `0`)
    Absent,
    Object(&'a Map<String, Value>),
    Text(&'a str),
    Other(&'a Value),
}

impl<'a> LookupBody<'a> {
    pub fn from_data(data: Option<&'a Value>) -> Self {
        match data {
            None => LookupBody::Absent,
            Some(value) if !truthy(value) => LookupBody::Absent,
            Some(Value::Object(map)) => LookupBody::Object(map),
            Some(Value::String(text)) => LookupBody::Text(text),
            Some(other) => LookupBody::Other(other),
        }
    }
}

/// Outcome of the create-record step
///
/// A 2xx response still fails when its body carries an `error` or `message` field.
pub fn classify_record_response(response: &ApiResponse) -> StepOutcome {
    if !response.success {
        return StepOutcome::failure(StepName::CreateRecord, failure_reason(response));
    }

    if let Some(Value::Object(body)) = &response.data {
        if let Some(reason) = first_signal(body, &["error", "message"]) {
            return StepOutcome::failure(StepName::CreateRecord, reason);
        }
    }

    StepOutcome::Success
}

/// Outcome of the create-lookup-user step
pub fn classify_lookup_response(response: &ApiResponse) -> StepOutcome {
    if !response.success {
        return StepOutcome::failure(StepName::CreateLookupUser, failure_reason(response));
    }

    match LookupBody::from_data(response.data.as_ref()) {
        LookupBody::Absent => StepOutcome::Success,
        LookupBody::Object(body) => classify_lookup_object(body),
        LookupBody::Text(text) => {
            let lower = text.to_lowercase();
            if TEXT_ERROR_MARKERS.iter().any(|marker| lower.contains(marker)) {
                StepOutcome::failure(StepName::CreateLookupUser, text)
            } else {
                StepOutcome::Success
            }
        }
        LookupBody::Other(_) => StepOutcome::Success,
    }
}

fn classify_lookup_object(body: &Map<String, Value>) -> StepOutcome {
    if body.get("ok").is_some_and(truthy) {
        return StepOutcome::Success;
    }

    if let Some(error) = body.get("error").filter(|v| truthy(v)) {
        return StepOutcome::failure(StepName::CreateLookupUser, value_text(error));
    }

    if let Some(message) = body.get("message").filter(|v| truthy(v)) {
        let message = value_text(message);
        if !message.contains(SUCCESS_MARKER) {
            return StepOutcome::failure(StepName::CreateLookupUser, message);
        }
    }

    StepOutcome::Success
}

/// Merge the two step outcomes of one identifier
///
/// The lookup-user step decides success. A create-record failure next to a successful
/// lookup user is only mentioned in the success message; when both fail, both failures
/// are kept in step order.
pub fn combine(identifier: &Identifier, record: StepOutcome, lookup: StepOutcome) -> RowResult {
    match (record, lookup) {
        (StepOutcome::Success, StepOutcome::Success) => RowResult::Success(SuccessEntry {
            identifier: identifier.clone(),
            message: "Lookup user created. Customer record created.".to_string(),
            record_failure: None,
        }),
        (StepOutcome::Failure { reason, .. }, StepOutcome::Success) => {
            RowResult::Success(SuccessEntry {
                identifier: identifier.clone(),
                message: format!("Lookup user created. Customer record failed: {}", reason),
                record_failure: Some(reason),
            })
        }
        (StepOutcome::Success, StepOutcome::Failure { step, reason }) => {
            RowResult::failed(FailureEntry::new(identifier.clone(), step, reason))
        }
        (
            StepOutcome::Failure {
                step: record_step,
                reason: record_reason,
            },
            StepOutcome::Failure {
                step: lookup_step,
                reason: lookup_reason,
            },
        ) => RowResult::Failed(vec![
            FailureEntry::new(identifier.clone(), record_step, record_reason),
            FailureEntry::new(identifier.clone(), lookup_step, lookup_reason),
        ]),
    }
}

/// Reason for a failed envelope: transport error, else the body, else a placeholder
fn failure_reason(response: &ApiResponse) -> String {
    if let Some(error) = response.error.as_deref().filter(|e| !e.is_empty()) {
        return error.to_string();
    }

    match &response.data {
        Some(data) if truthy(data) => value_text(data),
        _ => UNKNOWN_ERROR.to_string(),
    }
}

fn first_signal(body: &Map<String, Value>, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .filter_map(|field| body.get(*field))
        .find(|value| truthy(value))
        .map(value_text)
}

/// Loose truthiness as the service's clients interpret it
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
