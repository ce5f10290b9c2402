//! Request payloads and the common response envelope

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::constants::{EDIT_MODE_CREATE, FIRST_DETAIL_INDEX};
use crate::config::{OrganizationConfig, RecordConfig};

/// Outcome of one remote call, as seen by the pipeline
///
/// Transport failures are folded into this shape (`success = false`, `error` set) so the
/// pipeline never has to distinguish network errors from rejected requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// HTTP 2xx
    pub success: bool,
    /// Parsed body: JSON when it parses, otherwise the raw text
    pub data: Option<Value>,
    /// Transport-level error message
    pub error: Option<String>,
}

impl ApiResponse {
    #[cfg(test)]
    pub fn ok(data: Option<Value>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn transport_failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Build from a status flag and a raw response body
    pub fn from_body(success: bool, body: &str) -> Self {
        let trimmed = body.trim();
        let data = if trimmed.is_empty() {
            None
        } else {
            Some(
                serde_json::from_str(trimmed)
                    .unwrap_or_else(|_| Value::String(trimmed.to_string())),
            )
        };

        Self {
            success,
            data,
            error: None,
        }
    }
}

/// Body of `POST System/Save` creating a customer record
#[derive(Debug, Clone, Serialize)]
pub struct CustomerRecordRequest {
    #[serde(rename = "windowid")]
    pub window_id: String,
    #[serde(rename = "editmode")]
    pub edit_mode: u8,
    pub data: Vec<CustomerRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerRecord {
    #[serde(rename = "ma_dvcs")]
    pub org_unit: String,
    #[serde(rename = "ma_dt")]
    pub code: String,
    #[serde(rename = "ms_thue")]
    pub tax_code: String,
    #[serde(rename = "dt_me_id")]
    pub parent_id: String,
    #[serde(rename = "ten_dt")]
    pub name: String,
    pub email: String,
    #[serde(rename = "dai_dien")]
    pub representative: String,
    #[serde(rename = "dia_chi")]
    pub address: String,
    #[serde(rename = "dien_thoai")]
    pub phone: String,
    #[serde(rename = "dien_giai")]
    pub description: String,
    pub fax: String,
    pub details: Vec<RecordTab>,
}

/// Child tab rows saved together with the record
#[derive(Debug, Clone, Serialize)]
pub struct RecordTab {
    pub tab_id: String,
    pub tab_table: String,
    pub data: Vec<BankAccountRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BankAccountRow {
    /// Client-side row tag, must differ between calls
    pub id: i64,
    #[serde(rename = "ma_dvcs")]
    pub org_unit: String,
    pub idx: u32,
    #[serde(rename = "so_tk")]
    pub account_number: String,
    #[serde(rename = "dmngh_id")]
    pub bank_id: Option<String>,
    #[serde(rename = "dmdt_id")]
    pub partner_id: Option<String>,
}

impl CustomerRecordRequest {
    /// The identifier doubles as the record's code, display name and address
    pub fn new(
        identifier: &str,
        organization: &OrganizationConfig,
        record: &RecordConfig,
        tag: i64,
    ) -> Self {
        let bank_account = BankAccountRow {
            id: tag,
            org_unit: organization.org_unit.clone(),
            idx: FIRST_DETAIL_INDEX,
            account_number: String::new(),
            bank_id: None,
            partner_id: None,
        };

        let customer = CustomerRecord {
            org_unit: organization.org_unit.clone(),
            code: identifier.to_string(),
            tax_code: String::new(),
            parent_id: String::new(),
            name: identifier.to_string(),
            email: String::new(),
            representative: String::new(),
            address: identifier.to_string(),
            phone: String::new(),
            description: String::new(),
            fax: String::new(),
            details: vec![RecordTab {
                tab_id: record.tab_id.clone(),
                tab_table: record.tab_table.clone(),
                data: vec![bank_account],
            }],
        };

        Self {
            window_id: record.window_id.clone(),
            edit_mode: EDIT_MODE_CREATE,
            data: vec![customer],
        }
    }
}

/// Body of `POST Invoice/CreateUser_tracuu`
///
/// The identifier is used as code, username and initial password.
#[derive(Debug, Clone, Serialize)]
pub struct LookupUserRequest {
    #[serde(rename = "mst")]
    pub tax_id: String,
    #[serde(rename = "ma_dt")]
    pub code: String,
    pub username: String,
    pub password: String,
    pub email: String,
}

impl LookupUserRequest {
    pub fn new(identifier: &str, organization: &OrganizationConfig) -> Self {
        Self {
            tax_id: organization.tax_id.clone(),
            code: identifier.to_string(),
            username: identifier.to_string(),
            password: identifier.to_string(),
            email: String::new(),
        }
    }
}
