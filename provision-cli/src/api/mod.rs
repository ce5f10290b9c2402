//! Remote provisioning API
//!
//! Two independent operations are exposed for each identifier: creating the customer
//! record and creating the lookup-portal user. Both return the same response envelope.

pub mod client;
pub mod constants;
pub mod models;

pub use client::ProvisioningClient;
pub use models::ApiResponse;

use anyhow::Result;
use async_trait::async_trait;

/// The two remote operations the pipeline drives
///
/// Implementations report transport failures inside the returned [`ApiResponse`]. An
/// `Err` means the call could not be made at all and is recorded against the row as a
/// processing failure.
#[async_trait]
pub trait ProvisioningApi: Send + Sync {
    async fn create_record(&self, identifier: &str) -> Result<ApiResponse>;

    async fn create_lookup_user(&self, identifier: &str) -> Result<ApiResponse>;
}
