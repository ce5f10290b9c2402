//! HTTP client for the provisioning endpoints

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Url;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, HeaderMap, HeaderValue, ORIGIN, REFERER,
};
use serde::Serialize;

use super::ProvisioningApi;
use super::constants::{ACCEPT_ALL, CREATE_LOOKUP_USER_PATH, SAVE_RECORD_PATH};
use super::models::{ApiResponse, CustomerRecordRequest, LookupUserRequest};
use crate::config::{Config, OrganizationConfig, RecordConfig};

pub struct ProvisioningClient {
    http: reqwest::Client,
    base_url: String,
    organization: OrganizationConfig,
    record: RecordConfig,
    tags: UniqueTag,
}

impl ProvisioningClient {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config.api.base_url.trim().trim_end_matches('/').to_string();
        let url = Url::parse(&base_url)
            .with_context(|| format!("Invalid api.base_url: {}", base_url))?;

        let headers = default_headers(config, &url)?;
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url,
            organization: config.organization.clone(),
            record: config.record.clone(),
            tags: UniqueTag::default(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// POST a JSON body. Network and body-read errors become a failed response; only a
    /// request that cannot be built is returned as `Err`.
    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        let url = self.endpoint(path);
        debug!("POST {}", url);

        let response = match self.http.post(&url).json(body).send().await {
            Ok(response) => response,
            Err(e) if e.is_builder() => {
                return Err(e).with_context(|| format!("Failed to build request to {}", url));
            }
            Err(e) => {
                warn!("POST {} failed: {}", url, e);
                return Ok(ApiResponse::transport_failure(e.to_string()));
            }
        };

        let status = response.status();
        match response.text().await {
            Ok(text) => {
                debug!("POST {} -> {} ({} bytes)", url, status, text.len());
                Ok(ApiResponse::from_body(status.is_success(), &text))
            }
            Err(e) => {
                warn!("Failed to read response body from {}: {}", url, e);
                Ok(ApiResponse::transport_failure(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl ProvisioningApi for ProvisioningClient {
    async fn create_record(&self, identifier: &str) -> Result<ApiResponse> {
        let request = CustomerRecordRequest::new(
            identifier,
            &self.organization,
            &self.record,
            self.tags.next(),
        );
        self.post(SAVE_RECORD_PATH, &request).await
    }

    async fn create_lookup_user(&self, identifier: &str) -> Result<ApiResponse> {
        let request = LookupUserRequest::new(identifier, &self.organization);
        self.post(CREATE_LOOKUP_USER_PATH, &request).await
    }
}

fn default_headers(config: &Config, base_url: &Url) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    let auth = format!("{} {}", config.api.auth_scheme, config.api.auth_token);
    let mut auth = HeaderValue::from_str(&auth).context("api.auth_token contains invalid characters")?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_ALL));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_str(&config.api.accept_language)
            .context("api.accept_language is not a valid header value")?,
    );

    let origin = base_url.origin().ascii_serialization();
    if origin != "null" {
        headers.insert(ORIGIN, HeaderValue::from_str(&origin)?);
        headers.insert(REFERER, HeaderValue::from_str(&format!("{}/", origin))?);
    }

    Ok(headers)
}

/// Millisecond timestamps, bumped when two calls land in the same millisecond
#[derive(Debug, Default)]
struct UniqueTag {
    last: AtomicI64,
}

impl UniqueTag {
    fn next(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self
                .last
                .compare_exchange(last, candidate, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let mut config = Config::default();
        config.api.base_url = "https://tenant.example.com/api/".into();
        config.api.auth_token = "abc+def=".into();
        config.organization.tax_id = "0102030405".into();
        config
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = ProvisioningClient::new(&config()).unwrap();
        assert_eq!(
            client.endpoint(SAVE_RECORD_PATH),
            "https://tenant.example.com/api/System/Save"
        );
    }

    #[test]
    fn test_default_headers() {
        let config = config();
        let url = Url::parse("https://tenant.example.com/api").unwrap();
        let headers = default_headers(&config, &url).unwrap();

        assert_eq!(headers[AUTHORIZATION], "Bear abc+def=");
        assert_eq!(headers[ORIGIN], "https://tenant.example.com");
        assert_eq!(headers[REFERER], "https://tenant.example.com/");
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = config();
        config.api.base_url = "not a url".into();
        assert!(ProvisioningClient::new(&config).is_err());
    }

    #[test]
    fn test_unique_tags_increase() {
        let tags = UniqueTag::default();
        let first = tags.next();
        let second = tags.next();
        let third = tags.next();
        assert!(second > first);
        assert!(third > second);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_failed_response() {
        let mut config = config();
        // Reserved port on loopback, nothing listens there
        config.api.base_url = "http://127.0.0.1:9/api".into();
        config.api.timeout_secs = 5;
        let client = ProvisioningClient::new(&config).unwrap();

        let response = client.create_lookup_user("KH01").await.unwrap();
        assert!(!response.success);
    }
}
