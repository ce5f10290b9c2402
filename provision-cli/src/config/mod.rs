//! Configuration
//!
//! Loaded from a TOML file in the user's config directory, then overridden from the
//! environment (a `.env` file in the working directory is honoured by `main`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::pipeline::Locale;

const APP_DIR: &str = "provision-cli";
const CONFIG_FILE: &str = "config.toml";

/// Environment variables that override file settings
pub mod env_vars {
    pub const BASE_URL: &str = "PROVISION_BASE_URL";
    pub const AUTH_TOKEN: &str = "PROVISION_AUTH_TOKEN";
    pub const ORG_UNIT: &str = "PROVISION_ORG_UNIT";
    pub const TAX_ID: &str = "PROVISION_TAX_ID";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub organization: OrganizationConfig,
    pub record: RecordConfig,
    pub report: ReportConfig,
}

/// Remote service endpoint and static credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Service root, e.g. `https://<tenant>.minvoice.com.vn/api`
    pub base_url: String,
    pub auth_token: String,
    /// The service expects the non-standard `Bear` scheme
    pub auth_scheme: String,
    pub accept_language: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            auth_token: String::new(),
            auth_scheme: "Bear".to_string(),
            accept_language: "vi-VN,vi;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationConfig {
    /// Organization unit code ("mã đơn vị") stamped on every customer record
    pub org_unit: String,
    /// Tax id of the organization that owns the lookup users
    pub tax_id: String,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            org_unit: "VP".to_string(),
            tax_id: String::new(),
        }
    }
}

/// Form identifiers the customer-record save endpoint expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordConfig {
    pub window_id: String,
    pub tab_id: String,
    pub tab_table: String,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            window_id: "WIN00009".to_string(),
            tab_id: "TAB00014".to_string(),
            tab_table: "dmngh".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub locale: Locale,
}

impl Config {
    /// Default location: `<config dir>/provision-cli/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Could not determine the user config directory")?;
        Ok(dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Resolve `path` or the default location
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::default_path(),
        }
    }

    /// Load the file (if present) and apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(path)?;
        let mut config = Self::load_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a config file; a missing file yields the defaults
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Overwrite settings from `lookup` (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets = [
            (env_vars::BASE_URL, &mut self.api.base_url),
            (env_vars::AUTH_TOKEN, &mut self.api.auth_token),
            (env_vars::ORG_UNIT, &mut self.organization.org_unit),
            (env_vars::TAX_ID, &mut self.organization.tax_id),
        ];

        for (key, target) in targets {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                debug!("Config override from {}", key);
                *target = value.trim().to_string();
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Check the settings a provisioning run cannot do without
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            bail!(
                "api.base_url is not configured (set it in the config file or {})",
                env_vars::BASE_URL
            );
        }
        if self.api.auth_token.trim().is_empty() {
            bail!(
                "api.auth_token is not configured (set it in the config file or {})",
                env_vars::AUTH_TOKEN
            );
        }
        if self.organization.tax_id.trim().is_empty() {
            bail!(
                "organization.tax_id is not configured (set it in the config file or {})",
                env_vars::TAX_ID
            );
        }
        if self.organization.org_unit.trim().is_empty() {
            bail!("organization.org_unit must not be empty");
        }
        Ok(())
    }

    /// Copy suitable for display, with the token masked
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.api.auth_token = mask(&self.api.auth_token);
        copy
    }
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "*".repeat(secret.chars().count())
    } else {
        format!("{}****", visible)
    }
}
