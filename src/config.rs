//! Mock service configuration.

use crate::policy::enforcement::{default_sites, Site};
use crate::MockError;
use serde::Deserialize;
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

/// Default port the proxy under test expects the mock backend on.
pub const DEFAULT_PORT: u16 = 8000;

/// Configuration for the mock backend.
///
/// Defaults reproduce the fixture values the proxy's test-suite was written
/// against; override them only when a test needs different pricing or expiry.
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,

    /// How long a generated invoice stays payable.
    pub invoice_ttl: Duration,

    /// How long an issued access token stays valid.
    pub token_ttl: Duration,

    /// Invoice amount in XLM.
    pub amount_xlm: f64,

    /// Invoice amount in stroops.
    pub amount_stroops: u64,

    /// Per-page rate reported by the enforcement lookup.
    pub per_page_rate: f64,

    /// Seed table for the enforcement lookup.
    pub sites: Vec<Site>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            invoice_ttl: Duration::from_secs(15 * 60),
            token_ttl: Duration::from_secs(60 * 60),
            amount_xlm: 0.001,
            amount_stroops: 1000,
            per_page_rate: 0.001,
            sites: default_sites(),
        }
    }
}

/// On-disk TOML layout. Every key is optional and falls back to the default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    bind_addr: Option<SocketAddr>,
    invoice_ttl_secs: Option<u64>,
    token_ttl_secs: Option<u64>,
    amount_xlm: Option<f64>,
    amount_stroops: Option<u64>,
    per_page_rate: Option<f64>,
    sites: Option<Vec<Site>>,
}

impl MockConfig {
    /// Load configuration from a TOML file, filling unspecified keys with defaults.
    ///
    /// The result is validated before it is returned.
    pub fn from_file(path: &Path) -> Result<Self, MockError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            MockError::ConfigIO(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, MockError> {
        let file: ConfigFile = toml::from_str(raw)
            .map_err(|e| MockError::ConfigIO(format!("Invalid TOML: {}", e)))?;

        let defaults = Self::default();
        let config = Self {
            bind_addr: file.bind_addr.unwrap_or(defaults.bind_addr),
            invoice_ttl: file
                .invoice_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.invoice_ttl),
            token_ttl: file
                .token_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.token_ttl),
            amount_xlm: file.amount_xlm.unwrap_or(defaults.amount_xlm),
            amount_stroops: file.amount_stroops.unwrap_or(defaults.amount_stroops),
            per_page_rate: file.per_page_rate.unwrap_or(defaults.per_page_rate),
            sites: file.sites.unwrap_or(defaults.sites),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), MockError> {
        if self.invoice_ttl.is_zero() {
            return Err(MockError::ConfigError(
                "invoice_ttl must be positive".to_string(),
            ));
        }
        if self.token_ttl.is_zero() {
            return Err(MockError::ConfigError(
                "token_ttl must be positive".to_string(),
            ));
        }
        if !self.amount_xlm.is_finite() || self.amount_xlm < 0.0 {
            return Err(MockError::ConfigError(format!(
                "amount_xlm must be a non-negative number, got {}",
                self.amount_xlm
            )));
        }
        if !self.per_page_rate.is_finite() || self.per_page_rate < 0.0 {
            return Err(MockError::ConfigError(format!(
                "per_page_rate must be a non-negative number, got {}",
                self.per_page_rate
            )));
        }

        let mut seen = HashSet::new();
        for site in &self.sites {
            if site.site_id.is_empty() {
                return Err(MockError::ConfigError(
                    "site_id cannot be empty".to_string(),
                ));
            }
            if !seen.insert(site.site_id.as_str()) {
                return Err(MockError::ConfigError(format!(
                    "duplicate site_id: {}",
                    site.site_id
                )));
            }
        }
        Ok(())
    }
}
