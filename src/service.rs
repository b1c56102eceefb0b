//! Mock Service - the operations behind every endpoint.
//!
//! `MockService` owns the seeded site table, the transient payment and token
//! tables, and the clock every expiry is computed from:
//! - Enforcement lookups against the seed table
//! - Invoice generation and payment status
//! - Payment submission, which issues an access token
//! - Token validation against site and expiry

use crate::clock::{Clock, SystemClock};
use crate::config::MockConfig;
use crate::digest::url_hash;
use crate::policy::enforcement::SiteTable;
use crate::protocol::models::{
    DebugSnapshot, EnforcementResponse, HealthResponse, Invoice, InvoiceRequest, InvoiceStatus,
    Receipt, ResetResponse, SiteDetails, SubmitRequest, ValidateRequest, ValidationResponse,
};
use crate::store::tables::MemoryStore;
use crate::MockError;
use std::sync::Arc;
use uuid::Uuid;

/// Service name reported by `GET /health`.
pub const BACKEND_SERVICE_NAME: &str = "mock-backend";

/// Service name reported by `GET /internal/health`.
pub const INTERNAL_SERVICE_NAME: &str = "internal-api";

/// Prefix of every issued access token.
pub const TOKEN_PREFIX: &str = "mock_jwt_";

/// Prefix of generated transaction hashes when the caller supplies none.
pub const TX_HASH_PREFIX: &str = "mock_tx_";

/// The mocked enforcement, invoicing and token-validation backend.
///
/// Create one instance per test (or per server) and share it behind an `Arc`.
/// Instances do not share state.
pub struct MockService {
    config: MockConfig,
    clock: Arc<dyn Clock>,
    sites: SiteTable,
    store: MemoryStore,
    invoice_ttl: chrono::Duration,
    token_ttl: chrono::Duration,
}

impl MockService {
    /// Create a new mock service with the given configuration.
    ///
    /// Uses the system clock for time operations.
    ///
    /// # Errors
    /// Returns `ConfigError` if the configuration fails validation or a TTL
    /// does not fit a calendar duration.
    pub fn new(config: MockConfig) -> Result<Self, MockError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a mock service with a custom clock (for testing).
    #[cfg(any(test, feature = "test-seams"))]
    pub fn new_with_clock(config: MockConfig, clock: Arc<dyn Clock>) -> Result<Self, MockError> {
        Self::with_clock(config, clock)
    }

    fn with_clock(config: MockConfig, clock: Arc<dyn Clock>) -> Result<Self, MockError> {
        config.validate()?;

        let invoice_ttl = chrono::Duration::from_std(config.invoice_ttl)
            .map_err(|e| MockError::ConfigError(format!("invoice_ttl out of range: {}", e)))?;
        let token_ttl = chrono::Duration::from_std(config.token_ttl)
            .map_err(|e| MockError::ConfigError(format!("token_ttl out of range: {}", e)))?;
        let sites = SiteTable::from_seed(&config.sites);
        if sites.is_empty() {
            tracing::warn!("No sites seeded, enforcement is disabled everywhere");
        }

        Ok(Self {
            config,
            clock,
            sites,
            store: MemoryStore::new(),
            invoice_ttl,
            token_ttl,
        })
    }

    /// Liveness of the public-facing backend.
    pub fn health(&self) -> HealthResponse {
        HealthResponse::healthy(BACKEND_SERVICE_NAME)
    }

    /// Liveness of the internal API.
    pub fn internal_health(&self) -> HealthResponse {
        HealthResponse::healthy(INTERNAL_SERVICE_NAME)
    }

    /// Report whether payment is enforced for `site_id`.
    ///
    /// Never fails; unseeded sites report `enforcement_enabled: false`.
    pub fn check_enforcement(&self, site_id: &str) -> EnforcementResponse {
        EnforcementResponse {
            enforcement_enabled: self.sites.is_enforced(site_id),
            site_details: SiteDetails {
                site_id: site_id.to_string(),
                per_page_rate: self.config.per_page_rate,
            },
        }
    }

    /// Create and store a pending invoice.
    ///
    /// # Errors
    /// - `MissingField` - one of `site_id`, `url`, `user_agent`, `ip_address` is absent
    pub fn generate_invoice(&self, request: InvoiceRequest) -> Result<Invoice, MockError> {
        let fields = request.require_fields()?;

        let invoice = Invoice {
            payment_id: Uuid::new_v4().to_string(),
            url_hash: url_hash(&fields.url),
            site_id: fields.site_id,
            url: fields.url,
            amount_xlm: self.config.amount_xlm,
            amount_stroops: self.config.amount_stroops,
            expires_at: self.clock.now_utc() + self.invoice_ttl,
            status: InvoiceStatus::Pending,
            user_agent: fields.user_agent,
            ip_address: fields.ip_address,
        };

        tracing::info!(
            payment_id = %invoice.payment_id,
            site_id = %invoice.site_id,
            url = %invoice.url,
            "Invoice generated"
        );

        self.store.insert_invoice(invoice.clone());
        Ok(invoice)
    }

    /// Check a presented token against the token table.
    ///
    /// Failure is reported in the body, never as an error: a missing token,
    /// a site mismatch and an expired token all yield the same rejection.
    pub fn validate_token(&self, request: ValidateRequest) -> ValidationResponse {
        let (Some(token), Some(site_id)) = (request.token, request.site_id) else {
            tracing::debug!("Token validation request missing token or site_id");
            return ValidationResponse::rejected();
        };

        let now = self.clock.now_utc();
        match self.store.token(&token) {
            Some(record) if record.is_valid_for(&site_id, now) => {
                ValidationResponse::accepted(&record)
            }
            Some(record) => {
                tracing::debug!(
                    payment_id = %record.payment_id,
                    site_id = %site_id,
                    token_site_id = %record.site_id,
                    expires_at = %record.expires_at,
                    "Token rejected"
                );
                ValidationResponse::rejected()
            }
            None => {
                tracing::debug!(site_id = %site_id, "Unknown token presented");
                ValidationResponse::rejected()
            }
        }
    }

    /// Accept a payment for a known invoice and issue an access token.
    ///
    /// Every call issues a fresh token, even for a payment that already has one.
    /// The invoice itself stays `pending`.
    ///
    /// # Errors
    /// - `PaymentNotFound` - `payment_id` is absent or unknown
    pub fn submit_payment(&self, request: SubmitRequest) -> Result<Receipt, MockError> {
        let Some(payment_id) = request.payment_id else {
            tracing::warn!("Payment submitted without payment_id");
            return Err(MockError::PaymentNotFound);
        };

        let access_token = format!("{}{}", TOKEN_PREFIX, Uuid::new_v4());
        let expires_at = self.clock.now_utc() + self.token_ttl;

        if self
            .store
            .issue_token(&payment_id, access_token.clone(), expires_at)
            .is_none()
        {
            tracing::warn!(payment_id = %payment_id, "Payment submitted for unknown invoice");
            return Err(MockError::PaymentNotFound);
        }

        let tx_hash = request
            .stellar_tx_hash
            .unwrap_or_else(|| format!("{}{}", TX_HASH_PREFIX, Uuid::new_v4()));

        tracing::info!(
            payment_id = %payment_id,
            tx_hash = %tx_hash,
            expires_at = %expires_at,
            "Access token issued"
        );

        Ok(Receipt {
            access_token,
            expires_at,
            payment_id,
            tx_hash,
        })
    }

    /// Look up an invoice by id.
    ///
    /// # Errors
    /// - `PaymentNotFound` - no invoice with this id
    pub fn payment_status(&self, payment_id: &str) -> Result<Invoice, MockError> {
        self.store
            .invoice(payment_id)
            .ok_or(MockError::PaymentNotFound)
    }

    /// Dump every invoice and token.
    pub fn snapshot(&self) -> DebugSnapshot {
        self.store.snapshot()
    }

    /// Drop every invoice and token.
    pub fn reset(&self) -> ResetResponse {
        let (payments, tokens) = self.store.clear();
        tracing::info!(payments, tokens, "Mock data reset");
        ResetResponse {
            message: "Mock data reset".to_string(),
        }
    }

    /// Number of sites in the enforcement table.
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Get the current configuration.
    pub fn config(&self) -> &MockConfig {
        &self.config
    }
}
