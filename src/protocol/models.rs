//! Request and response bodies exchanged with the proxy under test.

use crate::MockError;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Error text returned for any token that fails validation.
pub const INVALID_TOKEN_ERROR: &str = "Invalid or expired token";

/// Error text returned for unknown payment ids.
pub const PAYMENT_NOT_FOUND_ERROR: &str = "Payment not found";

/// Lifecycle status of an invoice.
///
/// Only `Pending` is ever assigned: submitting a payment issues a token but
/// leaves the invoice untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Awaiting payment.
    Pending,
}

/// A requested payment for crawling one URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique payment id (UUID v4).
    pub payment_id: String,
    /// Site the URL belongs to.
    pub site_id: String,
    /// URL the crawler asked for.
    pub url: String,
    /// Stable hash of `url`, see [`crate::digest::url_hash`].
    pub url_hash: String,
    /// Price in XLM.
    pub amount_xlm: f64,
    /// Price in stroops.
    pub amount_stroops: u64,
    /// When the invoice stops being payable.
    pub expires_at: DateTime<Utc>,
    /// Always [`InvoiceStatus::Pending`].
    pub status: InvoiceStatus,
    /// User-Agent of the crawler that triggered the invoice.
    pub user_agent: String,
    /// IP address of the crawler that triggered the invoice.
    pub ip_address: String,
}

/// An issued access token, keyed by the token string in the token table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Payment the token was issued for.
    pub payment_id: String,
    /// Site copied from the invoice; validation must present the same site.
    pub site_id: String,
    /// When the token stops being valid.
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Whether this token may be used for `site_id` at instant `now`.
    ///
    /// Expiry is strict: a token whose `expires_at` equals `now` is already invalid.
    pub fn is_valid_for(&self, site_id: &str, now: DateTime<Utc>) -> bool {
        self.site_id == site_id && self.expires_at > now
    }
}

/// Body of `POST /internal/generate_invoice`.
///
/// Fields are optional on the wire so a missing one can be reported by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceRequest {
    /// Site the URL belongs to.
    pub site_id: Option<String>,
    /// URL the crawler asked for.
    pub url: Option<String>,
    /// User-Agent of the crawler.
    pub user_agent: Option<String>,
    /// IP address of the crawler.
    pub ip_address: Option<String>,
}

/// Invoice request with every required field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    /// Site the URL belongs to.
    pub site_id: String,
    /// URL the crawler asked for.
    pub url: String,
    /// User-Agent of the crawler.
    pub user_agent: String,
    /// IP address of the crawler.
    pub ip_address: String,
}

impl InvoiceRequest {
    /// Check required fields in order, failing on the first absent one.
    pub fn require_fields(self) -> Result<NewInvoice, MockError> {
        fn required(value: Option<String>, field: &'static str) -> Result<String, MockError> {
            value.ok_or(MockError::MissingField { field })
        }

        Ok(NewInvoice {
            site_id: required(self.site_id, "site_id")?,
            url: required(self.url, "url")?,
            user_agent: required(self.user_agent, "user_agent")?,
            ip_address: required(self.ip_address, "ip_address")?,
        })
    }
}

/// Read an optional string field, mapping any non-string value to `None`.
///
/// Lookup endpoints answer a wrong-typed key the same way as an unknown one,
/// so only an unparsable body is a request error there.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

/// Body of `POST /internal/validate_jwt`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidateRequest {
    /// Token presented by the proxy.
    #[serde(default, deserialize_with = "lenient_string")]
    pub token: Option<String>,
    /// Site the token is presented for.
    #[serde(default, deserialize_with = "lenient_string")]
    pub site_id: Option<String>,
}

/// Body of `POST /api/public/payments/submit`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Invoice being paid.
    #[serde(default, deserialize_with = "lenient_string")]
    pub payment_id: Option<String>,
    /// Caller-supplied transaction hash; one is generated when absent.
    #[serde(default, deserialize_with = "lenient_string")]
    pub stellar_tx_hash: Option<String>,
}

/// Liveness payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"healthy"`.
    pub status: String,
    /// Name of the mocked service.
    pub service: String,
}

impl HealthResponse {
    /// Healthy payload naming `service`.
    pub fn healthy(service: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            service: service.to_string(),
        }
    }
}

/// Fixed-shape site block of the enforcement response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteDetails {
    /// Site that was looked up.
    pub site_id: String,
    /// Price per crawled page in XLM.
    pub per_page_rate: f64,
}

/// Response of `GET /internal/enforcement/{site_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnforcementResponse {
    /// Whether payment is required for the site.
    pub enforcement_enabled: bool,
    /// Site id and pricing.
    pub site_details: SiteDetails,
}

/// Response of `POST /internal/validate_jwt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResponse {
    /// Whether the token was accepted.
    pub valid: bool,
    /// Payment the token was issued for, when accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    /// Site the token is bound to, when accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    /// Token expiry, when accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Rejection reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResponse {
    /// Accepted token.
    pub fn accepted(record: &TokenRecord) -> Self {
        Self {
            valid: true,
            payment_id: Some(record.payment_id.clone()),
            site_id: Some(record.site_id.clone()),
            expires_at: Some(record.expires_at),
            error: None,
        }
    }

    /// Rejected token. Unknown, mismatched and expired tokens are indistinguishable.
    pub fn rejected() -> Self {
        Self {
            valid: false,
            payment_id: None,
            site_id: None,
            expires_at: None,
            error: Some(INVALID_TOKEN_ERROR.to_string()),
        }
    }
}

/// Token issued for a submitted payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Newly minted token.
    pub access_token: String,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
    /// Payment the token was issued for.
    pub payment_id: String,
    /// Supplied or generated transaction hash.
    pub tx_hash: String,
}

/// Response of `POST /api/public/payments/submit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Whether the payment was accepted.
    pub verified: bool,
    /// Issued token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Token expiry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Payment the token was issued for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    /// Transaction hash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    /// Rejection reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmitResponse {
    /// Payment accepted and token issued.
    pub fn verified(receipt: Receipt) -> Self {
        Self {
            verified: true,
            access_token: Some(receipt.access_token),
            expires_at: Some(receipt.expires_at),
            payment_id: Some(receipt.payment_id),
            tx_hash: Some(receipt.tx_hash),
            error: None,
        }
    }

    /// Payment id unknown.
    pub fn not_found() -> Self {
        Self {
            verified: false,
            access_token: None,
            expires_at: None,
            payment_id: None,
            tx_hash: None,
            error: Some(PAYMENT_NOT_FOUND_ERROR.to_string()),
        }
    }
}

/// Response of `GET /api/public/payments/status/{payment_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Whether the invoice exists.
    pub found: bool,
    /// The stored invoice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<Invoice>,
    /// Lookup failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusResponse {
    /// Invoice found.
    pub fn found(payment: Invoice) -> Self {
        Self {
            found: true,
            payment: Some(payment),
            error: None,
        }
    }

    /// Invoice id unknown.
    pub fn not_found() -> Self {
        Self {
            found: false,
            payment: None,
            error: Some(PAYMENT_NOT_FOUND_ERROR.to_string()),
        }
    }
}

/// Response of `GET /debug/payments`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugSnapshot {
    /// Every invoice, in creation order.
    pub payments: Vec<Invoice>,
    /// Every issued token, keyed by token string, in issue order.
    pub jwts: IndexMap<String, TokenRecord>,
}

/// Response of `POST /debug/reset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetResponse {
    /// Confirmation text.
    pub message: String,
}
