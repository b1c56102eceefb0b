//! In-memory payment and token tables.
//!
//! Both tables keep insertion order so the debug dump lists records in the
//! order they were created. Lock order is always `payments` then `tokens`.

use crate::protocol::models::{DebugSnapshot, Invoice, TokenRecord};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::RwLock;

/// Transient state owned by one mock service instance.
#[derive(Debug, Default)]
pub struct MemoryStore {
    payments: RwLock<IndexMap<String, Invoice>>,
    tokens: RwLock<IndexMap<String, TokenRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an invoice under its `payment_id`.
    pub fn insert_invoice(&self, invoice: Invoice) {
        self.payments
            .write()
            .insert(invoice.payment_id.clone(), invoice);
    }

    /// Look up an invoice by exact `payment_id`.
    pub fn invoice(&self, payment_id: &str) -> Option<Invoice> {
        self.payments.read().get(payment_id).cloned()
    }

    /// Record a token for an existing payment.
    ///
    /// The token inherits the invoice's `site_id`. Returns `None` without
    /// touching the token table when the payment is unknown.
    pub fn issue_token(
        &self,
        payment_id: &str,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> Option<TokenRecord> {
        let payments = self.payments.read();
        let invoice = payments.get(payment_id)?;

        let record = TokenRecord {
            payment_id: invoice.payment_id.clone(),
            site_id: invoice.site_id.clone(),
            expires_at,
        };
        self.tokens.write().insert(token, record.clone());
        Some(record)
    }

    /// Look up a token record by exact token string.
    pub fn token(&self, token: &str) -> Option<TokenRecord> {
        self.tokens.read().get(token).cloned()
    }

    /// Copy out both tables.
    pub fn snapshot(&self) -> DebugSnapshot {
        let payments = self.payments.read();
        let tokens = self.tokens.read();
        DebugSnapshot {
            payments: payments.values().cloned().collect(),
            jwts: tokens.clone(),
        }
    }

    /// Empty both tables under both write locks.
    ///
    /// Returns how many invoices and tokens were dropped.
    pub fn clear(&self) -> (usize, usize) {
        let mut payments = self.payments.write();
        let mut tokens = self.tokens.write();
        let dropped = (payments.len(), tokens.len());
        payments.clear();
        tokens.clear();
        dropped
    }

    /// Number of stored invoices.
    #[cfg(test)]
    pub fn payment_count(&self) -> usize {
        self.payments.read().len()
    }

    /// Number of issued tokens.
    #[cfg(test)]
    pub fn token_count(&self) -> usize {
        self.tokens.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::models::InvoiceStatus;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn invoice(payment_id: &str, site_id: &str) -> Invoice {
        Invoice {
            payment_id: payment_id.to_string(),
            site_id: site_id.to_string(),
            url: "http://x".to_string(),
            url_hash: "0".to_string(),
            amount_xlm: 0.001,
            amount_stroops: 1000,
            expires_at: at("2025-01-15T12:15:00Z"),
            status: InvoiceStatus::Pending,
            user_agent: "UA".to_string(),
            ip_address: "1.2.3.4".to_string(),
        }
    }

    #[test]
    fn test_invoice_roundtrip() {
        let store = MemoryStore::new();
        store.insert_invoice(invoice("p1", "test-site.com"));
        assert_eq!(store.invoice("p1").unwrap().site_id, "test-site.com");
        assert!(store.invoice("p2").is_none());
    }

    #[test]
    fn test_issue_token_copies_site() {
        let store = MemoryStore::new();
        store.insert_invoice(invoice("p1", "test-site.com"));

        let record = store
            .issue_token("p1", "mock_jwt_a".to_string(), at("2025-01-15T13:00:00Z"))
            .unwrap();
        assert_eq!(record.site_id, "test-site.com");
        assert_eq!(store.token("mock_jwt_a"), Some(record));
    }

    #[test]
    fn test_issue_token_unknown_payment() {
        let store = MemoryStore::new();
        let record = store.issue_token("missing", "mock_jwt_a".to_string(), Utc::now());
        assert!(record.is_none());
        assert_eq!(store.token_count(), 0);
    }

    #[test]
    fn test_repeated_issue_keeps_every_token() {
        let store = MemoryStore::new();
        store.insert_invoice(invoice("p1", "test-site.com"));
        let expiry = at("2025-01-15T13:00:00Z");
        store.issue_token("p1", "mock_jwt_a".to_string(), expiry);
        store.issue_token("p1", "mock_jwt_b".to_string(), expiry);
        assert_eq!(store.token_count(), 2);
    }

    #[test]
    fn test_snapshot_preserves_insertion_order() {
        let store = MemoryStore::new();
        for id in ["p3", "p1", "p2"] {
            store.insert_invoice(invoice(id, "localhost"));
        }
        let ids: Vec<_> = store
            .snapshot()
            .payments
            .into_iter()
            .map(|p| p.payment_id)
            .collect();
        assert_eq!(ids, vec!["p3", "p1", "p2"]);
    }

    #[test]
    fn test_clear_empties_both_tables() {
        let store = MemoryStore::new();
        store.insert_invoice(invoice("p1", "test-site.com"));
        store.issue_token("p1", "mock_jwt_a".to_string(), Utc::now());
        store.issue_token("p1", "mock_jwt_b".to_string(), Utc::now());

        assert_eq!(store.clear(), (1, 2));
        assert_eq!(store.clear(), (0, 0));
        assert_eq!(store.payment_count(), 0);
        assert_eq!(store.token_count(), 0);
        assert!(store.token("mock_jwt_a").is_none());
    }
}
