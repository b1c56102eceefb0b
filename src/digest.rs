//! Stable URL hashing for invoices.
//!
//! Invoices carry a `url_hash` that is the decimal form of a signed 64-bit
//! integer. It is derived from SHA-256 so the same URL hashes identically in
//! every process and on every run.

use sha2::{Digest, Sha256};

/// Hash a URL into the signed 64-bit integer carried by invoices.
///
/// The value is the first eight bytes of `SHA-256(url)` read big-endian.
pub fn url_hash_value(url: &str) -> i64 {
    let hash = Sha256::digest(url.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash[..8]);
    i64::from_be_bytes(prefix)
}

/// Hash a URL into the string form stored on an invoice.
pub fn url_hash(url: &str) -> String {
    url_hash_value(url).to_string()
}
