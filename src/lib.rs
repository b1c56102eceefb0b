//! # paygate-mock
//!
//! **In-memory stand-in for the backend services a payment-gated crawling proxy talks to.**
//!
//! The proxy under test asks three services whether it may serve a page:
//! a site-enforcement lookup, an invoice issuer, and an access-token validator.
//! `paygate-mock` answers all three over HTTP from transient in-memory tables,
//! so the proxy's payment flow can be exercised end to end without payment
//! rails or token signing.
//!
//! ## Payment lifecycle
//!
//! 1. `POST /internal/generate_invoice` creates a `pending` invoice valid for 15 minutes.
//! 2. `POST /api/public/payments/submit` accepts any known invoice and issues a
//!    `mock_jwt_<uuid>` token valid for one hour.
//! 3. `POST /internal/validate_jwt` accepts the token only for the invoice's site and
//!    only before it expires.
//!
//! The invoice's `status` is never updated; token presence is the only record
//! that a payment was submitted.
//!
//! ## Quickstart
//!
//! ```no_run
//! use paygate_mock::{router, MockConfig, MockService};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let service = Arc::new(MockService::new(MockConfig::default())?);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, router(service)).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing against it
//!
//! Each [`MockService`] owns its own tables, so tests can build isolated
//! instances. With the `test-seams` feature, [`MockService::new_with_clock`]
//! and [`MockClock`] make token expiry deterministic.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Hashing
pub mod digest;

// Protocol layer
pub mod protocol;

// Policy layer
pub mod policy;

// Storage layer
pub mod store;

// Service (main public API)
pub mod service;

// HTTP layer
pub mod server;

// Re-exports for public API
pub use clock::{Clock, SystemClock};
pub use config::MockConfig;
pub use errors::MockError;
pub use protocol::models::{Invoice, InvoiceStatus, TokenRecord};
pub use server::routes::{router, serve};
pub use service::MockService;

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
