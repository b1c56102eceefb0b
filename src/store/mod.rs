//! Transient storage for invoices and tokens.

pub mod tables;
