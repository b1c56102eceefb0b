//! Wire protocol of the mocked backend.

pub mod models;
