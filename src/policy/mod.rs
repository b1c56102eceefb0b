//! Access policy for crawled sites.

pub mod enforcement;
