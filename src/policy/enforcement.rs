//! Site enforcement lookup.
//!
//! A site either requires payment before it can be crawled or it does not.
//! The table is seeded once at startup and never mutated; any site that was
//! not seeded is treated as unenforced.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A seeded site and whether payment is enforced for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Site identifier, usually the host name.
    pub site_id: String,

    /// Whether the proxy must collect payment before serving this site.
    pub enforcement_enabled: bool,
}

impl Site {
    fn new(site_id: &str, enforcement_enabled: bool) -> Self {
        Self {
            site_id: site_id.to_string(),
            enforcement_enabled,
        }
    }
}

/// The fixture sites the proxy's test-suite expects.
pub fn default_sites() -> Vec<Site> {
    vec![
        Site::new("test-site.com", true),
        Site::new("localhost", true),
        Site::new("disabled-site.com", false),
    ]
}

/// Read-only enforcement table keyed by exact `site_id`.
#[derive(Debug, Clone, Default)]
pub struct SiteTable {
    sites: HashMap<String, bool>,
}

impl SiteTable {
    /// Build the table from seed entries.
    pub fn from_seed(sites: &[Site]) -> Self {
        Self {
            sites: sites
                .iter()
                .map(|s| (s.site_id.clone(), s.enforcement_enabled))
                .collect(),
        }
    }

    /// Whether payment is enforced for `site_id`. Unknown sites are not enforced.
    pub fn is_enforced(&self, site_id: &str) -> bool {
        self.sites.get(site_id).copied().unwrap_or(false)
    }

    /// Number of seeded sites.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Whether the table has no seeded sites.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
