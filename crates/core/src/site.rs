//! Site bindings and process-wide site settings.

use serde::Serialize;

use crate::types::DbId;

pub const DEFAULT_HOSTNAME: &str = "crimea-yurist.ru";
pub const DEFAULT_SITE_NAME: &str = "Crimea Yurist";
pub const DEFAULT_PORT: i32 = 80;

/// Base URL used for absolute links when running in debug mode.
pub const DEBUG_BASE_URL: &str = "http://127.0.0.1:8000";

/// A hostname bound to a page that serves as that host's `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Site {
    pub id: DbId,
    pub hostname: String,
    pub port: i32,
    pub site_name: String,
    pub root_page_id: DbId,
    pub is_default_site: bool,
}

/// DTO for creating a site binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSite {
    pub hostname: String,
    pub port: i32,
    pub site_name: String,
    pub root_page_id: DbId,
    pub is_default_site: bool,
}

/// The default site, or the first site when none is flagged default.
pub fn default_site(sites: &[Site]) -> Option<&Site> {
    sites
        .iter()
        .find(|s| s.is_default_site)
        .or_else(|| sites.first())
}

/// Site settings loaded once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSettings {
    /// Hostname for the site binding created by bootstrap.
    pub hostname: String,
    pub port: i32,
    pub site_name: String,
    /// Domain used when neither a site binding nor an allowed host applies.
    pub fallback_domain: String,
    pub allowed_hosts: Vec<String>,
    /// Absolute links point at the local development server.
    pub debug: bool,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            port: DEFAULT_PORT,
            site_name: DEFAULT_SITE_NAME.to_string(),
            fallback_domain: DEFAULT_HOSTNAME.to_string(),
            allowed_hosts: Vec::new(),
            debug: false,
        }
    }
}

impl SiteSettings {
    /// Default site binding pointing at `root_page_id`.
    pub fn new_site(&self, root_page_id: DbId) -> NewSite {
        NewSite {
            hostname: self.hostname.clone(),
            port: self.port,
            site_name: self.site_name.clone(),
            root_page_id,
            is_default_site: true,
        }
    }

    /// Domain for absolute URLs.
    ///
    /// Order: the site binding's hostname, then the first allowed host that
    /// is neither `*` nor a `.suffix` wildcard, then the fallback domain.
    pub fn resolve_domain(&self, site: Option<&Site>) -> String {
        if let Some(site) = site.filter(|s| !s.hostname.trim().is_empty()) {
            return site.hostname.clone();
        }
        self.allowed_hosts
            .iter()
            .find(|h| h.as_str() != "*" && !h.starts_with('.'))
            .cloned()
            .unwrap_or_else(|| self.fallback_domain.clone())
    }

    /// Scheme and host for absolute URLs, without a trailing slash.
    pub fn base_url(&self, site: Option<&Site>) -> String {
        if self.debug {
            return DEBUG_BASE_URL.to_string();
        }
        let domain = self.resolve_domain(site);
        let host = domain.split(':').next().unwrap_or_default();
        format!("https://{host}")
    }
}
