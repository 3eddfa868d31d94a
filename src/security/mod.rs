//! Listing-URL validation.
//!
//! Requests are rejected here before any rendering session is opened, so
//! a bad URL never costs a browser launch.

use url::Url;

use crate::config::SecurityConfig;
use crate::error::{FlatcastError, FlatcastResult};

/// Validates that a listing URL belongs to one of the target sites
#[derive(Debug, Clone)]
pub struct UrlValidator {
    allowed_domains: Vec<String>,
    allowed_schemes: Vec<String>,
}

impl UrlValidator {
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            allowed_domains: config
                .allowed_domains
                .iter()
                .map(|d| d.to_lowercase())
                .collect(),
            allowed_schemes: config.allowed_schemes.clone(),
        }
    }

    /// Parse and validate a listing URL
    pub fn validate(&self, raw: &str) -> FlatcastResult<Url> {
        let url = Url::parse(raw.trim()).map_err(|e| FlatcastError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        if !self.allowed_schemes.iter().any(|s| s == url.scheme()) {
            return Err(FlatcastError::InvalidUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let host = url
            .host_str()
            .ok_or_else(|| FlatcastError::InvalidUrl {
                url: raw.to_string(),
                reason: "missing host".to_string(),
            })?
            .to_lowercase();

        let allowed = self
            .allowed_domains
            .iter()
            .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)));
        if !allowed {
            return Err(FlatcastError::DomainNotAllowed { domain: host });
        }

        Ok(url)
    }
}
