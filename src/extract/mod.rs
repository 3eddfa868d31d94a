//! Multi-tier attribute extraction pipeline.
//!
//! Three independent tiers read the same rendering session and each
//! produce a partial field map: the embedded-state scan, the markup
//! parser, and the visible-text scan. The merger reconciles them under
//! fixed precedence. Tier-internal failures degrade to an empty map and
//! never abort the request; only navigation failures propagate.

use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

pub mod embedded;
pub mod markup;
pub mod merge;
pub mod session;
pub mod textscan;

use crate::error::{FlatcastError, FlatcastResult};
use session::RenderSession;

/// Partial mapping from canonical field name to raw value, one per tier
pub type RawFieldMap = BTreeMap<String, String>;

/// One resolved raw value per canonical field, after reconciliation
pub type MergedFieldMap = BTreeMap<String, String>;

/// Supported listing sites, each with its own embedded-state location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSite {
    /// Cian pages expose their state through window globals and inline
    /// JSON scripts reachable from a probe script.
    Cian,
    /// Samolet pages serialize their Nuxt state into a `__NUXT_DATA__`
    /// script tag in the markup.
    Samolet,
}

impl ListingSite {
    pub fn detect(url: &Url) -> Self {
        let host = url.host_str().unwrap_or_default().to_lowercase();
        if host == "samolet.ru" || host.ends_with(".samolet.ru") {
            Self::Samolet
        } else {
            Self::Cian
        }
    }
}

/// Orchestrates the three extraction tiers over one rendering session
#[derive(Debug, Clone)]
pub struct ExtractionPipeline {
    navigation_timeout: Duration,
}

impl ExtractionPipeline {
    pub fn new(navigation_timeout: Duration) -> Self {
        Self { navigation_timeout }
    }

    /// Run the full extraction sequence against an already-opened session.
    ///
    /// The caller owns the session and is responsible for closing it on
    /// every exit path, including when this returns an error.
    pub async fn extract_listing(
        &self,
        session: &dyn RenderSession,
        url: &Url,
    ) -> FlatcastResult<MergedFieldMap> {
        session
            .navigate(url, self.navigation_timeout)
            .await
            .map_err(|e| FlatcastError::Session {
                message: format!("navigation to {} failed: {}", url, e),
            })?;

        // The markup is read once and shared by the tiers that need it.
        let rendered = match session.rendered_markup().await {
            Ok(html) => Some(html),
            Err(e) => {
                warn!("Could not read rendered markup: {}", e);
                None
            }
        };

        // Tiers run sequentially; each is a pure reader of session state.
        let from_embedded = match ListingSite::detect(url) {
            ListingSite::Cian => embedded::extract(session).await,
            ListingSite::Samolet => rendered
                .as_deref()
                .map(embedded::extract_nuxt)
                .unwrap_or_default(),
        };

        let from_markup = rendered
            .as_deref()
            .map(markup::extract)
            .unwrap_or_default();

        let from_text = match session.visible_text().await {
            Ok(text) => textscan::extract(&text),
            Err(e) => {
                warn!("Could not read visible text: {}", e);
                RawFieldMap::new()
            }
        };

        let merged = merge::merge(from_embedded, from_markup, from_text);
        info!("Extraction resolved {} fields for {}", merged.len(), url);

        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn test_site_detection() {
        assert_eq!(ListingSite::detect(&url("https://www.cian.ru/sale/flat/1/")), ListingSite::Cian);
        assert_eq!(ListingSite::detect(&url("https://samolet.ru/flats/2/")), ListingSite::Samolet);
        assert_eq!(
            ListingSite::detect(&url("https://msk.samolet.ru/flats/2/")),
            ListingSite::Samolet
        );
    }
}
