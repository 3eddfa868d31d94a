//! Rendering-session seam between the extraction pipeline and the
//! browser-automation driver.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use crate::config::BrowserConfig;

/// A live, hydrated page rendering session.
///
/// One session is owned exclusively by one extraction request and must be
/// closed on every exit path.
#[async_trait]
pub trait RenderSession: Send + Sync {
    /// Navigate to the listing URL and wait for hydration
    async fn navigate(&self, url: &Url, timeout: Duration) -> Result<()>;

    /// Execute a script in the page and return its JSON result
    async fn evaluate_script(&self, code: &str) -> Result<serde_json::Value>;

    /// Serialized markup of the rendered document
    async fn rendered_markup(&self) -> Result<String>;

    /// Visible text content of the rendered document
    async fn visible_text(&self) -> Result<String>;

    /// Release the underlying browser resources
    async fn close(&self);
}

/// Opens one rendering session per extraction request
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn RenderSession>>;
}

#[cfg(feature = "browser")]
pub use playwright_session::PlaywrightSessionFactory;

#[cfg(feature = "browser")]
mod playwright_session {
    use super::*;
    use playwright::Playwright;
    use tracing::{debug, warn};

    /// Browser-backed rendering session using Playwright
    pub struct PlaywrightSession {
        browser: playwright::api::Browser,
        page: playwright::api::Page,
        settle_delay: Duration,
    }

    unsafe impl Send for PlaywrightSession {}
    unsafe impl Sync for PlaywrightSession {}

    #[async_trait]
    impl RenderSession for PlaywrightSession {
        async fn navigate(&self, url: &Url, timeout: Duration) -> Result<()> {
            debug!("Navigating to {}", url);

            let goto = self.page.goto_builder(url.as_str()).goto();
            tokio::time::timeout(timeout, goto)
                .await
                .map_err(|_| anyhow::anyhow!("navigation timed out after {:?}", timeout))??;

            // Let the client framework finish hydrating before extraction.
            tokio::time::sleep(self.settle_delay).await;
            Ok(())
        }

        async fn evaluate_script(&self, code: &str) -> Result<serde_json::Value> {
            let value = self.page.evaluate::<(), serde_json::Value>(code, ()).await?;
            Ok(value)
        }

        async fn rendered_markup(&self) -> Result<String> {
            Ok(self.page.content().await?)
        }

        async fn visible_text(&self) -> Result<String> {
            let value = self
                .page
                .evaluate::<(), serde_json::Value>("document.body.innerText", ())
                .await?;
            Ok(value.as_str().unwrap_or_default().to_string())
        }

        async fn close(&self) {
            if let Err(e) = self.browser.close().await {
                warn!("Failed to close browser: {}", e);
            }
        }
    }

    /// Launches one headless browser per session
    pub struct PlaywrightSessionFactory {
        config: BrowserConfig,
    }

    unsafe impl Send for PlaywrightSessionFactory {}
    unsafe impl Sync for PlaywrightSessionFactory {}

    impl PlaywrightSessionFactory {
        pub fn new(config: &BrowserConfig) -> Self {
            Self { config: config.clone() }
        }
    }

    #[async_trait]
    impl SessionFactory for PlaywrightSessionFactory {
        async fn open(&self) -> Result<Box<dyn RenderSession>> {
            debug!("Launching browser session");

            let playwright = Playwright::initialize().await?;

            let browser = playwright
                .chromium()
                .launcher()
                .headless(self.config.headless)
                .launch()
                .await?;

            let context = browser.context_builder().build().await?;
            let page = context.new_page().await?;

            Ok(Box::new(PlaywrightSession {
                browser,
                page,
                settle_delay: Duration::from_millis(self.config.settle_delay_ms),
            }))
        }
    }
}

/// Factory used when the browser feature is disabled
pub struct DisabledSessionFactory;

impl DisabledSessionFactory {
    pub fn new(_config: &BrowserConfig) -> Self {
        Self
    }
}

#[async_trait]
impl SessionFactory for DisabledSessionFactory {
    async fn open(&self) -> Result<Box<dyn RenderSession>> {
        Err(crate::error::FlatcastError::BrowserUnavailable.into())
    }
}
