use crate::scrapers::error::FetchError;
use crate::scrapers::traits::PageFetcher;
use crate::scrapers::types::ScrapeParams;
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fetcher that renders pages in headless Chrome, for when the plain HTML is not enough
pub struct BrowserFetcher {
    browser: Browser,
    timeout: Duration,
}

impl BrowserFetcher {
    pub fn new(params: &ScrapeParams) -> Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;

        Ok(Self {
            browser,
            timeout: params.timeout,
        })
    }
}

fn render(browser: &Browser, url: &str, timeout: Duration) -> Result<String> {
    let tab = browser.new_tab()?;
    tab.set_default_timeout(timeout);
    tab.navigate_to(url)?;
    tab.wait_until_navigated()?;
    let html = tab.get_content()?;

    if let Err(e) = tab.close(true) {
        warn!("Could not close tab for {}: {}", url, e);
    }
    Ok(html)
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        debug!("Rendering URL: {}", url);

        let browser = self.browser.clone();
        let target = url.to_string();
        let timeout = self.timeout;

        let rendered = tokio::task::spawn_blocking(move || render(&browser, &target, timeout))
            .await
            .map_err(|e| FetchError::Browser {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let html = rendered.map_err(|e| FetchError::Browser {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        if html.is_empty() {
            return Err(FetchError::Browser {
                url: url.to_string(),
                message: "page rendered no HTML".to_string(),
            });
        }

        debug!("Rendered {} bytes of HTML", html.len());
        Ok(html)
    }

    fn source_name(&self) -> &'static str {
        "browser"
    }
}
