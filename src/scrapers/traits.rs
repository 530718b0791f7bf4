use crate::scrapers::error::FetchError;
use async_trait::async_trait;
use scraper::Html;

/// Retrieves the HTML of a single results page.
///
/// Implementations make exactly one attempt per call; retrying is up to the caller.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page body as decoded text
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError>;

    /// Get the name of the fetcher backend
    fn source_name(&self) -> &'static str;
}

/// Fetch `url` and parse it into a document tree
pub async fn fetch_document<F>(fetcher: &F, url: &str) -> Result<Html, FetchError>
where
    F: PageFetcher + ?Sized,
{
    let body = fetcher.fetch_html(url).await?;
    Ok(Html::parse_document(&body))
}
