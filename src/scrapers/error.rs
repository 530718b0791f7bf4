use std::path::PathBuf;

/// A page could not be retrieved
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Timeout, DNS, TLS, or any other transport failure
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// The server answered with a non-2xx status
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// The headless browser failed to render the page
    #[error("browser error fetching {url}: {message}")]
    Browser { url: String, message: String },
}

/// The city reference file could not be used
#[derive(Debug, thiserror::Error)]
pub enum CityError {
    #[error("city source {path} is unavailable: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A CSS selector failed to compile
#[derive(Debug, thiserror::Error)]
#[error("failed to parse selector '{selector}': {error}")]
pub struct SelectorError {
    pub selector: String,
    pub error: String,
}
