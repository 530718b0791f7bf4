use crate::scrapers::error::FetchError;
use crate::scrapers::traits::PageFetcher;
use crate::scrapers::types::ScrapeParams;
use anyhow::{Context, Result};
use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, error, warn};

/// How far into the body a `<meta charset>` declaration is looked for
const META_SNIFF_LEN: usize = 1024;

/// Plain HTTP fetcher backed by reqwest
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(params: &ScrapeParams) -> Result<Self> {
        let client = Client::builder()
            .timeout(params.timeout)
            .user_agent(params.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        debug!("Fetching URL: {}", url);

        let network = |e: reqwest::Error| FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(|e| {
            error!("Failed to retrieve the page from {}: {}", url, e);
            network(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("{} returned status: {}", url, status);
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(network)?;
        debug!("Downloaded {} bytes of HTML", bytes.len());
        Ok(decode_body(content_type.as_deref(), &bytes))
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

/// Decode a page body. The charset comes from the Content-Type header, then
/// from a `<meta>` declaration near the top of the document, then UTF-8. A
/// byte order mark overrides all of them.
pub fn decode_body(content_type: Option<&str>, bytes: &[u8]) -> String {
    let label = content_type
        .and_then(charset_param)
        .or_else(|| meta_charset(&bytes[..bytes.len().min(META_SNIFF_LEN)]));
    let encoding = match label {
        Some(label) => Encoding::for_label(label.as_bytes()).unwrap_or_else(|| {
            warn!("Unknown charset '{}', decoding as UTF-8", label);
            UTF_8
        }),
        None => UTF_8,
    };

    let (text, used, malformed) = encoding.decode(bytes);
    if malformed {
        warn!("Page body is not valid {}; invalid bytes were replaced", used.name());
    }
    text.into_owned()
}

/// Value following the first `charset=` in `text`, without quotes
fn charset_param(text: &str) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    let start = lower.find("charset=")? + "charset=".len();
    let value: String = lower[start..]
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(|c| !matches!(c, '"' | '\'' | ';' | '>' | '/') && !c.is_whitespace())
        .collect();
    (!value.is_empty()).then_some(value)
}

/// Charset named by a `<meta charset>` or `http-equiv` tag
fn meta_charset(head: &[u8]) -> Option<String> {
    let head = String::from_utf8_lossy(head);
    let lower = head.to_ascii_lowercase();
    let meta = lower.find("<meta")?;
    charset_param(&lower[meta..])
}
