#[cfg(feature = "browser")]
pub mod browser;
pub mod cities;
pub mod error;
pub mod extract;
pub mod http;
pub mod normalize;
pub mod otthonterkep;
pub mod pagination;
pub mod traits;
pub mod types;

#[cfg(feature = "browser")]
pub use browser::BrowserFetcher;
pub use cities::CityIndex;
pub use error::{CityError, FetchError, SelectorError};
pub use extract::ListingExtractor;
pub use http::HttpFetcher;
pub use otthonterkep::{OtthonterkepScraper, ScrapeOutcome};
pub use pagination::PaginationPlan;
pub use traits::{fetch_document, PageFetcher};
pub use types::{ScrapeParams, SlotSelectors};
