use crate::models::{NormalizedListingRecord, RawListingRecord};
use crate::scrapers::cities::CityIndex;
use crate::scrapers::error::SelectorError;
use crate::scrapers::extract::ListingExtractor;
use crate::scrapers::normalize;
use crate::scrapers::pagination::PaginationPlan;
use crate::scrapers::traits::{fetch_document, PageFetcher};
use crate::scrapers::types::{ScrapeParams, SlotSelectors};
use futures::stream::{self, StreamExt};
use scraper::Html;
use serde::Serialize;
use tracing::{error, info, warn};

/// Result of one scrape run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScrapeOutcome {
    /// Listing total reported by the landing page
    pub estate_count: u32,
    pub pages_planned: usize,
    /// Pages skipped because their fetch failed
    pub failed_pages: Vec<String>,
    /// Complete slots found across all pages
    pub raw_records: usize,
    /// Records dropped during normalization
    pub discarded: usize,
    pub records: Vec<NormalizedListingRecord>,
}

impl ScrapeOutcome {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Scraper for otthonterkep.hu search results
pub struct OtthonterkepScraper {
    fetcher: Box<dyn PageFetcher>,
    extractor: ListingExtractor,
    params: ScrapeParams,
    cities: Option<CityIndex>,
}

impl OtthonterkepScraper {
    pub fn new(fetcher: Box<dyn PageFetcher>, params: ScrapeParams) -> Result<Self, SelectorError> {
        Self::with_selectors(fetcher, params, &SlotSelectors::default())
    }

    pub fn with_selectors(
        fetcher: Box<dyn PageFetcher>,
        params: ScrapeParams,
        selectors: &SlotSelectors,
    ) -> Result<Self, SelectorError> {
        let extractor = ListingExtractor::new(selectors, params.max_slots)?;
        Ok(Self {
            fetcher,
            extractor,
            params,
            cities: None,
        })
    }

    /// Use a preloaded city index instead of reading `cities_path` on each run
    pub fn with_cities(mut self, cities: CityIndex) -> Self {
        self.cities = Some(cities);
        self
    }

    /// Scrape every results page and return the normalized listings.
    ///
    /// Only a failed landing page or a zero listing total end the run early, both
    /// with an empty outcome. Any other page that fails to load is skipped.
    pub async fn run(&self) -> ScrapeOutcome {
        info!("Starting scrape using the {} fetcher", self.fetcher.source_name());

        let landing_url = self.params.page_url(1);
        let estate_count = match fetch_document(self.fetcher.as_ref(), &landing_url).await {
            Ok(document) => self.extractor.estate_count(&document),
            Err(e) => {
                error!("Failed to fetch the main page content: {}", e);
                return ScrapeOutcome::default();
            }
        };

        if estate_count == 0 {
            error!("No real estate listings found");
            return ScrapeOutcome::default();
        }

        let plan = PaginationPlan::new(estate_count, &self.params);
        let cities = match &self.cities {
            Some(cities) => cities.clone(),
            None => CityIndex::load(&self.params.cities_path),
        };

        let (raw, failed_pages) = self.scrape_pages(&plan, &cities).await;
        info!("Scraping completed. Total records collected: {}", raw.len());

        let (records, discarded) = normalize::clean(&raw);
        if discarded > 0 {
            warn!("Discarded {} records with missing required fields", discarded);
        }
        info!("{} records ready for storage", records.len());

        ScrapeOutcome {
            estate_count,
            pages_planned: plan.urls.len(),
            failed_pages,
            raw_records: raw.len(),
            discarded,
            records,
        }
    }

    async fn scrape_pages(
        &self,
        plan: &PaginationPlan,
        cities: &CityIndex,
    ) -> (Vec<RawListingRecord>, Vec<String>) {
        let mut raw = Vec::new();
        let mut failed = Vec::new();

        let mut pages = stream::iter(plan.urls.iter())
            .map(|url| async move { (url, self.fetcher.fetch_html(url).await) })
            .buffered(self.params.concurrency.max(1));

        while let Some((url, result)) = pages.next().await {
            match result {
                Ok(body) => {
                    let document = Html::parse_document(&body);
                    raw.extend(self.extractor.extract(&document, cities));
                    info!("Total records collected so far: {}", raw.len());
                }
                Err(e) => {
                    warn!("Skipping link due to fetch error: {}", e);
                    failed.push(url.clone());
                }
            }
        }

        (raw, failed)
    }
}
