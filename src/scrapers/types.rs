use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str =
    "https://otthonterkep.hu/elado+minden-kategoria/minden-megye/minden-telepules/0/0/0/0";

/// Newest listings first, already URL-encoded (`ad_feladas_time|desc`)
pub const DEFAULT_SORT: &str = "ad_feladas_time%7Cdesc";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Parameters for one scrape run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeParams {
    /// Search results URL without query string (all categories, all counties)
    pub base_url: String,
    /// Value of the `sort` query parameter
    pub sort: String,
    /// Listings per results page
    pub page_size: u32,
    /// Hard ceiling on pages visited per run
    pub max_pages: u32,
    /// Listing slots probed per page
    pub max_slots: usize,
    /// Per-request timeout
    pub timeout: Duration,
    pub user_agent: String,
    /// Pages fetched at once; 1 keeps the run strictly sequential
    pub concurrency: usize,
    /// CSV file of known city names
    pub cities_path: PathBuf,
}

impl ScrapeParams {
    /// URL of a 1-based results page
    pub fn page_url(&self, page: u32) -> String {
        format!("{}?p={}&sort={}", self.base_url, page, self.sort)
    }
}

impl Default for ScrapeParams {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            sort: DEFAULT_SORT.to_string(),
            page_size: 20,
            max_pages: 500,
            max_slots: 21,
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrency: 1,
            cities_path: PathBuf::from("turabazis.csv"),
        }
    }
}

/// CSS selectors for the results page.
///
/// Slot selectors are evaluated inside one listing slot. Positional ones start
/// with `:scope` so that only descendants of the slot can match them. The floor
/// and the room count share a probe because the site renders them in the same
/// element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotSelectors {
    /// Element whose text starts with the total listing count
    pub estate_count: String,
    /// Direct children of the results grid, one per slot
    pub slot: String,
    pub location: String,
    pub price: String,
    pub place_size: String,
    pub land_size: String,
    pub rooms: String,
    pub floor: String,
}

impl Default for SlotSelectors {
    fn default() -> Self {
        Self {
            estate_count: "div.col.h5.m-0.fw-bolder".to_string(),
            slot: "div.properties.slotDoubleColumn > div".to_string(),
            location: "h5 > a".to_string(),
            price: "h4".to_string(),
            place_size: ":scope div:nth-child(1) > div:nth-child(1) > span".to_string(),
            land_size: ":scope div:nth-child(1) > div:nth-child(2) > span".to_string(),
            rooms: ":scope div:nth-child(2) > div:nth-child(1) > small > span".to_string(),
            floor: ":scope div:nth-child(2) > div:nth-child(1) > small > span".to_string(),
        }
    }
}
