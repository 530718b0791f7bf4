use crate::models::{PropertyType, RawListingRecord, NOT_AVAILABLE};
use crate::scrapers::cities::CityIndex;
use crate::scrapers::error::SelectorError;
use crate::scrapers::types::SlotSelectors;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, error, info};

fn compile(selector: &str) -> Result<Selector, SelectorError> {
    Selector::parse(selector).map_err(|e| SelectorError {
        selector: selector.to_string(),
        error: e.to_string(),
    })
}

/// Pulls listing slots and the listing total out of results pages
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    estate_count: Selector,
    slot: Selector,
    location: Selector,
    price: Selector,
    place_size: Selector,
    land_size: Selector,
    rooms: Selector,
    floor: Selector,
    max_slots: usize,
}

impl ListingExtractor {
    pub fn new(selectors: &SlotSelectors, max_slots: usize) -> Result<Self, SelectorError> {
        Ok(Self {
            estate_count: compile(&selectors.estate_count)?,
            slot: compile(&selectors.slot)?,
            location: compile(&selectors.location)?,
            price: compile(&selectors.price)?,
            place_size: compile(&selectors.place_size)?,
            land_size: compile(&selectors.land_size)?,
            rooms: compile(&selectors.rooms)?,
            floor: compile(&selectors.floor)?,
            max_slots,
        })
    }

    /// Total listings reported by the page, or 0 if the counter is missing or unreadable.
    pub fn estate_count(&self, document: &Html) -> u32 {
        let Some(element) = document.select(&self.estate_count).next() else {
            error!("Estate count element not found");
            return 0;
        };
        let text = element.text().collect::<String>();
        match text.split_whitespace().next().map(str::parse::<u32>) {
            Some(Ok(count)) => {
                info!("Total real estate listings found: {}", count);
                count
            }
            _ => {
                error!("Error extracting estate count from '{}'", text.trim());
                0
            }
        }
    }

    /// Every complete listing slot on the page.
    ///
    /// Slots lacking a location, price or room count are left out; other missing
    /// fields become [`NOT_AVAILABLE`].
    pub fn extract(&self, document: &Html, cities: &CityIndex) -> Vec<RawListingRecord> {
        let records: Vec<RawListingRecord> = document
            .select(&self.slot)
            .take(self.max_slots)
            .enumerate()
            .filter_map(|(idx, slot)| {
                let record = self.extract_slot(slot, cities);
                if record.is_none() {
                    debug!("Slot {} is incomplete, skipping", idx + 1);
                }
                record
            })
            .collect();

        info!("Extracted {} real estate records from the page", records.len());
        records
    }

    fn extract_slot(&self, slot: ElementRef<'_>, cities: &CityIndex) -> Option<RawListingRecord> {
        let location = first_text(slot, &self.location)?;
        let price_text = first_text(slot, &self.price)?;
        let rooms_text = first_text(slot, &self.rooms)?;

        let or_na = |selector: &Selector| {
            first_text(slot, selector).unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        Some(RawListingRecord {
            property_location: cities.resolve(&location),
            price_text,
            property_type: PropertyType::from_rooms_text(&rooms_text),
            place_size_text: or_na(&self.place_size),
            land_size_text: or_na(&self.land_size),
            rooms_text,
            floor_text: or_na(&self.floor),
        })
    }
}

/// Trimmed text of the first match inside `scope`
fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}
