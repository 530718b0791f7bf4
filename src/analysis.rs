//! Dataset preparation and aggregates for the listings dashboard.

use crate::models::{PropertyType, StoredListing};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// Cheapest price kept by [`clean`], in Forint
pub const MIN_PRICE: i64 = 5_000_000;
/// Most expensive price kept by [`clean`], in Forint
pub const MAX_PRICE: i64 = 1_000_000_000;

const PREFERRED_CITY: &str = "Debrecen";
const TOP_CITIES: usize = 10;

/// Listings fit for analysis: a room count and a plausible price.
pub fn clean(rows: &[StoredListing]) -> Vec<StoredListing> {
    let (min, max) = (Decimal::from(MIN_PRICE), Decimal::from(MAX_PRICE));
    let cleaned: Vec<StoredListing> = rows
        .iter()
        .filter(|row| row.listing.rooms.is_some())
        .filter(|row| (min..=max).contains(&row.listing.price))
        .cloned()
        .collect();
    info!("Data cleaning completed: kept {} of {} rows", cleaned.len(), rows.len());
    cleaned
}

/// City shown when the user has not picked one
pub fn default_city(rows: &[StoredListing]) -> Option<&str> {
    rows.iter()
        .map(|row| row.listing.property_location.as_str())
        .find(|city| *city == PREFERRED_CITY)
        .or_else(|| rows.first().map(|row| row.listing.property_location.as_str()))
}

/// Distinct cities, sorted
pub fn cities(rows: &[StoredListing]) -> Vec<&str> {
    rows.iter()
        .map(|row| row.listing.property_location.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Dashboard filter predicates
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub city: Option<String>,
    /// Empty means either type
    pub types: Vec<PropertyType>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl ListingFilter {
    pub fn matches(&self, row: &StoredListing) -> bool {
        let listing = &row.listing;
        self.city.as_deref().map_or(true, |c| listing.property_location == c)
            && (self.types.is_empty() || self.types.contains(&listing.property_type))
            && self.min_price.map_or(true, |min| listing.price >= min)
            && self.max_price.map_or(true, |max| listing.price <= max)
    }

    pub fn apply(&self, rows: &[StoredListing]) -> Vec<StoredListing> {
        rows.iter().filter(|row| self.matches(row)).cloned().collect()
    }
}

/// Aggregates shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_listings: usize,
    pub average_price: Decimal,
    pub average_place_size: Decimal,
    pub average_price_per_sqm: Decimal,
    pub type_counts: BTreeMap<PropertyType, usize>,
    pub average_price_by_type: BTreeMap<PropertyType, Decimal>,
    pub average_size_by_rooms: BTreeMap<u32, Decimal>,
    pub median_price_by_rooms: BTreeMap<u32, Decimal>,
    /// Highest average price first
    pub top_cities_by_price: Vec<(String, Decimal)>,
}

impl Summary {
    /// `None` when there is nothing to summarize.
    pub fn compute(rows: &[StoredListing]) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }

        let listings = rows.iter().map(|row| &row.listing);

        let mut type_prices: BTreeMap<PropertyType, Vec<Decimal>> = BTreeMap::new();
        let mut room_sizes: BTreeMap<u32, Vec<Decimal>> = BTreeMap::new();
        let mut room_prices: BTreeMap<u32, Vec<Decimal>> = BTreeMap::new();
        let mut city_prices: BTreeMap<&str, Vec<Decimal>> = BTreeMap::new();

        for listing in listings.clone() {
            type_prices.entry(listing.property_type).or_default().push(listing.price);
            city_prices
                .entry(listing.property_location.as_str())
                .or_default()
                .push(listing.price);
            if let Some(rooms) = listing.rooms {
                room_sizes.entry(rooms).or_default().push(listing.place_size);
                room_prices.entry(rooms).or_default().push(listing.price);
            }
        }

        let mut top_cities_by_price: Vec<(String, Decimal)> = city_prices
            .into_iter()
            .map(|(city, prices)| (city.to_string(), mean(&prices)))
            .collect();
        top_cities_by_price.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_cities_by_price.truncate(TOP_CITIES);

        let prices: Vec<Decimal> = listings.clone().map(|l| l.price).collect();
        let sizes: Vec<Decimal> = listings.clone().map(|l| l.place_size).collect();
        let per_sqm: Vec<Decimal> = listings
            .filter_map(|l| {
                let value = l.price_per_sqm();
                if value.is_none() {
                    warn!(
                        "Leaving {} Ft / {} m² in {} out of the price per m² average",
                        l.price, l.place_size, l.property_location
                    );
                }
                value
            })
            .collect();

        Some(Self {
            total_listings: rows.len(),
            average_price: mean(&prices),
            average_place_size: mean(&sizes),
            average_price_per_sqm: mean(&per_sqm),
            type_counts: type_prices.iter().map(|(t, p)| (*t, p.len())).collect(),
            average_price_by_type: type_prices.iter().map(|(t, p)| (*t, mean(p))).collect(),
            average_size_by_rooms: room_sizes.iter().map(|(r, s)| (*r, mean(s))).collect(),
            median_price_by_rooms: room_prices.into_iter().map(|(r, p)| (r, median(p))).collect(),
            top_cities_by_price,
        })
    }
}

/// Arithmetic mean rounded to two decimal places
fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let count = Decimal::from(values.len());
    let mean = match values.iter().try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v)) {
        Some(total) => total / count,
        // each share is at most the largest value
        None => values
            .iter()
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v / count)),
    };
    mean.round_dp(2)
}

fn median(mut values: Vec<Decimal>) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.sort();
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        let (low, high) = (values[mid - 1], values[mid]);
        let middle = match low.checked_add(high) {
            Some(sum) => sum / Decimal::TWO,
            None => low / Decimal::TWO + high / Decimal::TWO,
        };
        middle.round_dp(2)
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NormalizedListingRecord;
    use chrono::Utc;

    fn row(id: i64, city: &str, kind: PropertyType, price: i64, size: i64, rooms: Option<u32>) -> StoredListing {
        StoredListing {
            id,
            listing: NormalizedListingRecord {
                property_location: city.to_string(),
                price: Decimal::from(price),
                property_type: kind,
                place_size: Decimal::from(size),
                land_size: None,
                rooms,
                floor: None,
            },
            scraped_at: Utc::now(),
        }
    }

    fn sample() -> Vec<StoredListing> {
        vec![
            row(1, "Szeged", PropertyType::Apartment, 30_000_000, 60, Some(2)),
            row(2, "Debrecen", PropertyType::Apartment, 40_000_000, 80, Some(2)),
            row(3, "Debrecen", PropertyType::House, 75_000_000, 150, Some(0)),
            row(4, "Debrecen", PropertyType::Apartment, 50_000_000, 100, Some(3)),
        ]
    }

    #[test]
    fn clean_drops_missing_rooms_and_outlier_prices() {
        let rows = vec![
            row(1, "Eger", PropertyType::Apartment, 4_999_999, 50, Some(1)),
            row(2, "Eger", PropertyType::Apartment, 5_000_000, 50, Some(1)),
            row(3, "Eger", PropertyType::Apartment, 20_000_000, 50, None),
            row(4, "Eger", PropertyType::House, 1_000_000_000, 500, Some(0)),
            row(5, "Eger", PropertyType::House, 1_000_000_001, 500, Some(0)),
        ];
        let ids: Vec<i64> = clean(&rows).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn default_city_prefers_debrecen() {
        let rows = sample();
        assert_eq!(default_city(&rows), Some("Debrecen"));
        assert_eq!(default_city(&rows[..1]), Some("Szeged"));
        assert_eq!(default_city(&[]), None);
        assert_eq!(cities(&rows), vec!["Debrecen", "Szeged"]);
    }

    #[test]
    fn filter_combines_predicates() {
        let rows = sample();
        let filter = ListingFilter {
            city: Some("Debrecen".to_string()),
            types: vec![PropertyType::Apartment],
            min_price: Some(Decimal::from(45_000_000)),
            max_price: None,
        };
        let ids: Vec<i64> = filter.apply(&rows).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![4]);

        assert_eq!(ListingFilter::default().apply(&rows).len(), 4);
    }

    #[test]
    fn summary_aggregates() {
        let debrecen = ListingFilter {
            city: Some("Debrecen".to_string()),
            ..Default::default()
        }
        .apply(&sample());
        let summary = Summary::compute(&debrecen).unwrap();

        assert_eq!(summary.total_listings, 3);
        assert_eq!(summary.average_price, Decimal::from(55_000_000));
        assert_eq!(summary.average_place_size, Decimal::from(110));
        assert_eq!(summary.average_price_per_sqm, Decimal::from(500_000));
        assert_eq!(summary.type_counts[&PropertyType::Apartment], 2);
        assert_eq!(summary.type_counts[&PropertyType::House], 1);
        assert_eq!(summary.average_price_by_type[&PropertyType::Apartment], Decimal::from(45_000_000));
        assert_eq!(summary.average_size_by_rooms[&2], Decimal::from(80));
        assert_eq!(summary.median_price_by_rooms[&0], Decimal::from(75_000_000));
    }

    #[test]
    fn median_of_even_group_averages_the_middle() {
        let summary = Summary::compute(&sample()).unwrap();
        assert_eq!(summary.median_price_by_rooms[&2], Decimal::from(35_000_000));
    }

    #[test]
    fn top_cities_ordered_by_average_price() {
        let summary = Summary::compute(&sample()).unwrap();
        assert_eq!(
            summary.top_cities_by_price,
            vec![
                ("Debrecen".to_string(), Decimal::from(55_000_000)),
                ("Szeged".to_string(), Decimal::from(30_000_000)),
            ]
        );
    }

    #[test]
    fn extreme_sizes_do_not_overflow() {
        let mut tiny = row(1, "Eger", PropertyType::Apartment, 10_000_000, 1, Some(1));
        tiny.listing.place_size = "0.000000000000000000000001".parse().unwrap();
        let normal = row(2, "Eger", PropertyType::Apartment, 30_000_000, 60, Some(1));

        let summary = Summary::compute(&[tiny, normal]).unwrap();
        assert_eq!(summary.total_listings, 2);
        assert_eq!(summary.average_price_per_sqm, Decimal::from(500_000));

        let huge: Decimal = "50000000000000000000000000000".parse().unwrap();
        let mut rows = vec![
            row(3, "Tata", PropertyType::House, 10_000_000, 1, Some(0)),
            row(4, "Tata", PropertyType::House, 10_000_000, 1, Some(0)),
        ];
        for r in &mut rows {
            r.listing.place_size = huge;
        }
        let summary = Summary::compute(&rows).unwrap();
        assert_eq!(summary.average_place_size, huge);
        assert_eq!(summary.average_size_by_rooms[&0], huge);
    }

    #[test]
    fn median_of_huge_values_does_not_overflow() {
        let huge: Decimal = "60000000000000000000000000000".parse().unwrap();
        assert_eq!(median(vec![huge, huge]), huge);
    }

    #[test]
    fn empty_dataset_has_no_summary() {
        assert!(Summary::compute(&[]).is_none());
    }
}
