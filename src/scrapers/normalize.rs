//! Text-to-number conversion for scraped listing fields.
//!
//! Prices are whole Forint amounts rendered with grouping spaces
//! (`45 900 000 Ft`). Everything except ASCII digits and `.` is discarded before
//! parsing, so a `.` is always read as a decimal point. A dot used as a
//! thousands separator would be misread; the site has not been seen to do that.

use crate::models::{NormalizedListingRecord, RawListingRecord, NOT_AVAILABLE};
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Parse a currency or area string into a decimal.
pub fn normalize_currency(text: &str) -> Option<Decimal> {
    let digits: String = text
        .replace("Ft", "")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if digits.is_empty() {
        match text.trim() {
            "" | NOT_AVAILABLE => debug!("No value in '{}'", text),
            _ => warn!("No numeric content in '{}'", text),
        }
        return None;
    }

    match digits.parse::<Decimal>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Invalid decimal value '{}' (from '{}'): {}", digits, text, e);
            None
        }
    }
}

/// Parse the digits of `text` as an integer.
pub fn normalize_integer(text: &str) -> Option<u32> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    match digits.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Integer out of range '{}' (from '{}'): {}", digits, text, e);
            None
        }
    }
}

/// Why a raw record did not survive normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingLocation,
    InvalidPrice,
    InvalidPlaceSize,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Rejection::MissingLocation => "missing location",
            Rejection::InvalidPrice => "missing or non-positive price",
            Rejection::InvalidPlaceSize => "missing or non-positive place size",
        })
    }
}

/// Convert one raw record. Required fields are location, price and place size.
pub fn normalize_record(raw: &RawListingRecord) -> Result<NormalizedListingRecord, Rejection> {
    let property_location = raw.property_location.trim();
    if property_location.is_empty() {
        return Err(Rejection::MissingLocation);
    }

    let price = normalize_currency(&raw.price_text)
        .filter(|p| *p > Decimal::ZERO)
        .ok_or(Rejection::InvalidPrice)?;
    let place_size = normalize_currency(&raw.place_size_text)
        .filter(|s| *s > Decimal::ZERO)
        .ok_or(Rejection::InvalidPlaceSize)?;

    let floor = match raw.floor_text.trim() {
        NOT_AVAILABLE => None,
        floor => Some(floor.to_string()),
    };

    Ok(NormalizedListingRecord {
        property_location: property_location.to_string(),
        price,
        property_type: raw.property_type,
        place_size,
        land_size: normalize_currency(&raw.land_size_text),
        rooms: normalize_integer(&raw.rooms_text),
        floor,
    })
}

/// Normalize every record, dropping (and logging) the ones missing a required field.
pub fn clean(raw: &[RawListingRecord]) -> (Vec<NormalizedListingRecord>, usize) {
    let mut discarded = 0;
    let records = raw
        .iter()
        .filter_map(|record| match normalize_record(record) {
            Ok(normalized) => Some(normalized),
            Err(reason) => {
                warn!("Skipping record due to {}: {:?}", reason, record);
                discarded += 1;
                None
            }
        })
        .collect();
    (records, discarded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyType;

    fn raw(price: &str, place: &str) -> RawListingRecord {
        RawListingRecord {
            property_location: "Debrecen".to_string(),
            price_text: price.to_string(),
            property_type: PropertyType::Apartment,
            place_size_text: place.to_string(),
            land_size_text: NOT_AVAILABLE.to_string(),
            rooms_text: "3".to_string(),
            floor_text: "3".to_string(),
        }
    }

    #[test]
    fn currency_strips_grouping_and_marker() {
        assert_eq!(normalize_currency("45 900 000 Ft"), Some(Decimal::from(45_900_000)));
        assert_eq!(normalize_currency("45\u{a0}900\u{a0}000\u{a0}Ft"), Some(Decimal::from(45_900_000)));
        assert_eq!(normalize_currency("72 m²"), Some(Decimal::from(72)));
        assert_eq!(normalize_currency("64.5 m²"), "64.5".parse().ok());
    }

    #[test]
    fn currency_dot_is_a_decimal_point() {
        assert_eq!(normalize_currency("1.250"), "1.250".parse().ok());
    }

    #[test]
    fn currency_rejects_empty_and_garbage() {
        assert_eq!(normalize_currency(""), None);
        assert_eq!(normalize_currency("N/A"), None);
        assert_eq!(normalize_currency("Ár megegyezés szerint"), None);
        assert_eq!(normalize_currency("1.2.3 Ft"), None);
    }

    #[test]
    fn integer_keeps_digits_only() {
        assert_eq!(normalize_integer("3 szoba"), Some(3));
        assert_eq!(normalize_integer("0"), Some(0));
        assert_eq!(normalize_integer("N/A"), None);
        assert_eq!(normalize_integer("99999999999999"), None);
    }

    #[test]
    fn record_with_all_fields() {
        let mut r = raw("45 900 000 Ft", "72 m²");
        r.land_size_text = "540 m²".to_string();
        let n = normalize_record(&r).unwrap();
        assert_eq!(n.price, Decimal::from(45_900_000));
        assert_eq!(n.place_size, Decimal::from(72));
        assert_eq!(n.land_size, Some(Decimal::from(540)));
        assert_eq!(n.rooms, Some(3));
        assert_eq!(n.floor.as_deref(), Some("3"));
        assert_eq!(n.property_type, PropertyType::Apartment);
    }

    #[test]
    fn optional_fields_become_none() {
        let mut r = raw("10 000 000 Ft", "50 m²");
        r.rooms_text = NOT_AVAILABLE.to_string();
        r.floor_text = NOT_AVAILABLE.to_string();
        let n = normalize_record(&r).unwrap();
        assert_eq!(n.land_size, None);
        assert_eq!(n.rooms, None);
        assert_eq!(n.floor, None);
    }

    #[test]
    fn required_fields_must_be_positive() {
        assert_eq!(normalize_record(&raw("0 Ft", "50 m²")), Err(Rejection::InvalidPrice));
        assert_eq!(normalize_record(&raw("N/A", "50 m²")), Err(Rejection::InvalidPrice));
        assert_eq!(normalize_record(&raw("1 Ft", "N/A")), Err(Rejection::InvalidPlaceSize));
        assert_eq!(normalize_record(&raw("1 Ft", "0 m²")), Err(Rejection::InvalidPlaceSize));

        let mut r = raw("1 Ft", "1 m²");
        r.property_location = "  ".to_string();
        assert_eq!(normalize_record(&r), Err(Rejection::MissingLocation));
    }

    #[test]
    fn clean_counts_discards() {
        let batch = vec![raw("1 Ft", "1 m²"), raw("N/A", "1 m²"), raw("2 Ft", "N/A")];
        let (records, discarded) = clean(&batch);
        assert_eq!(records.len(), 1);
        assert_eq!(discarded, 2);
    }

    #[test]
    fn normalization_is_deterministic() {
        let r = raw("39 990 000 Ft", "64.5 m²");
        assert_eq!(normalize_record(&r), normalize_record(&r));
    }
}
