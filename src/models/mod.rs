use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel used for any slot field the page did not render
pub const NOT_AVAILABLE: &str = "N/A";

/// Location used when no known city occurs in the listing's address line
pub const UNKNOWN_CITY: &str = "Unknown";

/// Kind of property, derived from the room-count field of a listing slot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyType {
    House,
    Apartment,
}

impl PropertyType {
    /// The site renders a room count of "0" for houses; anything else is an apartment.
    pub fn from_rooms_text(rooms: &str) -> Self {
        if rooms.trim() == "0" {
            PropertyType::House
        } else {
            PropertyType::Apartment
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::House => "House",
            PropertyType::Apartment => "Apartment",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "house" => Ok(PropertyType::House),
            "apartment" => Ok(PropertyType::Apartment),
            other => Err(format!("unknown property type '{other}'")),
        }
    }
}

/// One listing slot as scraped, before any field is parsed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawListingRecord {
    pub property_location: String,
    pub price_text: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub place_size_text: String,
    pub land_size_text: String,
    pub rooms_text: String,
    pub floor_text: String,
}

/// A listing with every field parsed, ready for storage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedListingRecord {
    pub property_location: String,
    pub price: Decimal,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub place_size: Decimal,
    pub land_size: Option<Decimal>,
    pub rooms: Option<u32>,
    pub floor: Option<String>,
}

impl NormalizedListingRecord {
    /// Price per square metre of living space, `None` when the quotient is
    /// undefined or out of `Decimal` range
    pub fn price_per_sqm(&self) -> Option<Decimal> {
        self.price.checked_div(self.place_size)
    }
}

/// A listing as read back from the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredListing {
    pub id: i64,
    #[serde(flatten)]
    pub listing: NormalizedListingRecord,
    pub scraped_at: DateTime<Utc>,
}
