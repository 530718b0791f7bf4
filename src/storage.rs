//! SQLite persistence for scraped listings.
//!
//! Each scrape run replaces the whole table: the store holds exactly the
//! listings of the most recent successful run.

use crate::models::{NormalizedListingRecord, PropertyType, StoredListing};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{error, info};

/// Storage for the listing dataset
pub trait ListingStore {
    /// Replace the stored dataset with `records`, returning how many rows were written
    fn replace_all(&mut self, records: &[NormalizedListingRecord]) -> Result<usize>;

    /// Every stored listing, in insertion order
    fn fetch_all(&self) -> Result<Vec<StoredListing>>;
}

/// SQLite-backed listing store.
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path`.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database {}", db_path.display()))?;
        let store = Self {
            conn,
            path: Some(db_path.to_path_buf()),
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let store = Self { conn, path: None };
        store.init_schema()?;
        Ok(store)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS real_estate_listings (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    property_location TEXT NOT NULL CHECK (property_location <> ''),
                    -- decimals are stored as exact text
                    price TEXT NOT NULL CHECK (CAST(price AS REAL) > 0),
                    type TEXT NOT NULL CHECK (type IN ('House', 'Apartment')),
                    place_size TEXT NOT NULL CHECK (CAST(place_size AS REAL) > 0),
                    land_size TEXT,
                    rooms INTEGER,
                    floor TEXT,
                    scraped_at TEXT NOT NULL
                );
                "#,
            )
            .context("Failed to create real_estate_listings table")?;
        Ok(())
    }
}

impl ListingStore for SqliteStore {
    fn replace_all(&mut self, records: &[NormalizedListingRecord]) -> Result<usize> {
        let scraped_at = Utc::now().to_rfc3339();
        let tx = self.conn.transaction().context("Failed to start transaction")?;

        tx.execute("DELETE FROM real_estate_listings", [])
            .context("Failed to clear real_estate_listings")?;
        info!("Cleared existing data from real_estate_listings");

        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO real_estate_listings
                 (property_location, price, type, place_size, land_size, rooms, floor, scraped_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;

            for record in records {
                let result = stmt.execute(params![
                    record.property_location,
                    record.price.to_string(),
                    record.property_type.as_str(),
                    record.place_size.to_string(),
                    record.land_size.map(|d| d.to_string()),
                    record.rooms,
                    record.floor,
                    scraped_at,
                ]);
                match result {
                    Ok(_) => inserted += 1,
                    Err(e) => error!("Error when inserting record {:?}: {}", record, e),
                }
            }
        }

        tx.commit().context("Failed to commit listings")?;
        info!("Inserted {} of {} listings", inserted, records.len());
        Ok(inserted)
    }

    fn fetch_all(&self) -> Result<Vec<StoredListing>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, property_location, price, type, place_size, land_size, rooms, floor, scraped_at
             FROM real_estate_listings ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], row_to_listing)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read real_estate_listings")?;
        info!("Retrieved {} records from the database", rows.len());
        Ok(rows)
    }
}

fn text_err(idx: usize, e: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

fn decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(idx)?;
    Decimal::from_str(&text).map_err(|e| text_err(idx, e))
}

fn row_to_listing(row: &Row<'_>) -> rusqlite::Result<StoredListing> {
    let type_text: String = row.get(3)?;
    let property_type = PropertyType::from_str(&type_text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
    })?;
    let land_size = match row.get::<_, Option<String>>(5)? {
        Some(text) => Some(Decimal::from_str(&text).map_err(|e| text_err(5, e))?),
        None => None,
    };
    let scraped_at: String = row.get(8)?;
    let scraped_at = DateTime::parse_from_rfc3339(&scraped_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| text_err(8, e))?;

    Ok(StoredListing {
        id: row.get(0)?,
        listing: NormalizedListingRecord {
            property_location: row.get(1)?,
            price: decimal_at(row, 2)?,
            property_type,
            place_size: decimal_at(row, 4)?,
            land_size,
            rooms: row.get(6)?,
            floor: row.get(7)?,
        },
        scraped_at,
    })
}
