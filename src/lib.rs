//! Scraper for Hungarian property listings (otthonterkep.hu).
//!
//! Results pages are fetched, each listing slot is extracted and normalized into
//! typed records, and the records replace the contents of a SQLite store that the
//! dashboard reads from.

pub mod analysis;
pub mod cli;
pub mod models;
pub mod scrapers;
pub mod storage;
