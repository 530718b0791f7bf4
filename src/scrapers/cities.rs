use crate::models::UNKNOWN_CITY;
use crate::scrapers::error::CityError;
use std::path::Path;
use tracing::{error, info};

/// Known city names, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityIndex {
    cities: Vec<String>,
}

impl CityIndex {
    pub fn new(cities: Vec<String>) -> Self {
        Self { cities }
    }

    /// Load the index, degrading to an empty one if the file cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Self {
        match Self::try_load(path) {
            Ok(index) => index,
            Err(e) => {
                error!("{}", e);
                Self::default()
            }
        }
    }

    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, CityError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CityError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let index = Self::from_csv(&text);
        info!("Loaded {} cities from {}", index.len(), path.display());
        Ok(index)
    }

    /// Parse city names out of CSV text.
    ///
    /// The first row is always a header. Its `city` column is used when present,
    /// column 0 otherwise.
    pub fn from_csv(text: &str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut rows = parse_rows(text).into_iter();

        let column = rows
            .next()
            .and_then(|header| header.iter().position(|cell| cell.trim() == "city"))
            .unwrap_or(0);

        let cities = rows
            .filter_map(|row| row.into_iter().nth(column))
            .map(|cell| cell.trim().to_string())
            .filter(|city| !city.is_empty())
            .collect();

        Self { cities }
    }

    /// First known city occurring in `text`, or [`UNKNOWN_CITY`].
    pub fn resolve(&self, text: &str) -> String {
        if text.is_empty() {
            return UNKNOWN_CITY.to_string();
        }
        self.cities
            .iter()
            .find(|city| text.contains(city.as_str()))
            .cloned()
            .unwrap_or_else(|| UNKNOWN_CITY.to_string())
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.cities.iter().map(String::as_str)
    }
}

/// Comma-separated rows with double-quote escaping. Blank lines are dropped.
fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => row.push(std::mem::take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                if row.len() > 1 || !row[0].is_empty() {
                    rows.push(std::mem::take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn index(cities: &[&str]) -> CityIndex {
        CityIndex::new(cities.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn resolves_first_matching_city() {
        let idx = index(&["Pécs", "Debrecen", "Budapest"]);
        assert_eq!(idx.resolve("Debrecen, Nagyerdő"), "Debrecen");
        assert_eq!(idx.resolve("Budapest XIII. kerület"), "Budapest");
    }

    #[test]
    fn index_order_breaks_ties() {
        let idx = index(&["Buda", "Budapest"]);
        assert_eq!(idx.resolve("Budapest V. kerület"), "Buda");
    }

    #[test]
    fn unmatched_or_empty_text_is_unknown() {
        let idx = index(&["Debrecen"]);
        assert_eq!(idx.resolve("Szeged, Belváros"), UNKNOWN_CITY);
        assert_eq!(idx.resolve(""), UNKNOWN_CITY);
        assert_eq!(CityIndex::default().resolve("Debrecen"), UNKNOWN_CITY);
    }

    #[test]
    fn uses_city_column_when_header_names_it() {
        let idx = CityIndex::from_csv("county,city\nHajdú-Bihar, Debrecen \nBaranya,Pécs\n");
        assert_eq!(idx.iter().collect::<Vec<_>>(), vec!["Debrecen", "Pécs"]);
    }

    #[test]
    fn falls_back_to_first_column() {
        let idx = CityIndex::from_csv("name,population\r\nSzeged,160000\r\n\r\nGyőr,130000");
        assert_eq!(idx.iter().collect::<Vec<_>>(), vec!["Szeged", "Győr"]);
    }

    #[test]
    fn skips_blank_and_short_rows() {
        let idx = CityIndex::from_csv("id,city\n1,\n2\n3,\"Eger\"\n4,  \n");
        assert_eq!(idx.iter().collect::<Vec<_>>(), vec!["Eger"]);
    }

    #[test]
    fn quoted_fields_keep_commas() {
        let idx = CityIndex::from_csv("city\n\"Szentendre, Pest\"\n");
        assert_eq!(idx.iter().collect::<Vec<_>>(), vec!["Szentendre, Pest"]);
    }

    #[test]
    fn missing_file_yields_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        let idx = CityIndex::load(dir.path().join("nope.csv"));
        assert!(idx.is_empty());
        assert!(matches!(
            CityIndex::try_load(dir.path().join("nope.csv")),
            Err(CityError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "\u{feff}city\nDebrecen\nMiskolc\n").unwrap();
        let idx = CityIndex::load(file.path());
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.resolve("Miskolc, Avas"), "Miskolc");
    }
}
