use crate::constants::{
    BIGSIGHT_SOURCE, BIGSIGHT_URL, BIGSIGHT_VENUE_NAME, DEFAULT_CHARSET, KAGAKU_DEFAULT_CHARSET,
    KAGAKU_SOURCE, KAGAKU_URL, MAKUHARI_SOURCE, MAKUHARI_URL, MAKUHARI_VENUE_NAME,
};
use crate::error::{Result, ScraperError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The listing sites events are aggregated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Kagaku,
    Bigsight,
    Makuhari,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Kagaku, Source::Bigsight, Source::Makuhari];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Kagaku => KAGAKU_SOURCE,
            Source::Bigsight => BIGSIGHT_SOURCE,
            Source::Makuhari => MAKUHARI_SOURCE,
        }
    }

    /// Listing page fetched for this source
    pub fn listing_url(&self) -> &'static str {
        match self {
            Source::Kagaku => KAGAKU_URL,
            Source::Bigsight => BIGSIGHT_URL,
            Source::Makuhari => MAKUHARI_URL,
        }
    }

    /// Charset assumed when the response does not declare one
    pub fn default_charset(&self) -> &'static str {
        match self {
            Source::Kagaku => KAGAKU_DEFAULT_CHARSET,
            Source::Bigsight | Source::Makuhari => DEFAULT_CHARSET,
        }
    }

    /// Venue recorded for rows that do not name one. kagaku lists events
    /// all over Japan, so it has no fallback.
    pub fn default_venue(&self) -> Option<&'static str> {
        match self {
            Source::Kagaku => None,
            Source::Bigsight => Some(BIGSIGHT_VENUE_NAME),
            Source::Makuhari => Some(MAKUHARI_VENUE_NAME),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Source {
    type Err = ScraperError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            KAGAKU_SOURCE => Ok(Source::Kagaku),
            BIGSIGHT_SOURCE => Ok(Source::Bigsight),
            MAKUHARI_SOURCE => Ok(Source::Makuhari),
            other => Err(ScraperError::UnknownSource(other.to_string())),
        }
    }
}

/// One candidate event exactly as an extractor scraped it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub source: String,
    pub title: Option<String>,
    #[serde(alias = "dateText")]
    pub date_text: Option<String>,
    pub venue: Option<String>,
    pub url: Option<String>,
}

impl RawRow {
    pub fn new(source: Source) -> Self {
        Self {
            source: source.as_str().to_string(),
            ..Default::default()
        }
    }
}

/// A validated, normalized output row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub source: Source,
    pub title: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub venue: Option<String>,
    pub url: Option<String>,
    pub last_seen_at: NaiveDate,
}

/// Core trait that all event listing sources must implement
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    /// Which listing site this is
    fn source(&self) -> Source;

    /// Fetch the listing and extract raw rows from it
    async fn fetch_rows(&self) -> Result<Vec<RawRow>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_round_trips_through_str() {
        for source in Source::ALL {
            assert_eq!(source.as_str().parse::<Source>().unwrap(), source);
        }
        assert_eq!(" Makuhari ".parse::<Source>().unwrap(), Source::Makuhari);
    }

    #[test]
    fn test_unknown_source_is_an_error() {
        let err = "tokyo_dome".parse::<Source>().unwrap_err();
        assert!(matches!(err, ScraperError::UnknownSource(name) if name == "tokyo_dome"));
    }

    #[test]
    fn test_raw_row_accepts_camel_case_date_text() {
        let row: RawRow = serde_json::from_str(
            r#"{"source":"makuhari","title":"Expo A","dateText":"2026/3/1","venue":null,"url":null}"#,
        )
        .unwrap();
        assert_eq!(row.date_text.as_deref(), Some("2026/3/1"));
    }
}
