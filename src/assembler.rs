use crate::normalize::{clean_field, normalize_whitespace, DateRangeNormalizer};
use crate::types::{EventRecord, RawRow, Source};
use chrono::{Datelike, Local, NaiveDate};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Per-source acceptance rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Minimum title length in characters, keyed by source name. Sources
    /// without an entry only require a non-empty title.
    pub min_title_chars: BTreeMap<String, usize>,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        let mut min_title_chars = BTreeMap::new();
        // kagaku tables are full of short navigation links
        min_title_chars.insert(Source::Kagaku.as_str().to_string(), 5);
        Self { min_title_chars }
    }
}

impl AssemblerConfig {
    pub fn min_title_chars_for(&self, source: Source) -> usize {
        self.min_title_chars
            .get(source.as_str())
            .copied()
            .unwrap_or(1)
            .max(1)
    }
}

/// Why a raw row did not become a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("unknown source '{0}'")]
    UnknownSource(String),
    #[error("missing title")]
    MissingTitle,
    #[error("no parseable date in {0:?}")]
    NoDate(Option<String>),
    #[error("title has {len} chars, minimum is {min}")]
    TitleTooShort { len: usize, min: usize },
}

/// Row counts for one source over one assembly
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceTally {
    pub accepted: usize,
    pub rejected: usize,
    pub duplicates: usize,
}

/// Output of one assembly: the final records plus per-source counts
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub records: Vec<EventRecord>,
    pub tallies: BTreeMap<String, SourceTally>,
}

/// Fields two records must share to count as the same event
pub type RecordKey = (Source, String, Option<NaiveDate>, Option<String>);

pub fn identity_key(record: &EventRecord) -> RecordKey {
    (
        record.source,
        record.title.clone(),
        record.start_date,
        record.url.clone(),
    )
}

/// Identity keys seen so far in one assembly
#[derive(Debug, Default)]
pub struct SeenRecords(HashSet<RecordKey>);

impl SeenRecords {
    /// True the first time a record's identity key comes by
    pub fn first_sighting(&mut self, record: &EventRecord) -> bool {
        self.0.insert(identity_key(record))
    }
}

/// Drop later records whose identity key was already seen
pub fn dedup_records(records: Vec<EventRecord>) -> Vec<EventRecord> {
    let mut seen = SeenRecords::default();
    records
        .into_iter()
        .filter(|record| seen.first_sighting(record))
        .collect()
}

/// Tally bucket for a row: the canonical source name, or the raw string when
/// it names no known source
fn tally_key(raw_source: &str) -> String {
    raw_source
        .parse::<Source>()
        .map(|source| source.as_str().to_string())
        .unwrap_or_else(|_| raw_source.to_string())
}

/// Order by start date then title; undated records go last. Stable.
pub fn sort_records(records: &mut [EventRecord]) {
    records.sort_by(|a, b| {
        (a.start_date.is_none(), a.start_date, &a.title).cmp(&(
            b.start_date.is_none(),
            b.start_date,
            &b.title,
        ))
    });
}

/// Turns raw scraped rows from every source into the final record list
pub struct EventRecordAssembler {
    normalizer: DateRangeNormalizer,
    run_date: NaiveDate,
    config: AssemblerConfig,
}

impl EventRecordAssembler {
    /// Records are stamped with `run_date`, and date cells without a year
    /// default to its year.
    pub fn new(run_date: NaiveDate, config: AssemblerConfig) -> Self {
        Self {
            normalizer: DateRangeNormalizer::new(run_date.year()),
            run_date,
            config,
        }
    }

    pub fn for_today(config: AssemblerConfig) -> Self {
        Self::new(Local::now().date_naive(), config)
    }

    pub fn run_date(&self) -> NaiveDate {
        self.run_date
    }

    pub fn assemble<I>(&self, rows: I) -> Vec<EventRecord>
    where
        I: IntoIterator<Item = RawRow>,
    {
        self.assemble_with_report(rows).records
    }

    #[instrument(skip(self, rows), fields(run_date = %self.run_date))]
    pub fn assemble_with_report<I>(&self, rows: I) -> Assembly
    where
        I: IntoIterator<Item = RawRow>,
    {
        let mut tallies: BTreeMap<String, SourceTally> = BTreeMap::new();
        let mut seen = SeenRecords::default();
        let mut records = Vec::new();

        for row in rows {
            let tally = tallies.entry(tally_key(&row.source)).or_default();
            match self.assemble_row(&row) {
                Ok(record) => {
                    if seen.first_sighting(&record) {
                        tally.accepted += 1;
                        records.push(record);
                    } else {
                        tally.duplicates += 1;
                        debug!(source = %row.source, title = %record.title, "Dropping duplicate record");
                    }
                }
                Err(reason) => {
                    tally.rejected += 1;
                    debug!(source = %row.source, title = ?row.title, %reason, "Rejected row");
                }
            }
        }

        for (source, tally) in &tallies {
            counter!("expo_rows_accepted_total", "source" => source.clone())
                .increment(tally.accepted as u64);
            counter!("expo_rows_rejected_total", "source" => source.clone())
                .increment(tally.rejected as u64);
            if tally.accepted == 0 {
                warn!(source = %source, rejected = tally.rejected, "No rows accepted for source");
            }
        }

        sort_records(&mut records);
        info!("Assembled {} records from {} sources", records.len(), tallies.len());

        Assembly { records, tallies }
    }

    /// Validate and normalize a single row
    pub fn assemble_row(&self, row: &RawRow) -> Result<EventRecord, Rejection> {
        let source: Source = row
            .source
            .parse()
            .map_err(|_| Rejection::UnknownSource(row.source.clone()))?;

        let title = row
            .title
            .as_deref()
            .map(normalize_whitespace)
            .filter(|t| !t.is_empty())
            .ok_or(Rejection::MissingTitle)?;

        let range = self.normalizer.normalize(row.date_text.as_deref());
        if range.is_empty() {
            return Err(Rejection::NoDate(row.date_text.clone()));
        }

        let min = self.config.min_title_chars_for(source);
        let len = title.chars().count();
        if len < min {
            return Err(Rejection::TitleTooShort { len, min });
        }

        Ok(EventRecord {
            source,
            title,
            start_date: range.start,
            end_date: range.end,
            venue: clean_field(row.venue.as_deref()),
            url: clean_field(row.url.as_deref()),
            last_seen_at: self.run_date,
        })
    }
}
