//! Makuhari Messe event calendar. Listing items carry dotted dates
//! (`2026.3.1～3.3`) and the hall names.

use super::base::{ExtractionStrategy, SiteExtractor};
use super::strategies::{CardListStrategy, CardSelectors, FullTextStrategy, HeaderTableStrategy};
use crate::constants::MAKUHARI_URL;
use crate::error::Result;
use crate::infra::{DebugDump, PageFetcher};
use crate::types::Source;
use std::sync::Arc;

pub const CARD_SELECTORS: CardSelectors = CardSelectors {
    item: ".event-list__item, li.event-item, article.event",
    title: ".event-list__title, h3, .title",
    date: ".event-list__date, .date, time",
    venue: Some(".event-list__hall, .hall, .place"),
    link: "a[href]",
};

pub fn strategies() -> Result<Vec<Box<dyn ExtractionStrategy>>> {
    Ok(vec![
        Box::new(CardListStrategy::new(Source::Makuhari, CARD_SELECTORS)?),
        Box::new(HeaderTableStrategy::new(Source::Makuhari)?),
        Box::new(FullTextStrategy::new(Source::Makuhari)?),
    ])
}

pub fn extractor(fetcher: Arc<dyn PageFetcher>, dump: DebugDump) -> Result<SiteExtractor> {
    SiteExtractor::new(Source::Makuhari, MAKUHARI_URL, strategies()?, fetcher, dump)
}
