//! Tokyo Big Sight visitor event schedule. Events are cards with the hall
//! in their own element.

use super::base::{ExtractionStrategy, SiteExtractor};
use super::strategies::{CardListStrategy, CardSelectors, FullTextStrategy, HeaderTableStrategy};
use crate::constants::BIGSIGHT_URL;
use crate::error::Result;
use crate::infra::{DebugDump, PageFetcher};
use crate::types::Source;
use std::sync::Arc;

pub const CARD_SELECTORS: CardSelectors = CardSelectors {
    item: "div.lyt-event-01, li.event-item, article.event",
    title: "h3, .title, .ttl",
    date: ".date, .period, time",
    venue: Some(".hall, .place, .venue"),
    link: "a[href]",
};

pub fn strategies() -> Result<Vec<Box<dyn ExtractionStrategy>>> {
    Ok(vec![
        Box::new(CardListStrategy::new(Source::Bigsight, CARD_SELECTORS)?),
        Box::new(HeaderTableStrategy::new(Source::Bigsight)?),
        Box::new(FullTextStrategy::new(Source::Bigsight)?),
    ])
}

pub fn extractor(fetcher: Arc<dyn PageFetcher>, dump: DebugDump) -> Result<SiteExtractor> {
    SiteExtractor::new(Source::Bigsight, BIGSIGHT_URL, strategies()?, fetcher, dump)
}
