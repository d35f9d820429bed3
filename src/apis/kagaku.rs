//! kagaku.com science calendar: one large table per genre, EUC-JP encoded,
//! with separate year and 会期 columns.

use super::base::{ExtractionStrategy, SiteExtractor};
use super::strategies::{FullTextStrategy, HeaderTableStrategy};
use crate::constants::KAGAKU_URL;
use crate::error::Result;
use crate::infra::{DebugDump, PageFetcher};
use crate::types::Source;
use std::sync::Arc;

pub fn strategies() -> Result<Vec<Box<dyn ExtractionStrategy>>> {
    Ok(vec![
        Box::new(HeaderTableStrategy::new(Source::Kagaku)?),
        Box::new(FullTextStrategy::new(Source::Kagaku)?),
    ])
}

pub fn extractor(fetcher: Arc<dyn PageFetcher>, dump: DebugDump) -> Result<SiteExtractor> {
    SiteExtractor::new(Source::Kagaku, KAGAKU_URL, strategies()?, fetcher, dump)
}
