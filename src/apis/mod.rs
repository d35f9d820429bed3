pub mod base;
pub mod bigsight;
pub mod kagaku;
pub mod makuhari;
pub mod strategies;

pub use base::{extract_rows, ExtractionStrategy, SiteExtractor};

use crate::error::Result;
use crate::infra::{DebugDump, PageFetcher};
use crate::types::{EventSource, Source};
use std::sync::Arc;

/// Strategy chain for a source, in the order it is tried
pub fn strategies_for(source: Source) -> Result<Vec<Box<dyn ExtractionStrategy>>> {
    match source {
        Source::Kagaku => kagaku::strategies(),
        Source::Bigsight => bigsight::strategies(),
        Source::Makuhari => makuhari::strategies(),
    }
}

pub fn create_extractor(
    source: Source,
    fetcher: Arc<dyn PageFetcher>,
    dump: DebugDump,
) -> Result<SiteExtractor> {
    match source {
        Source::Kagaku => kagaku::extractor(fetcher, dump),
        Source::Bigsight => bigsight::extractor(fetcher, dump),
        Source::Makuhari => makuhari::extractor(fetcher, dump),
    }
}

/// Build one extractor per source, sharing the fetcher and dump settings
pub fn create_sources(
    sources: &[Source],
    fetcher: Arc<dyn PageFetcher>,
    dump: &DebugDump,
) -> Result<Vec<Arc<dyn EventSource>>> {
    sources
        .iter()
        .map(|&source| {
            create_extractor(source, fetcher.clone(), dump.clone())
                .map(|extractor| Arc::new(extractor) as Arc<dyn EventSource>)
        })
        .collect()
}
