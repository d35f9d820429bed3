use crate::error::{Result, ScraperError};
use crate::infra::{DebugDump, PageFetcher};
use crate::types::{EventSource, RawRow, Source};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// One way of turning a listing page into raw rows
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, document: &Html, page_url: &Url) -> Vec<RawRow>;
}

/// Try `strategies` in order and return the rows of the first one that finds any
pub fn extract_rows(
    source: Source,
    strategies: &[Box<dyn ExtractionStrategy>],
    html: &str,
    page_url: &Url,
) -> Vec<RawRow> {
    let document = Html::parse_document(html);
    for strategy in strategies {
        let rows = strategy.extract(&document, page_url);
        if !rows.is_empty() {
            info!(
                source = %source,
                strategy = strategy.name(),
                "Extracted {} raw rows",
                rows.len()
            );
            return rows;
        }
        debug!(source = %source, strategy = strategy.name(), "Strategy found no rows");
    }
    warn!(source = %source, "No rows found - the page structure may have changed");
    Vec::new()
}

/// A listing page plus the strategies that know how to read it
pub struct SiteExtractor {
    source: Source,
    page_url: Url,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    fetcher: Arc<dyn PageFetcher>,
    dump: DebugDump,
}

impl SiteExtractor {
    pub fn new(
        source: Source,
        page_url: &str,
        strategies: Vec<Box<dyn ExtractionStrategy>>,
        fetcher: Arc<dyn PageFetcher>,
        dump: DebugDump,
    ) -> Result<Self> {
        Ok(Self {
            source,
            page_url: parse_url(source, page_url)?,
            strategies,
            fetcher,
            dump,
        })
    }

    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    /// Extract rows from an already fetched page
    pub fn parse_html(&self, html: &str) -> Vec<RawRow> {
        extract_rows(self.source, &self.strategies, html, &self.page_url)
    }
}

#[async_trait::async_trait]
impl EventSource for SiteExtractor {
    fn source(&self) -> Source {
        self.source
    }

    #[instrument(skip(self), fields(source = %self.source))]
    async fn fetch_rows(&self) -> Result<Vec<RawRow>> {
        info!("Fetching {}", self.page_url);
        let html = self
            .fetcher
            .fetch_html(self.page_url.as_str(), self.source.default_charset())
            .await?;
        self.dump.save(self.source, &html);
        Ok(self.parse_html(&html))
    }
}

pub fn parse_url(source: Source, url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| ScraperError::Extraction {
        source_name: source.to_string(),
        message: format!("invalid page URL '{}': {}", url, e),
    })
}

pub fn parse_selector(source: Source, css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScraperError::Extraction {
        source_name: source.to_string(),
        message: format!("invalid selector '{}': {:?}", css, e),
    })
}

/// Text content with each text node trimmed and joined by single spaces
pub fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve `href` against the page and keep only http(s) links
pub fn absolutize(page_url: &Url, href: &str) -> Option<String> {
    let joined = page_url.join(href.trim()).ok()?;
    if !matches!(joined.scheme(), "http" | "https") {
        return None;
    }
    Some(joined.as_str().trim_end_matches('&').to_string())
}
