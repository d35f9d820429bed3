use super::base::{absolutize, element_text, parse_selector, ExtractionStrategy};
use crate::error::Result;
use crate::types::{RawRow, Source};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

static YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)((?:19|20)\d{2})(?:\D|$)").expect("invalid regex: year"));

static SLASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,2}/\d{1,2}").expect("invalid regex: slash date"));

// One date, optionally followed by a weekday note and a second date
static DATE_EXPRESSION: Lazy<Regex> = Lazy::new(|| {
    let atom = r"(?:\d{4}\s*[年/.]\s*)?\d{1,2}\s*[月/.]\s*\d{1,2}\s*日?";
    let note = r"(?:\s*[（(][^（()）]{1,8}[）)])?";
    let tail = r"(?:\d{4}\s*[年/.]\s*)?(?:\d{1,2}\s*[月/.]\s*)?\d{1,2}\s*日?";
    Regex::new(&format!(
        r"{atom}{note}(?:\s*[〜～~\-−—–－―]\s*{tail}{note})?"
    ))
    .expect("invalid regex: date expression")
});

/// Whether a cell plausibly holds a date (`3/1` or `…年…月…日`)
pub fn looks_like_date(text: &str) -> bool {
    SLASH_DATE.is_match(text) || (text.contains('年') && text.contains('月') && text.contains('日'))
}

/// First date or date range mentioned in `text`
pub fn find_date_expression(text: &str) -> Option<String> {
    DATE_EXPRESSION
        .find(text)
        .map(|m| m.as_str().trim().to_string())
}

/// Header words used to locate columns in listing tables
#[derive(Debug, Clone, Copy)]
pub struct ColumnSynonyms {
    pub title: &'static [&'static str],
    pub year: &'static [&'static str],
    pub date: &'static [&'static str],
    pub venue: &'static [&'static str],
    pub url: &'static [&'static str],
}

pub const JAPANESE_COLUMNS: ColumnSynonyms = ColumnSynonyms {
    title: &["イベント名", "イベント", "イベントの名称", "名称", "題目", "展示会名"],
    year: &["年"],
    date: &["会期", "開催日", "日程", "期間"],
    venue: &["場所", "会場", "開催地", "場所/会場", "ホール"],
    url: &["URL", "リンク", "Link"],
};

/// Tables are only considered when their text mentions one of these
pub const TABLE_KEYWORDS: &[&str] = &["イベント", "イベント名", "イベントの名称", "会期", "展示会"];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    title: Option<usize>,
    year: Option<usize>,
    date: Option<usize>,
    venue: Option<usize>,
    url: Option<usize>,
}

fn claim(slot: &mut Option<usize>, index: usize, cell: &str, words: &[&str]) {
    if slot.is_none() && words.iter().any(|w| cell.contains(w)) {
        *slot = Some(index);
    }
}

/// Reads `<table>` listings whose first row names the columns.
///
/// Each data row needs a link; its text becomes the title. A year column, if
/// present, is prefixed to date cells that omit the year.
pub struct HeaderTableStrategy {
    source: Source,
    columns: ColumnSynonyms,
    table: Selector,
    row: Selector,
    header_cell: Selector,
    cell: Selector,
    link: Selector,
}

impl HeaderTableStrategy {
    pub fn new(source: Source) -> Result<Self> {
        Ok(Self {
            source,
            columns: JAPANESE_COLUMNS,
            table: parse_selector(source, "table")?,
            row: parse_selector(source, "tr")?,
            header_cell: parse_selector(source, "th")?,
            cell: parse_selector(source, "td")?,
            link: parse_selector(source, "a[href]")?,
        })
    }

    /// Column positions from a row, and whether that row is a `<th>` header
    fn map_headers(&self, row: &ElementRef) -> (ColumnMap, bool) {
        let headers: Vec<String> = row.select(&self.header_cell).map(|c| element_text(&c)).collect();
        let is_header = !headers.is_empty();
        let cells = if is_header {
            headers
        } else {
            row.select(&self.cell).map(|c| element_text(&c)).collect()
        };

        let mut map = ColumnMap::default();
        for (i, cell) in cells.iter().enumerate() {
            claim(&mut map.title, i, cell, self.columns.title);
            claim(&mut map.year, i, cell, self.columns.year);
            claim(&mut map.date, i, cell, self.columns.date);
            claim(&mut map.venue, i, cell, self.columns.venue);
            claim(&mut map.url, i, cell, self.columns.url);
        }
        (map, is_header)
    }

    fn extract_row(&self, tr: &ElementRef, columns: &ColumnMap, page_url: &Url) -> Option<RawRow> {
        let tds: Vec<ElementRef> = tr.select(&self.cell).collect();
        if tds.len() < 2 {
            return None;
        }
        let texts: Vec<String> = tds.iter().map(element_text).collect();
        let column = |index: Option<usize>| index.and_then(|i| texts.get(i)).filter(|t| !t.is_empty());
        let link_in = |index: Option<usize>| {
            index
                .and_then(|i| tds.get(i))
                .and_then(|td| td.select(&self.link).next())
        };

        let anchor = link_in(columns.title)
            .or_else(|| link_in(columns.url))
            .or_else(|| tr.select(&self.link).next())?;
        let url = absolutize(page_url, anchor.value().attr("href")?)?;

        let date_text = column(columns.date)
            .or_else(|| texts.iter().find(|t| looks_like_date(t)))?
            .clone();
        let year = column(columns.year)
            .and_then(|t| YEAR.captures(t))
            .map(|caps| caps[1].to_string());
        let date_text = match year {
            Some(year) if !date_text.contains('年') => format!("{}年{}", year, date_text),
            _ => date_text,
        };

        let venue = column(columns.venue)
            .or_else(|| texts.last().filter(|t| !t.is_empty()))
            .cloned()
            .or_else(|| self.source.default_venue().map(str::to_string));

        Some(RawRow {
            source: self.source.as_str().to_string(),
            title: Some(element_text(&anchor)),
            date_text: Some(date_text),
            venue,
            url: Some(url),
        })
    }
}

impl ExtractionStrategy for HeaderTableStrategy {
    fn name(&self) -> &'static str {
        "header_table"
    }

    fn extract(&self, document: &Html, page_url: &Url) -> Vec<RawRow> {
        let candidates: Vec<ElementRef> = document
            .select(&self.table)
            .filter(|table| {
                let text = element_text(table);
                TABLE_KEYWORDS.iter().any(|k| text.contains(k))
            })
            .collect();
        debug!(source = %self.source, candidates = candidates.len(), "Candidate tables");

        let mut rows = Vec::new();
        for table in candidates {
            let mut columns: Option<ColumnMap> = None;
            for tr in table.select(&self.row) {
                let map = match columns {
                    Some(map) => map,
                    None => {
                        let (map, is_header) = self.map_headers(&tr);
                        columns = Some(map);
                        if is_header {
                            continue;
                        }
                        map
                    }
                };
                if let Some(row) = self.extract_row(&tr, &map, page_url) {
                    rows.push(row);
                }
            }
        }
        rows
    }
}

/// CSS selectors for a card or list layout
#[derive(Debug, Clone, Copy)]
pub struct CardSelectors {
    pub item: &'static str,
    pub title: &'static str,
    pub date: &'static str,
    pub venue: Option<&'static str>,
    pub link: &'static str,
}

/// Reads layouts where each event is its own element (card, `<li>`, `<article>`).
/// Items without any date are skipped.
pub struct CardListStrategy {
    source: Source,
    item: Selector,
    title: Selector,
    date: Selector,
    venue: Option<Selector>,
    link: Selector,
}

impl CardListStrategy {
    pub fn new(source: Source, selectors: CardSelectors) -> Result<Self> {
        Ok(Self {
            source,
            item: parse_selector(source, selectors.item)?,
            title: parse_selector(source, selectors.title)?,
            date: parse_selector(source, selectors.date)?,
            venue: selectors
                .venue
                .map(|css| parse_selector(source, css))
                .transpose()?,
            link: parse_selector(source, selectors.link)?,
        })
    }

    fn first_text(item: &ElementRef, selector: &Selector) -> Option<String> {
        item.select(selector)
            .next()
            .map(|e| element_text(&e))
            .filter(|t| !t.is_empty())
    }

    fn extract_item(&self, item: &ElementRef, page_url: &Url) -> Option<RawRow> {
        let title = Self::first_text(item, &self.title)?;
        let date_text = Self::first_text(item, &self.date)
            .or_else(|| find_date_expression(&element_text(item)))?;
        let venue = self
            .venue
            .as_ref()
            .and_then(|selector| Self::first_text(item, selector))
            .or_else(|| self.source.default_venue().map(str::to_string));
        let url = item
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .or_else(|| item.value().attr("href"))
            .and_then(|href| absolutize(page_url, href));

        Some(RawRow {
            source: self.source.as_str().to_string(),
            title: Some(title),
            date_text: Some(date_text),
            venue,
            url,
        })
    }
}

impl ExtractionStrategy for CardListStrategy {
    fn name(&self) -> &'static str {
        "card_list"
    }

    fn extract(&self, document: &Html, page_url: &Url) -> Vec<RawRow> {
        document
            .select(&self.item)
            .filter_map(|item| self.extract_item(&item, page_url))
            .collect()
    }
}

const BLOCK_TAGS: [&str; 8] = ["li", "tr", "dd", "dl", "p", "article", "section", "div"];

/// Last resort: every link whose surrounding block mentions a date.
/// Blocks longer than `max_block_chars` are page wrappers, not listings.
pub struct FullTextStrategy {
    source: Source,
    link: Selector,
    max_block_chars: usize,
}

impl FullTextStrategy {
    pub fn new(source: Source) -> Result<Self> {
        Ok(Self {
            source,
            link: parse_selector(source, "a[href]")?,
            max_block_chars: 300,
        })
    }
}

fn enclosing_block<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| BLOCK_TAGS.contains(&e.value().name()))
}

impl ExtractionStrategy for FullTextStrategy {
    fn name(&self) -> &'static str {
        "full_text"
    }

    fn extract(&self, document: &Html, page_url: &Url) -> Vec<RawRow> {
        let mut rows = Vec::new();
        for anchor in document.select(&self.link) {
            let title = element_text(&anchor);
            if title.is_empty() {
                continue;
            }
            let Some(url) = anchor.value().attr("href").and_then(|h| absolutize(page_url, h)) else {
                continue;
            };
            let Some(block) = enclosing_block(&anchor) else {
                continue;
            };
            let text = element_text(&block);
            if text.chars().count() > self.max_block_chars {
                continue;
            }
            if let Some(date_text) = find_date_expression(&text) {
                rows.push(RawRow {
                    source: self.source.as_str().to_string(),
                    title: Some(title),
                    date_text: Some(date_text),
                    venue: self.source.default_venue().map(str::to_string),
                    url: Some(url),
                });
            }
        }
        rows
    }
}
