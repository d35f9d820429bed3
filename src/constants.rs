/// Source name constants to ensure consistency across the codebase.
/// These are the values written to the `source` column of the output table.
pub const KAGAKU_SOURCE: &str = "kagaku";
pub const BIGSIGHT_SOURCE: &str = "bigsight";
pub const MAKUHARI_SOURCE: &str = "makuhari";

// Listing pages scraped for each source
pub const KAGAKU_URL: &str = "https://www.kagaku.com/calendar.php?selectgenre=society_all&selectpref=all_area&submit=%B8%A1%BA%F7&eid=none";
pub const BIGSIGHT_URL: &str = "https://www.bigsight.jp/visitor/event/";
pub const MAKUHARI_URL: &str = "https://www.m-messe.co.jp/event/";

// Venue names used when a listing row carries no venue of its own
pub const BIGSIGHT_VENUE_NAME: &str = "東京ビッグサイト";
pub const MAKUHARI_VENUE_NAME: &str = "幕張メッセ";

// kagaku.com still serves EUC-JP without always declaring it
pub const KAGAKU_DEFAULT_CHARSET: &str = "EUC-JP";
pub const DEFAULT_CHARSET: &str = "utf-8";

pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; expo_scraper/0.1)";

/// Column order of the output table
pub const OUTPUT_COLUMNS: [&str; 7] = [
    "source",
    "title",
    "start_date",
    "end_date",
    "venue",
    "url",
    "last_seen_at",
];

/// Get all supported source names, in the order they are assembled
pub fn get_supported_sources() -> Vec<&'static str> {
    vec![KAGAKU_SOURCE, BIGSIGHT_SOURCE, MAKUHARI_SOURCE]
}
