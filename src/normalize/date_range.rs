use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use std::fmt;

/// Glyph every range marker is rewritten to before splitting
pub const RANGE_SEPARATOR: char = '〜';

/// Dash and tilde variants that scraped pages use between two dates
pub const SEPARATOR_GLYPHS: [char; 9] = ['〜', '～', '~', '-', '−', '—', '–', '－', '―'];

static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[（(][^（()）]*[）)]").expect("invalid regex: parenthetical")
});

// 10:00〜17:00 is removed as a unit so its marker does not end up splitting the cell
static TIME_OF_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{1,2}:\d{2}(?:\s*[〜～~\-−—–－―]\s*\d{1,2}:\d{2})?")
        .expect("invalid regex: time of day")
});

// 2026-03-01 / 2026.3.1 must not be split on their dashes
static DELIMITED_YMD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{4})[-−－.](\d{1,2})[-−－.](\d{1,2})").expect("invalid regex: delimited ymd")
});

// 3.3 on the right of 2026.3.1〜3.3
static DOTTED_MONTH_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\.(\d{1,2})").expect("invalid regex: dotted month day"));

static WEEKDAY_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[月火水木金土日]曜日?").expect("invalid regex: weekday word"));

static DATE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d)([年月日])").expect("invalid regex: date marker"));

static STRAY_WEEKDAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[月火水木金土日曜]").expect("invalid regex: stray weekday"));

// Token patterns search inside a fragment, so labels such as 会期: around the
// date are ignored
static YEAR_MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\D)(\d{4})/(\d{1,2})/(\d{1,2})(?:\D|$)").expect("invalid regex: year month day")
});

static MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\D)(\d{1,2})/(\d{1,2})(?:\D|$)").expect("invalid regex: month day")
});

static DAY_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)(\d{1,2})(?:\D|$)").expect("invalid regex: day only"));

/// Start and end dates recovered from a free-form date cell.
///
/// Both sides are `None` only when nothing in the text parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn single(date: Option<NaiveDate>) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let iso = |d: Option<NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
        write!(f, "{}{}{}", iso(self.start), RANGE_SEPARATOR, iso(self.end))
    }
}

/// A date fragment before a year has been chosen for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateToken {
    Full { year: i32, month: u32, day: u32 },
    MonthDay { month: u32, day: u32 },
    Day(u32),
}

impl DateToken {
    /// First date token found anywhere in the fragment
    fn parse(fragment: &str) -> Option<Self> {
        let num = |caps: &Captures, i: usize| caps.get(i)?.as_str().parse::<u32>().ok();

        if let Some(caps) = YEAR_MONTH_DAY.captures(fragment) {
            let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
            return Some(DateToken::Full {
                year,
                month: num(&caps, 2)?,
                day: num(&caps, 3)?,
            });
        }
        if let Some(caps) = MONTH_DAY.captures(fragment) {
            return Some(DateToken::MonthDay {
                month: num(&caps, 1)?,
                day: num(&caps, 2)?,
            });
        }
        DAY_ONLY
            .captures(fragment)
            .and_then(|caps| num(&caps, 1))
            .map(DateToken::Day)
    }

    /// Resolve a token that has nothing to its left. A bare day is too
    /// ambiguous to place without a month.
    fn resolve(self, default_year: i32) -> Option<NaiveDate> {
        match self {
            DateToken::Full { year, month, day } => NaiveDate::from_ymd_opt(year, month, day),
            DateToken::MonthDay { month, day } => NaiveDate::from_ymd_opt(default_year, month, day),
            DateToken::Day(_) => None,
        }
    }

    /// Resolve the right side of a range against the already-resolved left
    /// side, inheriting whatever the fragment leaves out.
    fn resolve_after(self, anchor: NaiveDate) -> Option<NaiveDate> {
        match self {
            DateToken::Full { year, month, day } => NaiveDate::from_ymd_opt(year, month, day),
            DateToken::MonthDay { month, day } => {
                // 12月28日〜1月5日 crosses into the next year
                let year = if month < anchor.month() {
                    anchor.year() + 1
                } else {
                    anchor.year()
                };
                NaiveDate::from_ymd_opt(year, month, day)
            }
            DateToken::Day(day) => {
                let same_month = NaiveDate::from_ymd_opt(anchor.year(), anchor.month(), day)?;
                if same_month >= anchor {
                    return Some(same_month);
                }
                let (year, month) = if anchor.month() == 12 {
                    (anchor.year() + 1, 1)
                } else {
                    (anchor.year(), anchor.month() + 1)
                };
                NaiveDate::from_ymd_opt(year, month, day)
            }
        }
    }
}

/// Turns Japanese date cells such as `2026年2月18日（水）〜2月20日（金）`
/// into a [`DateRange`].
#[derive(Debug, Clone, Copy)]
pub struct DateRangeNormalizer {
    default_year: i32,
}

impl DateRangeNormalizer {
    /// `default_year` fills in fragments that carry no year and have nothing
    /// to inherit one from.
    pub fn new(default_year: i32) -> Self {
        Self { default_year }
    }

    /// Normalizer defaulting to the current local year
    pub fn current() -> Self {
        Self::new(Local::now().year())
    }

    pub fn default_year(&self) -> i32 {
        self.default_year
    }

    pub fn normalize(&self, text: Option<&str>) -> DateRange {
        let Some(text) = text else {
            return DateRange::default();
        };
        let cleaned = clean(text);
        if cleaned.is_empty() {
            return DateRange::default();
        }

        let parts: Vec<&str> = cleaned
            .split(RANGE_SEPARATOR)
            .map(|p| p.trim_matches('/'))
            .collect();

        match parts.as_slice() {
            [single] => DateRange::single(self.parse_leading(single)),
            [left, .., right] => {
                let start = self.parse_leading(left);
                let end = DateToken::parse(right).and_then(|token| match start {
                    Some(anchor) => token.resolve_after(anchor),
                    None => token.resolve(self.default_year),
                });
                DateRange { start, end }
            }
            [] => DateRange::default(),
        }
    }

    fn parse_leading(&self, fragment: &str) -> Option<NaiveDate> {
        DateToken::parse(fragment).and_then(|token| token.resolve(self.default_year))
    }
}

impl Default for DateRangeNormalizer {
    fn default() -> Self {
        Self::current()
    }
}

/// Normalize `text` using the current year as the default year
pub fn normalize(text: Option<&str>) -> DateRange {
    DateRangeNormalizer::current().normalize(text)
}

/// Normalize `text` with an explicit default year
pub fn normalize_with_year(text: Option<&str>, default_year: i32) -> DateRange {
    DateRangeNormalizer::new(default_year).normalize(text)
}

/// Rewrite a raw cell into `Y/M/D〜Y/M/D` shape. Weekday kanji share
/// characters with the 月/日 date markers, so markers are only recognized
/// directly after a digit and leftover kanji are removed afterwards.
fn clean(text: &str) -> String {
    let folded = fold_full_width(text);

    let mut stripped = folded;
    loop {
        let next = PARENTHETICAL.replace_all(&stripped, "").into_owned();
        if next == stripped {
            break;
        }
        stripped = next;
    }

    let no_time = TIME_OF_DAY.replace_all(&stripped, "");
    let compact: String = no_time.chars().filter(|c| !c.is_whitespace()).collect();
    let slashed = DELIMITED_YMD.replace_all(&compact, "${1}/${2}/${3}");
    let slashed = DOTTED_MONTH_DAY.replace_all(&slashed, "${1}/${2}");
    let no_weekday = WEEKDAY_WORD.replace_all(&slashed, "");

    let mut separated = String::with_capacity(no_weekday.len());
    for c in no_weekday.chars() {
        if SEPARATOR_GLYPHS.contains(&c) {
            if !separated.ends_with(RANGE_SEPARATOR) {
                separated.push(RANGE_SEPARATOR);
            }
        } else {
            separated.push(c);
        }
    }

    let marked = DATE_MARKER.replace_all(&separated, |caps: &Captures| match &caps[2] {
        "日" => caps[1].to_string(),
        _ => format!("{}/", &caps[1]),
    });

    STRAY_WEEKDAY.replace_all(&marked, "").into_owned()
}

fn fold_full_width(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
            '／' => '/',
            '：' => ':',
            '．' => '.',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn range(text: &str) -> DateRange {
        normalize_with_year(Some(text), 2026)
    }

    #[test]
    fn test_empty_input_yields_empty_range() {
        assert!(normalize_with_year(None, 2026).is_empty());
        assert!(range("").is_empty());
        assert!(range("   ").is_empty());
        assert!(range("（未定）").is_empty());
    }

    #[test]
    fn test_single_japanese_date() {
        let r = range("2026年2月18日");
        assert_eq!(r.start, ymd(2026, 2, 18));
        assert_eq!(r.end, ymd(2026, 2, 18));
    }

    #[test]
    fn test_right_side_inherits_left_year() {
        let r = normalize_with_year(Some("2026年2月18日（水）〜2月20日（金）"), 2031);
        assert_eq!(r.start, ymd(2026, 2, 18));
        assert_eq!(r.end, ymd(2026, 2, 20));
    }

    #[test]
    fn test_right_side_with_day_only_inherits_month() {
        let r = range("2026年2月18日(水)～20日(金)");
        assert_eq!(r.start, ymd(2026, 2, 18));
        assert_eq!(r.end, ymd(2026, 2, 20));
    }

    #[test]
    fn test_range_crossing_year_end_rolls_forward() {
        let r = range("2026年12月28日〜1月5日");
        assert_eq!(r.start, ymd(2026, 12, 28));
        assert_eq!(r.end, ymd(2027, 1, 5));

        let r = range("2026年12月30日〜2日");
        assert_eq!(r.end, ymd(2027, 1, 2));
    }

    #[test]
    fn test_month_day_defaults_to_default_year() {
        let r = range("3/1");
        assert_eq!(r.start, ymd(2026, 3, 1));
        assert_eq!(r.end, ymd(2026, 3, 1));
    }

    #[test]
    fn test_full_width_digits_and_bare_weekdays() {
        let r = range("２０２６年２月１８日");
        assert_eq!(r.start, ymd(2026, 2, 18));

        let r = range("2/18水〜2/20金");
        assert_eq!(r.start, ymd(2026, 2, 18));
        assert_eq!(r.end, ymd(2026, 2, 20));

        let r = range("2026年2月16日月曜日〜2月18日水曜日");
        assert_eq!(r.start, ymd(2026, 2, 16));
        assert_eq!(r.end, ymd(2026, 2, 18));
    }

    #[test]
    fn test_unparenthesized_monday_after_day() {
        // the trailing 月 reads like a month marker but must not break the date
        let r = range("2/16月〜2/18水");
        assert_eq!(r.start, ymd(2026, 2, 16));
        assert_eq!(r.end, ymd(2026, 2, 18));
    }

    #[test]
    fn test_time_annotations_are_ignored() {
        let r = range("2026/2/18 10:00〜17:00");
        assert_eq!(r.start, ymd(2026, 2, 18));
        assert_eq!(r.end, ymd(2026, 2, 18));
    }

    #[test]
    fn test_iso_dates_survive_dash_normalization() {
        let r = range("2026-03-01");
        assert_eq!(r.start, ymd(2026, 3, 1));
        assert_eq!(r.end, ymd(2026, 3, 1));

        let r = range("2026-03-01〜2026-03-03");
        assert_eq!(r.start, ymd(2026, 3, 1));
        assert_eq!(r.end, ymd(2026, 3, 3));
    }

    #[test]
    fn test_dotted_dates() {
        let r = range("2026.3.1〜3.3");
        assert_eq!(r.start, ymd(2026, 3, 1));
        assert_eq!(r.end, ymd(2026, 3, 3));
    }

    #[test]
    fn test_left_failure_keeps_right_without_inheritance() {
        let r = normalize_with_year(Some("近日公開〜2月20日"), 2031);
        assert_eq!(r.start, None);
        assert_eq!(r.end, ymd(2031, 2, 20));
    }

    #[test]
    fn test_invalid_calendar_dates_are_dropped() {
        assert!(range("2026年2月30日").is_empty());
        let r = range("2026年2月18日〜13月1日");
        assert_eq!(r.start, ymd(2026, 2, 18));
        assert_eq!(r.end, None);
    }

    #[test]
    fn test_labelled_cells_still_parse() {
        let r = range("会期：2026年2月18日〜2月20日");
        assert_eq!(r.start, ymd(2026, 2, 18));
        assert_eq!(r.end, ymd(2026, 2, 20));

        let r = range("会期：2026年2月18日");
        assert_eq!(r.start, ymd(2026, 2, 18));
        assert_eq!(r.end, ymd(2026, 2, 18));

        let r = range("開催日 3/7 予定");
        assert_eq!(r.start, ymd(2026, 3, 7));

        let r = range("期間：2026/4/8〜4/10まで");
        assert_eq!(r.end, ymd(2026, 4, 10));
    }

    #[test]
    fn test_bare_day_alone_is_unparseable() {
        assert!(range("18日").is_empty());
        assert!(range("会期未定").is_empty());
    }

    #[test]
    fn test_repeated_and_dangling_separators() {
        let r = range("2026/2/18〜〜2/20");
        assert_eq!(r.end, ymd(2026, 2, 20));

        let r = range("2026/2/18〜");
        assert_eq!(r.start, ymd(2026, 2, 18));
        assert_eq!(r.end, None);
    }

    #[test]
    fn test_display_renders_iso_pair() {
        assert_eq!(range("2026年2月18日〜2月20日").to_string(), "2026-02-18〜2026-02-20");
        assert_eq!(DateRange::default().to_string(), "〜");
    }
}
