use chrono::NaiveDate;
use expo_scraper::normalize::date_range::SEPARATOR_GLYPHS;
use expo_scraper::normalize::{normalize, normalize_with_year, DateRange};

fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

#[test]
fn test_empty_and_missing_text_yield_no_dates() {
    for text in [None, Some(""), Some("   "), Some("\u{3000}")] {
        assert_eq!(normalize(text), DateRange::default(), "{:?}", text);
    }
}

#[test]
fn test_single_and_explicit_ranges() {
    assert_eq!(
        normalize(Some("2026年2月18日")),
        DateRange { start: ymd(2026, 2, 18), end: ymd(2026, 2, 18) }
    );
    assert_eq!(
        normalize(Some("2026年2月18日〜2026年2月20日")),
        DateRange { start: ymd(2026, 2, 18), end: ymd(2026, 2, 20) }
    );
    assert_eq!(
        normalize(Some("2026年2月18日（水）〜2月20日（金）")),
        DateRange { start: ymd(2026, 2, 18), end: ymd(2026, 2, 20) }
    );
}

#[test]
fn test_every_separator_glyph_gives_the_same_range() {
    let expected = DateRange { start: ymd(2026, 2, 18), end: ymd(2026, 2, 20) };
    for glyph in SEPARATOR_GLYPHS {
        let text = format!("2026年2月18日（水）{}2月20日（金）", glyph);
        assert_eq!(normalize(Some(text.as_str())), expected, "separator {:?}", glyph);
    }
}

#[test]
fn test_iso_output_round_trips() {
    let inputs = [
        "2026年2月18日（水）〜2月20日（金）",
        "2026年12月28日〜1月5日",
        "2026/4/8－4/10",
        "2026.3.1～3.3",
        "2026年7月7日",
    ];
    for text in inputs {
        let first = normalize_with_year(Some(text), 2026);
        let rebuilt = first.to_string();
        assert_eq!(normalize_with_year(Some(rebuilt.as_str()), 1999), first, "{} -> {}", text, rebuilt);
    }
}

#[test]
fn test_cross_year_range_rolls_forward() {
    assert_eq!(
        normalize(Some("2026年12月28日〜1月5日")),
        DateRange { start: ymd(2026, 12, 28), end: ymd(2027, 1, 5) }
    );
}
