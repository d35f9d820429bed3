use chrono::NaiveDate;
use expo_scraper::assembler::{sort_records, AssemblerConfig, EventRecordAssembler};
use expo_scraper::types::{EventRecord, RawRow, Source};

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
}

fn assembler() -> EventRecordAssembler {
    EventRecordAssembler::new(run_date(), AssemblerConfig::default())
}

fn parse_rows(json: &str) -> Vec<RawRow> {
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_expo_a_collapses_to_one_record() {
    let rows = parse_rows(
        r#"[
            {"source":"makuhari","title":"Expo A","dateText":"2026年3月1日〜3月3日","venue":"Hall 1","url":"http://x"},
            {"source":"makuhari","title":"Expo A","dateText":"2026/3/1","venue":"Hall 1","url":"http://x"}
        ]"#,
    );

    let assembly = assembler().assemble_with_report(rows);

    assert_eq!(assembly.records.len(), 1);
    let record = &assembly.records[0];
    assert_eq!(record.start_date, NaiveDate::from_ymd_opt(2026, 3, 1));
    assert_eq!(record.end_date, NaiveDate::from_ymd_opt(2026, 3, 3));
    assert_eq!(record.last_seen_at, run_date());
    assert_eq!(assembly.tallies["makuhari"].duplicates, 1);
}

#[test]
fn test_first_of_duplicates_wins_regardless_of_venue() {
    let rows = parse_rows(
        r#"[
            {"source":"bigsight","title":"ギフト・ショー","dateText":"2026/2/4","venue":"東1ホール","url":"https://x/1"},
            {"source":"bigsight","title":"ギフト・ショー","dateText":"2026/2/4","venue":"西展示棟","url":"https://x/1"}
        ]"#,
    );

    let records = assembler().assemble(rows);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].venue.as_deref(), Some("東1ホール"));
}

#[test]
fn test_undated_and_untitled_rows_are_dropped() {
    let rows = parse_rows(
        r#"[
            {"source":"makuhari","title":"Expo B","dateText":"日程未定","venue":null,"url":null},
            {"source":"makuhari","title":null,"dateText":"2026/3/1","venue":null,"url":null},
            {"source":"makuhari","title":"Expo C","dateText":"2026/3/9","venue":null,"url":null}
        ]"#,
    );

    let assembly = assembler().assemble_with_report(rows);

    assert_eq!(assembly.records.len(), 1);
    assert_eq!(assembly.records[0].title, "Expo C");
    assert_eq!(assembly.tallies["makuhari"].rejected, 2);
}

#[test]
fn test_null_start_dates_sort_last() {
    let record = |start: Option<NaiveDate>| EventRecord {
        source: Source::Makuhari,
        title: "Expo".to_string(),
        start_date: start,
        end_date: None,
        venue: None,
        url: None,
        last_seen_at: run_date(),
    };
    let mut records = vec![
        record(NaiveDate::from_ymd_opt(2026, 5, 1)),
        record(None),
        record(NaiveDate::from_ymd_opt(2026, 1, 10)),
    ];

    sort_records(&mut records);

    let starts: Vec<Option<String>> = records
        .iter()
        .map(|r| r.start_date.map(|d| d.to_string()))
        .collect();
    assert_eq!(
        starts,
        vec![Some("2026-01-10".to_string()), Some("2026-05-01".to_string()), None]
    );
}

#[test]
fn test_title_minimum_comes_from_config() {
    let config: AssemblerConfig = toml::from_str("[min_title_chars]\nmakuhari = 4\n").unwrap();
    let assembler = EventRecordAssembler::new(run_date(), config);
    let rows = parse_rows(
        r#"[
            {"source":"makuhari","title":"CES","dateText":"2026/3/1","venue":null,"url":null},
            {"source":"kagaku","title":"天文","dateText":"2026/3/1","venue":null,"url":null}
        ]"#,
    );

    let records = assembler.assemble(rows);

    // makuhari is now strict and kagaku lost its default entry
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source, Source::Kagaku);
}

#[test]
fn test_labelled_date_cell_is_accepted() {
    let rows = parse_rows(
        r#"[
            {"source":"bigsight","title":"ギフト・ショー","dateText":"会期：2026年2月18日〜2月20日","venue":null,"url":null}
        ]"#,
    );

    let records = assembler().assemble(rows);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].start_date, NaiveDate::from_ymd_opt(2026, 2, 18));
    assert_eq!(records[0].end_date, NaiveDate::from_ymd_opt(2026, 2, 20));
}
