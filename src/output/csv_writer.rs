use crate::constants::OUTPUT_COLUMNS;
use crate::error::Result;
use crate::types::EventRecord;
use csv::WriterBuilder;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

// Spreadsheet apps need the BOM to pick UTF-8 for Japanese text
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write the BOM, the fixed header and one line per record. The header is
/// written even when there are no records.
pub fn write_records<W: Write>(mut writer: W, records: &[EventRecord]) -> Result<()> {
    writer.write_all(UTF8_BOM)?;
    let mut csv = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv.write_record(OUTPUT_COLUMNS)?;
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write `records` to `path`, creating parent directories as needed
pub fn write_csv(path: &Path, records: &[EventRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_records(BufWriter::new(file), records)?;
    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Source;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expo_a() -> EventRecord {
        EventRecord {
            source: Source::Makuhari,
            title: "Expo A".to_string(),
            start_date: Some(date(2026, 3, 1)),
            end_date: Some(date(2026, 3, 3)),
            venue: Some("幕張メッセ".to_string()),
            url: None,
            last_seen_at: date(2026, 1, 15),
        }
    }

    #[test]
    fn test_writes_bom_header_and_rows() {
        let mut buf = Vec::new();
        write_records(&mut buf, &[expo_a()]).unwrap();

        assert!(buf.starts_with(UTF8_BOM));
        let text = String::from_utf8(buf[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "source,title,start_date,end_date,venue,url,last_seen_at");
        assert_eq!(lines[1], "makuhari,Expo A,2026-03-01,2026-03-03,幕張メッセ,,2026-01-15");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let mut record = expo_a();
        record.title = "Robots, Drones & AI".to_string();
        record.start_date = None;
        let mut buf = Vec::new();
        write_records(&mut buf, &[record]).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("makuhari,\"Robots, Drones & AI\",,2026-03-03,"));
    }

    #[test]
    fn test_write_csv_creates_directories_and_header_only_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("events.csv");
        write_csv(&path, &[]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "\u{FEFF}source,title,start_date,end_date,venue,url,last_seen_at\n"
        );
    }
}
