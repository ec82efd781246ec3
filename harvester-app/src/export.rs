//! The two sinks: a console listing and a dated CSV file.
//!
//! Both only read the sorted records.
use crate::csv::{SEPARATOR, write_row};
use chrono::NaiveDateTime;
use harvester_common::{HarvesterError, PostRecord};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const CSV_HEADER: [&str; 4] = ["Account", "Datum", "Uhrzeit", "Inhalt"];

const RULE_WIDTH: usize = 80;
const TITLE: &str = "MASTODON TODO POSTS";
const ELLIPSIS: &str = "...";
pub const EMPTY_NOTICE: &str = "No todo posts found.";

/// First `max_chars` characters of `content`, with `...` only if something was cut.
pub fn preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &content[..cut]),
        None => content.to_string(),
    }
}

/// Console sink: banner plus one numbered block per record.
pub fn render_listing<W: Write>(
    records: &[PostRecord],
    preview_chars: usize,
    out: &mut W,
) -> io::Result<()> {
    if records.is_empty() {
        writeln!(out, "\n{EMPTY_NOTICE}")?;
        return Ok(());
    }

    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "\n{rule}")?;
    writeln!(out, "{TITLE:^RULE_WIDTH$}")?;
    writeln!(out, "{rule}\n")?;

    let divider = "-".repeat(RULE_WIDTH);
    for (i, record) in records.iter().enumerate() {
        writeln!(out, "[{}] Account: {}", i + 1, record.account)?;
        writeln!(out, "    Date: {} | Time: {}", record.date, record.time)?;
        writeln!(out, "    Content: {}", preview(&record.content, preview_chars))?;
        writeln!(out, "{divider}\n")?;
    }
    Ok(())
}

/// `<prefix><YYYYMMDD_HHMMSS>.csv`
pub fn csv_file_name(prefix: &str, stamp: NaiveDateTime) -> String {
    format!("{prefix}{}.csv", stamp.format("%Y%m%d_%H%M%S"))
}

/// File sink. Returns the written path, or `None` when there was nothing to write.
pub fn write_csv(
    records: &[PostRecord],
    dir: &Path,
    prefix: &str,
    stamp: NaiveDateTime,
) -> Result<Option<PathBuf>, HarvesterError> {
    if records.is_empty() {
        tracing::warn!("no posts to save, skipping CSV export");
        return Ok(None);
    }

    let path = dir.join(csv_file_name(prefix, stamp));
    let export_err = |source: io::Error| HarvesterError::Export {
        path: path.display().to_string(),
        source,
    };

    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir).map_err(export_err)?;
    }
    let file = fs::File::create(&path).map_err(export_err)?;
    let mut w = BufWriter::new(file);

    write_row(&mut w, &CSV_HEADER, SEPARATOR).map_err(export_err)?;
    for r in records {
        let row = [
            r.account.as_str(),
            r.date.as_str(),
            r.time.as_str(),
            r.content.as_str(),
        ];
        write_row(&mut w, &row, SEPARATOR).map_err(export_err)?;
    }
    w.flush().map_err(export_err)?;

    tracing::info!(count = records.len(), path = %path.display(), "saved posts to CSV");
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::parse_rows;
    use chrono::NaiveDate;
    use harvester_common::NOT_AVAILABLE;
    use tempfile::TempDir;

    fn record(account: &str, date: &str, time: &str, content: &str) -> PostRecord {
        PostRecord {
            account: account.into(),
            date: date.into(),
            time: time.into(),
            content: content.into(),
            visibility: "public".into(),
        }
    }

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    #[test]
    fn preview_cuts_on_characters() {
        assert_eq!(preview("short", 150), "short");
        assert_eq!(preview("exact", 5), "exact");
        assert_eq!(preview("abcdef", 5), "abcde...");
        assert_eq!(preview("äöüßé!", 3), "äöü...");
        assert_eq!(preview("", 0), "");
    }

    #[test]
    fn listing_for_empty_collection_is_a_notice() {
        let mut out = Vec::new();
        render_listing(&[], 150, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.trim(), EMPTY_NOTICE);
        assert!(!text.contains(TITLE));
    }

    #[test]
    fn listing_numbers_records_and_truncates() {
        let long = "x".repeat(200);
        let records = vec![
            record("alice", "2024-01-02", "10:00:00", "Buy milk"),
            record("bob", NOT_AVAILABLE, NOT_AVAILABLE, &long),
        ];
        let mut out = Vec::new();
        render_listing(&records, 150, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains(TITLE));
        assert!(text.contains("[1] Account: alice"));
        assert!(text.contains("    Date: 2024-01-02 | Time: 10:00:00"));
        assert!(text.contains("    Content: Buy milk\n"));
        assert!(text.contains("[2] Account: bob"));
        assert!(text.contains(&format!("    Content: {}...\n", "x".repeat(150))));
        assert!(!text.contains(&"x".repeat(151)));
    }

    #[test]
    fn file_name_embeds_fourteen_digit_stamp() {
        assert_eq!(
            csv_file_name("mastodon_todos_", stamp()),
            "mastodon_todos_20240102_030405.csv"
        );
    }

    #[test]
    fn empty_collection_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let written = write_csv(&[], tmp.path(), "mastodon_todos_", stamp()).unwrap();
        assert!(written.is_none());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn csv_round_trips_four_columns() {
        let tmp = TempDir::new().unwrap();
        let records = vec![
            record("alice", "2024-01-02", "10:00:00", "Buy milk"),
            record("bob", NOT_AVAILABLE, NOT_AVAILABLE, "Fix the bike"),
        ];
        let path = write_csv(&records, tmp.path(), "mastodon_todos_", stamp())
            .unwrap()
            .unwrap();

        let bytes = fs::read(&path).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("Account,Datum,Uhrzeit,Inhalt\r\n"));

        let rows = parse_rows(&text, SEPARATOR);
        assert_eq!(rows.len(), 3);
        for (row, r) in rows[1..].iter().zip(&records) {
            let expected = [&r.account, &r.date, &r.time, &r.content];
            assert_eq!(row.iter().collect::<Vec<_>>(), expected);
        }
    }

    #[test]
    fn csv_quotes_separators_and_quotes() {
        let tmp = TempDir::new().unwrap();
        let records = vec![record("team, inc", "2024-01-02", "10:00:00", "say \"done\"")];
        let path = write_csv(&records, tmp.path(), "t_", stamp()).unwrap().unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"team, inc\",2024-01-02,10:00:00,\"say \"\"done\"\"\"\r\n"));

        let rows = parse_rows(&text, SEPARATOR);
        assert_eq!(rows[1][0], "team, inc");
        assert_eq!(rows[1][3], "say \"done\"");
    }

    #[test]
    fn creates_missing_output_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("exports").join("2024");
        let records = vec![record("a", "2024-01-02", "10:00:00", "x")];
        let path = write_csv(&records, &dir, "p_", stamp()).unwrap().unwrap();
        assert!(path.starts_with(&dir));
        assert!(path.exists());
    }

    #[test]
    fn unwritable_target_is_an_export_error() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        fs::write(&blocker, "file in the way").unwrap();
        let records = vec![record("a", "2024-01-02", "10:00:00", "x")];
        let err = write_csv(&records, &blocker, "p_", stamp()).unwrap_err();
        assert!(matches!(err, HarvesterError::Export { .. }));
    }
}
