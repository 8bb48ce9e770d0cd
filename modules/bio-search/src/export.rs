use std::path::{Path, PathBuf};

use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::info;

use crate::error::Result;
use crate::types::Match;

pub const JSON_FILE_NAME: &str = "instagram_bio_search_results.json";
pub const CSV_FILE_NAME: &str = "instagram_bio_search_results.csv";

const CSV_HEADER: &str = "username,full_name,bio,url,status\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
    Both,
}

/// Pretty-printed JSON array of matches. Non-ASCII text is kept verbatim.
pub fn to_json(matches: &[Match]) -> Result<String> {
    Ok(serde_json::to_string_pretty(matches)?)
}

/// CSV with every field quoted and embedded quotes doubled. Newlines in the
/// bio become single spaces, so the bio column is not reversible.
pub fn to_csv(matches: &[Match]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(CSV_HEADER.as_bytes().to_vec());

    for m in matches {
        writer.write_record([
            m.username.as_str(),
            m.full_name.as_str(),
            collapse_newlines(&m.bio).as_str(),
            m.profile_url.as_str(),
            m.status.label(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| crate::error::BioSearchError::Export(e.to_string()))
}

/// Replace each line break (`\r\n`, `\n` or `\r`) with one space.
pub fn collapse_newlines(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// Write the requested formats into `dir`, returning the files written.
pub fn write_exports(matches: &[Match], dir: &Path, format: ExportFormat) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    if matches!(format, ExportFormat::Json | ExportFormat::Both) {
        let path = dir.join(JSON_FILE_NAME);
        std::fs::write(&path, to_json(matches)?)?;
        written.push(path);
    }
    if matches!(format, ExportFormat::Csv | ExportFormat::Both) {
        let path = dir.join(CSV_FILE_NAME);
        std::fs::write(&path, to_csv(matches)?)?;
        written.push(path);
    }

    info!(count = matches.len(), files = written.len(), "Exported matches");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{profile_url, Visibility};

    fn hit(username: &str, full_name: &str, bio: &str, is_private: bool) -> Match {
        Match {
            username: username.into(),
            full_name: full_name.into(),
            bio: bio.into(),
            profile_url: profile_url(username),
            is_private,
            status: Visibility::from_private(is_private),
        }
    }

    #[test]
    fn csv_has_plain_header_and_quoted_rows() {
        let csv = to_csv(&[hit("alice", "Alice", "DM 05 only", false)]).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "username,full_name,bio,url,status");
        assert_eq!(
            lines[1],
            r#""alice","Alice","DM 05 only","https://www.instagram.com/alice/","Public""#
        );
    }

    #[test]
    fn csv_bio_escaping_parses_back_to_collapsed_text() {
        let bio = "She said \"hi\"\nthen left";
        let csv = to_csv(&[hit("q", "Q \"Quote\" Person", bio, true)]).unwrap();

        assert!(csv.contains(r#""She said ""hi"" then left""#));

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][1], "Q \"Quote\" Person");
        assert_eq!(&rows[0][2], "She said \"hi\" then left");
        assert_eq!(&rows[0][4], "Private");
    }

    #[test]
    fn every_line_break_style_collapses_to_one_space() {
        assert_eq!(collapse_newlines("a\r\nb\nc\rd"), "a b c d");
    }

    #[test]
    fn json_is_pretty_and_keeps_unicode() {
        let json = to_json(&[hit("yuki", "雪", "05年生まれ", false)]).unwrap();
        assert!(json.contains("\n  {"));
        assert!(json.contains("05年生まれ"));

        let back: Vec<Match> = serde_json::from_str(&json).unwrap();
        assert_eq!(back[0].username, "yuki");
        assert_eq!(back[0].profile_url, "https://www.instagram.com/yuki/");
    }

    #[test]
    fn empty_match_list_exports_header_only() {
        assert_eq!(to_csv(&[]).unwrap(), "username,full_name,bio,url,status\n");
        assert_eq!(to_json(&[]).unwrap(), "[]");
    }

    #[test]
    fn write_exports_honours_format() {
        let dir = tempfile::tempdir().unwrap();
        let matches = [hit("a", "A", "05", false)];

        let csv_only = write_exports(&matches, dir.path(), ExportFormat::Csv).unwrap();
        assert_eq!(csv_only, vec![dir.path().join(CSV_FILE_NAME)]);

        let both = write_exports(&matches, dir.path(), ExportFormat::Both).unwrap();
        assert_eq!(both.len(), 2);
        assert!(dir.path().join(JSON_FILE_NAME).exists());
    }
}
