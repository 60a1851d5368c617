//! Corpus files of scraped abstract records.
//!
//! A corpus is either a JSON array of records or JSON Lines (one record per
//! line, blank lines ignored). The format is detected from the first
//! non-whitespace character.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AbstrakError, Result};
use crate::track::{LabelOrigin, Track};

/// One scraped record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CorpusRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, deserialize_with = "deserialize_year")]
    pub year: Option<i32>,
    #[serde(default)]
    pub abstract_text: String,
    #[serde(default)]
    pub url: Option<String>,
    /// Ground-truth label ("RPL"/"TKJ", any case), when known.
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_origin: Option<LabelOrigin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_label: Option<Track>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl CorpusRecord {
    /// Parsed ground-truth label. Blank labels count as absent.
    pub fn track(&self) -> Result<Option<Track>> {
        match self.label.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(label) => label.parse().map(Some),
        }
    }
}

/// Years arrive as numbers or as strings such as `"2021"`.
fn deserialize_year<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Parse corpus text in either format.
pub fn parse_corpus(content: &str) -> Result<Vec<CorpusRecord>> {
    let trimmed = content.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| {
                AbstrakError::invalid_argument(format!("corpus line {}: {e}", i + 1))
            })
        })
        .collect()
}

/// Read a corpus file.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<CorpusRecord>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let records = parse_corpus(&content)?;
    debug!("Read {} records from {}", records.len(), path.as_ref().display());
    Ok(records)
}

/// Write records as JSON Lines, or as a pretty JSON array when `pretty`.
pub fn write_corpus<P: AsRef<Path>>(path: P, records: &[CorpusRecord], pretty: bool) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, records)?;
        writeln!(writer)?;
    } else {
        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_json_array() {
        let content = r#"[
            {"title": "A", "abstract_text": "jaringan", "year": "2021", "label": "tkj"},
            {"title": "B", "abstract_text": "aplikasi", "year": 2020, "label": null}
        ]"#;
        let records = parse_corpus(content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].year, Some(2021));
        assert_eq!(records[0].track().unwrap(), Some(Track::Tkj));
        assert_eq!(records[1].year, Some(2020));
        assert_eq!(records[1].track().unwrap(), None);
    }

    #[test]
    fn test_parse_json_lines() {
        let content = "{\"title\": \"A\", \"label\": \"RPL\"}\n\n{\"title\": \"B\", \"year\": \"n.d.\"}\n";
        let records = parse_corpus(content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].track().unwrap(), Some(Track::Rpl));
        assert_eq!(records[1].year, None);
    }

    #[test]
    fn test_bad_line_reports_position() {
        let err = parse_corpus("{\"title\": \"A\"}\nnot json\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_invalid_label() {
        let record = CorpusRecord {
            label: Some("MM".to_string()),
            ..CorpusRecord::default()
        };
        assert!(record.track().is_err());
    }

    #[test]
    fn test_write_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.jsonl");
        let records = vec![CorpusRecord {
            title: "Judul".to_string(),
            abstract_text: "jaringan komputer".to_string(),
            predicted_label: Some(Track::Tkj),
            confidence: Some(0.75),
            ..CorpusRecord::default()
        }];
        write_corpus(&path, &records, false).unwrap();
        assert_eq!(load_corpus(&path).unwrap(), records);

        write_corpus(&path, &records, true).unwrap();
        assert_eq!(load_corpus(&path).unwrap(), records);
    }
}
