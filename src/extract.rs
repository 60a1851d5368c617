//! Text extraction from uploaded files.
//!
//! Only plain text is decoded in-crate; other formats plug in through the
//! [`TextExtractor`] trait. Whatever the format, the extracted text is reduced
//! to its abstract section by [`extract_abstract_section`].

use std::path::Path;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::error::{AbstrakError, Result};

/// Upload extensions accepted by the front end.
pub const ALLOWED_EXTENSIONS: &[&str] = &["txt", "pdf", "docx"];

/// Longest abstract kept, in characters.
pub const MAX_ABSTRACT_CHARS: usize = 3000;
/// Shortest section accepted as an abstract, in characters.
pub const MIN_ABSTRACT_CHARS: usize = 100;
/// Length of the leading text used when no section is found.
pub const FALLBACK_CHARS: usize = 1500;

static SECTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?is)abstrak\s*\n(.*?)\n\s*(?:kata kunci|bab\s+[ivx]|abstract|pendahuluan|daftar|chapter)",
        r"(?is)abstract\s*\n(.*?)\n\s*(?:keywords|chapter|bab\s+[ivx]|abstrak|pendahuluan)",
        r"(?is)(?:abstrak|abstract)\s*[:\n](.*)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("section pattern is a valid regex"))
    .collect()
});

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Cut the ABSTRAK/ABSTRACT section out of a full document.
///
/// The section runs from the heading to the next KATA KUNCI, KEYWORDS,
/// BAB n, CHAPTER, PENDAHULUAN, DAFTAR or other-language abstract heading.
/// A candidate is capped at 3000 characters and accepted from 100
/// characters; otherwise the first 1500 characters of the text are used.
pub fn extract_abstract_section(text: &str) -> String {
    for pattern in SECTION_PATTERNS.iter() {
        if let Some(section) = pattern.captures(text).and_then(|c| c.get(1)) {
            let candidate = truncate_chars(section.as_str().trim(), MAX_ABSTRACT_CHARS);
            if candidate.chars().count() >= MIN_ABSTRACT_CHARS {
                return candidate.to_string();
            }
        }
    }
    debug!("No abstract section found; using leading text");
    truncate_chars(text, FALLBACK_CHARS).trim().to_string()
}

/// Whether a file name carries an accepted upload extension.
pub fn is_allowed_file(name: &str) -> bool {
    extension_of(name).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Turns raw file bytes into text.
pub trait TextExtractor: Send + Sync {
    /// Whether this extractor handles the lowercase extension.
    fn supports(&self, extension: &str) -> bool;

    /// Decode the full text of a file.
    fn extract(&self, bytes: &[u8]) -> Result<String>;

    fn name(&self) -> &'static str;
}

/// UTF-8 plain-text extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn supports(&self, extension: &str) -> bool {
        extension == "txt"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| AbstrakError::extraction(format!("file is not valid UTF-8: {e}")))
    }

    fn name(&self) -> &'static str {
        "plain_text"
    }
}

/// Read a file and return its abstract section.
pub fn extract_file<P: AsRef<Path>>(path: P, extractor: &dyn TextExtractor) -> Result<String> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !is_allowed_file(&name) {
        return Err(AbstrakError::extraction(format!(
            "{name}: unsupported file type (allowed: {})",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    let ext = extension_of(&name).unwrap_or_default();
    if !extractor.supports(&ext) {
        return Err(AbstrakError::extraction(format!(
            "{name}: no extractor for .{ext} files ({} handles other types)",
            extractor.name()
        )));
    }

    let bytes = std::fs::read(path)?;
    let text = extractor.extract(&bytes)?;
    let section = extract_abstract_section(&text);
    if section.is_empty() {
        return Err(AbstrakError::extraction(format!("{name}: no text found")));
    }
    Ok(section)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn body(words: usize) -> String {
        vec!["jaringan komputer"; words].join(" ")
    }

    #[test]
    fn test_section_between_headings() {
        let text = format!(
            "HALAMAN JUDUL\nABSTRAK\n{}\nKata Kunci: jaringan\nBAB I\nPENDAHULUAN",
            body(10)
        );
        assert_eq!(extract_abstract_section(&text), body(10));
    }

    #[test]
    fn test_english_section() {
        let text = format!("Abstract\n{}\nKeywords: network", body(8));
        assert_eq!(extract_abstract_section(&text), body(8));
    }

    #[test]
    fn test_short_section_falls_back() {
        let text = "ABSTRAK\nterlalu pendek\nKATA KUNCI: x";
        assert_eq!(extract_abstract_section(text), text);
    }

    #[test]
    fn test_section_is_capped() {
        let long = "a".repeat(5000);
        let text = format!("Abstrak: {long}");
        assert_eq!(extract_abstract_section(&text).chars().count(), MAX_ABSTRACT_CHARS);
    }

    #[test]
    fn test_fallback_leading_text() {
        let text = "x".repeat(2000);
        assert_eq!(extract_abstract_section(&text).len(), FALLBACK_CHARS);
    }

    #[test]
    fn test_allowed_files() {
        assert!(is_allowed_file("skripsi.PDF"));
        assert!(is_allowed_file("a.b.docx"));
        assert!(is_allowed_file("abstrak.txt"));
        assert!(!is_allowed_file("gambar.png"));
        assert!(!is_allowed_file("noext"));
    }

    #[test]
    fn test_extract_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("abstrak.txt");
        std::fs::write(&path, format!("ABSTRAK\n{}\nBAB I", body(10))).unwrap();
        assert_eq!(extract_file(&path, &PlainTextExtractor).unwrap(), body(10));

        let pdf = dir.path().join("skripsi.pdf");
        std::fs::write(&pdf, b"%PDF").unwrap();
        assert!(matches!(
            extract_file(&pdf, &PlainTextExtractor),
            Err(AbstrakError::Extraction(_))
        ));
    }
}
