//! Root word dictionary for the Indonesian stemmer.
//!
//! The stemmer only accepts a stripping result that is a known root, so the
//! dictionary decides which words get stemmed at all. The embedded list covers
//! general Indonesian vocabulary plus the academic and computing terms common
//! in thesis abstracts. A fuller list (one root per line) can be loaded with
//! [`RootDictionary::from_file`].

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use crate::error::Result;

/// Embedded root list, one root per line, `#` starts a comment line.
const EMBEDDED_ROOTS: &str = include_str!("kata_dasar.txt");

/// The embedded dictionary, shared by every default stemmer.
pub static DEFAULT_ROOT_DICTIONARY: LazyLock<Arc<RootDictionary>> =
    LazyLock::new(|| Arc::new(RootDictionary::from_text(EMBEDDED_ROOTS)));

/// A set of known Indonesian root words.
#[derive(Clone, Debug, Default)]
pub struct RootDictionary {
    words: HashSet<String>,
}

impl RootDictionary {
    /// Build a dictionary from a list of roots. Entries are lowercased and trimmed.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        RootDictionary {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Load a dictionary file with one root per line. Blank lines and lines
    /// starting with `#` are skipped.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::from_text(&content))
    }

    /// Parse a root list in the same line format as [`from_file`](Self::from_file).
    pub fn from_text(content: &str) -> Self {
        Self::from_words(
            content
                .lines()
                .filter(|line| !line.trim_start().starts_with('#')),
        )
    }

    /// The embedded dictionary.
    pub fn embedded() -> Arc<RootDictionary> {
        Arc::clone(&DEFAULT_ROOT_DICTIONARY)
    }

    /// Add the roots of another dictionary to this one.
    pub fn merge(&mut self, other: &RootDictionary) {
        self.words.extend(other.words.iter().cloned());
    }

    /// All roots in lexicographic order.
    pub fn words(&self) -> Vec<&str> {
        let mut words: Vec<&str> = self.words.iter().map(String::as_str).collect();
        words.sort_unstable();
        words
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
