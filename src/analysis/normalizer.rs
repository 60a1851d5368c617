//! Raw abstract text to normalized, stemmed text.
//!
//! # Examples
//!
//! ```
//! use abstrak::analysis::TextNormalizer;
//!
//! let normalizer = TextNormalizer::new().unwrap();
//! let normalized = normalizer.normalize("Perancangan Jaringan Komputer (2021)");
//! assert_eq!(normalized, "rancang jaring komputer");
//! assert_eq!(normalizer.normalize(&normalized), normalized);
//! assert_eq!(normalizer.normalize("   "), "");
//! ```

use std::sync::Arc;

use log::warn;
use rayon::prelude::*;

use crate::analysis::analyzer::{Analyzer, IndonesianAnalyzer};
use crate::analysis::token_filter::stem::RootDictionary;
use crate::error::Result;

/// Text normalizer for Indonesian abstracts.
///
/// Cheap to clone; clones share the stemmer cache.
#[derive(Clone, Debug)]
pub struct TextNormalizer {
    analyzer: Arc<IndonesianAnalyzer>,
    dictionary: Arc<RootDictionary>,
}

impl TextNormalizer {
    /// Create a normalizer over the embedded root dictionary.
    pub fn new() -> Result<Self> {
        Self::with_dictionary(RootDictionary::embedded())
    }

    /// Create a normalizer over a custom root dictionary.
    pub fn with_dictionary(dictionary: Arc<RootDictionary>) -> Result<Self> {
        Ok(Self {
            analyzer: Arc::new(IndonesianAnalyzer::with_dictionary(Arc::clone(&dictionary))?),
            dictionary,
        })
    }

    /// Root dictionary behind the stemmer.
    pub fn dictionary(&self) -> &Arc<RootDictionary> {
        &self.dictionary
    }

    /// Normalize one text. Never fails; empty or all-noise input yields `""`.
    pub fn normalize(&self, raw: &str) -> String {
        self.tokens(raw).join(" ")
    }

    /// Normalized tokens of one text.
    pub fn tokens(&self, raw: &str) -> Vec<String> {
        if raw.trim().is_empty() {
            return Vec::new();
        }
        match self.analyzer.terms(raw) {
            Ok(terms) => terms,
            Err(e) => {
                warn!("Analysis failed, treating text as empty: {e}");
                Vec::new()
            }
        }
    }

    /// Normalize many texts in parallel, preserving order.
    pub fn normalize_batch<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Vec<String> {
        texts
            .par_iter()
            .map(|text| self.normalize(text.as_ref()))
            .collect()
    }

    /// Lowercase and strip noise without tokenizing or stemming.
    pub fn clean(&self, raw: &str) -> String {
        self.analyzer.clean(raw)
    }

    /// Stem a single lowercase word.
    pub fn stem_word(&self, word: &str) -> String {
        self.analyzer.stem_filter().stem_word(word)
    }
}
