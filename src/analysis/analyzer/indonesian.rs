//! Analyzer for Indonesian academic abstracts.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::analysis::analyzer::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::char_filter::{LowercaseCharFilter, PatternReplaceCharFilter};
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::stem::{IndonesianStemmer, RootDictionary, StemFilter};
use crate::analysis::token_filter::{LengthFilter, RemoveEmptyFilter, StopFilter};
use crate::analysis::tokenizer::WhitespaceTokenizer;
use crate::error::Result;

const URL_PATTERN: &str = r"http\S+|www\S+|https\S+";
const EMAIL_PATTERN: &str = r"\S+@\S+";
const DIGIT_PATTERN: &str = r"\d+";
const ASCII_PUNCT_PATTERN: &str = r"[[:punct:]]";
const SYMBOL_PATTERN: &str = r"[^\w\s]";
const WHITESPACE_PATTERN: &str = r"\s+";

/// Lowercase, strip URLs, e-mails, digits and punctuation, split on
/// whitespace, drop short tokens and stop words, stem.
///
/// Stemming can turn a token into a stop word or a very short root
/// ("menggunakan" becomes "guna"), so the length and stop filters run again
/// after the stem filter. That keeps the analyzer idempotent on its own output.
pub struct IndonesianAnalyzer {
    inner: PipelineAnalyzer,
    stem_filter: Arc<StemFilter>,
}

impl IndonesianAnalyzer {
    /// Create the analyzer with the embedded root dictionary.
    pub fn new() -> Result<Self> {
        Self::with_dictionary(RootDictionary::embedded())
    }

    /// Create the analyzer with a custom root dictionary.
    pub fn with_dictionary(dictionary: Arc<RootDictionary>) -> Result<Self> {
        let stem_filter = Arc::new(StemFilter::with_stemmer(Box::new(
            IndonesianStemmer::with_dictionary(dictionary),
        )));
        let length = Arc::new(LengthFilter::default());
        let stop = Arc::new(StopFilter::new());

        let inner = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
            .add_char_filter(Arc::new(LowercaseCharFilter::new()))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::remove(URL_PATTERN)?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::remove(EMAIL_PATTERN)?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::remove(DIGIT_PATTERN)?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::remove(
                ASCII_PUNCT_PATTERN,
            )?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::remove(SYMBOL_PATTERN)?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new(
                WHITESPACE_PATTERN,
                " ",
            )?))
            .add_filter(length.clone())
            .add_filter(stop.clone())
            .add_filter(stem_filter.clone())
            .add_filter(length)
            .add_filter(stop)
            .add_filter(Arc::new(RemoveEmptyFilter::new()))
            .with_name("indonesian");

        Ok(Self { inner, stem_filter })
    }

    /// Run only the cleaning stages (lowercasing through whitespace collapse).
    pub fn clean(&self, text: &str) -> String {
        self.inner.filter_chars(text).trim().to_string()
    }

    /// The stem filter used by this analyzer.
    pub fn stem_filter(&self) -> &StemFilter {
        &self.stem_filter
    }
}

impl Analyzer for IndonesianAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "indonesian"
    }
}

impl Debug for IndonesianAnalyzer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndonesianAnalyzer")
            .field("inner", &self.inner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean() {
        let analyzer = IndonesianAnalyzer::new().unwrap();
        let cleaned = analyzer.clean(
            "ABSTRAK: Sistem v2.0 (lihat https://contoh.ac.id, email admin@kampus.ac.id)!",
        );
        assert_eq!(cleaned, "abstrak sistem v lihat email");
    }

    #[test]
    fn test_full_pipeline() {
        let analyzer = IndonesianAnalyzer::new().unwrap();
        let terms = analyzer
            .terms("Pengujian jaringan yang menggunakan Mikrotik di sekolah")
            .unwrap();
        // "menggunakan" stems to the stop word "guna" and is dropped
        assert_eq!(terms, vec!["uji", "jaring", "mikrotik", "sekolah"]);
    }

    #[test]
    fn test_name() {
        assert_eq!(IndonesianAnalyzer::new().unwrap().name(), "indonesian");
    }
}
