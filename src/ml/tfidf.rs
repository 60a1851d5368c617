//! TF-IDF vectorizer for text feature extraction.
//!
//! Input is normalized text. Terms are runs of two or more word characters,
//! expanded into n-grams over the configured span. Document-frequency pruning
//! and a vocabulary cap are applied at fit time; the fitted vocabulary and IDF
//! weights are frozen until the next fit.
//!
//! # Examples
//!
//! ```
//! use abstrak::ml::tfidf::{TfIdfVectorizer, VectorizerConfig};
//!
//! let corpus = vec![
//!     "jaring komputer router",
//!     "jaring router mikrotik",
//!     "aplikasi web sistem",
//!     "aplikasi sistem informasi",
//! ];
//! let mut vectorizer = TfIdfVectorizer::new(VectorizerConfig::default());
//! let rows = vectorizer.fit_transform(&corpus).unwrap();
//!
//! assert_eq!(rows.len(), 4);
//! assert!(vectorizer.feature_names().contains(&"jaring router".to_string()));
//! assert!((rows[0].norm() - 1.0).abs() < 1e-12);
//! ```

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::RegexTokenizer;
use crate::error::{AbstrakError, Result};
use crate::ml::sparse::SparseVector;

static TERM_TOKENIZER: LazyLock<RegexTokenizer> =
    LazyLock::new(|| RegexTokenizer::new().expect("term pattern is a valid regex"));

/// Settings of the TF-IDF vectorizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Keep at most this many terms, by corpus-wide count. `None` keeps all.
    pub max_features: Option<usize>,
    /// Inclusive n-gram span.
    pub ngram_range: (usize, usize),
    /// Minimum number of documents a term must occur in.
    pub min_df: usize,
    /// Maximum share of documents a term may occur in, in (0, 1].
    pub max_df: f64,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: Some(1000),
            ngram_range: (1, 2),
            min_df: 2,
            max_df: 0.8,
        }
    }
}

impl VectorizerConfig {
    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(AbstrakError::invalid_config(format!(
                "ngram_range must satisfy 1 <= min <= max, got ({min_n}, {max_n})"
            )));
        }
        if self.min_df == 0 {
            return Err(AbstrakError::invalid_config("min_df must be at least 1"));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(AbstrakError::invalid_config(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        if self.max_features == Some(0) {
            return Err(AbstrakError::invalid_config("max_features must be positive"));
        }
        Ok(())
    }
}

/// TF-IDF vectorizer with document-frequency pruning and a vocabulary cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    config: VectorizerConfig,
    /// Term -> column index.
    vocabulary: HashMap<String, usize>,
    /// Terms in column order (lexicographic).
    feature_names: Vec<String>,
    /// Inverse document frequency per column.
    idf: Vec<f64>,
    /// Number of documents seen by `fit`.
    n_documents: usize,
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(config: VectorizerConfig) -> Self {
        Self {
            config,
            vocabulary: HashMap::new(),
            feature_names: Vec::new(),
            idf: Vec::new(),
            n_documents: 0,
        }
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        !self.feature_names.is_empty()
    }

    /// Terms of one document, n-grams included, in order of appearance.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let tokens = TERM_TOKENIZER.terms(text);
        let (min_n, max_n) = self.config.ngram_range;
        let mut terms = Vec::new();

        for n in min_n..=max_n {
            if n > tokens.len() {
                break;
            }
            terms.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
        terms
    }

    /// Learn vocabulary and IDF from a corpus of normalized texts.
    pub fn fit<S: AsRef<str> + Sync>(&mut self, corpus: &[S]) -> Result<()> {
        self.config.validate()?;

        let n_documents = corpus.len();
        if n_documents == 0 {
            return Err(AbstrakError::invalid_argument(
                "cannot fit a vectorizer on an empty corpus",
            ));
        }

        let max_doc_count = self.config.max_df * n_documents as f64;
        if max_doc_count < self.config.min_df as f64 {
            return Err(AbstrakError::invalid_config(format!(
                "max_df {} corresponds to {max_doc_count} of {n_documents} documents, \
                 fewer than min_df {}",
                self.config.max_df, self.config.min_df
            )));
        }

        let per_document: Vec<HashMap<String, usize>> = corpus
            .par_iter()
            .map(|doc| Self::count_terms(self.analyze(doc.as_ref())))
            .collect();

        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        let mut total_count: HashMap<&str, usize> = HashMap::new();
        for counts in &per_document {
            for (term, count) in counts {
                *document_frequency.entry(term.as_str()).or_insert(0) += 1;
                *total_count.entry(term.as_str()).or_insert(0) += count;
            }
        }

        if document_frequency.is_empty() {
            return Err(AbstrakError::EmptyVocabulary);
        }

        let mut kept: Vec<&str> = document_frequency
            .iter()
            .filter(|&(_, &df)| df >= self.config.min_df && df as f64 <= max_doc_count)
            .map(|(&term, _)| term)
            .collect();

        if kept.is_empty() {
            return Err(AbstrakError::EmptyVocabulary);
        }

        if let Some(limit) = self.config.max_features {
            if kept.len() > limit {
                kept.sort_by(|a, b| {
                    total_count[b]
                        .cmp(&total_count[a])
                        .then_with(|| a.cmp(b))
                });
                kept.truncate(limit);
            }
        }
        kept.sort_unstable();

        let n = n_documents as f64;
        self.idf = kept
            .iter()
            .map(|term| ((n + 1.0) / (document_frequency[term] as f64 + 1.0)).ln() + 1.0)
            .collect();
        self.feature_names = kept.iter().map(|t| t.to_string()).collect();
        self.vocabulary = self
            .feature_names
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        self.n_documents = n_documents;

        debug!(
            "Fitted TF-IDF vocabulary: {} terms from {} candidates over {} documents",
            self.feature_names.len(),
            document_frequency.len(),
            n_documents
        );

        Ok(())
    }

    /// Vectorize texts with the frozen vocabulary.
    pub fn transform<S: AsRef<str> + Sync>(&self, corpus: &[S]) -> Result<Vec<SparseVector>> {
        if !self.is_fitted() {
            return Err(AbstrakError::NotFitted);
        }
        corpus
            .par_iter()
            .map(|doc| self.transform_one(doc.as_ref()))
            .collect()
    }

    /// Vectorize a single text.
    pub fn transform_one(&self, text: &str) -> Result<SparseVector> {
        if !self.is_fitted() {
            return Err(AbstrakError::NotFitted);
        }

        let pairs: Vec<(usize, f64)> = Self::count_terms(self.analyze(text))
            .into_iter()
            .filter_map(|(term, count)| {
                self.vocabulary
                    .get(&term)
                    .map(|&idx| (idx, count as f64 * self.idf[idx]))
            })
            .collect();

        let mut vector = SparseVector::from_pairs(self.feature_names.len(), pairs)?;
        vector.l2_normalize();
        Ok(vector)
    }

    /// Fit on a corpus and vectorize it.
    pub fn fit_transform<S: AsRef<str> + Sync>(
        &mut self,
        corpus: &[S],
    ) -> Result<Vec<SparseVector>> {
        self.fit(corpus)?;
        self.transform(corpus)
    }

    /// Terms in column order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Size of the fitted vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.feature_names.len()
    }

    /// Column of a term, if it is in the vocabulary.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// The `n` highest-weighted terms of a vector, ties by column order.
    pub fn top_features(&self, vector: &SparseVector, n: usize) -> Vec<(String, f64)> {
        let mut entries: Vec<(usize, f64)> = vector.iter().filter(|(_, v)| *v > 0.0).collect();
        entries.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        entries
            .into_iter()
            .take(n)
            .filter_map(|(i, w)| self.feature_names.get(i).map(|t| (t.clone(), w)))
            .collect()
    }

    /// Check that the fitted tables agree with each other.
    pub fn check_consistency(&self) -> Result<()> {
        let n = self.feature_names.len();
        if self.idf.len() != n || self.vocabulary.len() != n {
            return Err(AbstrakError::corrupt(format!(
                "vectorizer tables disagree: {n} names, {} idf weights, {} vocabulary entries",
                self.idf.len(),
                self.vocabulary.len()
            )));
        }
        let unique: HashSet<&usize> = self.vocabulary.values().collect();
        if unique.len() != n || self.vocabulary.values().any(|&i| i >= n) {
            return Err(AbstrakError::corrupt("vectorizer vocabulary indices are invalid"));
        }
        Ok(())
    }

    fn count_terms(terms: Vec<String>) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for term in terms {
            *counts.entry(term).or_insert(0) += 1;
        }
        counts
    }
}
