//! Term-level explanation of a prediction.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ml::classifier::TrackClassifier;

static WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\b").expect("word pattern is a valid regex"));

/// A high-weight term of a text with the surface forms it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportantWord {
    /// Stemmed term (unigram or space-joined bigram).
    pub term: String,
    /// TF-IDF weight of the term in the text.
    pub weight: f64,
    /// Distinct lowercased words of the original text that stem to the term,
    /// longest first.
    pub variations: Vec<String>,
    /// Longest variation, or the term itself when none was found.
    pub display: String,
}

/// Map each stem to the distinct lowercased words of `text` producing it.
fn surface_forms(classifier: &TrackClassifier, text: &str) -> HashMap<String, BTreeSet<String>> {
    let lowered = text.to_lowercase();
    let mut forms: HashMap<String, BTreeSet<String>> = HashMap::new();
    for word in WORD_PATTERN.find_iter(&lowered).map(|m| m.as_str()) {
        let stem = classifier.normalizer().stem_word(word);
        forms.entry(stem).or_default().insert(word.to_string());
    }
    forms
}

impl TrackClassifier {
    /// The `top_n` highest-weighted terms of `text` under the fitted vectorizer.
    ///
    /// Equal weights are ordered by where the term first occurs in the
    /// normalized text.
    pub fn get_important_words(&self, text: &str, top_n: usize) -> Result<Vec<ImportantWord>> {
        let normalized = self.normalizer().normalize(text);
        let vector = self.vectorizer().transform_one(&normalized)?;

        let mut first_seen: HashMap<String, usize> = HashMap::new();
        for (order, term) in self.vectorizer().analyze(&normalized).into_iter().enumerate() {
            first_seen.entry(term).or_insert(order);
        }
        let tokens: Vec<&str> = normalized.split(' ').collect();
        let position = |term: &str| -> (usize, usize) {
            let words: Vec<&str> = term.split(' ').collect();
            let start = tokens
                .windows(words.len())
                .position(|w| w == words.as_slice())
                .unwrap_or(usize::MAX);
            (start, first_seen.get(term).copied().unwrap_or(usize::MAX))
        };

        let names = self.vectorizer().feature_names();
        let mut ranked: Vec<(&str, f64, (usize, usize))> = vector
            .iter()
            .filter(|(_, w)| *w > 0.0)
            .map(|(i, w)| (names[i].as_str(), w, position(&names[i])))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.2.cmp(&b.2)));
        ranked.truncate(top_n);

        let forms = surface_forms(self, text);

        Ok(ranked
            .into_iter()
            .map(|(term, weight, _)| {
                let mut variations: Vec<String> = term
                    .split(' ')
                    .filter_map(|stem| forms.get(stem))
                    .flatten()
                    .cloned()
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect();
                variations.sort_by(|a, b| {
                    b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b))
                });
                let display = variations
                    .first()
                    .cloned()
                    .unwrap_or_else(|| term.to_string());
                ImportantWord {
                    term: term.to_string(),
                    weight,
                    variations,
                    display,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ClassifierConfig;
    use crate::ml::TrackClassifier;
    use crate::ml::tfidf::VectorizerConfig;
    use crate::track::Track;

    fn trained() -> TrackClassifier {
        let texts = [
            "Jaringan komputer dengan router",
            "Jaringan router untuk sekolah",
            "Keamanan jaringan komputer",
            "Konfigurasi router jaringan",
            "Router dan jaringan komputer kampus",
            "Aplikasi sistem informasi web",
            "Sistem informasi berbasis web",
            "Aplikasi web perpustakaan",
            "Aplikasi sistem informasi toko",
            "Sistem aplikasi berbasis web",
        ];
        let labels: Vec<Track> = (0..10)
            .map(|i| if i < 5 { Track::Tkj } else { Track::Rpl })
            .collect();
        let config = ClassifierConfig {
            k: 3,
            vectorizer: VectorizerConfig {
                min_df: 1,
                max_df: 1.0,
                ..VectorizerConfig::default()
            },
            ..ClassifierConfig::default()
        };
        let mut c = TrackClassifier::new(config).unwrap();
        let split = c.prepare_data(&texts, &labels, 0.2, 42).unwrap();
        c.train(&split.x_train, &split.y_train).unwrap();
        c
    }

    #[test]
    fn test_important_words_map_surface_forms() {
        let c = trained();
        let words = c
            .get_important_words("Jaringan jaringan komputer kampus", 10)
            .unwrap();
        assert!(!words.is_empty());

        let jaring = words.iter().find(|w| w.term == "jaring").unwrap();
        assert_eq!(jaring.variations, vec!["jaringan".to_string()]);
        assert_eq!(jaring.display, "jaringan");

        for pair in words.windows(2) {
            assert!(pair[0].weight >= pair[1].weight);
        }

        let bigram = words.iter().find(|w| w.term == "jaring komputer").unwrap();
        assert!(bigram.variations.contains(&"jaringan".to_string()));
        assert!(bigram.variations.contains(&"komputer".to_string()));
        assert_eq!(bigram.display, "jaringan");
    }

    #[test]
    fn test_top_n_limit() {
        let c = trained();
        let words = c.get_important_words("aplikasi sistem informasi web", 2).unwrap();
        assert_eq!(words.len(), 2);
        assert!(c.get_important_words("", 5).unwrap().is_empty());
    }
}
