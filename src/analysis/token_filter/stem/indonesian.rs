//! Dictionary-backed Indonesian stemmer.
//!
//! Confix stripping in the Nazief–Adriani tradition: suffixes come off first
//! (particle, possessive, derivational), then up to three prefixes, with a
//! dictionary lookup after every step. Words shaped like `be…lah`, `be…an`,
//! `me…i`, `di…i`, `pe…i` or `ter…i` try prefixes first. When nothing reaches a
//! root, removed suffixes are put back one at a time (restoring `-kan` as `-k`
//! first) and prefix removal is retried. A word that never reaches a root is
//! returned unchanged.
//!
//! # Examples
//!
//! ```
//! use abstrak::analysis::token_filter::stem::{IndonesianStemmer, Stemmer};
//!
//! let stemmer = IndonesianStemmer::new();
//! assert_eq!(stemmer.stem("jaringan"), "jaring");
//! assert_eq!(stemmer.stem("pengujian"), "uji");
//! assert_eq!(stemmer.stem("mikrotik"), "mikrotik");
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::Stemmer;
use super::dictionary::RootDictionary;
use super::rules::{
    AffixKind, PLAIN_PREFIX, PREFIX_RULES, SUFFIX_RULES, needs_precedence_adjustment,
};

/// Words of this many characters or fewer are never stemmed.
const SHORT_WORD_MAX: usize = 3;

/// Maximum number of prefixes stripped from one word.
const MAX_PREFIX_PASSES: usize = 3;

/// Dictionary-backed Indonesian stemmer with a memo cache.
pub struct IndonesianStemmer {
    dictionary: Arc<RootDictionary>,
    cache: RwLock<HashMap<String, String>>,
}

impl std::fmt::Debug for IndonesianStemmer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndonesianStemmer")
            .field("roots", &self.dictionary.len())
            .field("cached", &self.cache.read().len())
            .finish()
    }
}

impl IndonesianStemmer {
    /// Create a stemmer over the embedded root dictionary.
    pub fn new() -> Self {
        Self::with_dictionary(RootDictionary::embedded())
    }

    /// Create a stemmer over a custom root dictionary.
    pub fn with_dictionary(dictionary: Arc<RootDictionary>) -> Self {
        IndonesianStemmer {
            dictionary,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn dictionary(&self) -> &RootDictionary {
        &self.dictionary
    }

    /// Number of memoized words.
    pub fn cache_len(&self) -> usize {
        self.cache.read().len()
    }

    fn stem_uncached(&self, word: &str) -> String {
        if word.chars().count() <= SHORT_WORD_MAX {
            return word.to_string();
        }
        StemContext::new(&self.dictionary, word).run()
    }
}

impl Default for IndonesianStemmer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stemmer for IndonesianStemmer {
    fn stem(&self, word: &str) -> String {
        if let Some(hit) = self.cache.read().get(word) {
            return hit.clone();
        }
        let stemmed = self.stem_uncached(word);
        self.cache
            .write()
            .insert(word.to_string(), stemmed.clone());
        stemmed
    }

    fn name(&self) -> &'static str {
        "indonesian"
    }
}

#[derive(Clone, Debug)]
struct Removal {
    /// Word before the affix came off.
    subject: String,
    /// Word after the affix came off.
    result: String,
    removed: String,
    kind: AffixKind,
}

/// Working state for stemming a single word.
struct StemContext<'a> {
    dictionary: &'a RootDictionary,
    original: &'a str,
    current: String,
    removals: Vec<Removal>,
}

impl<'a> StemContext<'a> {
    fn new(dictionary: &'a RootDictionary, word: &'a str) -> Self {
        StemContext {
            dictionary,
            original: word,
            current: word.to_string(),
            removals: Vec::new(),
        }
    }

    fn run(mut self) -> String {
        self.strip();
        if self.at_root() {
            self.current
        } else {
            self.original.to_string()
        }
    }

    fn at_root(&self) -> bool {
        self.dictionary.contains(&self.current)
    }

    fn strip(&mut self) {
        if self.at_root() {
            return;
        }

        if needs_precedence_adjustment(self.original) {
            self.remove_prefixes();
            if self.at_root() {
                return;
            }
            self.remove_suffixes();
            if self.at_root() {
                return;
            }
            self.current = self.original.to_string();
            self.removals.clear();
        }

        self.remove_suffixes();
        if self.at_root() {
            return;
        }
        self.remove_prefixes();
        if self.at_root() {
            return;
        }
        self.restore_suffixes();
    }

    fn record(&mut self, result: String, kind: AffixKind) {
        let removed = match kind {
            AffixKind::Prefix => self.current.replacen(&result, "", 1),
            _ => self.current[result.len()..].to_string(),
        };
        self.removals.push(Removal {
            subject: std::mem::take(&mut self.current),
            result: result.clone(),
            removed,
            kind,
        });
        self.current = result;
    }

    fn remove_suffixes(&mut self) {
        for rule in SUFFIX_RULES.iter() {
            if let Some(result) = rule.strip(&self.current) {
                self.record(result, rule.kind);
            }
            if self.at_root() {
                return;
            }
        }
    }

    fn remove_prefixes(&mut self) {
        for _ in 0..MAX_PREFIX_PASSES {
            self.remove_one_prefix();
            if self.at_root() {
                return;
            }
        }
    }

    /// Try the plain prefixes, then each disambiguation rule, stopping at the
    /// first one that removes something.
    fn remove_one_prefix(&mut self) {
        if let Some(m) = PLAIN_PREFIX.find(&self.current) {
            let result = self.current[m.end()..].to_string();
            self.record(result, AffixKind::Prefix);
            return;
        }

        for rule in PREFIX_RULES.iter() {
            let mut chosen = None;
            for candidate in rule.candidates(&self.current) {
                let hit = candidate
                    .as_deref()
                    .is_some_and(|c| self.dictionary.contains(c));
                chosen = candidate;
                if hit {
                    break;
                }
            }
            if let Some(result) = chosen {
                self.record(result, AffixKind::Prefix);
                return;
            }
        }
    }

    /// Undo every prefix removal, then put suffixes back from the innermost
    /// out, retrying prefix removal each time.
    fn restore_suffixes(&mut self) {
        if let Some(first) = self.removals.first() {
            self.current = first.subject.clone();
        }
        self.removals.retain(|r| r.kind.is_suffix());

        let removals = self.removals.clone();
        let word = self.current.clone();

        for removal in removals.iter().rev() {
            if removal.removed == "kan" {
                self.current = format!("{}k", removal.result);
                self.remove_prefixes();
                if self.at_root() {
                    return;
                }
                self.current = format!("{}kan", removal.result);
            } else {
                self.current = removal.subject.clone();
            }

            self.remove_prefixes();
            if self.at_root() {
                return;
            }

            self.removals = removals.clone();
            self.current = word.clone();
        }
    }
}
