//! Stop filter implementation.
//!
//! Removes Indonesian function words and the noise words that show up in
//! scraped journal abstracts (section headings, citation markers, volume and
//! ISSN labels).
//!
//! # Examples
//!
//! ```
//! use abstrak::analysis::token_filter::Filter;
//! use abstrak::analysis::token_filter::stop::StopFilter;
//! use abstrak::analysis::token::Token;
//!
//! let filter = StopFilter::new();
//! let tokens = vec![
//!     Token::new("sistem", 0),
//!     Token::new("yang", 1),
//!     Token::new("dkk", 2),
//! ];
//!
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(result.len(), 1);
//! assert_eq!(result[0].text, "sistem");
//! ```

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Indonesian function words.
const INDONESIAN_STOP_WORDS: &[&str] = &[
    "yang", "untuk", "pada", "ke", "para", "namun", "menurut", "antara", "dia", "dua",
    "ia", "seperti", "jika", "sehingga", "kembali", "dan", "tidak", "ini", "karena",
    "kepada", "oleh", "saat", "harus", "sementara", "setelah", "belum", "kami",
    "sekitar", "bagi", "serta", "di", "dari", "telah", "sebagai", "masih", "hal",
    "ketika", "adalah", "itu", "dalam", "bisa", "bahwa", "atau", "hanya", "kita",
    "dengan", "akan", "juga", "ada", "mereka", "sudah", "saya", "terhadap", "secara",
    "agar", "lain", "anda", "begitu", "mengapa", "kenapa", "yaitu", "yakni",
    "daripada", "itulah", "lagi", "maka", "tentang", "demi", "dimana", "kemana",
    "pula", "sambil", "sebelum", "sesudah", "supaya", "guna", "kah", "pun", "sampai",
    "sedangkan", "selagi", "tetapi", "apakah", "kecuali", "sebab", "selain", "seolah",
    "seraya", "seterusnya", "tanpa", "agak", "boleh", "dapat", "dsb", "dst", "dll",
    "dahulu", "dulunya", "anu", "demikian", "tapi", "ingin", "nggak", "mari", "nanti",
    "melainkan", "oh", "ok", "seharusnya", "sebetulnya", "setiap", "setidaknya",
    "sesuatu", "pasti", "saja", "toh", "ya", "walau", "tolong", "tentu", "amat",
    "apalagi", "bagaimanapun",
];

/// Words that are frequent in scraped abstracts but say nothing about the topic.
const ABSTRACT_NOISE_WORDS: &[&str] = &[
    "abstrak", "abstract", "hal", "vol", "no", "issn", "dkk", "et", "al",
];

/// Combined Indonesian and abstract-noise stop words as a HashSet.
pub static INDONESIAN_STOP_WORDS_SET: LazyLock<HashSet<String>> = LazyLock::new(|| {
    INDONESIAN_STOP_WORDS
        .iter()
        .chain(ABSTRACT_NOISE_WORDS)
        .map(|&s| s.to_string())
        .collect()
});

/// A filter that removes stop words from the token stream.
///
/// By default stopped tokens are dropped. With `remove_stopped(false)` they
/// stay in the stream marked as stopped, which is useful when positions must
/// be preserved for later filters.
#[derive(Clone, Debug)]
pub struct StopFilter {
    stop_words: Arc<HashSet<String>>,
    remove_stopped: bool,
}

impl StopFilter {
    /// Create a new stop filter with the Indonesian and abstract-noise words.
    pub fn new() -> Self {
        Self::with_stop_words(INDONESIAN_STOP_WORDS_SET.clone())
    }

    /// Create a stop filter with a custom set.
    pub fn with_stop_words(stop_words: HashSet<String>) -> Self {
        StopFilter {
            stop_words: Arc::new(stop_words),
            remove_stopped: true,
        }
    }

    /// Create a stop filter from a list of words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_stop_words(words.into_iter().map(Into::into).collect())
    }

    /// Extend the stop set with extra words.
    pub fn with_extra_words<I, S>(self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = (*self.stop_words).clone();
        set.extend(words.into_iter().map(Into::into));
        StopFilter {
            stop_words: Arc::new(set),
            remove_stopped: self.remove_stopped,
        }
    }

    /// Set whether stopped tokens are removed or only marked.
    pub fn remove_stopped(mut self, remove: bool) -> Self {
        self.remove_stopped = remove;
        self
    }

    /// Check whether a word is a stop word.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Number of stop words.
    pub fn len(&self) -> usize {
        self.stop_words.len()
    }

    /// Whether the stop set is empty.
    pub fn is_empty(&self) -> bool {
        self.stop_words.is_empty()
    }
}

impl Default for StopFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for StopFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let stop_words = Arc::clone(&self.stop_words);

        if self.remove_stopped {
            Ok(Box::new(
                tokens.filter(move |token| !stop_words.contains(&token.text)),
            ))
        } else {
            Ok(Box::new(tokens.map(move |token: Token| {
                if stop_words.contains(&token.text) {
                    token.stop()
                } else {
                    token
                }
            })))
        }
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}
