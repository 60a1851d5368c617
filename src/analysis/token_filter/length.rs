//! Length filter implementation.

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Tokens shorter than this many characters carry no signal in abstracts.
pub const DEFAULT_MIN_LENGTH: usize = 3;

/// A filter that drops tokens shorter than a minimum length in characters.
#[derive(Clone, Debug)]
pub struct LengthFilter {
    min: usize,
}

impl LengthFilter {
    /// Create a new length filter keeping tokens of at least `min` characters.
    pub fn new(min: usize) -> Self {
        LengthFilter { min }
    }

    /// Get the minimum length.
    pub fn min(&self) -> usize {
        self.min
    }
}

impl Default for LengthFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LENGTH)
    }
}

impl Filter for LengthFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let min = self.min;
        Ok(Box::new(tokens.filter(move |token| token.char_len() >= min)))
    }

    fn name(&self) -> &'static str {
        "length"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_drops_short_tokens() {
        let filter = LengthFilter::default();
        let tokens = vec![
            Token::new("di", 0),
            Token::new("uji", 1),
            Token::new("ke", 2),
            Token::new("jaringan", 3),
        ];

        let result: Vec<_> = filter
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .map(|t| t.text)
            .collect();

        assert_eq!(result, vec!["uji", "jaringan"]);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let filter = LengthFilter::new(3);
        let tokens = vec![Token::new("éé", 0)];
        assert_eq!(filter.filter(Box::new(tokens.into_iter())).unwrap().count(), 0);
    }
}
