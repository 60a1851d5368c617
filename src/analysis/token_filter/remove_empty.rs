//! Remove empty filter implementation.
//!
//! Drops tokens whose text became empty and tokens marked as stopped, so the
//! stream can be joined back into a normalized string.

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// A filter that removes empty and stopped tokens from the stream.
#[derive(Clone, Debug, Default)]
pub struct RemoveEmptyFilter;

impl RemoveEmptyFilter {
    /// Create a new remove empty filter.
    pub fn new() -> Self {
        RemoveEmptyFilter
    }
}

impl Filter for RemoveEmptyFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(
            tokens.filter(|token| !token.is_empty() && !token.is_stopped()),
        ))
    }

    fn name(&self) -> &'static str {
        "remove_empty"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_remove_empty_and_stopped() {
        let filter = RemoveEmptyFilter::new();
        let tokens = vec![
            Token::new("sistem", 0),
            Token::new("", 1),
            Token::new("yang", 2).stop(),
            Token::new("informasi", 3),
        ];

        let result: Vec<_> = filter
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .collect();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].text, "sistem");
        assert_eq!(result[1].text, "informasi");
    }
}
