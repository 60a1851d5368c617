//! Text analysis for Indonesian abstracts.
//!
//! Text passes through char filters, a tokenizer and token filters, composed
//! by a [`PipelineAnalyzer`]. [`TextNormalizer`] wraps the Indonesian pipeline
//! and turns raw abstracts into the space-joined stemmed form the feature
//! extractor consumes.

pub mod analyzer;
pub mod char_filter;
pub mod normalizer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::{Analyzer, IndonesianAnalyzer, PipelineAnalyzer};
pub use normalizer::TextNormalizer;
pub use token::{Token, TokenStream};
pub use token_filter::{Filter, IndonesianStemmer, RootDictionary, Stemmer};
pub use tokenizer::Tokenizer;
