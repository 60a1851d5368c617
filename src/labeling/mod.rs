//! Keyword-weighted heuristic labeling.
//!
//! Used to bootstrap training labels for scraped abstracts before a
//! statistical model exists. Never consulted at prediction time.

pub mod auto_labeler;
pub mod dictionary;

pub use auto_labeler::{KeywordAutoLabeler, KeywordMatch, KeywordStats};
pub use dictionary::{KeywordDictionary, RPL_KEYWORDS, TKJ_KEYWORDS};
