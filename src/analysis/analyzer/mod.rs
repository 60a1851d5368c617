//! Analyzer implementations that combine tokenizers and filters.

pub mod analyzer;
pub mod indonesian;
pub mod pipeline;

pub use analyzer::Analyzer;
pub use indonesian::IndonesianAnalyzer;
pub use pipeline::PipelineAnalyzer;
