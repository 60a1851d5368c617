//! Configuration for training and prediction.
//!
//! # Examples
//!
//! ```
//! use abstrak::config::ClassifierConfig;
//! use abstrak::ml::DistanceMetric;
//!
//! let config = ClassifierConfig::default();
//! assert_eq!(config.k, 5);
//! assert_eq!(config.metric, DistanceMetric::Cosine);
//! assert_eq!(config.vectorizer.max_features, Some(1000));
//!
//! let mut custom = ClassifierConfig::default();
//! custom.k = 7;
//! custom.test_fraction = 0.25;
//! assert!(custom.validate().is_ok());
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AbstrakError, Result};
use crate::ml::DistanceMetric;
use crate::ml::tfidf::VectorizerConfig;

/// Minimum number of labeled samples accepted for training.
pub const MIN_TRAINING_SAMPLES: usize = 10;

/// Top-level configuration of the classification pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Number of neighbors consulted per prediction.
    pub k: usize,
    /// Distance metric used by the neighbor search.
    pub metric: DistanceMetric,
    /// Share of the labeled corpus held out for evaluation, in (0, 1).
    pub test_fraction: f64,
    /// Seed for the stratified split.
    pub seed: u64,
    /// TF-IDF settings.
    pub vectorizer: VectorizerConfig,
    /// Directory holding the saved model artifacts.
    pub model_dir: PathBuf,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            k: 5,
            metric: DistanceMetric::Cosine,
            test_fraction: 0.2,
            seed: 42,
            vectorizer: VectorizerConfig::default(),
            model_dir: PathBuf::from("models"),
        }
    }
}

impl ClassifierConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ClassifierConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(AbstrakError::invalid_config("k must be at least 1"));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(AbstrakError::invalid_config(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        self.vectorizer.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ClassifierConfig::default();
        assert_eq!(config.k, 5);
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.seed, 42);
        assert_eq!(config.vectorizer.min_df, 2);
        assert_eq!(config.vectorizer.max_df, 0.8);
        assert_eq!(config.vectorizer.ngram_range, (1, 2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"k": 3, "metric": "euclidean"}}"#).unwrap();

        let config = ClassifierConfig::from_file(file.path()).unwrap();
        assert_eq!(config.k, 3);
        assert_eq!(config.metric, DistanceMetric::Euclidean);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_invalid_values() {
        let mut config = ClassifierConfig::default();
        config.k = 0;
        assert!(config.validate().is_err());

        let mut config = ClassifierConfig::default();
        config.test_fraction = 1.0;
        assert!(config.validate().is_err());
    }
}
