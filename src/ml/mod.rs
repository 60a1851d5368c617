//! Feature extraction and the nearest-neighbor track classifier.
//!
//! Normalized text is turned into L2-normalized TF-IDF [`SparseVector`]s by a
//! [`TfIdfVectorizer`]; a [`KnnIndex`] votes among the nearest training
//! vectors, weighting each neighbor by inverse distance. [`TrackClassifier`]
//! ties both together with the [`TextNormalizer`](crate::analysis::TextNormalizer).

pub mod classifier;
pub mod distance;
pub mod explain;
pub mod knn;
pub mod metrics;
pub mod sparse;
pub mod split;
pub mod tfidf;

pub use classifier::{
    CrossValidation, DataSplit, KScore, OptimalK, TrackClassifier, TrainingInfo,
};
pub use distance::DistanceMetric;
pub use explain::ImportantWord;
pub use knn::{ClassProbabilities, KnnIndex};
pub use metrics::{AverageMetrics, ClassMetrics, EvaluationReport};
pub use sparse::SparseVector;
pub use tfidf::{TfIdfVectorizer, VectorizerConfig};
