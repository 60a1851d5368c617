//! The track classifier: normalization, TF-IDF features and weighted KNN.
//!
//! # Examples
//!
//! ```
//! use abstrak::config::ClassifierConfig;
//! use abstrak::ml::TrackClassifier;
//! use abstrak::track::Track;
//!
//! let texts = [
//!     "Perancangan jaringan komputer dengan router mikrotik",
//!     "Analisis bandwidth jaringan dan router pada sekolah",
//!     "Implementasi router mikrotik untuk manajemen bandwidth",
//!     "Monitoring jaringan komputer dan bandwidth kampus",
//!     "Keamanan jaringan komputer menggunakan router firewall",
//!     "Aplikasi sistem informasi berbasis web untuk perpustakaan",
//!     "Sistem informasi akademik berbasis web dengan database",
//!     "Pengembangan aplikasi android sistem informasi kos",
//!     "Aplikasi web sistem informasi penjualan dengan database",
//!     "Rancang bangun aplikasi android berbasis database",
//! ];
//! let labels = [
//!     Track::Tkj, Track::Tkj, Track::Tkj, Track::Tkj, Track::Tkj,
//!     Track::Rpl, Track::Rpl, Track::Rpl, Track::Rpl, Track::Rpl,
//! ];
//!
//! let mut config = ClassifierConfig::default();
//! config.k = 3;
//! let mut classifier = TrackClassifier::new(config).unwrap();
//! let split = classifier.prepare_data(&texts, &labels, 0.2, 42).unwrap();
//! classifier.train(&split.x_train, &split.y_train).unwrap();
//!
//! let (track, confidence) = classifier
//!     .predict_single("Manajemen bandwidth jaringan dengan router")
//!     .unwrap();
//! assert_eq!(track, Track::Tkj);
//! assert!(confidence > 0.5);
//! ```

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::TextNormalizer;
use crate::config::{ClassifierConfig, MIN_TRAINING_SAMPLES};
use crate::error::{AbstrakError, Result};
use crate::ml::distance::DistanceMetric;
use crate::ml::knn::{ClassProbabilities, KnnIndex};
use crate::ml::metrics::EvaluationReport;
use crate::ml::sparse::SparseVector;
use crate::ml::split::{stratified_kfold, stratified_split};
use crate::ml::tfidf::TfIdfVectorizer;
use crate::storage::ModelStore;
use crate::track::Track;

/// Vectorized train/test partition produced by [`TrackClassifier::prepare_data`].
#[derive(Debug, Clone)]
pub struct DataSplit {
    pub x_train: Vec<SparseVector>,
    pub y_train: Vec<Track>,
    pub x_test: Vec<SparseVector>,
    pub y_test: Vec<Track>,
    /// Positions of the training samples in the input corpus.
    pub train_indices: Vec<usize>,
    /// Positions of the test samples in the input corpus.
    pub test_indices: Vec<usize>,
}

/// Facts about the last training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingInfo {
    pub model_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub n_train: usize,
    pub n_features: usize,
    pub class_counts: BTreeMap<Track, usize>,
    /// Accuracy on the held-out split, once evaluated.
    #[serde(default)]
    pub test_accuracy: Option<f64>,
    #[serde(default)]
    pub n_test: Option<usize>,
}

/// Result of stratified cross-validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidation {
    pub fold_accuracies: Vec<f64>,
    pub mean: f64,
    /// Population standard deviation of the fold accuracies.
    pub std: f64,
}

/// Test accuracy for one `k`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KScore {
    pub k: usize,
    pub accuracy: f64,
}

/// Result of the `k` search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalK {
    pub scores: Vec<KScore>,
    pub best_k: usize,
    pub best_accuracy: f64,
}

/// Distance-weighted KNN over TF-IDF vectors of normalized text.
#[derive(Debug, Clone)]
pub struct TrackClassifier {
    config: ClassifierConfig,
    normalizer: TextNormalizer,
    vectorizer: TfIdfVectorizer,
    index: Option<KnnIndex>,
    training_info: Option<TrainingInfo>,
}

impl TrackClassifier {
    /// Create an untrained classifier.
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        Self::with_normalizer(config, TextNormalizer::new()?)
    }

    /// Create an untrained classifier sharing an existing normalizer.
    pub fn with_normalizer(config: ClassifierConfig, normalizer: TextNormalizer) -> Result<Self> {
        config.validate()?;
        let vectorizer = TfIdfVectorizer::new(config.vectorizer.clone());
        Ok(Self {
            config,
            normalizer,
            vectorizer,
            index: None,
            training_info: None,
        })
    }

    /// Reassemble a trained classifier from persisted parts.
    pub(crate) fn from_parts(
        config: ClassifierConfig,
        normalizer: TextNormalizer,
        vectorizer: TfIdfVectorizer,
        index: KnnIndex,
        training_info: Option<TrainingInfo>,
    ) -> Result<Self> {
        Ok(Self {
            config,
            normalizer,
            vectorizer,
            index: Some(index),
            training_info,
        })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    pub fn index(&self) -> Option<&KnnIndex> {
        self.index.as_ref()
    }

    pub fn training_info(&self) -> Option<&TrainingInfo> {
        self.training_info.as_ref()
    }

    pub fn is_trained(&self) -> bool {
        self.index.is_some()
    }

    pub fn k(&self) -> usize {
        self.config.k
    }

    pub fn metric(&self) -> DistanceMetric {
        self.config.metric
    }

    /// Normalize the corpus, fit the vectorizer on all of it and split it.
    pub fn prepare_data<S: AsRef<str> + Sync>(
        &mut self,
        texts: &[S],
        labels: &[Track],
        test_fraction: f64,
        seed: u64,
    ) -> Result<DataSplit> {
        if texts.len() != labels.len() {
            return Err(AbstrakError::invalid_argument(format!(
                "{} texts but {} labels",
                texts.len(),
                labels.len()
            )));
        }
        if texts.len() < MIN_TRAINING_SAMPLES {
            return Err(AbstrakError::insufficient_data(
                MIN_TRAINING_SAMPLES,
                texts.len(),
            ));
        }
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(AbstrakError::invalid_argument(format!(
                "test_fraction must be in (0, 1), got {test_fraction}"
            )));
        }

        info!("Preparing {} labeled documents", texts.len());
        let normalized = self.normalizer.normalize_batch(texts);
        let vectors = self.vectorizer.fit_transform(&normalized)?;
        let split = stratified_split(labels, test_fraction, seed)?;

        let take = |idx: &[usize]| -> (Vec<SparseVector>, Vec<Track>) {
            idx.iter().map(|&i| (vectors[i].clone(), labels[i])).unzip()
        };
        let (x_train, y_train) = take(&split.train);
        let (x_test, y_test) = take(&split.test);

        info!(
            "Split into {} training and {} test samples over {} features",
            x_train.len(),
            x_test.len(),
            self.vectorizer.vocabulary_size()
        );

        Ok(DataSplit {
            x_train,
            y_train,
            x_test,
            y_test,
            train_indices: split.train,
            test_indices: split.test,
        })
    }

    /// Fit the neighbor index on vectorized training data.
    pub fn train(&mut self, x_train: &[SparseVector], y_train: &[Track]) -> Result<()> {
        if !self.vectorizer.is_fitted() {
            return Err(AbstrakError::NotFitted);
        }

        let index = KnnIndex::fit(
            self.config.k,
            self.config.metric,
            x_train.to_vec(),
            y_train.to_vec(),
        )?;

        let mut class_counts = BTreeMap::new();
        for label in y_train {
            *class_counts.entry(*label).or_insert(0) += 1;
        }
        if class_counts.len() < Track::ALL.len() {
            warn!("Training set holds a single class; every prediction will be that class");
        }

        self.training_info = Some(TrainingInfo {
            model_id: Uuid::new_v4(),
            trained_at: Utc::now(),
            n_train: x_train.len(),
            n_features: self.vectorizer.vocabulary_size(),
            class_counts,
            test_accuracy: None,
            n_test: None,
        });
        self.index = Some(index);

        info!(
            "Trained KNN classifier: k={}, metric={}, {} samples",
            self.config.k,
            self.config.metric,
            x_train.len()
        );
        Ok(())
    }

    fn trained_index(&self) -> Result<&KnnIndex> {
        self.index.as_ref().ok_or(AbstrakError::NotTrained)
    }

    /// Vectorize raw texts with the fitted vectorizer.
    pub fn vectorize<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Result<Vec<SparseVector>> {
        let normalized = self.normalizer.normalize_batch(texts);
        self.vectorizer.transform(&normalized)
    }

    /// Class probabilities for already vectorized samples.
    pub fn predict_proba_vectors(
        &self,
        vectors: &[SparseVector],
    ) -> Result<Vec<ClassProbabilities>> {
        let index = self.trained_index()?;
        vectors.par_iter().map(|v| index.predict_proba(v)).collect()
    }

    pub fn predict_vectors(&self, vectors: &[SparseVector]) -> Result<Vec<Track>> {
        Ok(self
            .predict_proba_vectors(vectors)?
            .into_iter()
            .map(|p| p.best().0)
            .collect())
    }

    /// Predict the track of each raw text.
    pub fn predict<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Result<Vec<Track>> {
        Ok(self
            .predict_proba(texts)?
            .into_iter()
            .map(|p| p.best().0)
            .collect())
    }

    /// Class probabilities of each raw text.
    pub fn predict_proba<S: AsRef<str> + Sync>(
        &self,
        texts: &[S],
    ) -> Result<Vec<ClassProbabilities>> {
        self.trained_index()?;
        let vectors = self.vectorize(texts)?;
        self.predict_proba_vectors(&vectors)
    }

    /// Top track and its probability for one raw text.
    pub fn predict_single(&self, text: &str) -> Result<(Track, f64)> {
        let index = self.trained_index()?;
        let normalized = self.normalizer.normalize(text);
        let vector = self.vectorizer.transform_one(&normalized)?;
        Ok(index.predict_proba(&vector)?.best())
    }

    /// Evaluate on vectorized test data.
    pub fn evaluate(&self, x_test: &[SparseVector], y_test: &[Track]) -> Result<EvaluationReport> {
        let predictions = self.predict_vectors(x_test)?;
        let report = EvaluationReport::from_predictions(y_test, &predictions)?;
        info!(
            "Evaluated on {} samples: accuracy {:.4}",
            y_test.len(),
            report.accuracy
        );
        Ok(report)
    }

    /// Attach held-out accuracy to the training metadata.
    pub fn record_evaluation(&mut self, report: &EvaluationReport) {
        if let Some(info) = self.training_info.as_mut() {
            info.test_accuracy = Some(report.accuracy);
            info.n_test = Some(report.support);
        }
    }

    /// Stratified k-fold cross-validation with this classifier's `k` and metric.
    ///
    /// Folds are built without shuffling. The classifier itself is untouched.
    pub fn cross_validate(
        &self,
        x: &[SparseVector],
        y: &[Track],
        folds: usize,
    ) -> Result<CrossValidation> {
        if x.len() != y.len() {
            return Err(AbstrakError::invalid_argument(format!(
                "{} vectors but {} labels",
                x.len(),
                y.len()
            )));
        }

        let splits = stratified_kfold(y, folds)?;
        let fold_accuracies = splits
            .par_iter()
            .map(|split| {
                let (train_x, train_y) = gather(x, y, &split.train);
                let (test_x, test_y) = gather(x, y, &split.test);
                let index = KnnIndex::fit(self.config.k, self.config.metric, train_x, train_y)?;
                accuracy(&index, &test_x, &test_y)
            })
            .collect::<Result<Vec<f64>>>()?;

        let n = fold_accuracies.len() as f64;
        let mean = fold_accuracies.iter().sum::<f64>() / n;
        let std = (fold_accuracies
            .iter()
            .map(|a| (a - mean).powi(2))
            .sum::<f64>()
            / n)
            .sqrt();

        info!("Cross-validation over {folds} folds: mean {mean:.4} (+/- {std:.4})");
        Ok(CrossValidation {
            fold_accuracies,
            mean,
            std,
        })
    }

    /// Test accuracy for every `k` in `k_range`; the best is the first maximum.
    ///
    /// Values of `k` larger than the training set are skipped.
    pub fn find_optimal_k(
        &self,
        x_train: &[SparseVector],
        y_train: &[Track],
        x_test: &[SparseVector],
        y_test: &[Track],
        k_range: RangeInclusive<usize>,
    ) -> Result<OptimalK> {
        let mut scores = Vec::new();
        for k in k_range {
            if k == 0 {
                continue;
            }
            if k > x_train.len() {
                debug!("Skipping k={k}: only {} training samples", x_train.len());
                continue;
            }
            let index = KnnIndex::fit(k, self.config.metric, x_train.to_vec(), y_train.to_vec())?;
            let accuracy = accuracy(&index, x_test, y_test)?;
            debug!("k={k}: accuracy {accuracy:.4}");
            scores.push(KScore { k, accuracy });
        }

        let best = scores
            .iter()
            .fold(None::<KScore>, |best, s| match best {
                Some(b) if b.accuracy >= s.accuracy => Some(b),
                _ => Some(*s),
            })
            .ok_or_else(|| AbstrakError::invalid_argument("no valid k in the requested range"))?;

        info!("Best k={} with accuracy {:.4}", best.k, best.accuracy);
        Ok(OptimalK {
            scores,
            best_k: best.k,
            best_accuracy: best.accuracy,
        })
    }

    /// Persist the trained model under `dir`.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        ModelStore::new(dir.as_ref()).save(self)
    }

    /// Load a trained model from `dir`.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        ModelStore::new(dir.as_ref()).load()
    }
}

fn gather(x: &[SparseVector], y: &[Track], idx: &[usize]) -> (Vec<SparseVector>, Vec<Track>) {
    idx.iter().map(|&i| (x[i].clone(), y[i])).unzip()
}

fn accuracy(index: &KnnIndex, x: &[SparseVector], y: &[Track]) -> Result<f64> {
    if x.is_empty() {
        return Err(AbstrakError::invalid_argument("cannot score an empty test set"));
    }
    let correct = x
        .iter()
        .zip(y)
        .map(|(v, label)| index.predict(v).map(|p| p == *label))
        .collect::<Result<Vec<bool>>>()?
        .into_iter()
        .filter(|ok| *ok)
        .count();
    Ok(correct as f64 / x.len() as f64)
}
