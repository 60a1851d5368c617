//! Owner of the live model.

use std::path::Path;
use std::sync::Arc;

use log::info;
use parking_lot::{Mutex, MutexGuard, RwLock};
use serde::{Deserialize, Serialize};

use crate::config::ClassifierConfig;
use crate::error::{AbstrakError, Result};
use crate::ml::classifier::{TrackClassifier, TrainingInfo};
use crate::ml::metrics::EvaluationReport;
use crate::track::Track;

/// What a successful retrain produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingOutcome {
    pub report: EvaluationReport,
    pub training: Option<TrainingInfo>,
    pub n_train: usize,
    pub n_test: usize,
    pub n_features: usize,
    pub saved: bool,
}

/// Exclusive right to train. Held for the duration of one training run.
pub struct TrainingLock<'a> {
    _guard: MutexGuard<'a, ()>,
}

/// The single live model of a process.
///
/// Readers take an `Arc` snapshot and never block training; a new model is
/// only published after it has been trained, evaluated and saved.
#[derive(Debug, Default)]
pub struct ModelHandle {
    current: RwLock<Option<Arc<TrackClassifier>>>,
    writer: Mutex<()>,
}

impl ModelHandle {
    /// A handle with no model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a saved model and publish it.
    ///
    /// Fails with `TrainingInProgress` while a training run holds the lock.
    pub fn load_from<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let lock = self.begin_training()?;
        let classifier = TrackClassifier::load(dir.as_ref())?;
        self.publish_locked(&lock, classifier);
        info!("Loaded model from {}", dir.as_ref().display());
        Ok(())
    }

    /// Replace the live model.
    ///
    /// Fails with `TrainingInProgress` while a training run holds the lock.
    pub fn publish(&self, classifier: TrackClassifier) -> Result<()> {
        let lock = self.begin_training()?;
        self.publish_locked(&lock, classifier);
        Ok(())
    }

    fn publish_locked(&self, _lock: &TrainingLock<'_>, classifier: TrackClassifier) {
        *self.current.write() = Some(Arc::new(classifier));
    }

    /// Snapshot of the live model, if any.
    pub fn current(&self) -> Option<Arc<TrackClassifier>> {
        self.current.read().clone()
    }

    /// Snapshot of the live model, or `NotTrained`.
    pub fn require(&self) -> Result<Arc<TrackClassifier>> {
        self.current().ok_or(AbstrakError::NotTrained)
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    /// Drop the live model.
    ///
    /// Fails with `TrainingInProgress` while a training run holds the lock.
    pub fn clear(&self) -> Result<()> {
        let _lock = self.begin_training()?;
        *self.current.write() = None;
        Ok(())
    }

    /// Take the training lock without waiting.
    pub fn begin_training(&self) -> Result<TrainingLock<'_>> {
        self.writer
            .try_lock()
            .map(|guard| TrainingLock { _guard: guard })
            .ok_or(AbstrakError::TrainingInProgress)
    }

    pub fn is_training(&self) -> bool {
        self.writer.is_locked()
    }

    /// Train, evaluate and optionally save a new model, then publish it.
    ///
    /// Fails with `TrainingInProgress` if another run holds the lock. On any
    /// failure the previous model stays live.
    pub fn retrain<S: AsRef<str> + Sync>(
        &self,
        config: &ClassifierConfig,
        texts: &[S],
        labels: &[Track],
        save: bool,
    ) -> Result<TrainingOutcome> {
        let lock = self.begin_training()?;
        info!("Retraining on {} labeled documents", texts.len());

        let mut classifier = TrackClassifier::new(config.clone())?;
        let split = classifier.prepare_data(texts, labels, config.test_fraction, config.seed)?;
        classifier.train(&split.x_train, &split.y_train)?;
        let report = classifier.evaluate(&split.x_test, &split.y_test)?;
        classifier.record_evaluation(&report);

        if save {
            classifier.save(&config.model_dir)?;
        }

        let outcome = TrainingOutcome {
            report,
            training: classifier.training_info().cloned(),
            n_train: split.x_train.len(),
            n_test: split.x_test.len(),
            n_features: classifier.vectorizer().vocabulary_size(),
            saved: save,
        };
        self.publish_locked(&lock, classifier);
        info!(
            "Published new model: accuracy {:.4} on {} test samples",
            outcome.report.accuracy, outcome.n_test
        );
        Ok(outcome)
    }
}
