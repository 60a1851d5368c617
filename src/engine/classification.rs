//! Labeling, training and classification workflows over a record store.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ClassifierConfig;
use crate::engine::handle::{ModelHandle, TrainingOutcome};
use crate::error::Result;
use crate::extract::{TextExtractor, extract_file};
use crate::labeling::KeywordAutoLabeler;
use crate::ml::explain::ImportantWord;
use crate::storage::{ClassificationRecord, DocumentId, MetricsRecord, RecordStore};
use crate::track::{ConfidenceLevel, Source, Track};

/// A model prediction for one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Track,
    pub confidence: f64,
    pub level: ConfidenceLevel,
}

impl Prediction {
    pub fn new(label: Track, confidence: f64) -> Self {
        Self {
            label,
            confidence,
            level: ConfidenceLevel::from_confidence(confidence),
        }
    }
}

/// Outcome of one item of a batch operation.
#[derive(Debug)]
pub struct ItemResult<T> {
    pub id: DocumentId,
    pub result: Result<T>,
}

/// Counts produced by heuristic bootstrapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BootstrapSummary {
    /// Documents that received a heuristic label.
    pub labeled: usize,
    /// Documents skipped because they already had a manual label.
    pub skipped: usize,
    pub per_class: BTreeMap<Track, usize>,
    pub high_confidence: usize,
    pub medium_confidence: usize,
    pub low_confidence: usize,
}

/// Classification workflows over a store and a model handle.
pub struct ClassificationEngine {
    config: ClassifierConfig,
    store: Arc<dyn RecordStore>,
    handle: Arc<ModelHandle>,
    labeler: KeywordAutoLabeler,
}

impl ClassificationEngine {
    pub fn new(
        config: ClassifierConfig,
        store: Arc<dyn RecordStore>,
        handle: Arc<ModelHandle>,
    ) -> Self {
        Self {
            config,
            store,
            handle,
            labeler: KeywordAutoLabeler::new(),
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn handle(&self) -> &Arc<ModelHandle> {
        &self.handle
    }

    pub fn labeler(&self) -> &KeywordAutoLabeler {
        &self.labeler
    }

    /// Publish the model saved under the configured directory.
    pub fn load_model(&self) -> Result<()> {
        self.handle.load_from(&self.config.model_dir)
    }

    /// Give every unlabeled document a heuristic label.
    ///
    /// Documents that already carry a manual label are left alone.
    pub fn bootstrap_labels(&self) -> Result<BootstrapSummary> {
        let documents = self.store.list()?;
        let (labeled, unlabeled): (Vec<_>, Vec<_>) = documents
            .into_iter()
            .partition(|doc| doc.manual_label.is_some());

        let texts: Vec<&str> = unlabeled.iter().map(|doc| doc.raw_text.as_str()).collect();
        let labels = self.labeler.label_batch(&texts);

        let mut summary = BootstrapSummary {
            skipped: labeled.len(),
            ..BootstrapSummary::default()
        };
        for (mut doc, (track, confidence)) in unlabeled.into_iter().zip(labels) {
            if !doc.apply_heuristic_label(track, confidence) {
                summary.skipped += 1;
                continue;
            }
            self.store.update(doc)?;
            summary.labeled += 1;
            *summary.per_class.entry(track).or_insert(0) += 1;
            match ConfidenceLevel::from_confidence(confidence) {
                ConfidenceLevel::High => summary.high_confidence += 1,
                ConfidenceLevel::Medium => summary.medium_confidence += 1,
                ConfidenceLevel::Low => summary.low_confidence += 1,
            }
        }

        info!(
            "Heuristically labeled {} documents ({} already labeled)",
            summary.labeled, summary.skipped
        );
        Ok(summary)
    }

    /// Retrain on the store's labeled documents and record the metrics.
    pub fn retrain(&self, save: bool) -> Result<TrainingOutcome> {
        let (texts, labels) = self.store.training_set()?;
        let outcome = self.handle.retrain(&self.config, &texts, &labels, save)?;

        self.store.record_metrics(MetricsRecord {
            model_id: outcome.training.as_ref().map(|t| t.model_id),
            recorded_at: Utc::now(),
            k: self.config.k,
            n_train: outcome.n_train,
            report: outcome.report.clone(),
        })?;
        Ok(outcome)
    }

    /// Classify one text and log it to the history.
    pub fn classify_text(&self, text: &str, source: Source) -> Result<Prediction> {
        let model = self.handle.require()?;
        let (label, confidence) = model.predict_single(text)?;
        self.store
            .append_history(ClassificationRecord::new(text, label, confidence, source))?;
        Ok(Prediction::new(label, confidence))
    }

    /// Extract the abstract from an uploaded file and classify it.
    pub fn classify_file<P: AsRef<Path>>(
        &self,
        path: P,
        extractor: &dyn TextExtractor,
    ) -> Result<(String, Prediction)> {
        let text = extract_file(path, extractor)?;
        let prediction = self.classify_text(&text, Source::Upload)?;
        Ok((text, prediction))
    }

    /// Highest-weighted terms of a text under the live model.
    pub fn explain(&self, text: &str, top_n: usize) -> Result<Vec<ImportantWord>> {
        self.handle.require()?.get_important_words(text, top_n)
    }

    /// Predict every document that has no prediction yet.
    ///
    /// Only `predicted_label` and `confidence` are written; the history is
    /// left alone. Each document reports its own result; a failure does not
    /// stop the batch.
    pub fn classify_all(&self) -> Result<Vec<ItemResult<Prediction>>> {
        let model = self.handle.require()?;
        let pending: Vec<_> = self
            .store
            .list()?
            .into_iter()
            .filter(|doc| doc.predicted_label.is_none())
            .collect();
        info!("Classifying {} documents", pending.len());

        let predictions: Vec<Result<(Track, f64)>> = pending
            .par_iter()
            .map(|doc| model.predict_single(&doc.raw_text))
            .collect();

        let mut results = Vec::with_capacity(pending.len());
        for (mut doc, predicted) in pending.into_iter().zip(predictions) {
            let id = doc.id;
            let result = predicted.and_then(|(label, confidence)| {
                doc.apply_prediction(label, confidence);
                self.store.update(doc)?;
                Ok(Prediction::new(label, confidence))
            });
            if let Err(e) = &result {
                warn!("Failed to classify document {id}: {e}");
            }
            results.push(ItemResult { id, result });
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::tfidf::VectorizerConfig;
    use crate::storage::{Document, MemoryRecordStore};
    use tempfile::TempDir;

    const TKJ: &[&str] = &[
        "Perancangan jaringan komputer dengan router mikrotik dan bandwidth",
        "Analisis bandwidth jaringan wireless menggunakan router",
        "Implementasi router mikrotik untuk manajemen bandwidth jaringan",
        "Monitoring jaringan komputer dan server dengan router",
        "Keamanan jaringan komputer dengan firewall dan router",
    ];
    const RPL: &[&str] = &[
        "Aplikasi sistem informasi berbasis web untuk perpustakaan dengan database",
        "Sistem informasi akademik berbasis web dengan database mysql",
        "Pengembangan aplikasi android sistem informasi dengan database",
        "Aplikasi web sistem informasi penjualan dengan database",
        "Rancang bangun aplikasi android berbasis web dan database",
    ];

    fn engine(dir: &Path) -> ClassificationEngine {
        let config = ClassifierConfig {
            k: 3,
            vectorizer: VectorizerConfig {
                min_df: 1,
                max_df: 1.0,
                ..VectorizerConfig::default()
            },
            model_dir: dir.join("model"),
            ..ClassifierConfig::default()
        };
        let store = Arc::new(MemoryRecordStore::new());
        for text in TKJ {
            store.insert(Document::new("tkj", *text)).unwrap();
        }
        for text in RPL {
            store.insert(Document::new("rpl", *text)).unwrap();
        }
        ClassificationEngine::new(config, store, Arc::new(ModelHandle::new()))
    }

    #[test]
    fn test_bootstrap_train_classify() {
        let dir = TempDir::new().unwrap();
        let engine = engine(dir.path());

        let summary = engine.bootstrap_labels().unwrap();
        assert_eq!(summary.labeled, 10);
        assert_eq!(summary.skipped, 0);
        assert_eq!(
            summary.high_confidence + summary.medium_confidence + summary.low_confidence,
            10
        );

        // second pass finds nothing to label
        let again = engine.bootstrap_labels().unwrap();
        assert_eq!(again.labeled, 0);
        assert_eq!(again.skipped, 10);

        let outcome = engine.retrain(true).unwrap();
        assert_eq!(outcome.n_train + outcome.n_test, 10);
        assert_eq!(engine.store().metrics().unwrap().len(), 1);

        let prediction = engine
            .classify_text("router mikrotik untuk jaringan komputer", Source::Manual)
            .unwrap();
        assert_eq!(prediction.label, Track::Tkj);
        assert_eq!(engine.store().history(None).unwrap().len(), 1);

        let words = engine.explain("router mikrotik jaringan", 3).unwrap();
        assert!(words.len() <= 3);
    }

    #[test]
    fn test_classify_all_keeps_manual_labels() {
        let dir = TempDir::new().unwrap();
        let engine = engine(dir.path());
        engine.bootstrap_labels().unwrap();
        engine.retrain(false).unwrap();

        let before: Vec<Document> = engine.store().list().unwrap();
        let results = engine.classify_all().unwrap();
        assert_eq!(results.len(), 10);
        assert!(results.iter().all(|r| r.result.is_ok()));

        for (old, new) in before.iter().zip(engine.store().list().unwrap()) {
            assert_eq!(old.manual_label, new.manual_label);
            assert!(new.predicted_label.is_some());
        }

        assert!(engine.store().history(None).unwrap().is_empty());

        // everything is predicted now
        assert!(engine.classify_all().unwrap().is_empty());
    }

    #[test]
    fn test_classify_without_model() {
        let dir = TempDir::new().unwrap();
        let engine = engine(dir.path());
        assert!(engine.classify_text("apa saja", Source::Manual).is_err());
        assert!(engine.classify_all().is_err());
        assert!(engine.load_model().is_err());
    }
}
