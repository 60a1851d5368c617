//! Document records, the classification audit log and metrics history.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AbstrakError, Result};
use crate::ml::metrics::EvaluationReport;
use crate::storage::corpus::CorpusRecord;
use crate::track::{LabelOrigin, Source, Track};

pub type DocumentId = u64;

/// A stored abstract with its labels.
///
/// `manual_label` is ground truth once set; predictions only ever touch
/// `predicted_label` and `confidence`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub url: Option<String>,
    pub raw_text: String,
    pub manual_label: Option<Track>,
    pub label_origin: Option<LabelOrigin>,
    pub predicted_label: Option<Track>,
    pub confidence: Option<f64>,
}

impl Document {
    /// A new unlabeled document. The id is assigned on insert.
    pub fn new<T: Into<String>, R: Into<String>>(title: T, raw_text: R) -> Self {
        Self {
            id: 0,
            title: title.into(),
            author: String::new(),
            year: None,
            url: None,
            raw_text: raw_text.into(),
            manual_label: None,
            label_origin: None,
            predicted_label: None,
            confidence: None,
        }
    }

    pub fn with_label(mut self, track: Track) -> Self {
        self.manual_label = Some(track);
        self.label_origin = Some(LabelOrigin::Manual);
        self
    }

    /// Build from a corpus record; a non-null label becomes the manual label.
    pub fn from_record(record: &CorpusRecord) -> Result<Self> {
        let manual_label = record.track()?;
        Ok(Self {
            id: 0,
            title: record.title.clone(),
            author: record.author.clone(),
            year: record.year,
            url: record.url.clone(),
            raw_text: record.abstract_text.clone(),
            manual_label,
            label_origin: manual_label.map(|_| record.label_origin.unwrap_or(LabelOrigin::Manual)),
            predicted_label: record.predicted_label,
            confidence: record.confidence,
        })
    }

    pub fn to_record(&self) -> CorpusRecord {
        CorpusRecord {
            title: self.title.clone(),
            author: self.author.clone(),
            year: self.year,
            abstract_text: self.raw_text.clone(),
            url: self.url.clone(),
            label: self.manual_label.map(|t| t.code().to_string()),
            label_origin: self.label_origin,
            predicted_label: self.predicted_label,
            confidence: self.confidence,
        }
    }

    /// Set a label from heuristic bootstrapping. Returns false, leaving the
    /// document untouched, when a manual label is already present.
    pub fn apply_heuristic_label(&mut self, track: Track, confidence: f64) -> bool {
        if self.manual_label.is_some() {
            return false;
        }
        self.manual_label = Some(track);
        self.label_origin = Some(LabelOrigin::Heuristic);
        self.confidence = Some(confidence);
        true
    }

    /// Record a model prediction.
    pub fn apply_prediction(&mut self, track: Track, confidence: f64) {
        self.predicted_label = Some(track);
        self.confidence = Some(confidence);
    }
}

/// Append-only audit entry for one classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub id: Uuid,
    pub text: String,
    pub predicted_label: Track,
    pub confidence: f64,
    pub source: Source,
    pub timestamp: DateTime<Utc>,
}

impl ClassificationRecord {
    pub fn new<S: Into<String>>(text: S, predicted_label: Track, confidence: f64, source: Source) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            predicted_label,
            confidence,
            source,
            timestamp: Utc::now(),
        }
    }
}

/// Evaluation snapshot of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub model_id: Option<Uuid>,
    pub recorded_at: DateTime<Utc>,
    pub k: usize,
    pub n_train: usize,
    pub report: EvaluationReport,
}

/// Document counts for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total: usize,
    pub labeled: usize,
    pub heuristic_labels: usize,
    pub unpredicted: usize,
    pub per_predicted_label: BTreeMap<Track, usize>,
    pub per_year: BTreeMap<i32, usize>,
}

impl CorpusStats {
    pub fn from_documents<'a, I: IntoIterator<Item = &'a Document>>(documents: I) -> Self {
        let mut stats = CorpusStats::default();
        for doc in documents {
            stats.total += 1;
            if doc.manual_label.is_some() {
                stats.labeled += 1;
            }
            if doc.label_origin == Some(LabelOrigin::Heuristic) {
                stats.heuristic_labels += 1;
            }
            match doc.predicted_label {
                Some(track) => *stats.per_predicted_label.entry(track).or_insert(0) += 1,
                None => stats.unpredicted += 1,
            }
            if let Some(year) = doc.year {
                *stats.per_year.entry(year).or_insert(0) += 1;
            }
        }
        stats
    }
}

/// Storage for documents, classification history and metrics.
pub trait RecordStore: Send + Sync {
    /// Store a document under a fresh id and return the id.
    fn insert(&self, document: Document) -> Result<DocumentId>;

    fn get(&self, id: DocumentId) -> Result<Option<Document>>;

    /// Replace an existing document.
    fn update(&self, document: Document) -> Result<()>;

    /// Remove a document. Returns whether it existed.
    fn delete(&self, id: DocumentId) -> Result<bool>;

    /// All documents in id order.
    fn list(&self) -> Result<Vec<Document>>;

    fn append_history(&self, record: ClassificationRecord) -> Result<()>;

    /// Most recent classifications first, at most `limit` when given.
    fn history(&self, limit: Option<usize>) -> Result<Vec<ClassificationRecord>>;

    fn record_metrics(&self, metrics: MetricsRecord) -> Result<()>;

    /// Metrics snapshots in recording order.
    fn metrics(&self) -> Result<Vec<MetricsRecord>>;

    /// Texts and labels of every document with a manual label.
    fn training_set(&self) -> Result<(Vec<String>, Vec<Track>)> {
        Ok(self
            .list()?
            .into_iter()
            .filter_map(|doc| doc.manual_label.map(|label| (doc.raw_text, label)))
            .unzip())
    }

    fn stats(&self) -> Result<CorpusStats> {
        Ok(CorpusStats::from_documents(&self.list()?))
    }
}

/// In-memory [`RecordStore`].
#[derive(Debug)]
pub struct MemoryRecordStore {
    documents: RwLock<BTreeMap<DocumentId, Document>>,
    history: RwLock<Vec<ClassificationRecord>>,
    metrics: RwLock<Vec<MetricsRecord>>,
    next_id: AtomicU64,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
            history: RwLock::new(Vec::new()),
            metrics: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Build a store holding the given corpus records.
    pub fn from_records(records: &[CorpusRecord]) -> Result<Self> {
        let store = Self::new();
        for record in records {
            store.insert(Document::from_record(record)?)?;
        }
        Ok(store)
    }

    /// All documents converted back to corpus records.
    pub fn to_records(&self) -> Vec<CorpusRecord> {
        self.documents.read().values().map(Document::to_record).collect()
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryRecordStore {
    fn insert(&self, mut document: Document) -> Result<DocumentId> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        document.id = id;
        self.documents.write().insert(id, document);
        Ok(id)
    }

    fn get(&self, id: DocumentId) -> Result<Option<Document>> {
        Ok(self.documents.read().get(&id).cloned())
    }

    fn update(&self, document: Document) -> Result<()> {
        let mut documents = self.documents.write();
        match documents.get_mut(&document.id) {
            Some(slot) => {
                *slot = document;
                Ok(())
            }
            None => Err(AbstrakError::store(format!(
                "document {} does not exist",
                document.id
            ))),
        }
    }

    fn delete(&self, id: DocumentId) -> Result<bool> {
        Ok(self.documents.write().remove(&id).is_some())
    }

    fn list(&self) -> Result<Vec<Document>> {
        Ok(self.documents.read().values().cloned().collect())
    }

    fn append_history(&self, record: ClassificationRecord) -> Result<()> {
        self.history.write().push(record);
        Ok(())
    }

    fn history(&self, limit: Option<usize>) -> Result<Vec<ClassificationRecord>> {
        let history = self.history.read();
        let limit = limit.unwrap_or(history.len());
        Ok(history.iter().rev().take(limit).cloned().collect())
    }

    fn record_metrics(&self, metrics: MetricsRecord) -> Result<()> {
        self.metrics.write().push(metrics);
        Ok(())
    }

    fn metrics(&self) -> Result<Vec<MetricsRecord>> {
        Ok(self.metrics.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crud() {
        let store = MemoryRecordStore::new();
        let id = store.insert(Document::new("Judul", "isi abstrak")).unwrap();
        let mut doc = store.get(id).unwrap().unwrap();
        assert_eq!(doc.id, id);

        doc.title = "Judul Baru".to_string();
        store.update(doc).unwrap();
        assert_eq!(store.get(id).unwrap().unwrap().title, "Judul Baru");

        assert!(store.delete(id).unwrap());
        assert!(!store.delete(id).unwrap());
        assert!(store.update(Document::new("x", "y")).is_err());
    }

    #[test]
    fn test_training_set_uses_manual_labels_only() {
        let store = MemoryRecordStore::new();
        store.insert(Document::new("a", "satu").with_label(Track::Tkj)).unwrap();
        let mut predicted = Document::new("b", "dua");
        predicted.apply_prediction(Track::Rpl, 0.9);
        store.insert(predicted).unwrap();

        let (texts, labels) = store.training_set().unwrap();
        assert_eq!(texts, vec!["satu".to_string()]);
        assert_eq!(labels, vec![Track::Tkj]);
    }

    #[test]
    fn test_heuristic_label_never_overwrites() {
        let mut doc = Document::new("a", "b").with_label(Track::Tkj);
        assert!(!doc.apply_heuristic_label(Track::Rpl, 0.9));
        assert_eq!(doc.manual_label, Some(Track::Tkj));

        let mut doc = Document::new("a", "b");
        assert!(doc.apply_heuristic_label(Track::Rpl, 0.6));
        assert_eq!(doc.label_origin, Some(LabelOrigin::Heuristic));

        doc.apply_prediction(Track::Tkj, 0.7);
        assert_eq!(doc.manual_label, Some(Track::Rpl));
        assert_eq!(doc.predicted_label, Some(Track::Tkj));
    }

    #[test]
    fn test_history_newest_first() {
        let store = MemoryRecordStore::new();
        for i in 0..3 {
            store
                .append_history(ClassificationRecord::new(
                    format!("teks {i}"),
                    Track::Rpl,
                    0.5,
                    Source::Manual,
                ))
                .unwrap();
        }
        let history = store.history(Some(2)).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text, "teks 2");
        assert_eq!(store.history(None).unwrap().len(), 3);
    }

    #[test]
    fn test_stats() {
        let store = MemoryRecordStore::new();
        let mut a = Document::new("a", "x").with_label(Track::Rpl);
        a.year = Some(2021);
        a.apply_prediction(Track::Rpl, 0.8);
        let mut b = Document::new("b", "y");
        b.year = Some(2021);
        store.insert(a).unwrap();
        store.insert(b).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.labeled, 1);
        assert_eq!(stats.unpredicted, 1);
        assert_eq!(stats.per_predicted_label.get(&Track::Rpl), Some(&1));
        assert_eq!(stats.per_year.get(&2021), Some(&2));
    }

    #[test]
    fn test_record_round_trip() {
        let record = CorpusRecord {
            title: "T".to_string(),
            abstract_text: "isi".to_string(),
            label: Some("tkj".to_string()),
            ..CorpusRecord::default()
        };
        let doc = Document::from_record(&record).unwrap();
        assert_eq!(doc.manual_label, Some(Track::Tkj));
        assert_eq!(doc.label_origin, Some(LabelOrigin::Manual));
        assert_eq!(doc.to_record().label.as_deref(), Some("TKJ"));
    }
}
