//! Persistence: model artifacts, document records and corpus files.
//!
//! - [`ModelStore`] saves and loads a trained classifier as three artifacts in
//!   one directory, swapped in atomically.
//! - [`RecordStore`] is the document/audit store interface, with the in-memory
//!   [`MemoryRecordStore`].
//! - [`corpus`] reads and writes scraped records as JSON arrays or JSON Lines.

pub mod corpus;
pub mod model_store;
pub mod record_store;

pub use corpus::{CorpusRecord, load_corpus, write_corpus};
pub use model_store::{CLASSIFIER_FILE, METADATA_FILE, ModelMetadata, ModelStore, VECTORIZER_FILE};
pub use record_store::{
    ClassificationRecord, CorpusStats, Document, DocumentId, MemoryRecordStore, MetricsRecord,
    RecordStore,
};
