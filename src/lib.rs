//! # abstrak
//!
//! Track classification for Indonesian thesis abstracts.
//!
//! Abstracts are assigned to one of two study tracks, RPL (software
//! engineering) or TKJ (computer networking), by a distance-weighted
//! k-nearest-neighbor model over TF-IDF vectors of normalized, stemmed text.
//! A keyword-weighted heuristic labels records before any model exists.
//!
//! ## Modules
//!
//! - [`analysis`]: Indonesian text normalization and stemming
//! - [`labeling`]: keyword auto-labeler
//! - [`ml`]: TF-IDF features, KNN, evaluation
//! - [`storage`]: model artifacts, record store, corpus files
//! - [`engine`]: the live model handle and classification workflows
//! - [`extract`]: abstract extraction from uploaded files
//!
//! ## Example
//!
//! ```
//! use abstrak::labeling::KeywordAutoLabeler;
//! use abstrak::track::Track;
//!
//! let labeler = KeywordAutoLabeler::new();
//! let (track, confidence) =
//!     labeler.label("Analisis QoS jaringan wireless dengan router Mikrotik");
//! assert_eq!(track, Track::Tkj);
//! assert!(confidence >= 0.5);
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod labeling;
pub mod ml;
pub mod storage;
pub mod track;

pub mod prelude {
    pub use crate::analysis::TextNormalizer;
    pub use crate::config::ClassifierConfig;
    pub use crate::engine::{ClassificationEngine, ModelHandle};
    pub use crate::error::{AbstrakError, Result};
    pub use crate::labeling::KeywordAutoLabeler;
    pub use crate::ml::TrackClassifier;
    pub use crate::storage::{MemoryRecordStore, ModelStore, RecordStore};
    pub use crate::track::{Source, Track};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
