//! The live model and the operations built on it.
//!
//! [`ModelHandle`] owns the single trained model of a process and serializes
//! retraining. [`ClassificationEngine`] combines a handle with a
//! [`RecordStore`](crate::storage::RecordStore) for labeling, training and
//! classification workflows.

pub mod classification;
pub mod handle;

pub use classification::{BootstrapSummary, ClassificationEngine, ItemResult, Prediction};
pub use handle::{ModelHandle, TrainingLock, TrainingOutcome};
