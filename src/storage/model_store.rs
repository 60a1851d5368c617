//! Atomic persistence of a trained classifier.
//!
//! A model directory holds three artifacts:
//!
//! - `knn_classifier.bin`: bincode-encoded neighbor index (k, metric, training
//!   vectors and labels)
//! - `tfidf_vectorizer.bin`: bincode-encoded vectorizer (config, vocabulary,
//!   IDF, document count) together with the stemmer's root dictionary, so a
//!   loaded model normalizes text exactly as it did when trained
//! - `model_metadata.json`: k, metric, classes and training info
//!
//! `save` writes into a fresh sibling staging directory, syncs it, then
//! renames it over the target. A reader therefore sees either the previous
//! model or the new one, never a mix.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::analysis::TextNormalizer;
use crate::analysis::token_filter::stem::RootDictionary;
use crate::config::ClassifierConfig;
use crate::error::{AbstrakError, Result};
use crate::ml::classifier::{TrackClassifier, TrainingInfo};
use crate::ml::distance::DistanceMetric;
use crate::ml::knn::KnnIndex;
use crate::ml::tfidf::TfIdfVectorizer;
use crate::track::Track;

pub const CLASSIFIER_FILE: &str = "knn_classifier.bin";
pub const VECTORIZER_FILE: &str = "tfidf_vectorizer.bin";
pub const METADATA_FILE: &str = "model_metadata.json";

const STAGING_MARKER: &str = ".staging-";
const RETIRED_MARKER: &str = ".retired-";

/// JSON sidecar describing a saved model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Crate version that wrote the model.
    pub version: String,
    pub k: usize,
    pub metric: DistanceMetric,
    pub classes: Vec<Track>,
    pub test_fraction: f64,
    pub seed: u64,
    pub n_features: usize,
    pub saved_at: DateTime<Utc>,
    pub training: Option<TrainingInfo>,
}

/// Contents of the vectorizer artifact.
#[derive(Debug, Deserialize)]
struct FeatureArtifact {
    vectorizer: TfIdfVectorizer,
    roots: Vec<String>,
}

/// Borrowed form of [`FeatureArtifact`]; encodes to the same bytes.
#[derive(Serialize)]
struct FeatureArtifactRef<'a> {
    vectorizer: &'a TfIdfVectorizer,
    roots: Vec<&'a str>,
}

/// Saves and loads a [`TrackClassifier`] under one directory.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether all three artifacts are present.
    pub fn exists(&self) -> bool {
        [CLASSIFIER_FILE, VECTORIZER_FILE, METADATA_FILE]
            .iter()
            .all(|name| self.dir.join(name).is_file())
    }

    /// Write a trained classifier, replacing any model already in the directory.
    pub fn save(&self, classifier: &TrackClassifier) -> Result<()> {
        let index = classifier.index().ok_or(AbstrakError::NotTrained)?;
        let (parent, name) = self.split_dir()?;
        fs::create_dir_all(&parent)?;

        let staging = parent.join(format!(".{name}{STAGING_MARKER}{}", Uuid::new_v4()));
        fs::create_dir(&staging)?;

        if let Err(e) = Self::write_artifacts(&staging, classifier, index) {
            if let Err(cleanup) = fs::remove_dir_all(&staging) {
                warn!("Failed to remove staging directory {}: {cleanup}", staging.display());
            }
            return Err(e);
        }

        let retired = if self.dir.exists() {
            let retired = parent.join(format!(".{name}{RETIRED_MARKER}{}", Uuid::new_v4()));
            fs::rename(&self.dir, &retired)?;
            Some(retired)
        } else {
            None
        };

        if let Err(e) = fs::rename(&staging, &self.dir) {
            if let Some(retired) = &retired {
                if let Err(restore) = fs::rename(retired, &self.dir) {
                    warn!("Failed to restore previous model: {restore}");
                }
            }
            if let Err(cleanup) = fs::remove_dir_all(&staging) {
                warn!("Failed to remove staging directory {}: {cleanup}", staging.display());
            }
            return Err(e.into());
        }
        sync_dir(&parent);

        if let Some(retired) = retired {
            if let Err(e) = fs::remove_dir_all(&retired) {
                warn!("Failed to remove previous model {}: {e}", retired.display());
            }
        }

        info!("Saved model to {}", self.dir.display());
        Ok(())
    }

    /// Load the classifier, checking that the artifacts agree.
    pub fn load(&self) -> Result<TrackClassifier> {
        self.reject_transient_dir()?;

        let metadata = self.load_metadata()?;
        let FeatureArtifact { vectorizer, roots } = self.read_bincode(VECTORIZER_FILE)?;
        let index: KnnIndex = self.read_bincode(CLASSIFIER_FILE)?;

        vectorizer.check_consistency()?;
        if !vectorizer.is_fitted() {
            return Err(AbstrakError::corrupt("vectorizer artifact has no vocabulary"));
        }
        if metadata.k != index.k() || metadata.metric != index.metric() {
            return Err(AbstrakError::corrupt(format!(
                "metadata says k={} metric={}, classifier has k={} metric={}",
                metadata.k,
                metadata.metric,
                index.k(),
                index.metric()
            )));
        }
        if index.dim() != vectorizer.vocabulary_size() {
            return Err(AbstrakError::corrupt(format!(
                "classifier vectors have {} dimensions, vocabulary has {} terms",
                index.dim(),
                vectorizer.vocabulary_size()
            )));
        }
        if metadata.classes != index.classes() {
            return Err(AbstrakError::corrupt(
                "metadata classes disagree with classifier labels",
            ));
        }

        let config = ClassifierConfig {
            k: metadata.k,
            metric: metadata.metric,
            test_fraction: metadata.test_fraction,
            seed: metadata.seed,
            vectorizer: vectorizer.config().clone(),
            model_dir: self.dir.clone(),
        };

        debug!(
            "Loaded model from {}: {} samples, {} features",
            self.dir.display(),
            index.len(),
            vectorizer.vocabulary_size()
        );
        let normalizer =
            TextNormalizer::with_dictionary(Arc::new(RootDictionary::from_words(roots)))?;
        TrackClassifier::from_parts(config, normalizer, vectorizer, index, metadata.training)
    }

    /// Read only the JSON metadata.
    pub fn load_metadata(&self) -> Result<ModelMetadata> {
        self.reject_transient_dir()?;
        let path = self.artifact(METADATA_FILE)?;
        let reader = BufReader::new(File::open(&path)?);
        serde_json::from_reader(reader).map_err(|e| {
            AbstrakError::corrupt(format!("{}: {e}", path.display()))
        })
    }

    fn write_artifacts(dir: &Path, classifier: &TrackClassifier, index: &KnnIndex) -> Result<()> {
        let config = classifier.config();
        let metadata = ModelMetadata {
            version: crate::VERSION.to_string(),
            k: index.k(),
            metric: index.metric(),
            classes: index.classes(),
            test_fraction: config.test_fraction,
            seed: config.seed,
            n_features: classifier.vectorizer().vocabulary_size(),
            saved_at: Utc::now(),
            training: classifier.training_info().cloned(),
        };

        write_synced(&dir.join(CLASSIFIER_FILE), |w| {
            bincode::serialize_into(w, index).map_err(AbstrakError::from)
        })?;
        write_synced(&dir.join(VECTORIZER_FILE), |w| {
            let artifact = FeatureArtifactRef {
                vectorizer: classifier.vectorizer(),
                roots: classifier.normalizer().dictionary().words(),
            };
            bincode::serialize_into(w, &artifact).map_err(AbstrakError::from)
        })?;
        write_synced(&dir.join(METADATA_FILE), |w| {
            serde_json::to_writer_pretty(w, &metadata).map_err(AbstrakError::from)
        })?;
        sync_dir(dir);
        Ok(())
    }

    fn read_bincode<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.artifact(name)?;
        let reader = BufReader::new(File::open(&path)?);
        bincode::deserialize_from(reader)
            .map_err(|e| AbstrakError::corrupt(format!("{}: {e}", path.display())))
    }

    fn artifact(&self, name: &str) -> Result<PathBuf> {
        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(AbstrakError::ArtifactMissing(path));
        }
        Ok(path)
    }

    fn reject_transient_dir(&self) -> Result<()> {
        let name = self
            .dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name.contains(STAGING_MARKER) || name.contains(RETIRED_MARKER) {
            return Err(AbstrakError::corrupt(format!(
                "{} is a transient save directory, not a model",
                self.dir.display()
            )));
        }
        Ok(())
    }

    fn split_dir(&self) -> Result<(PathBuf, String)> {
        let name = self
            .dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                AbstrakError::invalid_argument(format!(
                    "model directory {} has no final component",
                    self.dir.display()
                ))
            })?;
        let parent = match self.dir.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok((parent, name))
    }
}

fn write_synced<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    write(&mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
        debug!("Could not sync directory {}: {e}", dir.display());
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}
