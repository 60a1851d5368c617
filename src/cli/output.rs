//! Output formatting for CLI commands.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cli::args::{AbstrakArgs, OutputFormat};
use crate::engine::{BootstrapSummary, TrainingOutcome};
use crate::error::Result;
use crate::labeling::{KeywordMatch, KeywordStats};
use crate::ml::{CrossValidation, ImportantWord, OptimalK};
use crate::storage::ModelMetadata;
use crate::track::{ConfidenceLevel, Source, Track};

/// Result of heuristic labeling.
#[derive(Debug, Serialize, Deserialize)]
pub struct AutoLabelResult {
    pub corpus: String,
    pub total_records: usize,
    pub summary: BootstrapSummary,
    pub output: Option<String>,
    pub keyword_stats: Option<Vec<RecordKeywordStats>>,
}

/// Matched keywords of one record.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecordKeywordStats {
    pub title: String,
    pub stats: KeywordStats,
}

/// Result of training.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainResult {
    pub corpus: String,
    pub labeled_records: usize,
    pub bootstrap: Option<BootstrapSummary>,
    pub outcome: TrainingOutcome,
    pub model_dir: Option<String>,
}

/// Result of classifying one text.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifyResult {
    pub label: Track,
    pub confidence: f64,
    pub level: ConfidenceLevel,
    pub source: Source,
    pub important_words: Option<Vec<ImportantWord>>,
}

/// One failed item of a batch.
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchFailure {
    pub id: u64,
    pub title: String,
    pub error: String,
}

/// Result of batch classification.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifyAllResult {
    pub classified: usize,
    pub per_label: BTreeMap<Track, usize>,
    pub failures: Vec<BatchFailure>,
    pub output: String,
}

/// Result of cross-validation and the k search.
#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluateResult {
    pub samples: usize,
    pub folds: usize,
    pub cross_validation: CrossValidation,
    pub optimal_k: OptimalK,
}

/// Saved model description.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_dir: String,
    pub metadata: ModelMetadata,
}

fn keyword_list(matches: &[KeywordMatch]) -> String {
    matches
        .iter()
        .map(|m| format!("{}({})", m.keyword, m.weight))
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_counts(f: &mut fmt::Formatter<'_>, counts: &BTreeMap<Track, usize>) -> fmt::Result {
    for track in Track::ALL {
        writeln!(f, "  {track}: {}", counts.get(&track).copied().unwrap_or(0))?;
    }
    Ok(())
}

impl fmt::Display for BootstrapSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Labeled: {} (skipped {} already labeled)", self.labeled, self.skipped)?;
        write_counts(f, &self.per_class)?;
        writeln!(
            f,
            "Confidence: high {}, medium {}, low {}",
            self.high_confidence, self.medium_confidence, self.low_confidence
        )
    }
}

impl fmt::Display for AutoLabelResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Corpus: {} ({} records)", self.corpus, self.total_records)?;
        write!(f, "{}", self.summary)?;
        if let Some(stats) = &self.keyword_stats {
            writeln!(f)?;
            for entry in stats {
                writeln!(f, "{} -> {}", entry.title, entry.stats.predicted_label)?;
                writeln!(
                    f,
                    "  RPL {}: {}",
                    entry.stats.score_rpl,
                    keyword_list(&entry.stats.rpl_keywords)
                )?;
                writeln!(
                    f,
                    "  TKJ {}: {}",
                    entry.stats.score_tkj,
                    keyword_list(&entry.stats.tkj_keywords)
                )?;
            }
        }
        if let Some(output) = &self.output {
            writeln!(f, "Written to {output}")?;
        }
        Ok(())
    }
}

impl fmt::Display for TrainResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Corpus: {} ({} labeled)", self.corpus, self.labeled_records)?;
        if let Some(bootstrap) = &self.bootstrap {
            write!(f, "{bootstrap}")?;
        }
        writeln!(
            f,
            "Train/test: {}/{} samples, {} features",
            self.outcome.n_train, self.outcome.n_test, self.outcome.n_features
        )?;
        writeln!(f, "Accuracy: {:.4}", self.outcome.report.accuracy)?;
        writeln!(f)?;
        write!(f, "{}", self.outcome.report)?;
        if let Some(dir) = &self.model_dir {
            writeln!(f)?;
            writeln!(f, "Model saved to {dir}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ClassifyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} (confidence {:.2}%, {})",
            self.label,
            self.confidence * 100.0,
            self.level
        )?;
        if let Some(words) = &self.important_words {
            writeln!(f)?;
            writeln!(f, "Important terms:")?;
            for word in words {
                writeln!(
                    f,
                    "  {:<24} {:.4}  [{}]",
                    word.display,
                    word.weight,
                    word.variations.join(", ")
                )?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for ClassifyAllResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Classified: {}", self.classified)?;
        write_counts(f, &self.per_label)?;
        if !self.failures.is_empty() {
            writeln!(f, "Failed: {}", self.failures.len())?;
            for failure in &self.failures {
                writeln!(f, "  #{} {}: {}", failure.id, failure.title, failure.error)?;
            }
        }
        writeln!(f, "Written to {}", self.output)
    }
}

impl fmt::Display for EvaluateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Samples: {}", self.samples)?;
        writeln!(f, "Cross-validation ({} folds):", self.folds)?;
        for (i, acc) in self.cross_validation.fold_accuracies.iter().enumerate() {
            writeln!(f, "  fold {}: {acc:.4}", i + 1)?;
        }
        writeln!(
            f,
            "  mean {:.4} (+/- {:.4})",
            self.cross_validation.mean, self.cross_validation.std
        )?;
        writeln!(f)?;
        writeln!(f, "Accuracy by k:")?;
        for score in &self.optimal_k.scores {
            let marker = if score.k == self.optimal_k.best_k { " *" } else { "" };
            writeln!(f, "  k={:<3} {:.4}{marker}", score.k, score.accuracy)?;
        }
        writeln!(
            f,
            "Best k: {} ({:.4})",
            self.optimal_k.best_k, self.optimal_k.best_accuracy
        )
    }
}

impl fmt::Display for ModelInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.metadata;
        writeln!(f, "Model: {}", self.model_dir)?;
        writeln!(f, "Version: {}", m.version)?;
        writeln!(f, "k: {}, metric: {}", m.k, m.metric)?;
        let classes: Vec<&str> = m.classes.iter().map(|t| t.code()).collect();
        writeln!(f, "Classes: {}", classes.join(", "))?;
        writeln!(f, "Features: {}", m.n_features)?;
        writeln!(f, "Saved: {}", m.saved_at.to_rfc3339())?;
        if let Some(training) = &m.training {
            writeln!(f, "Model id: {}", training.model_id)?;
            writeln!(f, "Trained: {}", training.trained_at.to_rfc3339())?;
            writeln!(f, "Training samples: {}", training.n_train)?;
            write_counts(f, &training.class_counts)?;
            if let Some(acc) = training.test_accuracy {
                writeln!(f, "Test accuracy: {acc:.4}")?;
            }
        }
        Ok(())
    }
}

/// Output a result in the specified format.
pub fn output_result<T>(message: &str, result: &T, args: &AbstrakArgs) -> Result<()>
where
    T: Serialize + fmt::Display,
{
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                println!("{message}");
                println!();
            }
            print!("{result}");
        }
        OutputFormat::Json => {
            let json = if args.pretty {
                serde_json::to_string_pretty(result)?
            } else {
                serde_json::to_string(result)?
            };
            println!("{json}");
        }
    }
    Ok(())
}
