//! Command line argument parsing for the abstrak CLI using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::ClassifierConfig;
use crate::error::Result;
use crate::ml::DistanceMetric;

/// abstrak - track classification for Indonesian thesis abstracts
#[derive(Parser, Debug, Clone)]
#[command(name = "abstrak")]
#[command(about = "Classify Indonesian thesis abstracts into the RPL and TKJ tracks")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct AbstrakArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Configuration file (JSON); missing fields take defaults
    #[arg(short, long, value_name = "CONFIG_FILE", env = "ABSTRAK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Model directory (overrides the configuration)
    #[arg(short = 'm', long, value_name = "MODEL_DIR", global = true)]
    pub model_dir: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl AbstrakArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }

    /// Configuration from `--config` (or defaults) with global overrides applied.
    pub fn classifier_config(&self) -> Result<ClassifierConfig> {
        let mut config = match &self.config {
            Some(path) => ClassifierConfig::from_file(path)?,
            None => ClassifierConfig::default(),
        };
        if let Some(dir) = &self.model_dir {
            config.model_dir = dir.clone();
        }
        Ok(config)
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Assign heuristic keyword labels to unlabeled records
    #[command(name = "auto-label")]
    AutoLabel(AutoLabelArgs),

    /// Train, evaluate and save a model
    Train(TrainArgs),

    /// Classify a single text or file
    Classify(ClassifyArgs),

    /// Classify every record that has no prediction yet
    #[command(name = "classify-all")]
    ClassifyAll(ClassifyAllArgs),

    /// Cross-validate and search for the best k
    Evaluate(EvaluateArgs),

    /// Show the saved model
    Info,
}

/// Arguments for heuristic labeling
#[derive(Parser, Debug, Clone)]
pub struct AutoLabelArgs {
    /// Corpus file (JSON array or JSON Lines)
    #[arg(value_name = "CORPUS")]
    pub corpus: PathBuf,

    /// Write the labeled corpus here
    #[arg(short, long, value_name = "OUTPUT_FILE")]
    pub output: Option<PathBuf>,

    /// Include matched keywords per record
    #[arg(long)]
    pub stats: bool,
}

/// Hyperparameters settable from the command line.
#[derive(Args, Debug, Clone, Default)]
pub struct ModelOverrides {
    /// Number of neighbors
    #[arg(short, long)]
    pub k: Option<usize>,

    /// Distance metric (cosine, euclidean, manhattan)
    #[arg(long)]
    pub metric: Option<DistanceMetric>,

    /// Share of the corpus held out for testing
    #[arg(long)]
    pub test_fraction: Option<f64>,

    /// Seed for the stratified split
    #[arg(long)]
    pub seed: Option<u64>,
}

impl ModelOverrides {
    /// Apply the set overrides and revalidate.
    pub fn apply(&self, config: &mut ClassifierConfig) -> Result<()> {
        if let Some(k) = self.k {
            config.k = k;
        }
        if let Some(metric) = self.metric {
            config.metric = metric;
        }
        if let Some(fraction) = self.test_fraction {
            config.test_fraction = fraction;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.validate()
    }
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Corpus file (JSON array or JSON Lines)
    #[arg(value_name = "CORPUS")]
    pub corpus: PathBuf,

    #[command(flatten)]
    pub overrides: ModelOverrides,

    /// Label unlabeled records with the keyword heuristic first
    #[arg(long)]
    pub bootstrap: bool,

    /// Train and evaluate without saving
    #[arg(long)]
    pub no_save: bool,
}

/// Arguments for single classification
#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    /// Text to classify
    #[arg(value_name = "TEXT", required_unless_present = "file", conflicts_with = "file")]
    pub text: Option<String>,

    /// Classify the abstract of this file (.txt)
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Show the N most important terms
    #[arg(short, long, value_name = "N")]
    pub explain: Option<usize>,

    /// Append the classification to this JSON Lines history file
    #[arg(long, value_name = "HISTORY_FILE")]
    pub history: Option<PathBuf>,
}

/// Arguments for batch classification
#[derive(Parser, Debug, Clone)]
pub struct ClassifyAllArgs {
    /// Corpus file (JSON array or JSON Lines)
    #[arg(value_name = "CORPUS")]
    pub corpus: PathBuf,

    /// Write the classified corpus here (default: overwrite the input)
    #[arg(short, long, value_name = "OUTPUT_FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments for evaluation
#[derive(Parser, Debug, Clone)]
pub struct EvaluateArgs {
    /// Corpus file (JSON array or JSON Lines)
    #[arg(value_name = "CORPUS")]
    pub corpus: PathBuf,

    #[command(flatten)]
    pub overrides: ModelOverrides,

    /// Number of cross-validation folds
    #[arg(long, default_value = "5")]
    pub folds: usize,

    /// Smallest k to try
    #[arg(long, default_value = "1")]
    pub k_min: usize,

    /// Largest k to try
    #[arg(long, default_value = "20")]
    pub k_max: usize,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        let args = AbstrakArgs::try_parse_from(["abstrak", "info"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = AbstrakArgs::try_parse_from(["abstrak", "-vv", "info"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        let args = AbstrakArgs::try_parse_from(["abstrak", "--quiet", "info"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args = AbstrakArgs::try_parse_from(["abstrak", "--format", "json", "info"]).unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_train_overrides() {
        let args = AbstrakArgs::try_parse_from([
            "abstrak",
            "train",
            "corpus.jsonl",
            "-k",
            "7",
            "--metric",
            "euclidean",
            "--no-save",
        ])
        .unwrap();

        let Command::Train(train) = args.command else {
            panic!("Expected Train command");
        };
        assert!(train.no_save);

        let mut config = ClassifierConfig::default();
        train.overrides.apply(&mut config).unwrap();
        assert_eq!(config.k, 7);
        assert_eq!(config.metric, DistanceMetric::Euclidean);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_classify_requires_text_or_file() {
        assert!(AbstrakArgs::try_parse_from(["abstrak", "classify"]).is_err());
        assert!(
            AbstrakArgs::try_parse_from(["abstrak", "classify", "teks", "--file", "a.txt"])
                .is_err()
        );

        let args =
            AbstrakArgs::try_parse_from(["abstrak", "classify", "--file", "a.txt", "-e", "5"])
                .unwrap();
        let Command::Classify(classify) = args.command else {
            panic!("Expected Classify command");
        };
        assert_eq!(classify.explain, Some(5));
        assert!(classify.text.is_none());
    }

    #[test]
    fn test_model_dir_override() {
        let args =
            AbstrakArgs::try_parse_from(["abstrak", "info", "--model-dir", "/tmp/m"]).unwrap();
        let config = args.classifier_config().unwrap();
        assert_eq!(config.model_dir, PathBuf::from("/tmp/m"));
    }
}
