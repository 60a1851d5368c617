//! Command implementations for the abstrak CLI.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use log::info;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::ClassifierConfig;
use crate::engine::{ClassificationEngine, ModelHandle};
use crate::error::{AbstrakError, Result};
use crate::extract::PlainTextExtractor;
use crate::ml::{SparseVector, TrackClassifier};
use crate::storage::{
    CorpusRecord, MemoryRecordStore, ModelStore, RecordStore, load_corpus, write_corpus,
};
use crate::track::{Source, Track};

/// Execute a CLI command.
pub fn execute_command(args: AbstrakArgs) -> Result<()> {
    match &args.command {
        Command::AutoLabel(label_args) => auto_label(label_args, &args),
        Command::Train(train_args) => train(train_args, &args),
        Command::Classify(classify_args) => classify(classify_args, &args),
        Command::ClassifyAll(all_args) => classify_all(all_args, &args),
        Command::Evaluate(evaluate_args) => evaluate(evaluate_args, &args),
        Command::Info => show_info(&args),
    }
}

fn engine_for(
    config: ClassifierConfig,
    records: &[CorpusRecord],
    handle: ModelHandle,
) -> Result<(ClassificationEngine, Arc<MemoryRecordStore>)> {
    let store = Arc::new(MemoryRecordStore::from_records(records)?);
    let engine = ClassificationEngine::new(config, store.clone(), Arc::new(handle));
    Ok((engine, store))
}

fn loaded_handle(config: &ClassifierConfig) -> Result<ModelHandle> {
    let handle = ModelHandle::new();
    handle.load_from(&config.model_dir).inspect_err(|e| {
        if e.is_missing_model() {
            info!("No usable model in {}; run `abstrak train` first", config.model_dir.display());
        }
    })?;
    Ok(handle)
}

/// Label unlabeled records with the keyword heuristic.
fn auto_label(args: &AutoLabelArgs, cli_args: &AbstrakArgs) -> Result<()> {
    let config = cli_args.classifier_config()?;
    let records = load_corpus(&args.corpus)?;
    let (engine, store) = engine_for(config, &records, ModelHandle::new())?;

    let summary = engine.bootstrap_labels()?;

    let keyword_stats = if args.stats {
        Some(
            store
                .list()?
                .into_iter()
                .map(|doc| RecordKeywordStats {
                    stats: engine.labeler().keyword_stats(&doc.raw_text),
                    title: doc.title,
                })
                .collect(),
        )
    } else {
        None
    };

    if let Some(output) = &args.output {
        write_corpus(output, &store.to_records(), cli_args.pretty)?;
    }

    output_result(
        "Heuristic labeling finished",
        &AutoLabelResult {
            corpus: args.corpus.display().to_string(),
            total_records: records.len(),
            summary,
            output: args.output.as_ref().map(|p| p.display().to_string()),
            keyword_stats,
        },
        cli_args,
    )
}

/// Train, evaluate and save a model.
fn train(args: &TrainArgs, cli_args: &AbstrakArgs) -> Result<()> {
    let mut config = cli_args.classifier_config()?;
    args.overrides.apply(&mut config)?;

    let records = load_corpus(&args.corpus)?;
    let (engine, store) = engine_for(config.clone(), &records, ModelHandle::new())?;

    let bootstrap = if args.bootstrap {
        Some(engine.bootstrap_labels()?)
    } else {
        None
    };
    let labeled_records = store.training_set()?.1.len();

    let save = !args.no_save;
    let outcome = engine.retrain(save)?;

    output_result(
        "Training finished",
        &TrainResult {
            corpus: args.corpus.display().to_string(),
            labeled_records,
            bootstrap,
            outcome,
            model_dir: save.then(|| config.model_dir.display().to_string()),
        },
        cli_args,
    )
}

/// Classify one text or file with the saved model.
fn classify(args: &ClassifyArgs, cli_args: &AbstrakArgs) -> Result<()> {
    let config = cli_args.classifier_config()?;
    let handle = loaded_handle(&config)?;
    let (engine, store) = engine_for(config, &[], handle)?;

    let (text, prediction, source) = match (&args.text, &args.file) {
        (_, Some(file)) => {
            let (text, prediction) = engine.classify_file(file, &PlainTextExtractor)?;
            (text, prediction, Source::Upload)
        }
        (Some(text), None) => {
            let prediction = engine.classify_text(text, Source::Manual)?;
            (text.clone(), prediction, Source::Manual)
        }
        (None, None) => {
            return Err(AbstrakError::invalid_argument(
                "either TEXT or --file is required",
            ));
        }
    };

    let important_words = match args.explain {
        Some(n) => Some(engine.explain(&text, n)?),
        None => None,
    };

    if let Some(history) = &args.history {
        append_history(history, &store)?;
    }

    output_result(
        "Classification",
        &ClassifyResult {
            label: prediction.label,
            confidence: prediction.confidence,
            level: prediction.level,
            source,
            important_words,
        },
        cli_args,
    )
}

fn append_history(path: &Path, store: &MemoryRecordStore) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    // oldest first, matching append order
    for record in store.history(None)?.iter().rev() {
        serde_json::to_writer(&mut writer, record)?;
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Predict every record that has no prediction.
fn classify_all(args: &ClassifyAllArgs, cli_args: &AbstrakArgs) -> Result<()> {
    let config = cli_args.classifier_config()?;
    let handle = loaded_handle(&config)?;
    let records = load_corpus(&args.corpus)?;
    let (engine, store) = engine_for(config, &records, handle)?;

    let results = engine.classify_all()?;

    let mut per_label: BTreeMap<Track, usize> = BTreeMap::new();
    let mut failures = Vec::new();
    let mut classified = 0;
    for item in results {
        match item.result {
            Ok(prediction) => {
                classified += 1;
                *per_label.entry(prediction.label).or_insert(0) += 1;
            }
            Err(e) => failures.push(BatchFailure {
                id: item.id,
                title: store.get(item.id)?.map(|d| d.title).unwrap_or_default(),
                error: e.to_string(),
            }),
        }
    }

    let output = args.output.clone().unwrap_or_else(|| args.corpus.clone());
    write_corpus(&output, &store.to_records(), cli_args.pretty)?;

    output_result(
        "Batch classification finished",
        &ClassifyAllResult {
            classified,
            per_label,
            failures,
            output: output.display().to_string(),
        },
        cli_args,
    )
}

/// Cross-validate and search k on a labeled corpus.
fn evaluate(args: &EvaluateArgs, cli_args: &AbstrakArgs) -> Result<()> {
    let mut config = cli_args.classifier_config()?;
    args.overrides.apply(&mut config)?;
    if args.k_min > args.k_max {
        return Err(AbstrakError::invalid_argument(format!(
            "k range {}..={} is empty",
            args.k_min, args.k_max
        )));
    }

    let records = load_corpus(&args.corpus)?;
    let store = MemoryRecordStore::from_records(&records)?;
    let (texts, labels) = store.training_set()?;

    let mut classifier = TrackClassifier::new(config.clone())?;
    let split = classifier.prepare_data(&texts, &labels, config.test_fraction, config.seed)?;

    let x: Vec<SparseVector> = split.x_train.iter().chain(&split.x_test).cloned().collect();
    let y: Vec<Track> = split.y_train.iter().chain(&split.y_test).copied().collect();
    let cross_validation = classifier.cross_validate(&x, &y, args.folds)?;
    let optimal_k = classifier.find_optimal_k(
        &split.x_train,
        &split.y_train,
        &split.x_test,
        &split.y_test,
        args.k_min..=args.k_max,
    )?;

    output_result(
        "Evaluation finished",
        &EvaluateResult {
            samples: texts.len(),
            folds: args.folds,
            cross_validation,
            optimal_k,
        },
        cli_args,
    )
}

/// Show the saved model's metadata.
fn show_info(cli_args: &AbstrakArgs) -> Result<()> {
    let config = cli_args.classifier_config()?;
    let metadata = ModelStore::new(&config.model_dir).load_metadata()?;

    output_result(
        "Model information",
        &ModelInfo {
            model_dir: config.model_dir.display().to_string(),
            metadata,
        },
        cli_args,
    )
}
