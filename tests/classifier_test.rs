mod common;

use std::sync::Arc;

use abstrak::analysis::{RootDictionary, TextNormalizer};
use abstrak::error::AbstrakError;
use abstrak::ml::TrackClassifier;
use abstrak::ml::split::stratified_split;
use abstrak::track::Track;
use tempfile::TempDir;

#[test]
fn test_minimum_training_samples() {
    let dir = TempDir::new().unwrap();
    let (texts, labels) = common::corpus();

    let mut classifier = TrackClassifier::new(common::config(dir.path())).unwrap();
    let err = classifier
        .prepare_data(&texts[..9], &labels[..9], 0.2, 42)
        .unwrap_err();
    assert!(matches!(
        err,
        AbstrakError::InsufficientData {
            required: 10,
            actual: 9
        }
    ));

    let split = classifier
        .prepare_data(&texts[..10], &labels[..10], 0.2, 42)
        .unwrap();
    classifier.train(&split.x_train, &split.y_train).unwrap();
    assert!(classifier.is_trained());
}

#[test]
fn test_save_load_reproduces_predictions() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let (texts, labels) = common::corpus();

    let mut classifier = TrackClassifier::new(config.clone()).unwrap();
    let split = classifier.prepare_data(&texts, &labels, 0.25, 7).unwrap();
    classifier.train(&split.x_train, &split.y_train).unwrap();
    classifier.save(&config.model_dir).unwrap();

    let loaded = TrackClassifier::load(&config.model_dir).unwrap();
    let queries = [
        "Analisis jaringan wireless dengan router Mikrotik",
        "Aplikasi sistem informasi berbasis web",
        "Perancangan sistem monitoring server",
        "",
    ];
    for query in queries {
        let (a, pa) = classifier.predict_single(query).unwrap();
        let (b, pb) = loaded.predict_single(query).unwrap();
        assert_eq!(a, b, "{query}");
        assert!((pa - pb).abs() < 1e-9, "{query}");
    }

    let before = classifier.predict_proba(&texts).unwrap();
    let after = loaded.predict_proba(&texts).unwrap();
    for (x, y) in before.iter().zip(&after) {
        for track in Track::ALL {
            assert!((x.get(track) - y.get(track)).abs() < 1e-9);
        }
    }
}

#[test]
fn test_custom_dictionary_model_reproduces_predictions() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let (texts, labels) = common::corpus();

    let dictionary = Arc::new(RootDictionary::from_words(["sehat", "tani", "jaring"]));
    let normalizer = TextNormalizer::with_dictionary(dictionary).unwrap();
    let mut classifier = TrackClassifier::with_normalizer(config.clone(), normalizer).unwrap();
    let split = classifier.prepare_data(&texts, &labels, 0.25, 7).unwrap();
    classifier.train(&split.x_train, &split.y_train).unwrap();
    classifier.save(&config.model_dir).unwrap();

    let loaded = TrackClassifier::load(&config.model_dir).unwrap();
    assert_eq!(loaded.normalizer().dictionary().len(), 3);

    let queries = [
        "kesehatan",
        "Layanan kesehatan pertanian berbasis jaringan",
        "Pengujian aplikasi menggunakan metode waterfall",
    ];
    for query in queries {
        assert_eq!(
            classifier.normalizer().normalize(query),
            loaded.normalizer().normalize(query),
            "{query}"
        );
        let (a, pa) = classifier.predict_single(query).unwrap();
        let (b, pb) = loaded.predict_single(query).unwrap();
        assert_eq!(a, b, "{query}");
        assert!((pa - pb).abs() < 1e-9, "{query}");
    }
}

#[test]
fn test_identical_normalized_texts_predict_identically() {
    let dir = TempDir::new().unwrap();
    let (texts, labels) = common::corpus();

    let mut classifier = TrackClassifier::new(common::config(dir.path())).unwrap();
    let split = classifier.prepare_data(&texts, &labels, 0.2, 42).unwrap();
    classifier.train(&split.x_train, &split.y_train).unwrap();

    let a = "Perancangan Jaringan Komputer dengan Router MIKROTIK (2021)";
    let b = "perancangan jaringan, komputer dengan router mikrotik 2022!";
    let normalizer = classifier.normalizer();
    assert_eq!(normalizer.normalize(a), normalizer.normalize(b));

    let pa = classifier.predict_single(a).unwrap();
    let pb = classifier.predict_single(b).unwrap();
    assert_eq!(pa.0, pb.0);
    assert_eq!(pa.1, pb.1);
}

#[test]
fn test_predictions_separate_tracks() {
    let dir = TempDir::new().unwrap();
    let (texts, labels) = common::corpus();

    let mut classifier = TrackClassifier::new(common::config(dir.path())).unwrap();
    let split = classifier.prepare_data(&texts, &labels, 0.2, 42).unwrap();
    classifier.train(&split.x_train, &split.y_train).unwrap();

    let predictions = classifier
        .predict(&[
            "Konfigurasi router Mikrotik dan bandwidth jaringan wireless",
            "Aplikasi sistem informasi berbasis web dengan database",
        ])
        .unwrap();
    assert_eq!(predictions, vec![Track::Tkj, Track::Rpl]);

    let report = classifier.evaluate(&split.x_test, &split.y_test).unwrap();
    assert_eq!(report.support, split.x_test.len());
}

#[test]
fn test_stratified_split_preserves_ratio() {
    let labels: Vec<Track> = (0..37)
        .map(|i| if i % 3 == 0 { Track::Tkj } else { Track::Rpl })
        .collect();
    let n_tkj = labels.iter().filter(|&&t| t == Track::Tkj).count() as f64;

    for fraction in [0.05, 0.15, 0.2, 0.3, 0.45, 0.6, 0.85] {
        let split = stratified_split(&labels, fraction, 42).unwrap();
        let expected = split.test.len() as f64 * n_tkj / labels.len() as f64;
        let got = split
            .test
            .iter()
            .filter(|&&i| labels[i] == Track::Tkj)
            .count() as f64;
        assert!((got - expected).abs() <= 1.0, "fraction {fraction}");
        assert_eq!(split.train.len() + split.test.len(), labels.len());
    }
}
