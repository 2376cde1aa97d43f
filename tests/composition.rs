// Composition tests: verifying that the stages chain together correctly.
//
// These tests exercise the data flow between modules:
//   CSV -> Corpus -> FittedModel -> artifact file -> ClassificationService
// using temporary directories for anything written to disk.

use std::io::Write;

use truthlens::classifier::service::decode_document;
use truthlens::classifier::{artifact, metrics, ClassificationService, TrainingParams};
use truthlens::corpus::Corpus;
use truthlens::ClassifierError;

const TRAINING_CSV: &str = "\
id,text,label,source
1,Bank of Italy warns of fraud,FAKE,web
2,NASA confirms water on Mars,REAL,wire
3,Aliens run the government,FAKE,forum
4,Vaccines are safe per health ministry,REAL,wire
5,,REAL,wire
6,Celebrity cloned by secret lab,FAKE,
7,Parliament passes annual budget,REAL,wire
8,Moon landing staged in desert,FAKE,forum
9,Health ministry confirms vaccine trial results,REAL,wire
";

// ============================================================
// Chain: CSV -> fit -> save -> load -> classify
// ============================================================

#[test]
fn csv_to_served_model() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("train.csv");
    std::fs::File::create(&csv_path)
        .unwrap()
        .write_all(TRAINING_CSV.as_bytes())
        .unwrap();

    let corpus = Corpus::from_csv_path(&csv_path).unwrap();
    assert_eq!(corpus.len(), 8);
    assert_eq!(corpus.dropped(), 1);

    let trainer = ClassificationService::new();
    let report = trainer.fit(&corpus, &TrainingParams::default()).unwrap();
    assert_eq!(report.documents, 8);
    assert_eq!(report.class_counts, [4, 4]);

    let model_path = dir.path().join("models").join("model.json");
    let written = artifact::save_to_file(trainer.model().unwrap(), &model_path).unwrap();
    assert_eq!(written, model_path);

    let server = ClassificationService::new().with_max_input_chars(1_000);
    server.load_file(&model_path).unwrap();
    assert!(server.trained_at().is_some());
    assert_eq!(server.model().unwrap(), trainer.model().unwrap());

    let verdict = server
        .classify("Officials confirm new vaccine safety data")
        .unwrap();
    assert_eq!(verdict.label, "REAL");

    let text = "Aliens staged the moon landing";
    assert_eq!(
        server.predict_proba(text).unwrap(),
        trainer.predict_proba(text).unwrap()
    );
}

#[test]
fn holdout_evaluation_counts_every_document() {
    let corpus = Corpus::from_csv_reader(TRAINING_CSV.as_bytes()).unwrap();
    let (train, holdout) = corpus.split_holdout(0.25).unwrap();
    assert_eq!(train.len() + holdout.len(), corpus.len());

    let service = ClassificationService::new();
    service.fit(&corpus, &TrainingParams::default()).unwrap();
    let evaluation = metrics::evaluate(&service, &holdout).unwrap();
    assert_eq!(evaluation.total(), holdout.len());
    assert!((0.0..=1.0).contains(&evaluation.accuracy));
    assert!(evaluation.log_loss.is_finite());
}

#[test]
fn missing_label_column_names_the_column() {
    let err = Corpus::from_csv_reader("text,category\nhello,REAL\n".as_bytes()).unwrap_err();
    match err {
        ClassifierError::Training(msg) => assert!(msg.contains("label"), "{msg}"),
        other => panic!("expected Training error, got {other:?}"),
    }
}

#[test]
fn missing_model_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let service = ClassificationService::new();
    let err = service.load_file(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ClassifierError::Io(_)));
    assert!(!service.is_ready());
}

#[test]
fn corrupt_model_file_leaves_service_untrained() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(&path, b"{\"format\":\"truthlens-model\"").unwrap();

    let service = ClassificationService::new();
    let err = service.load_file(&path).unwrap_err();
    assert!(matches!(err, ClassifierError::Serialization(_)));
    assert!(matches!(
        service.classify("anything"),
        Err(ClassifierError::ModelNotLoaded)
    ));
}

#[test]
fn non_utf8_document_is_invalid_input() {
    let err = decode_document(vec![b'o', b'k', 0xff, 0xfe]).unwrap_err();
    assert!(matches!(err, ClassifierError::InvalidInput(_)));
    assert_eq!(decode_document(b"fine".to_vec()).unwrap(), "fine");
}
