//! Contract tests for DocumentStore.
//!
//! Both the filesystem store and the in-memory fake run through the same
//! checks. Any conforming implementation must pass these.

use snp_state::fakes::MemoryDocumentStore;
use snp_state::{
    ArtifactKind, Base, Classification, DocumentStore, FsDocumentStore, MutationRecord,
    Prediction, PredictionDocument, RunDocument, StateError,
};

fn sample_run() -> RunDocument {
    RunDocument {
        wild_type_sequence: "ACTGACTGAC".parse().unwrap(),
        mutated_sequence: "TCTGACTGAG".parse().unwrap(),
        mutations: vec![
            MutationRecord {
                index: 0,
                original: Base::A,
                mutated: Base::T,
            },
            MutationRecord {
                index: 9,
                original: Base::C,
                mutated: Base::G,
            },
        ],
    }
}

fn check_missing_documents(store: &dyn DocumentStore) {
    assert!(matches!(
        store.read_run().unwrap_err(),
        StateError::NotFound {
            artifact: ArtifactKind::Mutations,
            ..
        }
    ));
    assert!(matches!(
        store.read_predictions().unwrap_err(),
        StateError::NotFound {
            artifact: ArtifactKind::Predictions,
            ..
        }
    ));
}

fn check_run_roundtrip(store: &dyn DocumentStore) {
    let run = sample_run();
    store.write_run(&run).unwrap();
    assert_eq!(store.read_run().unwrap(), run);
}

fn check_latest_predictions_win(store: &dyn DocumentStore) {
    let run = sample_run();
    let mut doc = PredictionDocument::for_run(&run);
    for (i, m) in run.mutations.iter().enumerate() {
        doc.predictions.push(Prediction::new(
            *m,
            Classification::Predicted(format!("call {}", i)),
        ));
        store.write_predictions(&doc).unwrap();
    }
    let back = store.read_predictions().unwrap();
    assert_eq!(back.predictions.len(), 2);
    assert_eq!(back.predictions[1].prediction.text(), "call 1");
}

fn check_remove(store: &dyn DocumentStore) {
    store.write_run(&sample_run()).unwrap();
    store.remove(ArtifactKind::Mutations).unwrap();
    assert!(store.read_run().is_err());
    store.remove(ArtifactKind::Predictions).unwrap();
}

#[test]
fn memory_store_contract() {
    let store = MemoryDocumentStore::new();
    check_missing_documents(&store);
    check_run_roundtrip(&store);
    check_latest_predictions_win(&store);
    check_remove(&store);
}

#[test]
fn fs_store_contract() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsDocumentStore::new(dir.path()).unwrap();
    check_missing_documents(&store);
    check_run_roundtrip(&store);
    check_latest_predictions_win(&store);
    check_remove(&store);
}

#[test]
fn memory_store_keeps_checkpoint_history() {
    let store = MemoryDocumentStore::with_run(sample_run());
    check_latest_predictions_win(&store);
    let history = store.prediction_history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].predictions.len(), 1);
}

#[test]
fn fs_store_writes_readable_json() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsDocumentStore::new(dir.path()).unwrap();
    store.write_run(&sample_run()).unwrap();

    let raw = std::fs::read_to_string(dir.path().join("mutations.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["mutations"][1]["index"], 9);
    assert_eq!(value["mutations"][1]["mutated"], "G");
}
