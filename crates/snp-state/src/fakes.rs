//! In-memory fakes for the storage trait (testing only)
//!
//! `MemoryDocumentStore` satisfies the `DocumentStore` contract without
//! touching the filesystem and keeps every prediction write so tests can
//! inspect checkpoints.

use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::StateError;
use crate::schema::{PredictionDocument, RunDocument};
use crate::store::{ArtifactKind, DocumentStore};
use crate::Result;

/// In-memory document store.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    run: Mutex<Option<RunDocument>>,
    predictions: Mutex<Vec<PredictionDocument>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a run document.
    pub fn with_run(run: RunDocument) -> Self {
        let store = Self::new();
        *store.run.lock().unwrap() = Some(run);
        store
    }

    /// Every prediction document written so far, oldest first.
    pub fn prediction_history(&self) -> Vec<PredictionDocument> {
        self.predictions.lock().unwrap().clone()
    }

    fn not_found(kind: ArtifactKind) -> StateError {
        StateError::NotFound {
            artifact: kind,
            path: PathBuf::from(format!("memory://{}", kind.file_name())),
        }
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn write_run(&self, doc: &RunDocument) -> Result<()> {
        *self.run.lock().unwrap() = Some(doc.clone());
        Ok(())
    }

    fn read_run(&self) -> Result<RunDocument> {
        let run = self.run.lock().unwrap();
        let doc = run
            .clone()
            .ok_or_else(|| Self::not_found(ArtifactKind::Mutations))?;
        doc.validate()?;
        Ok(doc)
    }

    fn write_predictions(&self, doc: &PredictionDocument) -> Result<()> {
        self.predictions.lock().unwrap().push(doc.clone());
        Ok(())
    }

    fn read_predictions(&self) -> Result<PredictionDocument> {
        let history = self.predictions.lock().unwrap();
        let doc = history
            .last()
            .cloned()
            .ok_or_else(|| Self::not_found(ArtifactKind::Predictions))?;
        doc.validate()?;
        Ok(doc)
    }

    fn remove(&self, kind: ArtifactKind) -> Result<()> {
        match kind {
            ArtifactKind::Mutations => *self.run.lock().unwrap() = None,
            ArtifactKind::Predictions => self.predictions.lock().unwrap().clear(),
        }
        Ok(())
    }
}
