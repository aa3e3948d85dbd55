//! Document storage for pipeline artifacts
//!
//! Each stage reads its input and writes its output through a
//! [`DocumentStore`]. The filesystem implementation keeps both documents
//! side by side in one directory and replaces them atomically, so a reader
//! never sees a half-written file.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StateError;
use crate::schema::{PredictionDocument, RunDocument};
use crate::Result;

/// The two documents the pipeline exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Stage 1 output
    Mutations,
    /// Stage 2 output
    Predictions,
}

impl ArtifactKind {
    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactKind::Mutations => "mutations.json",
            ArtifactKind::Predictions => "predictions.json",
        }
    }

    /// Name of the pipeline stage that writes this artifact.
    pub fn producing_stage(self) -> &'static str {
        match self {
            ArtifactKind::Mutations => "generate",
            ArtifactKind::Predictions => "classify",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Storage seam for pipeline documents.
///
/// Guarantees:
/// - `read_*` returns `StateError::NotFound` when the document was never written.
/// - `read_*` only returns documents that pass their `validate()` checks.
/// - A `write_*` either replaces the previous document completely or not at all.
pub trait DocumentStore: Send + Sync {
    fn write_run(&self, doc: &RunDocument) -> Result<()>;

    fn read_run(&self) -> Result<RunDocument>;

    fn write_predictions(&self, doc: &PredictionDocument) -> Result<()>;

    fn read_predictions(&self) -> Result<PredictionDocument>;

    /// Delete an artifact. No-op if absent.
    fn remove(&self, kind: ArtifactKind) -> Result<()>;
}

/// Filesystem-backed store rooted at a data directory.
///
/// Layout: `<root>/mutations.json`, `<root>/predictions.json`
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    /// Create a store rooted at `root`. Creates the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, kind: ArtifactKind) -> PathBuf {
        self.root.join(kind.file_name())
    }

    fn write_json<T: Serialize>(&self, kind: ArtifactKind, doc: &T) -> Result<()> {
        let path = self.path_of(kind);
        let content = serde_json::to_string_pretty(doc)?;

        // Atomic write: temp file in the same directory, then rename.
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(content.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.persist(&path).map_err(|e| e.error)?;

        debug!(artifact = %kind, path = ?path, bytes = content.len(), "document written");
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, kind: ArtifactKind) -> Result<T> {
        let path = self.path_of(kind);
        let content = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StateError::NotFound {
                    artifact: kind,
                    path: path.clone(),
                }
            } else {
                StateError::Io(e)
            }
        })?;
        serde_json::from_str(&content)
            .map_err(|e| StateError::Deserialization(format!("{}: {}", kind, e)))
    }
}

impl DocumentStore for FsDocumentStore {
    fn write_run(&self, doc: &RunDocument) -> Result<()> {
        self.write_json(ArtifactKind::Mutations, doc)
    }

    fn read_run(&self) -> Result<RunDocument> {
        let doc: RunDocument = self.read_json(ArtifactKind::Mutations)?;
        doc.validate()?;
        Ok(doc)
    }

    fn write_predictions(&self, doc: &PredictionDocument) -> Result<()> {
        self.write_json(ArtifactKind::Predictions, doc)
    }

    fn read_predictions(&self) -> Result<PredictionDocument> {
        let doc: PredictionDocument = self.read_json(ArtifactKind::Predictions)?;
        doc.validate()?;
        Ok(doc)
    }

    fn remove(&self, kind: ArtifactKind) -> Result<()> {
        match fs::remove_file(self.path_of(kind)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StateError::Io(e)),
        }
    }
}
