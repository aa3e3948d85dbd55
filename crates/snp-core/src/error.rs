//! Stage-level error taxonomy for snpsim.
//!
//! Oracle failures never appear here: the classifier turns them into
//! `Classification::Failed` values and keeps going.

use snp_state::{ArtifactKind, StateError};

/// Errors that abort a pipeline stage.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{artifact} not found; run the `{stage}` stage first")]
    MissingArtifact {
        artifact: ArtifactKind,
        stage: &'static str,
    },

    #[error("{var} is not set; export it or add it to a .env file")]
    MissingCredential { var: String },

    #[error("oracle setup failed: {0}")]
    OracleSetup(String),

    #[error("storage error: {0}")]
    Storage(StateError),

    #[error("export error: {0}")]
    Export(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StateError> for SimError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::NotFound { artifact, .. } => SimError::MissingArtifact {
                artifact,
                stage: artifact.producing_stage(),
            },
            StateError::InvalidSymbol { .. } | StateError::Invariant(_) => {
                SimError::InvalidInput(err.to_string())
            }
            other => SimError::Storage(other),
        }
    }
}

impl From<csv::Error> for SimError {
    fn from(err: csv::Error) -> Self {
        SimError::Export(err.to_string())
    }
}

/// Result type for snpsim stage operations.
pub type Result<T> = std::result::Result<T, SimError>;
