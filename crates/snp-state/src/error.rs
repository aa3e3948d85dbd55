//! Error types for snp-state

use std::path::PathBuf;

use thiserror::Error;

use crate::store::ArtifactKind;

/// Errors that can occur while building, validating or persisting documents
#[derive(Error, Debug)]
pub enum StateError {
    /// Requested document has never been written
    #[error("{artifact} not found at {}", path.display())]
    NotFound {
        artifact: ArtifactKind,
        path: PathBuf,
    },

    /// A sequence contained something other than A, C, T or G
    #[error("invalid nucleotide {symbol:?} at position {position}")]
    InvalidSymbol { symbol: char, position: usize },

    /// A document failed its structural checks
    #[error("document invariant violated: {0}")]
    Invariant(String),

    /// Serialization error
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization failed: {0}")]
    Deserialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StateError {
    fn from(err: serde_json::Error) -> Self {
        StateError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_artifact_and_path() {
        let err = StateError::NotFound {
            artifact: ArtifactKind::Mutations,
            path: PathBuf::from("/tmp/run/mutations.json"),
        };
        let msg = err.to_string();
        assert!(msg.contains("mutations.json"));
        assert!(msg.contains("/tmp/run"));
    }

    #[test]
    fn test_invalid_symbol_display() {
        let err = StateError::InvalidSymbol {
            symbol: 'N',
            position: 7,
        };
        assert_eq!(err.to_string(), "invalid nucleotide 'N' at position 7");
    }
}
