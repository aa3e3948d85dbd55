//! SNP-State: Run Document Schema and Persistence for snpsim
//!
//! This crate owns the data that flows between the pipeline stages:
//! the baseline/mutated sequences, the mutation list, and the classified
//! prediction list.
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: Document invariants and crash-safe writes.
//!
//! ## Key Components
//!
//! - `RunDocument`: stage 1 output (`mutations.json`)
//! - `PredictionDocument`: stage 2 output (`predictions.json`)
//! - `DocumentStore`: storage seam, with `FsDocumentStore` and an in-memory fake

mod error;
pub mod fakes;
mod schema;
pub mod store;

pub use error::StateError;
pub use schema::{
    Base, Classification, MutationRecord, Prediction, PredictionDocument, RunDocument, Sequence,
    ERROR_PREFIX,
};
pub use store::{ArtifactKind, DocumentStore, FsDocumentStore};

/// Result type for snp-state operations
pub type Result<T> = std::result::Result<T, StateError>;
