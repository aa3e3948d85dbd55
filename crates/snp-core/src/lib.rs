//! snpsim Core Library
//!
//! Mutation generation, oracle classification and reporting for the SNP
//! simulator, plus the ambient tracing/metrics setup used by the binary.

pub mod classifier;
pub mod config;
pub mod error;
pub mod generator;
pub mod metrics;
pub mod obs;
pub mod pacing;
pub mod pipeline;
pub mod reporting;
pub mod summary;
pub mod telemetry;

pub use classifier::{build_prompt, MutationClassifier};
pub use config::{SimConfig, API_KEY_VAR};
pub use error::{Result, SimError};
pub use generator::SequenceGenerator;
pub use pacing::{FixedDelay, NoDelay, Pacing};
pub use pipeline::{connect_oracle, run_classify_stage, run_generate_stage, run_pipeline};
pub use reporting::{
    export_predictions_csv, render_summary_md, write_predictions_csv, write_summary_json,
    DEFAULT_CSV_NAME,
};
pub use summary::{ImpactCounts, ImpactSummary, StructureHint, PLACEHOLDER_PDB_ID};

pub use snp_oracle::{GeminiClient, GeminiConfig, Oracle, OracleError};
pub use snp_state::{
    ArtifactKind, Base, Classification, DocumentStore, FsDocumentStore, MutationRecord,
    Prediction, PredictionDocument, RunDocument, Sequence, StateError,
};

pub use metrics::METRICS;
pub use obs::StageSpan;
pub use telemetry::init_tracing;

/// snpsim version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
