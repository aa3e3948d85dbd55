//! Pipeline stages.
//!
//! Each stage takes the config and a [`DocumentStore`] explicitly; nothing
//! is resolved relative to the executable.

use std::time::Instant;

use snp_oracle::{GeminiClient, Oracle};
use snp_state::{ArtifactKind, DocumentStore, PredictionDocument, RunDocument};
use tracing::{info, Instrument};

use crate::classifier::MutationClassifier;
use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::generator::SequenceGenerator;
use crate::metrics::METRICS;
use crate::obs::{self, StageSpan};
use crate::pacing::Pacing;

/// Build the production oracle. Fails with `MissingCredential` before
/// anything else when no API key is configured.
pub fn connect_oracle(config: &SimConfig) -> Result<GeminiClient> {
    let gemini = config.gemini_config()?;
    GeminiClient::new(gemini).map_err(|e| SimError::OracleSetup(e.to_string()))
}

/// Stage 1: generate a fresh run and persist it as `mutations.json`.
///
/// Any prediction document left by an earlier run is removed so the two
/// artifacts never describe different runs.
pub fn run_generate_stage(config: &SimConfig, store: &dyn DocumentStore) -> Result<RunDocument> {
    let _span = StageSpan::enter("generate");
    let started = Instant::now();
    config.validate()?;
    obs::emit_stage_started("generate", config.mutation_count);

    let mut generator = SequenceGenerator::from_config(config);
    let run = generator.generate_run(config.sequence_length, config.mutation_count)?;

    store.remove(ArtifactKind::Predictions)?;
    store.write_run(&run)?;

    obs::emit_stage_finished(
        "generate",
        started.elapsed().as_millis() as u64,
        run.mutations.len(),
        0,
    );
    METRICS.flush();
    Ok(run)
}

/// Stage 2: classify every mutation of the stored run.
///
/// The prediction document is rewritten after each record, so an
/// interrupted run leaves the completed prefix on disk. A failed checkpoint
/// is logged and the batch continues; only the final write is fatal.
pub async fn run_classify_stage(
    oracle: &dyn Oracle,
    pacing: &dyn Pacing,
    store: &dyn DocumentStore,
) -> Result<PredictionDocument> {
    classify_stage(oracle, pacing, store)
        .instrument(StageSpan::span("classify"))
        .await
}

async fn classify_stage(
    oracle: &dyn Oracle,
    pacing: &dyn Pacing,
    store: &dyn DocumentStore,
) -> Result<PredictionDocument> {
    let started = Instant::now();

    let run = store.read_run()?;
    let total = run.mutations.len();
    obs::emit_stage_started("classify", total);
    info!(oracle = oracle.name(), mutations = total, "processing mutations");

    let mut checkpoint = PredictionDocument::for_run(&run);
    let classifier = MutationClassifier::new(oracle, pacing);
    let predictions = classifier
        .classify_all_with(&run.mutations, |prediction| {
            checkpoint.predictions.push(prediction.clone());
            match store.write_predictions(&checkpoint) {
                Ok(()) => {
                    METRICS.inc_checkpoints();
                    obs::emit_checkpoint_written(checkpoint.predictions.len(), total);
                }
                Err(e) => obs::emit_checkpoint_error(checkpoint.predictions.len(), &e),
            }
        })
        .await;

    let mut doc = PredictionDocument::for_run(&run);
    doc.predictions = predictions;
    store.write_predictions(&doc)?;

    obs::emit_stage_finished(
        "classify",
        started.elapsed().as_millis() as u64,
        doc.predictions.len(),
        doc.failure_count(),
    );
    METRICS.flush();
    Ok(doc)
}

/// Both stages back to back.
pub async fn run_pipeline(
    config: &SimConfig,
    oracle: &dyn Oracle,
    pacing: &dyn Pacing,
    store: &dyn DocumentStore,
) -> Result<PredictionDocument> {
    run_generate_stage(config, store)?;
    run_classify_stage(oracle, pacing, store).await
}
