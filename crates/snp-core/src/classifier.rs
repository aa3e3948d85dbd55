//! Oracle-backed mutation classification.
//!
//! One prompt per mutation, sent strictly one at a time with a pacing
//! pause between calls. A failed call becomes a `Classification::Failed`
//! for that record only; the batch always yields one prediction per input.

use snp_oracle::{Oracle, OracleError};
use snp_state::{Classification, MutationRecord, Prediction};

use crate::metrics::METRICS;
use crate::obs;
use crate::pacing::Pacing;

/// Build the classification prompt for one mutation.
///
/// Only the two bases are embedded; position and sequence context are not.
pub fn build_prompt(record: &MutationRecord) -> String {
    format!(
        "I have a DNA mutation in a protein-coding region. \
         The wild-type base is {} and the mutated base is {}. \
         Predict the most likely biological impact of this Single Nucleotide Polymorphism (SNP). \
         Is it likely synonymous, missense, or nonsense? Keep your answer to one short sentence.",
        record.original, record.mutated
    )
}

/// Sequential classifier over an oracle and a pacing policy.
pub struct MutationClassifier<'a> {
    oracle: &'a dyn Oracle,
    pacing: &'a dyn Pacing,
}

impl<'a> MutationClassifier<'a> {
    pub fn new(oracle: &'a dyn Oracle, pacing: &'a dyn Pacing) -> Self {
        MutationClassifier { oracle, pacing }
    }

    /// Ask the oracle about a single mutation. Never fails.
    pub async fn classify(&self, record: &MutationRecord) -> Classification {
        METRICS.inc_oracle_calls();
        let outcome = self
            .oracle
            .predict(&build_prompt(record))
            .await
            .and_then(|text| {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Err(OracleError::EmptyResponse)
                } else {
                    Ok(trimmed.to_string())
                }
            });

        match outcome {
            Ok(text) => Classification::Predicted(text),
            Err(err) => {
                METRICS.inc_oracle_failures();
                obs::emit_prediction_failed(record.index, &err);
                Classification::Failed(err.to_string())
            }
        }
    }

    /// Classify every record in order.
    pub async fn classify_all(&self, records: &[MutationRecord]) -> Vec<Prediction> {
        self.classify_all_with(records, |_| {}).await
    }

    /// Classify every record in order, calling `on_record` after each one.
    ///
    /// The pacing pause runs between calls, not after the last one.
    pub async fn classify_all_with<F>(
        &self,
        records: &[MutationRecord],
        mut on_record: F,
    ) -> Vec<Prediction>
    where
        F: FnMut(&Prediction),
    {
        let mut predictions = Vec::with_capacity(records.len());
        for (seq, record) in records.iter().enumerate() {
            if seq > 0 {
                self.pacing.pause().await;
            }
            let prediction = Prediction::new(*record, self.classify(record).await);
            if !prediction.prediction.is_failure() {
                obs::emit_prediction_recorded(record.index, seq + 1, records.len());
            }
            on_record(&prediction);
            predictions.push(prediction);
        }
        predictions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::NoDelay;
    use snp_oracle::fakes::ScriptedOracle;
    use snp_state::Base;

    fn record(index: usize, original: Base, mutated: Base) -> MutationRecord {
        MutationRecord {
            index,
            original,
            mutated,
        }
    }

    #[test]
    fn prompt_embeds_only_the_bases() {
        let prompt = build_prompt(&record(57, Base::G, Base::T));
        assert!(prompt.contains("The wild-type base is G and the mutated base is T."));
        assert!(prompt.contains("synonymous, missense, or nonsense"));
        assert!(!prompt.contains("57"));
    }

    #[tokio::test]
    async fn response_is_trimmed() {
        let oracle = ScriptedOracle::always("  Likely missense.\n");
        let classifier = MutationClassifier::new(&oracle, &NoDelay);
        let c = classifier.classify(&record(0, Base::A, Base::C)).await;
        assert_eq!(c, Classification::Predicted("Likely missense.".to_string()));
    }

    #[tokio::test]
    async fn whitespace_only_response_is_a_failure() {
        let oracle = ScriptedOracle::always(" \n ");
        let classifier = MutationClassifier::new(&oracle, &NoDelay);
        let c = classifier.classify(&record(0, Base::A, Base::C)).await;
        assert_eq!(c, Classification::Failed("empty response".to_string()));
    }

    #[tokio::test]
    async fn callback_sees_each_prediction_in_order() {
        let oracle = ScriptedOracle::always("Synonymous.");
        let classifier = MutationClassifier::new(&oracle, &NoDelay);
        let records = vec![record(4, Base::A, Base::G), record(1, Base::T, Base::C)];

        let mut seen = Vec::new();
        let out = classifier
            .classify_all_with(&records, |p| seen.push(p.mutation.index))
            .await;

        assert_eq!(seen, vec![4, 1]);
        assert_eq!(out.len(), 2);
    }
}
