//! Random baseline sequences and point substitutions.
//!
//! Every symbol is drawn independently and uniformly from `ACTG`; mutation
//! sites are sampled without replacement and each site receives one of the
//! three bases that differ from the original.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use snp_state::{Base, MutationRecord, RunDocument, Sequence};

use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::metrics::METRICS;
use crate::obs;

/// Sequence generator owning its random source.
#[derive(Debug, Clone)]
pub struct SequenceGenerator {
    rng: StdRng,
}

impl SequenceGenerator {
    /// Reproducible generator: the same seed yields the same runs.
    pub fn seeded(seed: u64) -> Self {
        SequenceGenerator {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        SequenceGenerator {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when the config carries a seed, entropy otherwise.
    pub fn from_config(config: &SimConfig) -> Self {
        match config.seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Random sequence of exactly `length` bases.
    pub fn generate(&mut self, length: usize) -> Result<Sequence> {
        if length == 0 {
            return Err(SimError::InvalidInput(
                "sequence length must be positive".to_string(),
            ));
        }
        let bases = (0..length)
            .map(|_| Base::ALL[self.rng.gen_range(0..Base::ALL.len())])
            .collect();
        Ok(Sequence::new(bases))
    }

    /// Introduce `count` point substitutions at distinct random positions.
    ///
    /// Returns the mutated copy and the records in the order the positions
    /// were drawn. `sequence` itself is left untouched.
    pub fn mutate(
        &mut self,
        sequence: &Sequence,
        count: usize,
    ) -> Result<(Sequence, Vec<MutationRecord>)> {
        if count > sequence.len() {
            return Err(SimError::InvalidInput(format!(
                "cannot place {} mutations in a sequence of length {}",
                count,
                sequence.len()
            )));
        }

        let positions = index::sample(&mut self.rng, sequence.len(), count);
        let mut records = Vec::with_capacity(count);
        for position in positions.iter() {
            let original = sequence.bases()[position];
            let choices = original.substitutes();
            let mutated = choices[self.rng.gen_range(0..choices.len())];
            obs::emit_mutation_introduced(position, original.as_char(), mutated.as_char());
            records.push(MutationRecord {
                index: position,
                original,
                mutated,
            });
        }

        METRICS.add_mutations(records.len() as u64);
        Ok((sequence.with_substitutions(&records), records))
    }

    /// Generate a baseline, mutate it, and package both as a run document.
    pub fn generate_run(&mut self, length: usize, count: usize) -> Result<RunDocument> {
        if count > length {
            return Err(SimError::InvalidInput(format!(
                "cannot place {} mutations in a sequence of length {}",
                count, length
            )));
        }
        let wild_type = self.generate(length)?;
        let (mutated, mutations) = self.mutate(&wild_type, count)?;
        let run = RunDocument {
            wild_type_sequence: wild_type,
            mutated_sequence: mutated,
            mutations,
        };
        run.validate()?;
        Ok(run)
    }
}
