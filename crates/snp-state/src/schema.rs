//! Schema definitions for snpsim run documents
//!
//! Documents:
//! - `mutations.json`: baseline sequence, mutated sequence, mutation list
//! - `predictions.json`: the same sequences plus one classified entry per mutation

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StateError;
use crate::Result;

/// Prefix marking a classification that records an oracle failure.
pub const ERROR_PREFIX: &str = "Error: ";

/// A single nucleotide.
///
/// Serialized as a one-character string (`"A"`, `"C"`, `"T"`, `"G"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Base {
    A,
    C,
    T,
    G,
}

impl Base {
    /// The alphabet, in sampling order.
    pub const ALL: [Base; 4] = [Base::A, Base::C, Base::T, Base::G];

    pub fn as_char(self) -> char {
        match self {
            Base::A => 'A',
            Base::C => 'C',
            Base::T => 'T',
            Base::G => 'G',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Base::A),
            'C' => Some(Base::C),
            'T' => Some(Base::T),
            'G' => Some(Base::G),
            _ => None,
        }
    }

    /// The three bases a point substitution may turn `self` into.
    pub fn substitutes(self) -> [Base; 3] {
        let mut out = [self; 3];
        let mut i = 0;
        for base in Self::ALL {
            if base != self {
                out[i] = base;
                i += 1;
            }
        }
        out
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl From<Base> for String {
    fn from(base: Base) -> Self {
        base.as_char().to_string()
    }
}

impl TryFrom<String> for Base {
    type Error = StateError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Base::from_char(c).ok_or(StateError::InvalidSymbol { symbol: c, position: 0 })
            }
            _ => Err(StateError::Deserialization(format!(
                "expected a single nucleotide, got {:?}",
                s
            ))),
        }
    }
}

/// An ordered run of nucleotides, serialized as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sequence(Vec<Base>);

impl Sequence {
    pub fn new(bases: Vec<Base>) -> Self {
        Sequence(bases)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Base> {
        self.0.get(index).copied()
    }

    pub fn bases(&self) -> &[Base] {
        &self.0
    }

    /// Return a copy with every record's substitution applied.
    ///
    /// Records pointing past the end are ignored; callers validate first.
    pub fn with_substitutions<'a>(
        &self,
        records: impl IntoIterator<Item = &'a MutationRecord>,
    ) -> Sequence {
        let mut bases = self.0.clone();
        for record in records {
            if let Some(slot) = bases.get_mut(record.index) {
                *slot = record.mutated;
            }
        }
        Sequence(bases)
    }
}

impl FromStr for Sequence {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self> {
        s.chars()
            .enumerate()
            .map(|(position, symbol)| {
                Base::from_char(symbol).ok_or(StateError::InvalidSymbol { symbol, position })
            })
            .collect::<Result<Vec<_>>>()
            .map(Sequence)
    }
}

impl TryFrom<String> for Sequence {
    type Error = StateError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Sequence> for String {
    fn from(seq: Sequence) -> Self {
        seq.to_string()
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for base in &self.0 {
            write!(f, "{}", base.as_char())?;
        }
        Ok(())
    }
}

/// One point substitution between the baseline and the mutated sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MutationRecord {
    /// 0-based position in the sequence
    pub index: usize,
    /// Base in the wild-type sequence
    pub original: Base,
    /// Base in the mutated sequence
    pub mutated: Base,
}

/// Outcome of asking the oracle about one mutation.
///
/// On disk both variants are plain text; failures carry the
/// [`ERROR_PREFIX`] so readers that only know the string form still see
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Classification {
    /// Free text returned by the oracle, already trimmed
    Predicted(String),
    /// The call failed; the reason is kept for the operator
    Failed(String),
}

impl Classification {
    pub fn is_failure(&self) -> bool {
        matches!(self, Classification::Failed(_))
    }

    /// The text a reader sees, including the error tag for failures.
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Predicted(text) => write!(f, "{}", text),
            Classification::Failed(reason) => write!(f, "{}{}", ERROR_PREFIX, reason),
        }
    }
}

impl From<String> for Classification {
    fn from(s: String) -> Self {
        match s.strip_prefix(ERROR_PREFIX) {
            Some(reason) => Classification::Failed(reason.to_string()),
            None => Classification::Predicted(s),
        }
    }
}

impl From<Classification> for String {
    fn from(c: Classification) -> Self {
        c.to_string()
    }
}

/// A mutation record with its classification attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(flatten)]
    pub mutation: MutationRecord,
    pub prediction: Classification,
}

impl Prediction {
    pub fn new(mutation: MutationRecord, prediction: Classification) -> Self {
        Prediction {
            mutation,
            prediction,
        }
    }
}

/// Stage 1 output: both sequences and the mutations that separate them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDocument {
    pub wild_type_sequence: Sequence,
    pub mutated_sequence: Sequence,
    pub mutations: Vec<MutationRecord>,
}

impl RunDocument {
    /// Check every structural invariant of a generated run.
    ///
    /// Besides the per-record checks, the two sequences must agree at every
    /// position that no record mentions.
    pub fn validate(&self) -> Result<()> {
        check_records(
            &self.wild_type_sequence,
            &self.mutated_sequence,
            self.mutations.iter(),
        )?;

        let touched: HashSet<usize> = self.mutations.iter().map(|m| m.index).collect();
        let stray = self
            .wild_type_sequence
            .bases()
            .iter()
            .zip(self.mutated_sequence.bases())
            .enumerate()
            .find(|(i, (a, b))| a != b && !touched.contains(i));
        if let Some((index, _)) = stray {
            return Err(StateError::Invariant(format!(
                "sequences differ at position {} but no mutation records it",
                index
            )));
        }
        Ok(())
    }
}

/// Stage 2 output, consumed by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionDocument {
    pub wild_type_sequence: Sequence,
    pub mutated_sequence: Sequence,
    pub predictions: Vec<Prediction>,
}

impl PredictionDocument {
    /// Start a prediction document for `run` with no entries yet.
    pub fn for_run(run: &RunDocument) -> Self {
        PredictionDocument {
            wild_type_sequence: run.wild_type_sequence.clone(),
            mutated_sequence: run.mutated_sequence.clone(),
            predictions: Vec::with_capacity(run.mutations.len()),
        }
    }

    pub fn failure_count(&self) -> usize {
        self.predictions
            .iter()
            .filter(|p| p.prediction.is_failure())
            .count()
    }

    /// Per-record checks only: a checkpoint may hold a prefix of the run.
    pub fn validate(&self) -> Result<()> {
        check_records(
            &self.wild_type_sequence,
            &self.mutated_sequence,
            self.predictions.iter().map(|p| &p.mutation),
        )
    }
}

fn check_records<'a>(
    wild_type: &Sequence,
    mutated: &Sequence,
    records: impl Iterator<Item = &'a MutationRecord>,
) -> Result<()> {
    if wild_type.is_empty() {
        return Err(StateError::Invariant("sequence is empty".to_string()));
    }
    if wild_type.len() != mutated.len() {
        return Err(StateError::Invariant(format!(
            "wild-type length {} != mutated length {}",
            wild_type.len(),
            mutated.len()
        )));
    }

    let mut seen = HashSet::new();
    for record in records {
        if !seen.insert(record.index) {
            return Err(StateError::Invariant(format!(
                "duplicate mutation index {}",
                record.index
            )));
        }
        if record.original == record.mutated {
            return Err(StateError::Invariant(format!(
                "mutation at {} does not change the base",
                record.index
            )));
        }
        match (wild_type.get(record.index), mutated.get(record.index)) {
            (Some(w), Some(m)) if w == record.original && m == record.mutated => {}
            (Some(w), Some(m)) => {
                return Err(StateError::Invariant(format!(
                    "mutation at {} says {}>{} but sequences hold {}>{}",
                    record.index, record.original, record.mutated, w, m
                )))
            }
            _ => {
                return Err(StateError::Invariant(format!(
                    "mutation index {} out of range for length {}",
                    record.index,
                    wild_type.len()
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(s: &str) -> Sequence {
        s.parse().unwrap()
    }

    fn sample_run() -> RunDocument {
        RunDocument {
            wild_type_sequence: seq("ACTGACTGAC"),
            mutated_sequence: seq("ACTAACTGCC"),
            mutations: vec![
                MutationRecord {
                    index: 3,
                    original: Base::G,
                    mutated: Base::A,
                },
                MutationRecord {
                    index: 8,
                    original: Base::A,
                    mutated: Base::C,
                },
            ],
        }
    }

    #[test]
    fn test_substitutes_exclude_original() {
        for base in Base::ALL {
            let subs = base.substitutes();
            assert!(!subs.contains(&base));
            let unique: HashSet<_> = subs.iter().collect();
            assert_eq!(unique.len(), 3);
        }
    }

    #[test]
    fn test_sequence_parse_rejects_unknown_symbol() {
        let err = "ACGN".parse::<Sequence>().unwrap_err();
        assert!(matches!(
            err,
            StateError::InvalidSymbol {
                symbol: 'N',
                position: 3
            }
        ));
    }

    #[test]
    fn test_sequence_display_matches_input() {
        assert_eq!(seq("GATTACA").to_string(), "GATTACA");
    }

    #[test]
    fn test_run_document_wire_format() {
        let raw = serde_json::to_value(sample_run()).unwrap();
        assert_eq!(raw["wild_type_sequence"], "ACTGACTGAC");
        assert_eq!(raw["mutated_sequence"], "ACTAACTGCC");
        assert_eq!(raw["mutations"][0]["index"], 3);
        assert_eq!(raw["mutations"][0]["original"], "G");
        assert_eq!(raw["mutations"][0]["mutated"], "A");
    }

    #[test]
    fn test_run_document_roundtrip() {
        let run = sample_run();
        let json = serde_json::to_string_pretty(&run).unwrap();
        let back: RunDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(run, back);
    }

    #[test]
    fn test_valid_run_passes_validation() {
        sample_run().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_duplicate_index() {
        let mut run = sample_run();
        run.mutations[1] = run.mutations[0];
        let err = run.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_validate_rejects_unrecorded_difference() {
        let mut run = sample_run();
        run.mutations.pop();
        let err = run.validate().unwrap_err();
        assert!(err.to_string().contains("position 8"));
    }

    #[test]
    fn test_validate_rejects_mismatched_record() {
        let mut run = sample_run();
        run.mutations[0].original = Base::C;
        assert!(run.validate().is_err());
    }

    #[test]
    fn test_classification_error_tag_roundtrip() {
        let failed = Classification::Failed("timeout".to_string());
        let raw = serde_json::to_value(&failed).unwrap();
        assert_eq!(raw, "Error: timeout");

        let back: Classification = serde_json::from_value(raw).unwrap();
        assert_eq!(back, failed);

        let ok: Classification = serde_json::from_str("\"Likely missense.\"").unwrap();
        assert_eq!(ok, Classification::Predicted("Likely missense.".to_string()));
    }

    #[test]
    fn test_prediction_flattens_mutation_fields() {
        let p = Prediction::new(
            MutationRecord {
                index: 12,
                original: Base::T,
                mutated: Base::G,
            },
            Classification::Predicted("Probably synonymous.".to_string()),
        );
        let raw = serde_json::to_value(&p).unwrap();
        let obj = raw.as_object().unwrap();
        for key in ["index", "original", "mutated", "prediction"] {
            assert!(obj.contains_key(key), "missing key: {}", key);
        }
        let back: Prediction = serde_json::from_value(raw).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_prediction_document_accepts_prefix() {
        let run = sample_run();
        let mut doc = PredictionDocument::for_run(&run);
        doc.predictions.push(Prediction::new(
            run.mutations[0],
            Classification::Failed("503".to_string()),
        ));
        doc.validate().unwrap();
        assert_eq!(doc.failure_count(), 1);
    }
}
