//! Aggregate view of a prediction document.
//!
//! Counts are keyword hits, not a parsed label: a prediction mentioning
//! both "missense" and "nonsense" counts toward both. Matching is
//! case-insensitive. Every prediction is counted, including the
//! error-tagged text of a failed call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snp_state::{Prediction, PredictionDocument};

/// Placeholder structure shown by the dashboard's 3D viewer.
pub const PLACEHOLDER_PDB_ID: &str = "1A2P";

/// Keyword hit counts over prediction texts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactCounts {
    pub missense: usize,
    pub nonsense: usize,
    pub synonymous: usize,
}

impl ImpactCounts {
    /// Count keyword hits over raw texts.
    pub fn tally<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let mut counts = ImpactCounts::default();
        for text in texts {
            let lower = text.to_lowercase();
            if lower.contains("missense") {
                counts.missense += 1;
            }
            if lower.contains("nonsense") {
                counts.nonsense += 1;
            }
            if lower.contains("synonymous") {
                counts.synonymous += 1;
            }
        }
        counts
    }

    /// Count over the stored text of every prediction.
    pub fn from_predictions(predictions: &[Prediction]) -> Self {
        let texts: Vec<String> = predictions.iter().map(|p| p.prediction.text()).collect();
        Self::tally(texts.iter().map(String::as_str))
    }

    /// `(label, count)` pairs in chart order.
    pub fn as_pairs(&self) -> [(&'static str, usize); 3] {
        [
            ("missense", self.missense),
            ("nonsense", self.nonsense),
            ("synonymous", self.synonymous),
        ]
    }

    /// Most severe impact present: nonsense, then missense, else unchanged.
    pub fn dominant(&self) -> StructureHint {
        if self.nonsense > 0 {
            StructureHint::Truncated
        } else if self.missense > 0 {
            StructureHint::Altered
        } else {
            StructureHint::Unchanged
        }
    }
}

/// How the placeholder protein should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureHint {
    /// At least one nonsense call: premature stop
    Truncated,
    /// At least one missense call: altered residue
    Altered,
    /// Only synonymous (or unclassified) calls
    Unchanged,
}

impl StructureHint {
    pub fn ribbon_color(self) -> &'static str {
        match self {
            StructureHint::Truncated => "yellow",
            StructureHint::Altered => "purple",
            StructureHint::Unchanged => "cyan",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StructureHint::Truncated => "Nonsense mutation detected: truncated protein",
            StructureHint::Altered => "Missense mutation detected: altered protein",
            StructureHint::Unchanged => "Synonymous mutations: protein structure unchanged",
        }
    }
}

/// Summary artifact handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactSummary {
    pub generated_at: DateTime<Utc>,
    pub sequence_length: usize,
    pub total_predictions: usize,
    pub failed_predictions: usize,
    pub counts: ImpactCounts,
    pub structure_hint: StructureHint,
    pub ribbon_color: String,
    pub pdb_id: String,
}

impl ImpactSummary {
    pub fn from_document(doc: &PredictionDocument) -> Self {
        Self::from_document_at(doc, Utc::now())
    }

    pub fn from_document_at(doc: &PredictionDocument, generated_at: DateTime<Utc>) -> Self {
        let counts = ImpactCounts::from_predictions(&doc.predictions);
        let hint = counts.dominant();
        ImpactSummary {
            generated_at,
            sequence_length: doc.wild_type_sequence.len(),
            total_predictions: doc.predictions.len(),
            failed_predictions: doc.failure_count(),
            counts,
            structure_hint: hint,
            ribbon_color: hint.ribbon_color().to_string(),
            pdb_id: PLACEHOLDER_PDB_ID.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snp_state::{Base, Classification, MutationRecord};

    #[test]
    fn tally_is_case_insensitive() {
        let counts = ImpactCounts::tally(["MISSENSE change", "Nonsense!", "synonymous"]);
        assert_eq!(
            counts,
            ImpactCounts {
                missense: 1,
                nonsense: 1,
                synonymous: 1
            }
        );
    }

    #[test]
    fn one_text_can_hit_several_buckets() {
        let counts = ImpactCounts::tally(["could be missense or nonsense"]);
        assert_eq!(counts.missense, 1);
        assert_eq!(counts.nonsense, 1);
        assert_eq!(counts.synonymous, 0);
    }

    #[test]
    fn dominant_prefers_nonsense_then_missense() {
        let c = ImpactCounts {
            missense: 3,
            nonsense: 1,
            synonymous: 0,
        };
        assert_eq!(c.dominant(), StructureHint::Truncated);
        assert_eq!(c.dominant().ribbon_color(), "yellow");

        let c = ImpactCounts {
            missense: 1,
            nonsense: 0,
            synonymous: 4,
        };
        assert_eq!(c.dominant(), StructureHint::Altered);
        assert_eq!(c.dominant().ribbon_color(), "purple");

        assert_eq!(ImpactCounts::default().dominant(), StructureHint::Unchanged);
        assert_eq!(StructureHint::Unchanged.ribbon_color(), "cyan");
    }

    #[test]
    fn pairs_are_in_chart_order() {
        let c = ImpactCounts {
            missense: 2,
            nonsense: 0,
            synonymous: 1,
        };
        assert_eq!(
            c.as_pairs(),
            [("missense", 2), ("nonsense", 0), ("synonymous", 1)]
        );
    }

    #[test]
    fn failed_prediction_text_is_counted() {
        let record = MutationRecord {
            index: 1,
            original: Base::A,
            mutated: Base::G,
        };
        let predictions = vec![
            Prediction::new(
                record,
                Classification::Failed("model said missense then cut off".to_string()),
            ),
            Prediction::new(
                MutationRecord { index: 2, ..record },
                Classification::Predicted("Synonymous.".to_string()),
            ),
        ];

        let counts = ImpactCounts::from_predictions(&predictions);

        assert_eq!(
            counts,
            ImpactCounts::tally(["Error: model said missense then cut off", "Synonymous."])
        );
        assert_eq!(counts.missense, 1);
        assert_eq!(counts.synonymous, 1);
        assert_eq!(counts.dominant(), StructureHint::Altered);
    }
}
