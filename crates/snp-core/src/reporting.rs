//! Report outputs for a prediction document.
//!
//! - CSV: one row per mutation, `index,original,mutated,prediction`
//! - Summary JSON: the serialized [`ImpactSummary`]
//! - Markdown: sequences, impact counts, structure hint and the table

use std::io::Write;
use std::path::Path;

use snp_state::PredictionDocument;

use crate::error::Result;
use crate::summary::ImpactSummary;

/// File name the dashboard offers for the CSV download.
pub const DEFAULT_CSV_NAME: &str = "snp_predictions.csv";

/// Header row of the flattened prediction table.
pub const CSV_HEADER: [&str; 4] = ["index", "original", "mutated", "prediction"];

/// Write the flattened prediction table as CSV.
pub fn write_predictions_csv<W: Write>(writer: W, doc: &PredictionDocument) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for p in &doc.predictions {
        csv_writer.write_record([
            p.mutation.index.to_string(),
            p.mutation.original.to_string(),
            p.mutation.mutated.to_string(),
            p.prediction.text(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the CSV export to `path`.
pub fn export_predictions_csv(path: &Path, doc: &PredictionDocument) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_predictions_csv(file, doc)
}

/// Write the summary artifact as pretty JSON.
pub fn write_summary_json(path: &Path, summary: &ImpactSummary) -> Result<()> {
    let content = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Render a markdown report: sequences, impact counts, structure hint, table.
pub fn render_summary_md(doc: &PredictionDocument, summary: &ImpactSummary) -> String {
    let mut out = String::new();
    out.push_str("# SNP Simulation Report\n\n");

    out.push_str("## Wild-Type Sequence\n```text\n");
    out.push_str(&format!("{}\n```\n\n", doc.wild_type_sequence));
    out.push_str("## Mutated Sequence\n```text\n");
    out.push_str(&format!("{}\n```\n\n", doc.mutated_sequence));

    out.push_str("## Mutation Type Distribution\n");
    for (label, count) in summary.counts.as_pairs() {
        out.push_str(&format!("- {}: {}\n", label, count));
    }
    out.push('\n');

    out.push_str("## Structural Prediction\n");
    out.push_str(&format!(
        "- {} (PDB {}, ribbon {})\n",
        summary.structure_hint.label(),
        summary.pdb_id,
        summary.ribbon_color
    ));
    if summary.failed_predictions > 0 {
        out.push_str(&format!(
            "- {} of {} oracle calls failed\n",
            summary.failed_predictions, summary.total_predictions
        ));
    }
    out.push('\n');

    out.push_str("## Predictions\n");
    out.push_str("| index | original | mutated | prediction |\n");
    out.push_str("|---|---|---|---|\n");
    for p in &doc.predictions {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            p.mutation.index,
            p.mutation.original,
            p.mutation.mutated,
            p.prediction.text().replace('|', "\\|")
        ));
    }
    out
}
