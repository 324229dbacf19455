//! Human-readable narrative summary of a matrix run.

use crate::driver::RunOutcome;
use crate::results::MatrixResults;
use std::fmt::Write;

const VOLATILE_TERM_SAMPLE: usize = 10;

/// Render the narrative summary for one persisted matrix run.
/// Deterministic: the same results always render the same text.
pub fn render_summary(results: &MatrixResults) -> String {
    let mut out = String::new();
    let line = "=".repeat(70);

    let _ = writeln!(out, "{line}");
    let _ = writeln!(out, "ONTOLOGY MERGE-ORDER SENSITIVITY SUMMARY");
    let _ = writeln!(out, "{line}");
    let _ = writeln!(out, "Run:        {}", results.run_id);
    let _ = writeln!(out, "Finished:   {}", results.finished_at.to_rfc3339());
    let _ = writeln!(out, "Inputs:     {}", results.inputs.join(", "));
    let _ = writeln!(
        out,
        "Matrix:     {} orderings x {} variants",
        results.orderings.len(),
        results.variants.len()
    );

    let _ = writeln!(out, "\nRun results:");
    for run in &results.runs {
        match &run.outcome {
            RunOutcome::Success { record } => {
                let axioms = record
                    .basic_counts
                    .total_axioms
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "unmeasured".to_string());
                let _ = writeln!(
                    out,
                    "  ok   {:30} {:>14} bytes  {:>12} axioms  ({})",
                    run.run_key(),
                    record.file_size,
                    axioms,
                    provenance_label(record),
                );
            }
            RunOutcome::Failed { error } => {
                let _ = writeln!(out, "  FAIL {:30} {}", run.run_key(), first_line(error));
            }
        }
    }

    let analysis = &results.analysis;
    let _ = writeln!(out, "\nAnalysis:");
    let _ = writeln!(
        out,
        "  Successful runs:             {}/{}",
        analysis.successful_runs, analysis.total_runs
    );
    let _ = writeln!(
        out,
        "  Significant ordering pairs:  {}/{}",
        analysis.significant_pairs, analysis.compared_pairs
    );
    let _ = writeln!(
        out,
        "  Volatile key terms:          {}",
        analysis.volatile_term_count
    );
    let _ = writeln!(
        out,
        "  Cleanup varies by order:     {}",
        if analysis.cleanup_impact_varies_by_order {
            "yes"
        } else {
            "no"
        }
    );

    let volatile: Vec<_> = analysis
        .term_attributions
        .iter()
        .filter(|(_, t)| t.volatile)
        .collect();
    if !volatile.is_empty() {
        let _ = writeln!(
            out,
            "\nTerms with order-dependent attribution ({}):",
            volatile.len()
        );
        for (id, term) in volatile.iter().take(VOLATILE_TERM_SAMPLE) {
            let _ = writeln!(
                out,
                "  - {} ({}, {}): {} distinct definers",
                term.label,
                id,
                term.category,
                term.unique_definers.len()
            );
        }
        if volatile.len() > VOLATILE_TERM_SAMPLE {
            let _ = writeln!(
                out,
                "  ... and {} more",
                volatile.len() - VOLATILE_TERM_SAMPLE
            );
        }
    }

    let _ = writeln!(out, "\nKey findings:");
    for finding in &analysis.findings {
        let _ = writeln!(out, "  - {finding}");
    }

    out
}

fn provenance_label(record: &owlmetry_metrics::MetricsRecord) -> String {
    let method = match record.provenance.method {
        owlmetry_metrics::CountMethod::Measured => "measured",
        owlmetry_metrics::CountMethod::Estimated => "estimated",
        owlmetry_metrics::CountMethod::Failed => "failed",
    };
    method.to_string()
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}
