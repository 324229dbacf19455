//! Order-sensitivity analysis over the full run matrix.
//!
//! A derived view: recomputed in full from the RunRecords, never
//! updated incrementally. Failed runs keep their matrix slot but are
//! excluded from every aggregate here.

use crate::driver::RunRecord;
use crate::ordering::Variant;
use owlmetry_metrics::{MetricsRecord, MonitoredTerm, compare};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How the cleanup removals changed one ordering's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupImpact {
    pub file_size_difference: i64,
    pub axiom_count_difference: i64,
    pub class_count_difference: i64,
    /// Monitored terms whose definer changed across the cleanup.
    pub definer_difference_count: usize,
}

/// Spread of the aggregate metrics across one variant's successful
/// runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSpread {
    pub runs: usize,
    pub file_size_min: u64,
    pub file_size_max: u64,
    pub unique_file_sizes: usize,
    pub unique_axiom_counts: usize,
    pub unique_class_counts: usize,
    /// Distinct content digests, where digests were recorded.
    pub unique_digests: Option<usize>,
    /// True when any aggregate metric took more than one value.
    pub has_variations: bool,
}

/// One monitored term's attribution across every tested combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermAttributionSummary {
    pub label: String,
    pub category: String,
    /// Run key (`<ordering>_<variant>`) → recorded definer.
    pub definers: BTreeMap<String, String>,
    pub unique_definers: BTreeSet<String>,
    /// Derived, recomputed on every analysis: at least two distinct
    /// definers were observed.
    pub volatile: bool,
}

/// The top-level output of the order-sensitivity analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAnalysisSummary {
    pub total_runs: usize,
    pub successful_runs: usize,
    pub failed_runs: usize,

    /// Same-variant pairs compared, with any non-zero difference, and
    /// flagged significant.
    pub compared_pairs: usize,
    pub differing_pairs: usize,
    pub significant_pairs: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_only_spread: Option<VariantSpread>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_removes_spread: Option<VariantSpread>,

    /// Ordering id → cleanup impact, for orderings where both variants
    /// succeeded.
    pub cleanup_impacts: BTreeMap<String, CleanupImpact>,
    pub cleanup_impact_varies_by_order: bool,

    pub term_attributions: BTreeMap<String, TermAttributionSummary>,
    pub volatile_term_count: usize,

    /// Mechanically derived findings, deterministic for the same runs.
    pub findings: Vec<String>,
}

/// Analyze the complete run matrix.
pub fn analyze(runs: &[RunRecord], terms: &[MonitoredTerm]) -> OrderAnalysisSummary {
    let successful: Vec<&RunRecord> = runs.iter().filter(|r| r.is_success()).collect();

    let pairwise = pairwise_significance(&successful);
    let merge_only_spread = variant_spread(&successful, Variant::MergeOnly);
    let with_removes_spread = variant_spread(&successful, Variant::WithRemoves);
    let cleanup_impacts = cleanup_impacts(&successful);
    let cleanup_impact_varies_by_order = cleanup_varies(&cleanup_impacts);
    let term_attributions = term_attributions(&successful, terms);
    let volatile_term_count = term_attributions.values().filter(|t| t.volatile).count();

    let findings = findings(
        volatile_term_count,
        merge_only_spread.as_ref(),
        cleanup_impact_varies_by_order,
        pairwise.significant,
    );

    OrderAnalysisSummary {
        total_runs: runs.len(),
        successful_runs: successful.len(),
        failed_runs: runs.len() - successful.len(),
        compared_pairs: pairwise.compared,
        differing_pairs: pairwise.differing,
        significant_pairs: pairwise.significant,
        merge_only_spread,
        with_removes_spread,
        cleanup_impacts,
        cleanup_impact_varies_by_order,
        term_attributions,
        volatile_term_count,
        findings,
    }
}

struct PairwiseTally {
    compared: usize,
    differing: usize,
    significant: usize,
}

/// Pass (i): compare every pair of successful records sharing a
/// variant, counting non-zero and significant divergences.
fn pairwise_significance(successful: &[&RunRecord]) -> PairwiseTally {
    let mut tally = PairwiseTally {
        compared: 0,
        differing: 0,
        significant: 0,
    };
    for variant in Variant::BOTH {
        let of_variant: Vec<&&RunRecord> = successful
            .iter()
            .filter(|r| r.variant == variant)
            .collect();
        for i in 0..of_variant.len() {
            for j in (i + 1)..of_variant.len() {
                let (a, b) = (of_variant[i], of_variant[j]);
                let (Some(record_a), Some(record_b)) = (a.record(), b.record()) else {
                    continue;
                };
                tally.compared += 1;
                let result = compare(record_a, record_b, &a.ordering_id, &b.ordering_id);
                if result.differing_metric_count() > 0 || result.file_size_difference != 0 {
                    tally.differing += 1;
                }
                if result.significant {
                    tally.significant += 1;
                }
            }
        }
    }
    tally
}

fn variant_spread(successful: &[&RunRecord], variant: Variant) -> Option<VariantSpread> {
    let records: Vec<&MetricsRecord> = successful
        .iter()
        .filter(|r| r.variant == variant)
        .filter_map(|r| r.record())
        .collect();
    if records.is_empty() {
        return None;
    }

    let sizes: Vec<u64> = records.iter().map(|r| r.file_size).collect();
    let axiom_counts: BTreeSet<u64> = records
        .iter()
        .filter_map(|r| r.basic_counts.total_axioms)
        .collect();
    let class_counts: BTreeSet<u64> = records
        .iter()
        .filter_map(|r| r.basic_counts.classes)
        .collect();
    let digests: Vec<&String> = records.iter().filter_map(|r| r.sha256.as_ref()).collect();
    let unique_digests = (digests.len() == records.len()).then(|| {
        digests
            .iter()
            .collect::<BTreeSet<_>>()
            .len()
    });

    let unique_file_sizes = sizes.iter().collect::<BTreeSet<_>>().len();
    let has_variations =
        unique_file_sizes > 1 || axiom_counts.len() > 1 || class_counts.len() > 1;

    Some(VariantSpread {
        runs: records.len(),
        file_size_min: sizes.iter().copied().min().unwrap_or(0),
        file_size_max: sizes.iter().copied().max().unwrap_or(0),
        unique_file_sizes,
        unique_axiom_counts: axiom_counts.len(),
        unique_class_counts: class_counts.len(),
        unique_digests,
        has_variations,
    })
}

/// Pass (ii): per ordering, quantify what the cleanup removals changed.
fn cleanup_impacts(successful: &[&RunRecord]) -> BTreeMap<String, CleanupImpact> {
    let mut merge_only: BTreeMap<&str, &MetricsRecord> = BTreeMap::new();
    let mut with_removes: BTreeMap<&str, &MetricsRecord> = BTreeMap::new();
    for run in successful {
        let Some(record) = run.record() else { continue };
        match run.variant {
            Variant::MergeOnly => {
                merge_only.insert(run.ordering_id.as_str(), record);
            }
            Variant::WithRemoves => {
                with_removes.insert(run.ordering_id.as_str(), record);
            }
        }
    }

    let mut impacts = BTreeMap::new();
    for (ordering_id, base) in &merge_only {
        let Some(cleaned) = with_removes.get(ordering_id) else {
            continue;
        };
        let result = compare(base, cleaned, "merge_only", "with_removes");
        let difference_of = |key: &str| {
            result
                .count_differences
                .get(key)
                .map(|d| d.difference)
                .unwrap_or(0)
        };
        impacts.insert(
            ordering_id.to_string(),
            CleanupImpact {
                file_size_difference: result.file_size_difference,
                axiom_count_difference: difference_of("total_axioms"),
                class_count_difference: difference_of("classes"),
                definer_difference_count: result.key_term_differences.len(),
            },
        );
    }
    impacts
}

/// The cleanup step "varies by order" when its measured impact is not
/// the same for every ordering.
fn cleanup_varies(impacts: &BTreeMap<String, CleanupImpact>) -> bool {
    let size_deltas: BTreeSet<i64> = impacts.values().map(|i| i.file_size_difference).collect();
    let axiom_deltas: BTreeSet<i64> = impacts
        .values()
        .map(|i| i.axiom_count_difference)
        .collect();
    size_deltas.len() > 1 || axiom_deltas.len() > 1
}

/// Pass (iii): classify every monitored term stable/volatile from its
/// definers across all combinations where it appeared.
fn term_attributions(
    successful: &[&RunRecord],
    terms: &[MonitoredTerm],
) -> BTreeMap<String, TermAttributionSummary> {
    let mut attributions = BTreeMap::new();
    for term in terms {
        let mut definers = BTreeMap::new();
        for run in successful {
            let Some(record) = run.record() else { continue };
            if let Some(definer) = record.key_term_definers.get(&term.id) {
                definers.insert(run.run_key(), definer.definer.clone());
            }
        }
        let unique_definers: BTreeSet<String> = definers.values().cloned().collect();
        let volatile = unique_definers.len() > 1;
        attributions.insert(
            term.id.clone(),
            TermAttributionSummary {
                label: term.label.clone(),
                category: term.category.clone(),
                definers,
                unique_definers,
                volatile,
            },
        );
    }
    attributions
}

/// Fixed findings rules. Order and wording are part of the contract:
/// the same records always produce the same findings.
fn findings(
    volatile_term_count: usize,
    merge_only_spread: Option<&VariantSpread>,
    cleanup_varies: bool,
    significant_pairs: usize,
) -> Vec<String> {
    let mut findings = Vec::new();
    if volatile_term_count > 0 {
        findings.push(format!(
            "order affects term attribution for {volatile_term_count} key terms"
        ));
    }
    if merge_only_spread.is_some_and(|s| s.has_variations) {
        findings.push("merge order affects final results even without remove operations".to_string());
    }
    if cleanup_varies {
        findings.push("remove operations impact varies depending on merge order".to_string());
    }
    if findings.is_empty() && significant_pairs == 0 {
        findings.push("no significant order-dependent differences detected".to_string());
    }
    findings
}
