//! Pairwise comparison of two MetricsRecords.

use crate::record::MetricsRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Absolute file-size delta (bytes) above which a comparison is
/// flagged significant.
pub const SIGNIFICANT_SIZE_DELTA: i64 = 1_000_000;

/// One metric key's values on both sides and their difference (b − a).
/// A key absent from one side is zero-filled before differencing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountDelta {
    pub a: u64,
    pub b: u64,
    pub difference: i64,
}

impl CountDelta {
    fn new(a: u64, b: u64) -> Self {
        Self {
            a,
            b,
            difference: b as i64 - a as i64,
        }
    }
}

/// A monitored term whose recorded definer differs between two records.
/// `None` means the term carried no definer on that side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinerDifference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<String>,
    pub label: String,
}

/// The delta between two MetricsRecords. A derived, recomputable view:
/// comparing the same two records twice yields identical results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub label_a: String,
    pub label_b: String,

    /// `b.file_size − a.file_size`.
    pub file_size_difference: i64,

    /// Every metric key in the union of both sides' basic counts and
    /// axiom breakdowns.
    pub count_differences: BTreeMap<String, CountDelta>,

    /// Definer sources whose term counts differ (nonzero only).
    pub definer_differences: BTreeMap<String, CountDelta>,

    /// Monitored terms whose recorded definer differs.
    pub key_term_differences: BTreeMap<String, DefinerDifference>,

    /// Set when the size delta exceeds [`SIGNIFICANT_SIZE_DELTA`] or
    /// any definer count differs.
    pub significant: bool,
}

impl ComparisonResult {
    /// Count of metric keys whose values actually differ.
    pub fn differing_metric_count(&self) -> usize {
        self.count_differences
            .values()
            .filter(|d| d.difference != 0)
            .count()
            + self.definer_differences.len()
    }
}

/// Compare two metrics records. Swapping the arguments negates every
/// numeric difference and preserves the significance flag.
pub fn compare(
    a: &MetricsRecord,
    b: &MetricsRecord,
    label_a: &str,
    label_b: &str,
) -> ComparisonResult {
    let map_a = a.metric_map();
    let map_b = b.metric_map();

    let mut count_differences = BTreeMap::new();
    let keys: BTreeSet<&String> = map_a.keys().chain(map_b.keys()).collect();
    for key in keys {
        let delta = CountDelta::new(
            map_a.get(key).copied().unwrap_or(0),
            map_b.get(key).copied().unwrap_or(0),
        );
        count_differences.insert(key.clone(), delta);
    }

    let mut definer_differences = BTreeMap::new();
    let definers: BTreeSet<&String> = a
        .defined_by_counts
        .keys()
        .chain(b.defined_by_counts.keys())
        .collect();
    for definer in definers {
        let delta = CountDelta::new(
            a.defined_by_counts.get(definer).copied().unwrap_or(0),
            b.defined_by_counts.get(definer).copied().unwrap_or(0),
        );
        if delta.difference != 0 {
            definer_differences.insert(definer.clone(), delta);
        }
    }

    let mut key_term_differences = BTreeMap::new();
    let terms: BTreeSet<&String> = a
        .key_term_definers
        .keys()
        .chain(b.key_term_definers.keys())
        .collect();
    for term in terms {
        let on_a = a.key_term_definers.get(term);
        let on_b = b.key_term_definers.get(term);
        let definer_a = on_a.map(|d| d.definer.clone());
        let definer_b = on_b.map(|d| d.definer.clone());
        if definer_a != definer_b {
            let label = on_a
                .or(on_b)
                .map(|d| d.label.clone())
                .unwrap_or_default();
            key_term_differences.insert(
                term.clone(),
                DefinerDifference {
                    a: definer_a,
                    b: definer_b,
                    label,
                },
            );
        }
    }

    let file_size_difference = b.file_size as i64 - a.file_size as i64;
    let significant =
        file_size_difference.abs() > SIGNIFICANT_SIZE_DELTA || !definer_differences.is_empty();

    ComparisonResult {
        label_a: label_a.to_string(),
        label_b: label_b.to_string(),
        file_size_difference,
        count_differences,
        definer_differences,
        key_term_differences,
        significant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counts::{BasicCounts, CountProvenance, CountStrategy};
    use crate::record::TermDefiner;

    fn record(file_size: u64, classes: u64, axioms: u64) -> MetricsRecord {
        MetricsRecord {
            file_path: "merged.owl".to_string(),
            file_size,
            sha256: None,
            basic_counts: BasicCounts {
                classes: Some(classes),
                total_axioms: Some(axioms),
                ..Default::default()
            },
            provenance: CountProvenance::measured(CountStrategy::Measure),
            axiom_breakdown: BTreeMap::new(),
            defined_by_counts: BTreeMap::new(),
            cross_references: BTreeMap::new(),
            key_term_definers: BTreeMap::new(),
            collection_seconds: 0.0,
        }
    }

    #[test]
    fn comparison_is_idempotent() {
        let a = record(100, 5, 20);
        let b = record(250, 6, 24);
        let first = compare(&a, &b, "alpha", "beta");
        let second = compare(&a, &b, "alpha", "beta");
        assert_eq!(first, second);
    }

    #[test]
    fn swapping_sides_negates_differences_and_keeps_significance() {
        let mut a = record(100, 5, 20);
        let mut b = record(2_200_000, 6, 24);
        a.defined_by_counts.insert("chebi.owl".to_string(), 10);
        b.defined_by_counts.insert("chebi.owl".to_string(), 8);

        let forward = compare(&a, &b, "alpha", "beta");
        let backward = compare(&b, &a, "beta", "alpha");

        for (key, delta) in &forward.count_differences {
            assert_eq!(delta.difference, -backward.count_differences[key].difference);
        }
        assert_eq!(
            forward.file_size_difference,
            -backward.file_size_difference
        );
        assert_eq!(
            forward.definer_differences["chebi.owl"].difference,
            -backward.definer_differences["chebi.owl"].difference
        );
        assert_eq!(forward.significant, backward.significant);
        assert!(forward.significant);
    }

    #[test]
    fn missing_keys_are_zero_filled_not_skipped() {
        let mut a = record(100, 5, 20);
        let b = record(100, 5, 20);
        a.axiom_breakdown.insert("subclass_axioms".to_string(), 7);

        let result = compare(&a, &b, "alpha", "beta");
        let delta = &result.count_differences["subclass_axioms"];
        assert_eq!((delta.a, delta.b, delta.difference), (7, 0, -7));
    }

    #[test]
    fn size_delta_exactly_at_threshold_is_not_significant() {
        let a = record(10_000_000, 5, 20);
        let at = record(11_000_000, 5, 20);
        let over = record(11_000_001, 5, 20);
        assert!(!compare(&a, &at, "a", "at").significant);
        assert!(compare(&a, &over, "a", "over").significant);
    }

    #[test]
    fn near_identical_sizes_are_not_significant_while_divergent_ones_are() {
        // Three orderings: two near-identical outputs, one divergent.
        let first = record(10_000_000, 5, 20);
        let second = record(10_000_050, 5, 20);
        let third = record(11_050_000, 5, 20);

        assert!(!compare(&first, &second, "alphabetical", "hierarchy").significant);
        assert!(compare(&second, &third, "hierarchy", "size").significant);
    }

    #[test]
    fn any_definer_count_change_is_significant() {
        let mut a = record(100, 5, 20);
        let mut b = record(100, 5, 20);
        a.defined_by_counts.insert("chebi.owl".to_string(), 10);
        b.defined_by_counts.insert("chebi.owl".to_string(), 11);
        assert!(compare(&a, &b, "a", "b").significant);
    }

    #[test]
    fn key_term_definer_changes_are_reported_with_labels() {
        let mut a = record(100, 5, 20);
        let mut b = record(100, 5, 20);
        a.key_term_definers.insert(
            "CHEBI:15377".to_string(),
            TermDefiner {
                definer: "chebi.owl".to_string(),
                label: "water".to_string(),
                category: "chemical".to_string(),
            },
        );
        b.key_term_definers.insert(
            "CHEBI:15377".to_string(),
            TermDefiner {
                definer: "envo.owl".to_string(),
                label: "water".to_string(),
                category: "chemical".to_string(),
            },
        );

        let result = compare(&a, &b, "a", "b");
        let difference = &result.key_term_differences["CHEBI:15377"];
        assert_eq!(difference.a.as_deref(), Some("chebi.owl"));
        assert_eq!(difference.b.as_deref(), Some("envo.owl"));
        assert_eq!(difference.label, "water");
    }
}
