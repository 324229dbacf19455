//! MetricsRecord: the aggregate measurement for one artifact.

use crate::counts::{BasicCounts, CountProvenance};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The defining ontology recorded for one monitored term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermDefiner {
    /// IRI of the ontology declared as the term's definer.
    pub definer: String,
    /// Display label from the monitored-term catalogue.
    pub label: String,
    /// Reporting category from the catalogue.
    pub category: String,
}

/// One immutable measurement record per artifact.
///
/// Created once per test run and read-only afterwards. Every count is a
/// non-negative integer; fields a failed method could not establish are
/// empty rather than zero, and `provenance` always disambiguates the
/// two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Path of the measured file.
    pub file_path: String,

    /// Size in bytes.
    pub file_size: u64,

    /// Streaming SHA-256 of the file content, when readable. Identical
    /// digests across orderings are a byte-identity shortcut for the
    /// analyzer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,

    /// Best-effort entity/axiom counts.
    pub basic_counts: BasicCounts,

    /// How the basic counts were obtained.
    pub provenance: CountProvenance,

    /// Axiom-category name → count, from the fixed breakdown queries.
    /// Zero-defaulted per category on query failure.
    #[serde(default)]
    pub axiom_breakdown: BTreeMap<String, u64>,

    /// Definer ontology IRI → number of terms it defines.
    #[serde(default)]
    pub defined_by_counts: BTreeMap<String, u64>,

    /// Term-namespace prefix → definer prefix → count, for terms whose
    /// declared definer belongs to a different ontology namespace.
    #[serde(default)]
    pub cross_references: BTreeMap<String, BTreeMap<String, u64>>,

    /// Monitored term ID → its recorded definer.
    #[serde(default)]
    pub key_term_definers: BTreeMap<String, TermDefiner>,

    /// Wall-clock seconds spent collecting this record.
    pub collection_seconds: f64,
}

impl MetricsRecord {
    /// Union view of basic counts and the axiom breakdown, as one
    /// metric map for comparison.
    pub fn metric_map(&self) -> BTreeMap<String, u64> {
        let mut map = self.basic_counts.metric_map();
        for (key, value) in &self.axiom_breakdown {
            map.insert(key.clone(), *value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counts::{CountMethod, CountStrategy};

    fn record() -> MetricsRecord {
        MetricsRecord {
            file_path: "merged.owl".to_string(),
            file_size: 1024,
            sha256: None,
            basic_counts: BasicCounts {
                classes: Some(5),
                total_axioms: Some(20),
                ..Default::default()
            },
            provenance: CountProvenance::measured(CountStrategy::Measure),
            axiom_breakdown: BTreeMap::from([("subclass_axioms".to_string(), 7)]),
            defined_by_counts: BTreeMap::new(),
            cross_references: BTreeMap::new(),
            key_term_definers: BTreeMap::new(),
            collection_seconds: 0.5,
        }
    }

    #[test]
    fn metric_map_unions_counts_and_breakdown() {
        let map = record().metric_map();
        assert_eq!(map["classes"], 5);
        assert_eq!(map["total_axioms"], 20);
        assert_eq!(map["subclass_axioms"], 7);
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = record();
        let json = serde_json::to_string(&record).expect("serialize");
        let back: MetricsRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, record);
        // The provenance tag survives and stays unambiguous.
        assert_eq!(back.provenance.method, CountMethod::Measured);
    }
}
