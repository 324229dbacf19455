//! Basic entity/axiom counts and their provenance.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Best-effort entity and axiom counts for one artifact.
///
/// `None` means unmeasured. A strategy that fails must leave its fields
/// unset rather than record a zero that looks authoritative; the
/// provenance tag disambiguates "zero because empty" from "zero because
/// unmeasured".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicCounts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_properties: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_properties: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_properties: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub individuals: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_axioms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_axioms: Option<u64>,
}

impl BasicCounts {
    /// Established counts as a named metric map, for comparison.
    /// Unset fields are absent, not zero.
    pub fn metric_map(&self) -> BTreeMap<String, u64> {
        let mut map = BTreeMap::new();
        let fields = [
            ("classes", self.classes),
            ("object_properties", self.object_properties),
            ("data_properties", self.data_properties),
            ("annotation_properties", self.annotation_properties),
            ("individuals", self.individuals),
            ("total_axioms", self.total_axioms),
            ("logical_axioms", self.logical_axioms),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                map.insert(name.to_string(), value);
            }
        }
        map
    }

    /// True if no field was established at all.
    pub fn is_empty(&self) -> bool {
        self.metric_map().is_empty()
    }
}

/// How a record's counts were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMethod {
    /// Direct authoritative measurement.
    Measured,
    /// Inferred from indirect signals (ratios, size, tag patterns).
    Estimated,
    /// No strategy produced a usable total.
    Failed,
}

/// Which ladder rung produced the final counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountStrategy {
    Measure,
    SparqlCount,
    PatternScan,
}

/// Provenance tag carried by every [`BasicCounts`]: the method is never
/// ambiguous, and the strategy names the rung that won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountProvenance {
    pub method: CountMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<CountStrategy>,
}

impl CountProvenance {
    pub fn measured(strategy: CountStrategy) -> Self {
        Self {
            method: CountMethod::Measured,
            strategy: Some(strategy),
        }
    }

    pub fn estimated(strategy: CountStrategy) -> Self {
        Self {
            method: CountMethod::Estimated,
            strategy: Some(strategy),
        }
    }

    pub fn failed() -> Self {
        Self {
            method: CountMethod::Failed,
            strategy: None,
        }
    }
}

/// Tunable constants of the counting ladder.
///
/// The ratios and the bytes-per-axiom figure are empirical; treat them
/// as deployment parameters, not derived truths.
#[derive(Debug, Clone)]
pub struct CounterConfig {
    /// Axioms contributed per class, on average.
    pub class_axiom_ratio: f64,
    /// Axioms contributed per object property.
    pub object_property_axiom_ratio: f64,
    /// Axioms contributed per data property.
    pub data_property_axiom_ratio: f64,
    /// Axioms contributed per annotation property.
    pub annotation_property_axiom_ratio: f64,
    /// Axioms contributed per named individual.
    pub individual_axiom_ratio: f64,
    /// Average serialized bytes per axiom in RDF/XML.
    pub bytes_per_axiom: f64,
    /// Tags whose occurrence count approximates an axiom count.
    pub structural_tags: Vec<String>,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            class_axiom_ratio: 4.5,
            object_property_axiom_ratio: 3.0,
            data_property_axiom_ratio: 2.5,
            annotation_property_axiom_ratio: 2.0,
            individual_axiom_ratio: 1.5,
            bytes_per_axiom: 350.0,
            structural_tags: [
                "<rdfs:subClassOf",
                "<owl:equivalentClass",
                "<owl:disjointWith",
                "<rdf:type",
                "<rdfs:label",
                "<owl:Restriction",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

impl CounterConfig {
    /// Estimate total axioms from entity counts via the per-kind ratios,
    /// floored. `None` when no entity count is established.
    pub fn axioms_from_entities(&self, counts: &BasicCounts) -> Option<u64> {
        let contributions = [
            (counts.classes, self.class_axiom_ratio),
            (counts.object_properties, self.object_property_axiom_ratio),
            (counts.data_properties, self.data_property_axiom_ratio),
            (
                counts.annotation_properties,
                self.annotation_property_axiom_ratio,
            ),
            (counts.individuals, self.individual_axiom_ratio),
        ];
        let mut total = 0.0;
        let mut any = false;
        for (count, ratio) in contributions {
            if let Some(count) = count {
                total += count as f64 * ratio;
                any = true;
            }
        }
        any.then_some(total.floor() as u64)
    }

    /// Estimate total axioms from serialized size.
    pub fn axioms_from_size(&self, byte_size: u64) -> u64 {
        (byte_size as f64 / self.bytes_per_axiom).floor() as u64
    }
}

/// Resolve disagreeing axiom estimates by taking the median of the
/// non-zero values, which resists one wildly divergent estimate.
///
/// An even number of survivors averages the middle two; a single
/// survivor stands alone; no survivors yields `None`.
pub fn resolve_estimates(estimates: &[u64]) -> Option<u64> {
    let mut nonzero: Vec<u64> = estimates.iter().copied().filter(|&e| e > 0).collect();
    if nonzero.is_empty() {
        return None;
    }
    nonzero.sort_unstable();
    let mid = nonzero.len() / 2;
    if nonzero.len() % 2 == 1 {
        Some(nonzero[mid])
    } else {
        Some((nonzero[mid - 1] + nonzero[mid]) / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_map_skips_unset_fields() {
        let counts = BasicCounts {
            classes: Some(10),
            total_axioms: Some(45),
            ..Default::default()
        };
        let map = counts.metric_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map["classes"], 10);
        assert_eq!(map["total_axioms"], 45);
        assert!(!map.contains_key("individuals"));
    }

    #[test]
    fn ratio_estimate_uses_only_established_counts() {
        let config = CounterConfig::default();
        let counts = BasicCounts {
            classes: Some(100),
            object_properties: Some(10),
            ..Default::default()
        };
        // 100 * 4.5 + 10 * 3.0 = 480
        assert_eq!(config.axioms_from_entities(&counts), Some(480));
    }

    #[test]
    fn ratio_estimate_is_none_with_no_entity_counts() {
        let config = CounterConfig::default();
        assert_eq!(config.axioms_from_entities(&BasicCounts::default()), None);
    }

    #[test]
    fn median_of_three_picks_the_middle() {
        assert_eq!(resolve_estimates(&[100, 500, 900]), Some(500));
        assert_eq!(resolve_estimates(&[900, 100, 500]), Some(500));
    }

    #[test]
    fn median_of_two_averages() {
        assert_eq!(resolve_estimates(&[100, 900]), Some(500));
    }

    #[test]
    fn median_of_one_stands_alone() {
        assert_eq!(resolve_estimates(&[700]), Some(700));
    }

    #[test]
    fn median_ignores_zero_estimates() {
        assert_eq!(resolve_estimates(&[0, 700, 0]), Some(700));
        assert_eq!(resolve_estimates(&[0, 0]), None);
    }

    #[test]
    fn agreeing_estimates_resolve_to_the_common_value() {
        assert_eq!(resolve_estimates(&[400, 400, 400]), Some(400));
    }
}
