//! Entity/axiom counter: the escalating strategy ladder.
//!
//! Strategies are tried in order and the ladder stops at the first one
//! that yields a non-zero total-axiom count:
//!
//! 1. `measure`: authoritative report from the external tool
//! 2. `sparql_count`: per-kind typed-subject counts, axioms estimated
//!    from entity ratios
//! 3. `pattern_scan`: streaming text scan, axioms estimated by median
//!    of three independent signals
//!
//! The counter never errors: when every rung fails it returns empty
//! counts tagged `failed`, so downstream consumers can always tell an
//! unmeasured zero from a measured one.

use crate::QueryBackend;
use crate::artifact::Artifact;
use crate::counts::{BasicCounts, CountProvenance, CountStrategy, CounterConfig};
use crate::pattern;
use crate::sparql::{self, EntityKind};

/// Counts plus the provenance of how they were obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountedMetrics {
    pub counts: BasicCounts,
    pub provenance: CountProvenance,
}

/// Strategy-ladder counter over a [`QueryBackend`].
#[derive(Debug, Clone)]
pub struct EntityCounter<B> {
    backend: B,
    config: CounterConfig,
}

impl<B: QueryBackend> EntityCounter<B> {
    pub fn new(backend: B, config: CounterConfig) -> Self {
        Self { backend, config }
    }

    /// Count entities and axioms in `artifact`. Never errors.
    pub fn count(&self, artifact: &Artifact) -> CountedMetrics {
        if let Some(counts) = self.measure_counts(artifact) {
            return CountedMetrics {
                counts,
                provenance: CountProvenance::measured(CountStrategy::Measure),
            };
        }
        if let Some(counts) = self.sparql_counts(artifact) {
            return CountedMetrics {
                counts,
                provenance: CountProvenance::estimated(CountStrategy::SparqlCount),
            };
        }
        if let Some(counts) = self.pattern_counts(artifact) {
            return CountedMetrics {
                counts,
                provenance: CountProvenance::estimated(CountStrategy::PatternScan),
            };
        }
        CountedMetrics {
            counts: BasicCounts::default(),
            provenance: CountProvenance::failed(),
        }
    }

    /// Rung 1: parse the authoritative measure report.
    fn measure_counts(&self, artifact: &Artifact) -> Option<BasicCounts> {
        let report = self.backend.measure(&artifact.path).ok()?;
        let counts = parse_measure_report(&report);
        accept_nonzero_axioms(counts)
    }

    /// Rung 2: typed-subject counts per entity kind, plus a ratio-based
    /// axiom estimate. A query returning zero is treated as unknown,
    /// not as ground truth.
    fn sparql_counts(&self, artifact: &Artifact) -> Option<BasicCounts> {
        let mut counts = BasicCounts::default();
        for kind in EntityKind::ALL {
            let query = sparql::count_typed_subjects(kind);
            let counted = self
                .backend
                .query(&artifact.path, &query)
                .ok()
                .and_then(|csv| sparql::parse_count_csv(&csv))
                .filter(|&n| n > 0);
            match kind {
                EntityKind::Class => counts.classes = counted,
                EntityKind::ObjectProperty => counts.object_properties = counted,
                EntityKind::DataProperty => counts.data_properties = counted,
                EntityKind::AnnotationProperty => counts.annotation_properties = counted,
                EntityKind::NamedIndividual => counts.individuals = counted,
            }
        }
        counts.total_axioms = self.config.axioms_from_entities(&counts).filter(|&n| n > 0);
        accept_nonzero_axioms(counts)
    }

    /// Rung 3: streaming text scan with median-resolved axiom estimate.
    fn pattern_counts(&self, artifact: &Artifact) -> Option<BasicCounts> {
        let outcome = pattern::scan_file(&artifact.path, &self.config)?;
        let mut counts = outcome.winning_counts().to_basic_counts();
        counts.total_axioms = pattern::estimate_axioms(&outcome, artifact.byte_size, &self.config);
        accept_nonzero_axioms(counts)
    }
}

/// A rung only wins the ladder when it established a non-zero total
/// axiom count.
fn accept_nonzero_axioms(counts: BasicCounts) -> Option<BasicCounts> {
    match counts.total_axioms {
        Some(n) if n > 0 => Some(counts),
        _ => None,
    }
}

/// Parse the flat "label: number" measure report.
///
/// Accepts both the current measure labels and the older stats-era
/// labels; unknown lines are ignored, unparseable numbers skipped.
pub fn parse_measure_report(report: &str) -> BasicCounts {
    let mut counts = BasicCounts::default();
    for line in report.lines() {
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let Ok(number) = value.trim().replace(',', "").parse::<u64>() else {
            continue;
        };
        match label.trim() {
            "Classes" | "Class count" => counts.classes = Some(number),
            "Object properties" | "Object property count" => {
                counts.object_properties = Some(number)
            }
            "Data properties" | "Data property count" => counts.data_properties = Some(number),
            "Annotation properties" | "Annotation property count" => {
                counts.annotation_properties = Some(number)
            }
            "Individuals" | "Individual count" => counts.individuals = Some(number),
            "Axioms" | "Axiom count" => counts.total_axioms = Some(number),
            "Logical axioms" | "Logical axiom count" => counts.logical_axioms = Some(number),
            _ => {}
        }
    }
    counts
}
