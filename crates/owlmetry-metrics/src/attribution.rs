//! Term-attribution extraction: which ontology defines which term.

use crate::QueryBackend;
use crate::artifact::Artifact;
use crate::record::TermDefiner;
use crate::sparql;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sample size for the cross-reference analysis query.
const CROSS_REFERENCE_SAMPLE: usize = 1000;

/// One monitored term from the configured catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredTerm {
    /// CURIE-style identifier, e.g. `CHEBI:15377`.
    pub id: String,
    /// Canonical IRI.
    pub iri: String,
    /// Display label.
    pub label: String,
    /// Reporting category, e.g. `chemical`.
    pub category: String,
}

/// Declared definer for each monitored term present in the artifact.
///
/// One independent query per term: a term whose query fails or returns
/// nothing is simply omitted, so one malformed IRI or timeout cannot
/// abort extraction for the remaining terms. Callers treat "missing"
/// and "defined by nothing" identically.
pub fn key_term_definers<B: QueryBackend>(
    backend: &B,
    artifact: &Artifact,
    terms: &[MonitoredTerm],
) -> BTreeMap<String, TermDefiner> {
    let mut definers = BTreeMap::new();
    for term in terms {
        let query = sparql::term_definer(&term.iri);
        let Ok(csv) = backend.query(&artifact.path, &query) else {
            continue;
        };
        let Some(row) = sparql::data_rows(&csv).into_iter().next() else {
            continue;
        };
        let Some(definer) = row.into_iter().next().filter(|d| !d.is_empty()) else {
            continue;
        };
        definers.insert(
            term.id.clone(),
            TermDefiner {
                definer,
                label: term.label.clone(),
                category: term.category.clone(),
            },
        );
    }
    definers
}

/// Distribution of defined terms over their defining ontologies
/// (definer IRI → number of terms it defines).
pub fn definer_distribution<B: QueryBackend>(
    backend: &B,
    artifact: &Artifact,
) -> BTreeMap<String, u64> {
    let Ok(csv) = backend.query(&artifact.path, &sparql::definer_distribution()) else {
        return BTreeMap::new();
    };
    let mut distribution = BTreeMap::new();
    for row in sparql::data_rows(&csv) {
        if row.len() < 2 {
            continue;
        }
        let Ok(count) = row[1].parse::<u64>() else {
            continue;
        };
        distribution.insert(row[0].clone(), count);
    }
    distribution
}

/// Cross-ontology attribution: for a sample of defined terms, count how
/// often a term whose IRI belongs to one ontology namespace is declared
/// as defined by a different one (term prefix → definer prefix → count).
pub fn cross_references<B: QueryBackend>(
    backend: &B,
    artifact: &Artifact,
) -> BTreeMap<String, BTreeMap<String, u64>> {
    let query = sparql::term_definer_sample(CROSS_REFERENCE_SAMPLE);
    let Ok(csv) = backend.query(&artifact.path, &query) else {
        return BTreeMap::new();
    };
    let mut cross: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
    for row in sparql::data_rows(&csv) {
        if row.len() < 2 {
            continue;
        }
        let (Some(term_prefix), Some(definer_prefix)) =
            (obo_prefix(&row[0]), obo_prefix(&row[1]))
        else {
            continue;
        };
        if term_prefix != definer_prefix {
            *cross
                .entry(term_prefix)
                .or_default()
                .entry(definer_prefix)
                .or_default() += 1;
        }
    }
    cross
}

/// Uppercased ontology prefix of an OBO-style IRI, e.g.
/// `http://purl.obolibrary.org/obo/CHEBI_15377` → `CHEBI` and
/// `http://purl.obolibrary.org/obo/chebi.owl` → `CHEBI`.
fn obo_prefix(iri: &str) -> Option<String> {
    let tail = iri.split("/obo/").nth(1)?;
    let prefix: &str = tail
        .split(['_', '.'])
        .next()
        .filter(|p| !p.is_empty())?;
    Some(prefix.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::Path;

    struct FakeBackend {
        responses: RefCell<Vec<Result<String, String>>>,
    }

    impl QueryBackend for FakeBackend {
        fn measure(&self, _input: &Path) -> Result<String, String> {
            Err("unused".to_string())
        }

        fn query(&self, _input: &Path, _sparql: &str) -> Result<String, String> {
            let mut responses = self.responses.borrow_mut();
            if responses.is_empty() {
                Err("no response scripted".to_string())
            } else {
                responses.remove(0)
            }
        }
    }

    fn artifact() -> Artifact {
        Artifact::standalone("/no/such/file.owl")
    }

    fn term(id: &str, label: &str) -> MonitoredTerm {
        MonitoredTerm {
            id: id.to_string(),
            iri: format!(
                "http://purl.obolibrary.org/obo/{}",
                id.replace(':', "_")
            ),
            label: label.to_string(),
            category: "chemical".to_string(),
        }
    }

    #[test]
    fn one_failed_term_query_does_not_abort_the_rest() {
        let backend = FakeBackend {
            responses: RefCell::new(vec![
                Err("timeout".to_string()),
                Ok("definer\nhttp://purl.obolibrary.org/obo/chebi.owl\n".to_string()),
            ]),
        };
        let terms = [term("CHEBI:24431", "chemical entity"), term("CHEBI:15377", "water")];
        let definers = key_term_definers(&backend, &artifact(), &terms);
        assert_eq!(definers.len(), 1);
        assert_eq!(
            definers["CHEBI:15377"].definer,
            "http://purl.obolibrary.org/obo/chebi.owl"
        );
    }

    #[test]
    fn absent_term_is_omitted_not_recorded_as_null() {
        let backend = FakeBackend {
            responses: RefCell::new(vec![Ok("definer\n".to_string())]),
        };
        let terms = [term("CHEBI:15377", "water")];
        assert!(key_term_definers(&backend, &artifact(), &terms).is_empty());
    }

    #[test]
    fn definer_distribution_parses_grouped_counts() {
        let backend = FakeBackend {
            responses: RefCell::new(vec![Ok(
                "definer,count\nhttp://purl.obolibrary.org/obo/chebi.owl,120\nhttp://purl.obolibrary.org/obo/go.owl,30\n"
                    .to_string(),
            )]),
        };
        let distribution = definer_distribution(&backend, &artifact());
        assert_eq!(distribution.len(), 2);
        assert_eq!(distribution["http://purl.obolibrary.org/obo/chebi.owl"], 120);
    }

    #[test]
    fn cross_references_count_only_mismatched_prefixes() {
        let backend = FakeBackend {
            responses: RefCell::new(vec![Ok([
                "term,definer",
                "http://purl.obolibrary.org/obo/CHEBI_15377,http://purl.obolibrary.org/obo/chebi.owl",
                "http://purl.obolibrary.org/obo/CHEBI_16236,http://purl.obolibrary.org/obo/foodon.owl",
                "http://purl.obolibrary.org/obo/GO_0008150,http://purl.obolibrary.org/obo/go.owl",
            ]
            .join("\n"))]),
        };
        let cross = cross_references(&backend, &artifact());
        assert_eq!(cross.len(), 1);
        assert_eq!(cross["CHEBI"]["FOODON"], 1);
    }

    #[test]
    fn obo_prefix_handles_terms_and_ontology_files() {
        assert_eq!(
            obo_prefix("http://purl.obolibrary.org/obo/CHEBI_15377").as_deref(),
            Some("CHEBI")
        );
        assert_eq!(
            obo_prefix("http://purl.obolibrary.org/obo/chebi.owl").as_deref(),
            Some("CHEBI")
        );
        assert_eq!(obo_prefix("http://example.org/other"), None);
    }
}
