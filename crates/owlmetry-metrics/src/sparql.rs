//! Canonical SPARQL queries and CSV result parsing.
//!
//! The external tool returns CSV with one header row. Malformed rows
//! and unparseable numbers are treated as absent, never raised.

/// OWL entity kinds the counter queries for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Class,
    ObjectProperty,
    DataProperty,
    AnnotationProperty,
    NamedIndividual,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Class,
        EntityKind::ObjectProperty,
        EntityKind::DataProperty,
        EntityKind::AnnotationProperty,
        EntityKind::NamedIndividual,
    ];

    /// Full IRI of the OWL type.
    pub fn type_iri(self) -> &'static str {
        match self {
            EntityKind::Class => "http://www.w3.org/2002/07/owl#Class",
            EntityKind::ObjectProperty => "http://www.w3.org/2002/07/owl#ObjectProperty",
            EntityKind::DataProperty => "http://www.w3.org/2002/07/owl#DatatypeProperty",
            EntityKind::AnnotationProperty => "http://www.w3.org/2002/07/owl#AnnotationProperty",
            EntityKind::NamedIndividual => "http://www.w3.org/2002/07/owl#NamedIndividual",
        }
    }
}

/// Count distinct subjects declared with the given type.
pub fn count_typed_subjects(kind: EntityKind) -> String {
    format!(
        "SELECT (COUNT(DISTINCT ?s) AS ?count) WHERE {{ ?s a <{}> }}",
        kind.type_iri()
    )
}

/// The fixed catalogue of axiom-type breakdown queries:
/// (category name, query).
pub fn axiom_breakdown_queries() -> Vec<(&'static str, String)> {
    vec![
        (
            "subclass_axioms",
            "SELECT (COUNT(*) AS ?count) WHERE { ?s <http://www.w3.org/2000/01/rdf-schema#subClassOf> ?o }"
                .to_string(),
        ),
        (
            "equivalent_class_axioms",
            "SELECT (COUNT(*) AS ?count) WHERE { ?s <http://www.w3.org/2002/07/owl#equivalentClass> ?o }"
                .to_string(),
        ),
        (
            "disjoint_class_axioms",
            "SELECT (COUNT(*) AS ?count) WHERE { ?s <http://www.w3.org/2002/07/owl#disjointWith> ?o }"
                .to_string(),
        ),
        (
            "annotation_assertions",
            "SELECT (COUNT(*) AS ?count) WHERE { ?s <http://www.w3.org/2000/01/rdf-schema#label> ?o }"
                .to_string(),
        ),
    ]
}

const IS_DEFINED_BY: &str = "http://www.geneontology.org/formats/oboInOwl#isDefinedBy";

/// Distribution of terms over their defining ontologies.
pub fn definer_distribution() -> String {
    format!(
        "SELECT ?definer (COUNT(DISTINCT ?s) AS ?count) \
         WHERE {{ ?s <{IS_DEFINED_BY}> ?definer }} \
         GROUP BY ?definer ORDER BY DESC(?count)"
    )
}

/// Sample of (term, definer) pairs for cross-reference analysis.
pub fn term_definer_sample(limit: usize) -> String {
    format!(
        "SELECT ?term ?definer WHERE {{ ?term <{IS_DEFINED_BY}> ?definer }} LIMIT {limit}"
    )
}

/// The declared definer of a single term.
pub fn term_definer(term_iri: &str) -> String {
    format!("SELECT ?definer WHERE {{ <{term_iri}> <{IS_DEFINED_BY}> ?definer }}")
}

/// Parse a single-count CSV result. The count sits on the first data
/// row; anything unparseable is `None`.
pub fn parse_count_csv(csv: &str) -> Option<u64> {
    let row = data_rows(csv).into_iter().next()?;
    row.first()?.parse::<u64>().ok()
}

/// Parse the data rows of a CSV result, skipping the header row and
/// blank lines. Fields are comma-split, trimmed, and unquoted.
pub fn data_rows(csv: &str) -> Vec<Vec<String>> {
    csv.lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split(',')
                .map(|field| field.trim().trim_matches('"').to_string())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_csv_parses_first_data_row() {
        assert_eq!(parse_count_csv("count\n42\n"), Some(42));
    }

    #[test]
    fn count_csv_tolerates_garbage() {
        assert_eq!(parse_count_csv("count\nnot-a-number\n"), None);
        assert_eq!(parse_count_csv(""), None);
        assert_eq!(parse_count_csv("count\n"), None);
    }

    #[test]
    fn data_rows_skip_header_and_blanks() {
        let csv = "definer,count\nhttp://example.org/a.owl,10\n\nhttp://example.org/b.owl,3\n";
        let rows = data_rows(csv);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["http://example.org/a.owl", "10"]);
        assert_eq!(rows[1], vec!["http://example.org/b.owl", "3"]);
    }

    #[test]
    fn typed_subject_query_names_the_full_iri() {
        let q = count_typed_subjects(EntityKind::Class);
        assert!(q.contains("http://www.w3.org/2002/07/owl#Class"));
        assert!(q.contains("COUNT(DISTINCT ?s)"));
    }
}
