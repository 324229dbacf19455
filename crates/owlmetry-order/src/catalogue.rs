//! Monitored-term catalogue: supplied as configuration, not computed.

use owlmetry_metrics::MonitoredTerm;
use serde::Deserialize;
use std::path::Path;

const OBO_BASE: &str = "http://purl.obolibrary.org/obo/";

/// Errors from loading the catalogue configuration.
#[derive(Debug, thiserror::Error)]
pub enum CatalogueError {
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("catalogue at {0} declares no monitored terms")]
    Empty(String),
}

#[derive(Debug, Deserialize)]
struct CatalogueFile {
    #[serde(default)]
    term: Vec<TermEntry>,
    #[serde(default)]
    orderings: OrderingsSection,
}

#[derive(Debug, Deserialize)]
struct TermEntry {
    id: String,
    label: String,
    category: String,
    /// Explicit IRI; defaults to the OBO PURL derived from the ID.
    #[serde(default)]
    iri: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OrderingsSection {
    /// Pre-declared hierarchical merge order (foundational → domain).
    #[serde(default)]
    hierarchy: Vec<String>,
}

/// The static monitored-term catalogue plus the optional pre-declared
/// hierarchical ordering, loaded from one TOML file.
#[derive(Debug, Clone)]
pub struct TermCatalogue {
    terms: Vec<MonitoredTerm>,
    hierarchy: Vec<String>,
}

impl TermCatalogue {
    /// Load and validate the catalogue. An unreadable or empty
    /// catalogue is a precondition failure: execution must not start
    /// without monitored terms.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogueError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| CatalogueError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    fn parse(text: &str, origin: &str) -> Result<Self, CatalogueError> {
        let file: CatalogueFile = toml::from_str(text).map_err(|e| CatalogueError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        if file.term.is_empty() {
            return Err(CatalogueError::Empty(origin.to_string()));
        }
        let terms = file
            .term
            .into_iter()
            .map(|entry| {
                let iri = entry
                    .iri
                    .unwrap_or_else(|| format!("{OBO_BASE}{}", entry.id.replace(':', "_")));
                MonitoredTerm {
                    id: entry.id,
                    iri,
                    label: entry.label,
                    category: entry.category,
                }
            })
            .collect();
        Ok(Self {
            terms,
            hierarchy: file.orderings.hierarchy,
        })
    }

    pub fn terms(&self) -> &[MonitoredTerm] {
        &self.terms
    }

    /// The configured hierarchical order; empty when not declared.
    pub fn hierarchy(&self) -> &[String] {
        &self.hierarchy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[term]]
id = "CHEBI:15377"
label = "water"
category = "chemical"

[[term]]
id = "GO:0008150"
label = "biological_process"
category = "process"
iri = "http://purl.obolibrary.org/obo/GO_0008150"

[orderings]
hierarchy = ["bfo.owl", "chebi.owl", "go.owl"]
"#;

    #[test]
    fn parses_terms_and_derives_obo_iris() {
        let catalogue = TermCatalogue::parse(SAMPLE, "test").expect("catalogue should parse");
        assert_eq!(catalogue.terms().len(), 2);
        let water = &catalogue.terms()[0];
        assert_eq!(water.id, "CHEBI:15377");
        assert_eq!(water.iri, "http://purl.obolibrary.org/obo/CHEBI_15377");
        assert_eq!(catalogue.hierarchy().len(), 3);
    }

    #[test]
    fn empty_catalogue_is_a_precondition_failure() {
        let result = TermCatalogue::parse("", "test");
        assert!(matches!(result, Err(CatalogueError::Empty(_))));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let result = TermCatalogue::parse("[[term]\nid=", "test");
        assert!(matches!(result, Err(CatalogueError::Parse { .. })));
    }

    #[test]
    fn hierarchy_defaults_to_empty() {
        let text = "[[term]]\nid = \"CL:0000000\"\nlabel = \"cell\"\ncategory = \"anatomical\"\n";
        let catalogue = TermCatalogue::parse(text, "test").expect("catalogue should parse");
        assert!(catalogue.hierarchy().is_empty());
    }
}
