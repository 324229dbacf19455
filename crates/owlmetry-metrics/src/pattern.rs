//! Text-pattern counting: the last rung of the ladder.
//!
//! For inputs too large for the external tool, the RDF/XML text itself
//! is scanned in a single streaming pass. Two independent counters run
//! side by side (one matching typed declaration tags, one matching
//! description-then-type sequences) and the one with the larger total
//! entity count wins, being treated as the more complete view.

use crate::counts::{BasicCounts, CounterConfig, resolve_estimates};
use regex::Regex;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Entity tallies from one scan strategy. Zero here means "none seen",
/// which is meaningful for a completed scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanCounts {
    pub classes: u64,
    pub object_properties: u64,
    pub data_properties: u64,
    pub annotation_properties: u64,
    pub individuals: u64,
}

impl ScanCounts {
    pub fn total(&self) -> u64 {
        self.classes
            + self.object_properties
            + self.data_properties
            + self.annotation_properties
            + self.individuals
    }

    /// Convert to [`BasicCounts`], keeping only non-zero tallies so a
    /// zero from an incomplete scan is never mistaken for ground truth.
    pub fn to_basic_counts(self) -> BasicCounts {
        fn keep(n: u64) -> Option<u64> {
            (n > 0).then_some(n)
        }
        BasicCounts {
            classes: keep(self.classes),
            object_properties: keep(self.object_properties),
            data_properties: keep(self.data_properties),
            annotation_properties: keep(self.annotation_properties),
            individuals: keep(self.individuals),
            total_axioms: None,
            logical_axioms: None,
        }
    }
}

/// Outcome of the single streaming pass over the file.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Counter matching `<owl:Class rdf:about=...>`-style typed tags.
    pub typed_tags: ScanCounts,
    /// Counter matching `<rdf:Description>` elements whose next
    /// `rdf:type` names an OWL entity type.
    pub typed_sequences: ScanCounts,
    /// Total occurrences of the structurally significant tags.
    pub structural_tag_hits: u64,
}

impl ScanOutcome {
    /// The more complete of the two entity counters.
    pub fn winning_counts(&self) -> ScanCounts {
        if self.typed_sequences.total() > self.typed_tags.total() {
            self.typed_sequences
        } else {
            self.typed_tags
        }
    }
}

struct ScanPatterns {
    typed_tags: [(Regex, EntityField); 5],
    description_open: Regex,
    type_resource: Regex,
    structural: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
enum EntityField {
    Class,
    ObjectProperty,
    DataProperty,
    AnnotationProperty,
    Individual,
}

impl EntityField {
    fn bump(self, counts: &mut ScanCounts) {
        match self {
            EntityField::Class => counts.classes += 1,
            EntityField::ObjectProperty => counts.object_properties += 1,
            EntityField::DataProperty => counts.data_properties += 1,
            EntityField::AnnotationProperty => counts.annotation_properties += 1,
            EntityField::Individual => counts.individuals += 1,
        }
    }
}

fn build_patterns(config: &CounterConfig) -> Result<ScanPatterns, regex::Error> {
    Ok(ScanPatterns {
        typed_tags: [
            (Regex::new(r"<owl:Class\s+rdf:about=")?, EntityField::Class),
            (
                Regex::new(r"<owl:ObjectProperty\s+rdf:about=")?,
                EntityField::ObjectProperty,
            ),
            (
                Regex::new(r"<owl:DatatypeProperty\s+rdf:about=")?,
                EntityField::DataProperty,
            ),
            (
                Regex::new(r"<owl:AnnotationProperty\s+rdf:about=")?,
                EntityField::AnnotationProperty,
            ),
            (
                Regex::new(r"<owl:NamedIndividual\s+rdf:about=")?,
                EntityField::Individual,
            ),
        ],
        description_open: Regex::new(r"<rdf:Description\s+rdf:about=")?,
        type_resource: Regex::new(
            r#"<rdf:type\s+rdf:resource="http://www\.w3\.org/2002/07/owl#(Class|ObjectProperty|DatatypeProperty|AnnotationProperty|NamedIndividual)""#,
        )?,
        structural: config.structural_tags.clone(),
    })
}

/// Single streaming pass over `path`, feeding both entity counters and
/// the structural-tag tally. I/O failure mid-file keeps whatever was
/// counted so far; a partial scan still beats no data.
pub fn scan_file(path: &Path, config: &CounterConfig) -> Option<ScanOutcome> {
    let patterns = build_patterns(config).ok()?;
    let file = std::fs::File::open(path).ok()?;
    let reader = BufReader::new(file);

    let mut outcome = ScanOutcome::default();
    // Set when the previous lines opened an rdf:Description whose type
    // has not been seen yet.
    let mut pending_description = false;

    for line in reader.lines() {
        let Ok(line) = line else { break };

        for (regex, field) in &patterns.typed_tags {
            for _ in regex.find_iter(&line) {
                field.bump(&mut outcome.typed_tags);
            }
        }

        if patterns.description_open.is_match(&line) {
            pending_description = true;
        }
        if pending_description {
            if let Some(captures) = patterns.type_resource.captures(&line) {
                let field = match &captures[1] {
                    "Class" => EntityField::Class,
                    "ObjectProperty" => EntityField::ObjectProperty,
                    "DatatypeProperty" => EntityField::DataProperty,
                    "AnnotationProperty" => EntityField::AnnotationProperty,
                    _ => EntityField::Individual,
                };
                field.bump(&mut outcome.typed_sequences);
                pending_description = false;
            }
        }

        for tag in &patterns.structural {
            outcome.structural_tag_hits += line.matches(tag.as_str()).count() as u64;
        }
    }

    Some(outcome)
}

/// Estimate the total axiom count from three independent signals and
/// resolve disagreement by median (see [`resolve_estimates`]).
pub fn estimate_axioms(
    outcome: &ScanOutcome,
    byte_size: u64,
    config: &CounterConfig,
) -> Option<u64> {
    let entity_counts = outcome.winning_counts().to_basic_counts();
    let ratio_estimate = config.axioms_from_entities(&entity_counts).unwrap_or(0);
    let size_estimate = config.axioms_from_size(byte_size);
    let tag_estimate = outcome.structural_tag_hits;
    resolve_estimates(&[ratio_estimate, size_estimate, tag_estimate])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn temp_owl(name: &str, content: &str) -> PathBuf {
        let unique = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "owlmetry-pattern-{name}-{}-{unique}.owl",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).expect("fixture should write");
        file.write_all(content.as_bytes()).expect("fixture body");
        path
    }

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<rdf:RDF>
  <owl:Class rdf:about="http://purl.obolibrary.org/obo/CHEBI_15377">
    <rdfs:label>water</rdfs:label>
    <rdfs:subClassOf rdf:resource="http://purl.obolibrary.org/obo/CHEBI_24431"/>
  </owl:Class>
  <owl:Class rdf:about="http://purl.obolibrary.org/obo/CHEBI_24431"/>
  <owl:ObjectProperty rdf:about="http://purl.obolibrary.org/obo/RO_0000056"/>
  <rdf:Description rdf:about="http://purl.obolibrary.org/obo/GO_0008150">
    <rdf:type rdf:resource="http://www.w3.org/2002/07/owl#Class"/>
  </rdf:Description>
</rdf:RDF>
"#;

    #[test]
    fn typed_tag_scan_counts_declarations() {
        let path = temp_owl("tags", SAMPLE);
        let outcome = scan_file(&path, &CounterConfig::default()).expect("scan should run");
        assert_eq!(outcome.typed_tags.classes, 2);
        assert_eq!(outcome.typed_tags.object_properties, 1);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn sequence_scan_counts_description_then_type() {
        let path = temp_owl("seq", SAMPLE);
        let outcome = scan_file(&path, &CounterConfig::default()).expect("scan should run");
        assert_eq!(outcome.typed_sequences.classes, 1);
        assert_eq!(outcome.typed_sequences.total(), 1);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn winner_is_the_scan_with_more_entities() {
        let path = temp_owl("winner", SAMPLE);
        let outcome = scan_file(&path, &CounterConfig::default()).expect("scan should run");
        // Typed tags saw 3 entities, sequences saw 1.
        assert_eq!(outcome.winning_counts(), outcome.typed_tags);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn structural_tags_are_tallied() {
        let path = temp_owl("structural", SAMPLE);
        let outcome = scan_file(&path, &CounterConfig::default()).expect("scan should run");
        // One subClassOf, one label, one rdf:type.
        assert_eq!(outcome.structural_tag_hits, 3);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn agreeing_estimates_pass_through_unchanged() {
        let config = CounterConfig {
            bytes_per_axiom: 1.0,
            ..CounterConfig::default()
        };
        // 100 classes * 4.5 = 450; size 450 bytes at 1 byte/axiom = 450;
        // 450 structural tag hits: all three estimates agree.
        let outcome = ScanOutcome {
            typed_tags: ScanCounts {
                classes: 100,
                ..Default::default()
            },
            typed_sequences: ScanCounts::default(),
            structural_tag_hits: 450,
        };
        assert_eq!(estimate_axioms(&outcome, 450, &config), Some(450));
    }

    #[test]
    fn missing_file_yields_none() {
        assert!(scan_file(Path::new("/no/such/file.owl"), &CounterConfig::default()).is_none());
    }
}
