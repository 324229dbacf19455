//! Metrics aggregation: one MetricsRecord per artifact.

use crate::QueryBackend;
use crate::artifact::Artifact;
use crate::attribution::{self, MonitoredTerm};
use crate::counter::EntityCounter;
use crate::counts::CounterConfig;
use crate::record::MetricsRecord;
use crate::sparql;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

/// Aggregates counter, breakdown, and attribution results into one
/// immutable [`MetricsRecord`]. Never errors: every failure degrades a
/// specific field to empty/zero plus the provenance tag.
#[derive(Debug)]
pub struct MetricsCollector<B> {
    backend: B,
    counter: EntityCounter<B>,
}

impl<B: QueryBackend + Clone> MetricsCollector<B> {
    pub fn new(backend: B, config: CounterConfig) -> Self {
        let counter = EntityCounter::new(backend.clone(), config);
        Self { backend, counter }
    }

    /// Collect the full measurement for `artifact`, extracting
    /// attribution for the supplied monitored terms.
    pub fn collect(&self, artifact: &Artifact, terms: &[MonitoredTerm]) -> MetricsRecord {
        let started = Instant::now();

        let counted = self.counter.count(artifact);
        let axiom_breakdown = self.axiom_breakdown(artifact);
        let defined_by_counts = attribution::definer_distribution(&self.backend, artifact);
        let cross_references = attribution::cross_references(&self.backend, artifact);
        let key_term_definers = attribution::key_term_definers(&self.backend, artifact, terms);

        MetricsRecord {
            file_path: artifact.path.display().to_string(),
            file_size: artifact.byte_size,
            sha256: file_sha256(&artifact.path),
            basic_counts: counted.counts,
            provenance: counted.provenance,
            axiom_breakdown,
            defined_by_counts,
            cross_references,
            key_term_definers,
            collection_seconds: started.elapsed().as_secs_f64(),
        }
    }

    /// The fixed catalogue of axiom-type breakdown queries, each
    /// independently zero-defaulted on failure.
    fn axiom_breakdown(&self, artifact: &Artifact) -> BTreeMap<String, u64> {
        let mut breakdown = BTreeMap::new();
        for (category, query) in sparql::axiom_breakdown_queries() {
            let count = self
                .backend
                .query(&artifact.path, &query)
                .ok()
                .and_then(|csv| sparql::parse_count_csv(&csv))
                .unwrap_or(0);
            breakdown.insert(category.to_string(), count);
        }
        breakdown
    }
}

/// Streaming SHA-256 hex digest of a file, or `None` if unreadable.
pub fn file_sha256(path: &Path) -> Option<String> {
    let mut file = std::fs::File::open(path).ok()?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let read = file.read(&mut buffer).ok()?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{byte:02x}"));
    }
    Some(hex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counts::CountMethod;
    use std::io::Write;
    use std::path::PathBuf;

    /// Backend that fails every call.
    #[derive(Clone)]
    struct DeadBackend;

    impl QueryBackend for DeadBackend {
        fn measure(&self, _input: &Path) -> Result<String, String> {
            Err("robot unavailable".to_string())
        }

        fn query(&self, _input: &Path, _sparql: &str) -> Result<String, String> {
            Err("robot unavailable".to_string())
        }
    }

    fn temp_file(name: &str, content: &[u8]) -> PathBuf {
        let unique = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "owlmetry-collect-{name}-{}-{unique}",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).expect("fixture should write");
        file.write_all(content).expect("fixture body");
        path
    }

    #[test]
    fn collect_never_errors_even_with_a_dead_backend() {
        let collector = MetricsCollector::new(DeadBackend, CounterConfig::default());
        let record = collector.collect(&Artifact::standalone("/no/such/file.owl"), &[]);
        assert_eq!(record.provenance.method, CountMethod::Failed);
        assert!(record.basic_counts.is_empty());
        // Breakdown categories are zero-defaulted, not missing.
        assert_eq!(record.axiom_breakdown.len(), 4);
        assert!(record.axiom_breakdown.values().all(|&v| v == 0));
        assert!(record.defined_by_counts.is_empty());
        assert!(record.key_term_definers.is_empty());
    }

    #[test]
    fn sha256_digest_matches_known_value() {
        let path = temp_file("digest", b"abc");
        assert_eq!(
            file_sha256(&path).as_deref(),
            Some("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn sha256_of_missing_file_is_none() {
        assert!(file_sha256(Path::new("/no/such/file.owl")).is_none());
    }
}
