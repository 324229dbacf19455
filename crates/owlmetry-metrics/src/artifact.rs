//! Artifact: one produced knowledge-graph file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A single merged-ontology file under measurement.
///
/// Immutable once produced: the merge that wrote it has fully returned
/// before an `Artifact` is constructed, and nothing here mutates the
/// file afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Path to the file on disk.
    pub path: PathBuf,

    /// Size in bytes at construction time.
    pub byte_size: u64,

    /// Source names in the merge order that produced this file.
    /// Empty for ad-hoc measurement of a standalone file.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ordering: Vec<String>,

    /// Whether the cleanup removals ran after the merge.
    #[serde(default)]
    pub include_removes: bool,
}

impl Artifact {
    /// Artifact for a standalone file with no recorded merge provenance.
    pub fn standalone(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let byte_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        Self {
            path,
            byte_size,
            ordering: Vec::new(),
            include_removes: false,
        }
    }

    /// Artifact produced by merging `ordering` (optionally with removes).
    pub fn merged(path: impl AsRef<Path>, ordering: Vec<String>, include_removes: bool) -> Self {
        let mut artifact = Self::standalone(path);
        artifact.ordering = ordering;
        artifact.include_removes = include_removes;
        artifact
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standalone_artifact_of_missing_file_has_zero_size() {
        let artifact = Artifact::standalone("/no/such/file.owl");
        assert_eq!(artifact.byte_size, 0);
        assert!(artifact.ordering.is_empty());
        assert!(!artifact.include_removes);
    }
}
