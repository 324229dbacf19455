//! Persisted matrix results: the write-once machine-readable record of
//! one full test run.

use crate::analyzer::OrderAnalysisSummary;
use crate::driver::RunRecord;
use crate::ordering::{Ordering, Variant};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Schema version of the persisted results document.
pub const MATRIX_RESULTS_SCHEMA: u32 = 1;

/// Everything one matrix run produced, keyed by run id and timestamp.
/// Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixResults {
    pub schema: u32,
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Directory the input ontologies were read from.
    pub data_dir: String,
    /// Source names participating in the matrix.
    pub inputs: Vec<String>,
    /// The orderings that were tested.
    pub orderings: Vec<Ordering>,
    /// The variants that were tested.
    pub variants: Vec<Variant>,

    pub runs: Vec<RunRecord>,
    pub analysis: OrderAnalysisSummary,
}

impl MatrixResults {
    /// Timestamp key used in persisted output filenames,
    /// e.g. `20260807T142509Z`.
    pub fn timestamp_key(&self) -> String {
        self.finished_at.format("%Y%m%dT%H%M%SZ").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::RunOutcome;
    use chrono::TimeZone;

    #[test]
    fn results_round_trip_through_json() {
        let runs = vec![RunRecord {
            ordering_id: "perm_01".to_string(),
            ordering: vec!["a.owl".to_string(), "b.owl".to_string()],
            variant: Variant::MergeOnly,
            outcome: RunOutcome::Failed {
                error: "simulated tool error".to_string(),
            },
        }];
        let results = MatrixResults {
            schema: MATRIX_RESULTS_SCHEMA,
            run_id: Uuid::nil(),
            started_at: Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap(),
            finished_at: Utc.with_ymd_and_hms(2026, 8, 7, 12, 30, 0).unwrap(),
            data_dir: "data".to_string(),
            inputs: vec!["a.owl".to_string(), "b.owl".to_string()],
            orderings: vec![Ordering {
                id: "perm_01".to_string(),
                sources: vec!["a.owl".to_string(), "b.owl".to_string()],
            }],
            variants: vec![Variant::MergeOnly],
            analysis: crate::analyzer::analyze(&runs, &[]),
            runs,
        };

        let json = serde_json::to_value(&results).expect("serialize");
        // Run outcomes are flattened with a status tag.
        assert_eq!(json["runs"][0]["status"], "failed");
        assert_eq!(json["runs"][0]["error"], "simulated tool error");
        assert_eq!(json["variants"][0], "merge_only");

        let back: MatrixResults = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, results);
    }

    #[test]
    fn timestamp_key_is_filename_safe() {
        let results = MatrixResults {
            schema: MATRIX_RESULTS_SCHEMA,
            run_id: Uuid::nil(),
            started_at: Utc.with_ymd_and_hms(2026, 8, 7, 14, 25, 9).unwrap(),
            finished_at: Utc.with_ymd_and_hms(2026, 8, 7, 14, 25, 9).unwrap(),
            data_dir: "data".to_string(),
            inputs: Vec::new(),
            orderings: Vec::new(),
            variants: Vec::new(),
            runs: Vec::new(),
            analysis: crate::analyzer::analyze(&[], &[]),
        };
        assert_eq!(results.timestamp_key(), "20260807T142509Z");
    }
}
