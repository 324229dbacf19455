//! # Owlmetry measurement core
//!
//! Best-effort structural measurement of merged OWL artifacts.
//!
//! The central contract: measurement never aborts. Each component
//! degrades field by field. A count that could not be established is
//! left unset with an explanatory provenance tag, never recorded as a
//! zero that looks authoritative.
//!
//! ## Architecture
//!
//! ```text
//! QueryBackend            ← measure/query surface (ROBOT, or a fake)
//!     │
//! EntityCounter           ← strategy ladder: measure → sparql_count → pattern_scan
//!     │
//! MetricsCollector        ← one immutable MetricsRecord per artifact
//!     │
//! compare()               ← ComparisonResult between two records
//! ```

pub mod artifact;
pub mod attribution;
pub mod collect;
pub mod compare;
pub mod counter;
pub mod counts;
pub mod pattern;
pub mod record;
pub mod sparql;

pub use artifact::Artifact;
pub use attribution::MonitoredTerm;
pub use compare::{
    ComparisonResult, CountDelta, DefinerDifference, SIGNIFICANT_SIZE_DELTA, compare,
};
pub use collect::MetricsCollector;
pub use counter::{CountedMetrics, EntityCounter, parse_measure_report};
pub use counts::{BasicCounts, CountMethod, CountProvenance, CountStrategy, CounterConfig};
pub use record::{MetricsRecord, TermDefiner};

use owlmetry_robot::RobotClient;
use std::path::Path;

/// Measurement/query surface of the external tool.
///
/// [`RobotClient`] is the production implementation; tests substitute
/// fakes. Errors cross this seam as plain strings; every caller
/// degrades them into provenance tags rather than propagating them.
pub trait QueryBackend {
    /// Flat "label: number" measure report for `input`.
    fn measure(&self, input: &Path) -> Result<String, String>;

    /// CSV result (header row first) of a SPARQL query against `input`.
    fn query(&self, input: &Path, sparql: &str) -> Result<String, String>;
}

impl QueryBackend for RobotClient {
    fn measure(&self, input: &Path) -> Result<String, String> {
        // Inherent method on RobotClient, not a recursive trait call.
        RobotClient::measure(self, input).map_err(|e| e.to_string())
    }

    fn query(&self, input: &Path, sparql: &str) -> Result<String, String> {
        RobotClient::query(self, input, sparql).map_err(|e| e.to_string())
    }
}
