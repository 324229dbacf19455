//! # Owlmetry order-sensitivity engine
//!
//! Drives the full matrix of (ordering × variant) merge runs through
//! the external pipeline, measures every produced artifact, and
//! determines which aspects of the output depend on input merge order.
//!
//! ```text
//! TermCatalogue           ← configured monitored terms + hierarchy order
//!     │
//! Ordering / Variant      ← permutations or named strategies, × cleanup
//!     │
//! MatrixDriver            ← one sequential pipeline run per combination
//!     │
//! analyze()               ← OrderAnalysisSummary over all RunRecords
//!     │
//! render_summary()        ← human-readable narrative
//! ```

pub mod analyzer;
pub mod catalogue;
pub mod driver;
pub mod ordering;
pub mod report;
pub mod results;

pub use analyzer::{
    CleanupImpact, OrderAnalysisSummary, TermAttributionSummary, VariantSpread, analyze,
};
pub use catalogue::{CatalogueError, TermCatalogue};
pub use driver::{MatrixDriver, MergePipeline, RunOutcome, RunRecord};
pub use ordering::{Ordering, Variant, named_strategies, permutations};
pub use report::render_summary;
pub use results::MatrixResults;
