use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "owlmetry",
    about = "Owlmetry: structural metrics and merge-order sensitivity analysis for merged OWL ontologies",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Which orderings the matrix tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderingPlan {
    /// The full permutation group of the inputs (n! runs).
    Permutations,
    /// The named deterministic strategies: alphabetical, hierarchy, size.
    Strategies,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check preconditions before running a matrix: tool availability,
    /// input files, catalogue config
    Validate {
        /// Directory containing the source ontology files
        #[arg(long, default_value = "data")]
        data_dir: String,

        /// Path to the monitored-term catalogue (TOML)
        #[arg(long, default_value = "owlmetry.toml")]
        config: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Measure one artifact and print its metrics record
    Collect {
        /// The OWL file to measure
        artifact: String,

        /// Path to the monitored-term catalogue (TOML)
        #[arg(long, default_value = "owlmetry.toml")]
        config: String,

        /// Write the record to this file instead of stdout
        #[arg(long)]
        out: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare two persisted metrics records
    Compare {
        /// First metrics record (JSON)
        record_a: String,

        /// Second metrics record (JSON)
        record_b: String,

        /// Label for the first record
        #[arg(long, default_value = "a")]
        label_a: String,

        /// Label for the second record
        #[arg(long, default_value = "b")]
        label_b: String,

        /// Also run a ROBOT structural diff between the two artifacts
        #[arg(long)]
        robot_diff: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the full (ordering x variant) merge matrix and analyze
    /// order sensitivity
    Matrix {
        /// Directory containing the source ontology files
        #[arg(long, default_value = "data")]
        data_dir: String,

        /// Path to the monitored-term catalogue (TOML)
        #[arg(long, default_value = "owlmetry.toml")]
        config: String,

        /// Directory for merged artifacts and persisted results
        #[arg(long, default_value = "results")]
        out: String,

        /// Which orderings to test; defaults to permutations for small
        /// input sets and strategies for large ones
        #[arg(long, value_enum)]
        orderings: Option<OrderingPlan>,

        /// Skip the merge-plus-removes variant
        #[arg(long)]
        skip_removes: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Regenerate the narrative summary from persisted matrix results
    Report {
        /// Persisted matrix results (JSON)
        results: String,

        /// Write the summary to this file instead of stdout
        #[arg(long)]
        out: Option<String>,
    },
}
