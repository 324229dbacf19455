//! Matrix driver: one sequential pipeline run per (ordering, variant).

use crate::ordering::{Ordering, Variant};
use owlmetry_metrics::{Artifact, MetricsCollector, MetricsRecord, MonitoredTerm, QueryBackend};
use owlmetry_robot::RobotClient;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The external merge pipeline, consumed as a black box: an ordered
/// input list in, one artifact file (or a failure) out. Errors cross
/// this seam as strings; the driver records them instead of
/// propagating them.
pub trait MergePipeline {
    fn merge(
        &self,
        inputs: &[PathBuf],
        include_removes: bool,
        output: &Path,
    ) -> Result<(), String>;
}

impl MergePipeline for RobotClient {
    fn merge(
        &self,
        inputs: &[PathBuf],
        include_removes: bool,
        output: &Path,
    ) -> Result<(), String> {
        RobotClient::merge(self, inputs, include_removes, output).map_err(|e| e.to_string())
    }
}

/// Outcome of one (ordering, variant) combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Success { record: MetricsRecord },
    Failed { error: String },
}

/// One entry of the run matrix. Failed combinations keep their slot,
/// so the matrix is always complete; the analyzer excludes them from
/// aggregate statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub ordering_id: String,
    pub ordering: Vec<String>,
    pub variant: Variant,
    #[serde(flatten)]
    pub outcome: RunOutcome,
}

impl RunRecord {
    /// The metrics record, for successful runs.
    pub fn record(&self) -> Option<&MetricsRecord> {
        match &self.outcome {
            RunOutcome::Success { record } => Some(record),
            RunOutcome::Failed { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RunOutcome::Success { .. })
    }

    /// Stable key of this matrix cell, e.g. `alphabetical_merge_only`.
    pub fn run_key(&self) -> String {
        format!("{}_{}", self.ordering_id, self.variant.as_str())
    }
}

/// Sequential driver over the full (ordering × variant) matrix.
///
/// Each external invocation may consume a multi-gigabyte heap, so runs
/// are deliberately serialized: one pipeline invocation completes (or
/// times out) before the next starts, and the produced file is only
/// read after its invocation has fully returned.
pub struct MatrixDriver<'a, P, B> {
    pipeline: &'a P,
    collector: &'a MetricsCollector<B>,
    data_dir: PathBuf,
    output_dir: PathBuf,
}

impl<'a, P: MergePipeline, B: QueryBackend + Clone> MatrixDriver<'a, P, B> {
    pub fn new(
        pipeline: &'a P,
        collector: &'a MetricsCollector<B>,
        data_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            pipeline,
            collector,
            data_dir: data_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Run every (ordering, variant) combination, invoking `on_run`
    /// after each one. Individual failures are recorded and the matrix
    /// continues; the result always holds exactly
    /// `orderings.len() * variants.len()` entries.
    pub fn run_all(
        &self,
        orderings: &[Ordering],
        variants: &[Variant],
        terms: &[MonitoredTerm],
        mut on_run: impl FnMut(&RunRecord),
    ) -> Vec<RunRecord> {
        let mut records = Vec::with_capacity(orderings.len() * variants.len());
        for ordering in orderings {
            for &variant in variants {
                let record = self.run_one(ordering, variant, terms);
                on_run(&record);
                records.push(record);
            }
        }
        records
    }

    fn run_one(&self, ordering: &Ordering, variant: Variant, terms: &[MonitoredTerm]) -> RunRecord {
        let outcome = self.merge_and_measure(ordering, variant, terms);
        RunRecord {
            ordering_id: ordering.id.clone(),
            ordering: ordering.sources.clone(),
            variant,
            outcome,
        }
    }

    fn merge_and_measure(
        &self,
        ordering: &Ordering,
        variant: Variant,
        terms: &[MonitoredTerm],
    ) -> RunOutcome {
        let inputs: Vec<PathBuf> = ordering
            .sources
            .iter()
            .map(|name| self.data_dir.join(name))
            .collect();
        if let Some(missing) = inputs.iter().find(|path| !path.exists()) {
            return RunOutcome::Failed {
                error: format!("missing input artifact: {}", missing.display()),
            };
        }

        let output = self
            .output_dir
            .join(format!("{}_{}.owl", ordering.id, variant.as_str()));
        if let Err(error) = self
            .pipeline
            .merge(&inputs, variant.include_removes(), &output)
        {
            return RunOutcome::Failed { error };
        }

        let artifact = Artifact::merged(&output, ordering.sources.clone(), variant.include_removes());
        let record = self.collector.collect(&artifact, terms);
        RunOutcome::Success { record }
    }
}
