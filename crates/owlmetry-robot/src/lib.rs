//! ROBOT adapter for merge pipelines and measurement queries.
//!
//! This crate is intentionally thin: it shells out to `robot` for merges,
//! measure reports, and SPARQL queries, and keeps no measurement policy.
//! Interpretation of report text and query results belongs to callers.
//!
//! Every invocation is sequential and carries a per-invocation,
//! non-cooperative timeout: expiry kills the child process and surfaces
//! [`RobotError::Timeout`] without affecting later invocations. The JVM
//! heap budget scales with input size unless `ROBOT_JAVA_ARGS` is already
//! set in the environment, in which case the operator's value wins.

mod process;

pub use process::CapturedRun;

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// Environment variable ROBOT reads its JVM arguments from.
pub const ROBOT_JAVA_ARGS: &str = "ROBOT_JAVA_ARGS";

const GIB: u64 = 1024 * 1024 * 1024;

/// Errors from interacting with the ROBOT tool.
#[derive(Debug, thiserror::Error)]
pub enum RobotError {
    #[error("robot executable is not available in PATH")]
    NotInstalled,

    #[error("robot command failed: robot {args} ({message})")]
    CommandFailed { args: String, message: String },

    #[error("robot command timed out after {}s: robot {args}", .timeout.as_secs())]
    Timeout { args: String, timeout: Duration },

    #[error("robot reported success but produced no output file: {0}")]
    MissingOutput(PathBuf),

    #[error("i/o error: {0}")]
    Io(String),
}

/// Resource policy for ROBOT invocations.
///
/// The scaling constants are empirical, not derived; they are fields so
/// deployments measuring very large inputs can tune them.
#[derive(Debug, Clone)]
pub struct RobotConfig {
    /// JVM heap floor in GiB.
    pub heap_min_gb: u64,
    /// JVM heap ceiling in GiB.
    pub heap_max_gb: u64,
    /// Additional heap GiB granted per GiB of input.
    pub heap_gb_per_input_gb: u64,
    /// Throughput assumed when scaling merge/measure timeouts.
    pub measure_bytes_per_sec: u64,
    /// Merge/measure timeout clamp, low end.
    pub measure_timeout_floor: Duration,
    /// Merge/measure timeout clamp, high end.
    pub measure_timeout_ceiling: Duration,
    /// Throughput assumed when scaling query timeouts.
    pub query_bytes_per_sec: u64,
    /// Query timeout clamp, low end.
    pub query_timeout_floor: Duration,
    /// Query timeout clamp, high end.
    pub query_timeout_ceiling: Duration,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            heap_min_gb: 8,
            heap_max_gb: 64,
            heap_gb_per_input_gb: 4,
            measure_bytes_per_sec: 1_500_000,
            measure_timeout_floor: Duration::from_secs(5 * 60),
            measure_timeout_ceiling: Duration::from_secs(30 * 60),
            query_bytes_per_sec: 3_000_000,
            query_timeout_floor: Duration::from_secs(60),
            query_timeout_ceiling: Duration::from_secs(600),
        }
    }
}

impl RobotConfig {
    /// JVM heap argument for an input of `input_bytes`, e.g. `-Xmx16g`.
    pub fn heap_arg(&self, input_bytes: u64) -> String {
        let input_gb = input_bytes.div_ceil(GIB);
        let scaled = input_gb.saturating_mul(self.heap_gb_per_input_gb);
        let gb = scaled.clamp(self.heap_min_gb, self.heap_max_gb);
        format!("-Xmx{gb}g")
    }

    /// Merge/measure timeout for an input of `input_bytes`.
    pub fn measure_timeout(&self, input_bytes: u64) -> Duration {
        scaled_timeout(
            input_bytes,
            self.measure_bytes_per_sec,
            self.measure_timeout_floor,
            self.measure_timeout_ceiling,
        )
    }

    /// Query timeout for an input of `input_bytes`.
    pub fn query_timeout(&self, input_bytes: u64) -> Duration {
        scaled_timeout(
            input_bytes,
            self.query_bytes_per_sec,
            self.query_timeout_floor,
            self.query_timeout_ceiling,
        )
    }
}

fn scaled_timeout(bytes: u64, bytes_per_sec: u64, floor: Duration, ceiling: Duration) -> Duration {
    let secs = bytes / bytes_per_sec.max(1);
    Duration::from_secs(secs).clamp(floor, ceiling)
}

/// Thin client around the `robot` CLI.
#[derive(Debug, Clone, Default)]
pub struct RobotClient {
    config: RobotConfig,
}

impl RobotClient {
    pub fn new(config: RobotConfig) -> Self {
        Self { config }
    }

    /// Returns true if `robot` is available in PATH.
    pub fn is_available() -> bool {
        Command::new("robot")
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// First line of `robot --version`, if the tool responds.
    pub fn version() -> Option<String> {
        let output = Command::new("robot").arg("--version").output().ok()?;
        if !output.status.success() {
            return None;
        }
        let text = String::from_utf8_lossy(&output.stdout).to_string();
        text.lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(ToOwned::to_owned)
    }

    /// Merge `inputs` in the given order into `output`, annotating every
    /// term with its defining ontology.
    ///
    /// With `include_removes`, the merge is followed by the cleanup
    /// removals (disjointness axioms and `owl:Nothing`) the production
    /// pipeline applies before publishing.
    pub fn merge(
        &self,
        inputs: &[PathBuf],
        include_removes: bool,
        output: &Path,
    ) -> Result<(), RobotError> {
        let mut args: Vec<String> = vec![
            "merge".into(),
            "--annotate-defined-by".into(),
            "true".into(),
        ];
        for input in inputs {
            args.push("--input".into());
            args.push(input.display().to_string());
        }
        if include_removes {
            args.extend(
                [
                    "remove",
                    "--axioms",
                    "disjoint",
                    "--trim",
                    "true",
                    "--preserve-structure",
                    "false",
                    "remove",
                    "--term",
                    "owl:Nothing",
                    "--trim",
                    "true",
                    "--preserve-structure",
                    "false",
                ]
                .map(String::from),
            );
        }
        args.push("--output".into());
        args.push(output.display().to_string());

        let total_bytes: u64 = inputs.iter().map(|p| file_size(p)).sum();
        let timeout = self.config.measure_timeout(total_bytes);
        let run = self.run(&args, total_bytes, timeout)?;
        expect_success(&args, &run)?;
        if !output.exists() {
            return Err(RobotError::MissingOutput(output.to_path_buf()));
        }
        Ok(())
    }

    /// Run `robot measure` against `input` and return the flat
    /// "label: number" report text.
    pub fn measure(&self, input: &Path) -> Result<String, RobotError> {
        let report_path = scratch_path("measure", "txt");
        let args: Vec<String> = [
            "measure",
            "--input",
            &input.display().to_string(),
            "--metrics",
            "extended",
            "--output",
            &report_path.display().to_string(),
        ]
        .map(String::from)
        .to_vec();

        let bytes = file_size(input);
        let timeout = self.config.measure_timeout(bytes);
        let result = self.run(&args, bytes, timeout).and_then(|run| {
            expect_success(&args, &run)?;
            std::fs::read_to_string(&report_path).map_err(|e| RobotError::Io(e.to_string()))
        });
        let _ = std::fs::remove_file(&report_path);
        result
    }

    /// Run a SPARQL query against `input` and return CSV text
    /// (header row first).
    pub fn query(&self, input: &Path, sparql: &str) -> Result<String, RobotError> {
        let args: Vec<String> = [
            "query",
            "--input",
            &input.display().to_string(),
            "--query",
            sparql,
            "--format",
            "csv",
        ]
        .map(String::from)
        .to_vec();

        let bytes = file_size(input);
        let timeout = self.config.query_timeout(bytes);
        let run = self.run(&args, bytes, timeout)?;
        expect_success(&args, &run)?;
        Ok(run.stdout)
    }

    /// Structural diff between two artifacts, as report text.
    pub fn diff(&self, left: &Path, right: &Path) -> Result<String, RobotError> {
        let report_path = scratch_path("diff", "txt");
        let args: Vec<String> = [
            "diff",
            "--left",
            &left.display().to_string(),
            "--right",
            &right.display().to_string(),
            "--output",
            &report_path.display().to_string(),
        ]
        .map(String::from)
        .to_vec();

        let bytes = file_size(left).max(file_size(right));
        let timeout = self.config.measure_timeout(bytes);
        let result = self.run(&args, bytes, timeout).and_then(|run| {
            expect_success(&args, &run)?;
            std::fs::read_to_string(&report_path).map_err(|e| RobotError::Io(e.to_string()))
        });
        let _ = std::fs::remove_file(&report_path);
        result
    }

    fn run(&self, args: &[String], input_bytes: u64, timeout: Duration) -> Result<CapturedRun, RobotError> {
        let mut command = Command::new("robot");
        command.args(args);
        if env::var_os(ROBOT_JAVA_ARGS).is_none() {
            command.env(ROBOT_JAVA_ARGS, self.config.heap_arg(input_bytes));
        }
        process::run_with_timeout(command, args, timeout)
    }
}

fn expect_success(args: &[String], run: &CapturedRun) -> Result<(), RobotError> {
    if run.status_success {
        return Ok(());
    }
    let stderr = run.stderr.trim();
    let message = if stderr.is_empty() {
        "unknown error".to_string()
    } else {
        stderr.to_string()
    };
    Err(RobotError::CommandFailed {
        args: args.join(" "),
        message,
    })
}

fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Unique scratch path under the system temp directory.
fn scratch_path(prefix: &str, ext: &str) -> PathBuf {
    let unique = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "owlmetry-{prefix}-{}-{unique}.{ext}",
        std::process::id()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_arg_clamps_to_floor_for_small_inputs() {
        let config = RobotConfig::default();
        assert_eq!(config.heap_arg(10_000_000), "-Xmx8g");
    }

    #[test]
    fn heap_arg_scales_with_input_size() {
        let config = RobotConfig::default();
        // 4 GiB input, 4 GiB of heap per input GiB.
        assert_eq!(config.heap_arg(4 * GIB), "-Xmx16g");
    }

    #[test]
    fn heap_arg_clamps_to_ceiling_for_huge_inputs() {
        let config = RobotConfig::default();
        assert_eq!(config.heap_arg(800 * GIB), "-Xmx64g");
    }

    #[test]
    fn measure_timeout_clamps_to_five_and_thirty_minutes() {
        let config = RobotConfig::default();
        assert_eq!(config.measure_timeout(0), Duration::from_secs(300));
        // 1 GiB at 1.5 MB/s is ~716s, inside the clamp.
        let mid = config.measure_timeout(GIB);
        assert!(mid > Duration::from_secs(300) && mid < Duration::from_secs(1800));
        assert_eq!(config.measure_timeout(800 * GIB), Duration::from_secs(1800));
    }

    #[test]
    fn query_timeout_has_its_own_clamp() {
        let config = RobotConfig::default();
        assert_eq!(config.query_timeout(0), Duration::from_secs(60));
        assert_eq!(config.query_timeout(800 * GIB), Duration::from_secs(600));
    }
}
