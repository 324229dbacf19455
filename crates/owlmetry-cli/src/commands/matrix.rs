use crate::cli::OrderingPlan;
use crate::support::{self, EXIT_PRECONDITION};
use chrono::Utc;
use owlmetry_metrics::{CounterConfig, MetricsCollector};
use owlmetry_order::ordering::PERMUTATION_INPUT_LIMIT;
use owlmetry_order::results::MATRIX_RESULTS_SCHEMA;
use owlmetry_order::{
    MatrixDriver, MatrixResults, RunOutcome, Variant, analyze, named_strategies, permutations,
    render_summary,
};
use owlmetry_robot::RobotClient;
use serde_json::json;
use std::path::Path;
use uuid::Uuid;

pub struct Args {
    pub data_dir: String,
    pub config: String,
    pub out: String,
    pub orderings: Option<OrderingPlan>,
    pub skip_removes: bool,
    pub json: bool,
}

pub fn run(args: Args) {
    let data_path = Path::new(&args.data_dir);
    let out_path = Path::new(&args.out);

    // Preconditions: these block the matrix entirely. Everything after
    // this point records failures instead of aborting.
    let catalogue = support::load_catalogue_or_exit(&args.config);
    let inputs = support::list_owl_inputs(data_path).unwrap_or_else(|e| {
        eprintln!("error: failed to list inputs: {e}");
        std::process::exit(EXIT_PRECONDITION);
    });
    if inputs.len() < 2 {
        eprintln!(
            "error: need at least 2 input ontologies in {}, found {}",
            args.data_dir,
            inputs.len()
        );
        std::process::exit(EXIT_PRECONDITION);
    }
    if !RobotClient::is_available() {
        eprintln!("error: robot executable is not available in PATH");
        std::process::exit(EXIT_PRECONDITION);
    }

    let plan = args.orderings.unwrap_or(if inputs.len() <= PERMUTATION_INPUT_LIMIT {
        OrderingPlan::Permutations
    } else {
        OrderingPlan::Strategies
    });
    let orderings = match plan {
        OrderingPlan::Permutations => permutations(&inputs),
        OrderingPlan::Strategies => {
            let sizes = support::input_sizes(data_path, &inputs);
            named_strategies(&inputs, catalogue.hierarchy(), &sizes)
        }
    };
    let variants: Vec<Variant> = if args.skip_removes {
        vec![Variant::MergeOnly]
    } else {
        Variant::BOTH.to_vec()
    };

    let merged_dir = out_path.join("merged");
    if let Err(e) = std::fs::create_dir_all(&merged_dir) {
        eprintln!("error: failed to create {}: {e}", merged_dir.display());
        std::process::exit(EXIT_PRECONDITION);
    }

    if !args.json {
        println!(
            "owlmetry matrix: {} inputs, {} orderings x {} variants = {} runs",
            inputs.len(),
            orderings.len(),
            variants.len(),
            orderings.len() * variants.len()
        );
    }

    let started_at = Utc::now();
    let pipeline = RobotClient::default();
    let collector = MetricsCollector::new(RobotClient::default(), CounterConfig::default());
    let driver = MatrixDriver::new(&pipeline, &collector, data_path, &merged_dir);

    let total = orderings.len() * variants.len();
    let mut completed = 0usize;
    let runs = driver.run_all(&orderings, &variants, catalogue.terms(), |run| {
        completed += 1;
        if args.json {
            return;
        }
        match &run.outcome {
            RunOutcome::Success { record } => println!(
                "  [{completed}/{total}] ok   {} ({} bytes)",
                run.run_key(),
                record.file_size
            ),
            RunOutcome::Failed { error } => println!(
                "  [{completed}/{total}] FAIL {} ({})",
                run.run_key(),
                error.lines().next().unwrap_or("")
            ),
        }
    });

    let analysis = analyze(&runs, catalogue.terms());
    let results = MatrixResults {
        schema: MATRIX_RESULTS_SCHEMA,
        run_id: Uuid::new_v4(),
        started_at,
        finished_at: Utc::now(),
        data_dir: args.data_dir.clone(),
        inputs,
        orderings,
        variants,
        runs,
        analysis,
    };

    let key = results.timestamp_key();
    let results_path = out_path.join(format!("matrix_results_{key}.json"));
    let summary_path = out_path.join(format!("matrix_summary_{key}.txt"));
    let rendered = serde_json::to_vec_pretty(&results).expect("json serialization");
    support::write_once_or_exit(&results_path, &rendered);
    let summary = render_summary(&results);
    support::write_once_or_exit(&summary_path, summary.as_bytes());

    if args.json {
        let payload = json!({
            "run_id": results.run_id,
            "results_path": results_path.display().to_string(),
            "summary_path": summary_path.display().to_string(),
            "total_runs": results.analysis.total_runs,
            "successful_runs": results.analysis.successful_runs,
            "failed_runs": results.analysis.failed_runs,
            "volatile_term_count": results.analysis.volatile_term_count,
            "significant_pairs": results.analysis.significant_pairs,
            "findings": results.analysis.findings,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).expect("json serialization")
        );
    } else {
        println!();
        print!("{summary}");
        println!("Results:  {}", results_path.display());
        println!("Summary:  {}", summary_path.display());
    }
    // The matrix completed; individual run failures are recorded in the
    // results, not reflected in the exit status.
}
