use crate::support::read_json_file_or_exit;
use owlmetry_metrics::{ComparisonResult, MetricsRecord, compare};
use owlmetry_robot::RobotClient;
use serde_json::json;
use std::path::Path;

/// Structural diff output is truncated to this length in summaries.
const DIFF_EXCERPT_LEN: usize = 1000;

pub fn run(
    record_a: String,
    record_b: String,
    label_a: String,
    label_b: String,
    robot_diff: bool,
    json_output: bool,
) {
    let a: MetricsRecord = read_json_file_or_exit(&record_a, "metrics record");
    let b: MetricsRecord = read_json_file_or_exit(&record_b, "metrics record");

    let result = compare(&a, &b, &label_a, &label_b);
    let diff_excerpt = robot_diff.then(|| structural_diff(&a, &b)).flatten();

    if json_output {
        let mut payload = serde_json::to_value(&result).expect("json serialization");
        if let (Some(map), Some(diff)) = (payload.as_object_mut(), &diff_excerpt) {
            map.insert("robot_diff".to_string(), json!(diff));
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).expect("json serialization")
        );
    } else {
        print_human_summary(&result);
        if let Some(diff) = &diff_excerpt {
            println!("  Structural diff (excerpt):");
            for line in diff.lines() {
                println!("    {line}");
            }
        }
    }
}

/// Best-effort ROBOT diff between the compared artifacts; a failure is
/// reported as a warning, never fatal.
fn structural_diff(a: &MetricsRecord, b: &MetricsRecord) -> Option<String> {
    let client = RobotClient::default();
    match client.diff(Path::new(&a.file_path), Path::new(&b.file_path)) {
        Ok(text) => {
            let excerpt: String = text.chars().take(DIFF_EXCERPT_LEN).collect();
            Some(excerpt)
        }
        Err(error) => {
            eprintln!("warning: robot diff failed: {error}");
            None
        }
    }
}

fn print_human_summary(result: &ComparisonResult) {
    println!("owlmetry compare {} vs {}", result.label_a, result.label_b);
    println!("  File size diff:   {:+} bytes", result.file_size_difference);
    println!(
        "  Significant:      {}",
        if result.significant { "yes" } else { "no" }
    );
    println!(
        "  Differing metrics: {}",
        result.differing_metric_count()
    );

    let differing: Vec<_> = result
        .count_differences
        .iter()
        .filter(|(_, d)| d.difference != 0)
        .collect();
    if differing.is_empty() {
        println!("  Counts:           no differences");
    } else {
        println!("  Count differences:");
        for (key, delta) in differing {
            println!(
                "    {key:24} {} -> {} ({:+})",
                delta.a, delta.b, delta.difference
            );
        }
    }

    if !result.definer_differences.is_empty() {
        println!("  Definer differences:");
        for (definer, delta) in &result.definer_differences {
            println!(
                "    {definer}: {} -> {} ({:+})",
                delta.a, delta.b, delta.difference
            );
        }
    }

    if !result.key_term_differences.is_empty() {
        println!("  Monitored-term differences:");
        for (id, difference) in &result.key_term_differences {
            println!(
                "    {id} ({}): {} -> {}",
                difference.label,
                difference.a.as_deref().unwrap_or("absent"),
                difference.b.as_deref().unwrap_or("absent")
            );
        }
    }
}
