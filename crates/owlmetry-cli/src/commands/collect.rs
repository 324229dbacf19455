use crate::support::{self, EXIT_PRECONDITION};
use owlmetry_metrics::{Artifact, CounterConfig, MetricsCollector, MetricsRecord};
use owlmetry_robot::RobotClient;
use std::path::Path;

pub fn run(artifact: String, config: String, out: Option<String>, json_output: bool) {
    let path = Path::new(&artifact);
    if !path.exists() {
        eprintln!("error: artifact not found: {artifact}");
        std::process::exit(EXIT_PRECONDITION);
    }
    let catalogue = support::load_catalogue_or_exit(&config);

    let backend = RobotClient::default();
    let collector = MetricsCollector::new(backend, CounterConfig::default());
    let record = collector.collect(&Artifact::standalone(path), catalogue.terms());

    let rendered = serde_json::to_string_pretty(&record).expect("json serialization");
    if let Some(out) = out {
        support::write_once_or_exit(Path::new(&out), rendered.as_bytes());
        println!("metrics record written to {out}");
        return;
    }

    if json_output {
        println!("{rendered}");
    } else {
        print_human_summary(&record);
    }
}

fn print_human_summary(record: &MetricsRecord) {
    println!("owlmetry collect {}", record.file_path);
    println!("  File size:        {} bytes", record.file_size);
    if let Some(digest) = &record.sha256 {
        println!("  SHA-256:          {digest}");
    }
    let provenance = serde_json::to_string(&record.provenance.method).expect("json serialization");
    println!("  Count provenance: {}", provenance.trim_matches('"'));
    let counts = record.basic_counts.metric_map();
    if counts.is_empty() {
        println!("  Counts:           none established");
    } else {
        println!("  Counts:");
        for (name, value) in counts {
            println!("    {name:24} {value}");
        }
    }
    if !record.axiom_breakdown.is_empty() {
        println!("  Axiom breakdown:");
        for (name, value) in &record.axiom_breakdown {
            println!("    {name:24} {value}");
        }
    }
    if !record.defined_by_counts.is_empty() {
        println!("  Definers:");
        for (definer, count) in &record.defined_by_counts {
            println!("    {count:>10}  {definer}");
        }
    }
    if !record.key_term_definers.is_empty() {
        println!("  Monitored terms:");
        for (id, definer) in &record.key_term_definers {
            println!("    {id} ({}) -> {}", definer.label, definer.definer);
        }
    }
    println!("  Collected in:     {:.1}s", record.collection_seconds);
}
