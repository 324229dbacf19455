use crate::support::{self, EXIT_PRECONDITION, yes_no};
use owlmetry_order::TermCatalogue;
use owlmetry_robot::{ROBOT_JAVA_ARGS, RobotClient};
use serde_json::json;
use std::path::Path;

/// Precondition gate for a matrix run. A failure here means the matrix
/// must not start; individual run failures later never come back
/// through this path.
pub fn run(data_dir: String, config: String, json_output: bool) {
    let data_path = Path::new(&data_dir);

    let robot_available = RobotClient::is_available();
    let robot_version = RobotClient::version();
    let heap_override = std::env::var(ROBOT_JAVA_ARGS).ok();

    let inputs = support::list_owl_inputs(data_path).unwrap_or_default();
    let inputs_ok = inputs.len() >= 2;

    let catalogue = TermCatalogue::load(&config);
    let (catalogue_ok, catalogue_detail) = match &catalogue {
        Ok(catalogue) => (true, format!("{} monitored terms", catalogue.terms().len())),
        Err(error) => (false, error.to_string()),
    };

    let passed = robot_available && inputs_ok && catalogue_ok;

    if json_output {
        let payload = json!({
            "passed": passed,
            "robot": {
                "available": robot_available,
                "version": robot_version,
                "heap_override": heap_override,
            },
            "inputs": {
                "data_dir": data_dir,
                "count": inputs.len(),
                "names": inputs,
            },
            "catalogue": {
                "path": config,
                "ok": catalogue_ok,
                "detail": catalogue_detail,
            },
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).expect("json serialization")
        );
    } else {
        println!("owlmetry validate");
        println!(
            "  ROBOT available:  {} {}",
            yes_no(robot_available),
            robot_version.as_deref().unwrap_or("")
        );
        match &heap_override {
            Some(value) => println!("  Heap override:    {value}"),
            None => println!("  Heap override:    none (size-scaled default)"),
        }
        println!(
            "  Input files:      {} in {} ({})",
            inputs.len(),
            data_dir,
            yes_no(inputs_ok)
        );
        println!("  Catalogue:        {catalogue_detail} ({})", yes_no(catalogue_ok));
        println!("  Preconditions:    {}", yes_no(passed));
    }

    if !passed {
        std::process::exit(EXIT_PRECONDITION);
    }
}
