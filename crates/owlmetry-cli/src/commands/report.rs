use crate::support::{self, read_json_file_or_exit};
use owlmetry_order::{MatrixResults, render_summary};
use std::path::Path;

pub fn run(results: String, out: Option<String>) {
    let results: MatrixResults = read_json_file_or_exit(&results, "matrix results");
    let summary = render_summary(&results);

    match out {
        Some(out) => {
            support::write_once_or_exit(Path::new(&out), summary.as_bytes());
            println!("summary written to {out}");
        }
        None => print!("{summary}"),
    }
}
