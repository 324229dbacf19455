//! Owlmetry CLI: the `owlmetry` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            data_dir,
            config,
            json,
        } => commands::validate::run(data_dir, config, json),

        Commands::Collect {
            artifact,
            config,
            out,
            json,
        } => commands::collect::run(artifact, config, out, json),

        Commands::Compare {
            record_a,
            record_b,
            label_a,
            label_b,
            robot_diff,
            json,
        } => commands::compare::run(record_a, record_b, label_a, label_b, robot_diff, json),

        Commands::Matrix {
            data_dir,
            config,
            out,
            orderings,
            skip_removes,
            json,
        } => commands::matrix::run(commands::matrix::Args {
            data_dir,
            config,
            out,
            orderings,
            skip_removes,
            json,
        }),

        Commands::Report { results, out } => commands::report::run(results, out),
    }
}
