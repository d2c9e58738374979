use clap::Parser;
use colored::Colorize;
use pomup::cli::{Cli, Commands};
use pomup::workflow;
use std::process;

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        unsafe {
            std::env::set_var("POMUP_VERBOSE", "1");
        }
    }

    let result = match cli.command {
        Commands::UseReleases {
            accept_qualified,
            qualifier_includes,
            qualifier_excludes,
        } => workflow::execute_use_releases(
            &cli.pom,
            &cli.repos,
            &cli.comparison_method,
            accept_qualified,
            qualifier_includes.as_deref(),
            qualifier_excludes.as_deref(),
        ),
        Commands::Check {
            range,
            snapshots,
            json,
        } => workflow::execute_check(
            &cli.pom,
            &cli.repos,
            &cli.comparison_method,
            range.as_deref(),
            snapshots,
            json,
        ),
        Commands::Set {
            coordinate,
            version,
            range,
            verify_remote,
        } => workflow::execute_set(
            &cli.pom,
            &cli.repos,
            &cli.comparison_method,
            &coordinate,
            &version,
            range.as_deref(),
            verify_remote,
        ),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}
