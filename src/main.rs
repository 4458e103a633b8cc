use clap::Parser;
use dlsort::cli::{Cli, run_cli};
use dlsort::logging;
use dlsort::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // Per-file failures are part of a completed run; only setup errors fail.
    match run_cli(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}
