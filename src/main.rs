use clap::Parser;
use coursetidy::cli::{Cli, run_cli};
use coursetidy::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("Welcome to coursetidy - coursework organization made easy!");

    let cli = Cli::parse();

    // Per-file errors are reported during the run and do not change the exit status
    match run_cli(cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&e);
            ExitCode::FAILURE
        }
    }
}
