use clap::Parser;
use dirsort::cli::{Cli, RunOutcome, run_cli};
use dirsort::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli.log_level().as_str()),
    )
    .format_timestamp(None)
    .init();

    match run_cli(&cli) {
        Ok(RunOutcome::Sorted(report)) if !report.is_success() => ExitCode::from(2),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            if e.is_pre_mutation() {
                OutputFormatter::plain("No files were changed.");
            }
            ExitCode::from(1)
        }
    }
}
