// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags, set up logging, hand off to `cli::run`.
// - Failures are printed once here and mapped to a non-zero exit code.

use clap::Parser;
use std::process::ExitCode;

use agenthq_cli::cli::{self, Cli};
use agenthq_cli::logging;
use agenthq_cli::ui::Printer;

fn main() -> ExitCode {
    let args = Cli::parse();
    let printer = Printer::new(args.output_mode());
    logging::init(args.debug, printer.mode());

    match cli::run(args, printer.clone()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            printer.error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
