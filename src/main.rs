use std::process::ExitCode;

use clap::Parser;

use photofe::cli;
use photofe::logger;

fn main() -> ExitCode {
    // Initialize session log (overwrites previous session log)
    logger::init();

    let args = cli::CliArgs::parse();
    cli::run(args)
}
