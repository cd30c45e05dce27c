//! `phaser` - Advance declared resources through ordered phases

use clap::Parser;

use phaser::cli::args::Cli;
use phaser::cli::commands;
use phaser::error::ExitCode;
use phaser::observability::init_logging;

fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(cli.log_format, cli.verbose, cli.color);
    }

    match commands::dispatch(cli) {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
