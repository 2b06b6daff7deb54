#![forbid(unsafe_code)]

//! fwv: frame waterfall viewer CLI entry point.

use clap::Parser;

mod cli_app;

fn main() {
    let args = cli_app::Cli::parse();
    if let Err(e) = cli_app::run(&args) {
        eprintln!("fwv: {e}");
        std::process::exit(e.exit_code());
    }
}
