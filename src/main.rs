mod check_cmd;
mod cli;
mod config;
mod convert;
mod input;
mod logging;
mod report;
mod transform_cmd;

use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Dwt(args) => transform_cmd::run_dwt(args),
        Command::Modwt(args) => transform_cmd::run_modwt(args),
        Command::Packet(args) => transform_cmd::run_packet(args),
        Command::Check(args) => check_cmd::run(args),
    }
}
